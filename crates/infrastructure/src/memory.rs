//! In-Memory Stores
//!
//! Role and connection-configuration stores kept in process memory. Useful
//! for embedding hosts that load their catalogue at startup, and for tests.
//! Writes are visible to the next lookup; nothing is cached by readers.

use async_trait::async_trait;
use dbcreds_domain::credentials::{
    ConnectionConfig, ConnectionConfigStore, CredentialError, Role, RoleStore,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory role store
#[derive(Clone, Default)]
pub struct InMemoryRoleStore {
    roles: Arc<RwLock<HashMap<String, Role>>>,
}

impl InMemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a role
    pub async fn put(&self, role: Role) {
        let mut roles = self.roles.write().await;
        roles.insert(role.name().to_string(), role);
    }

    /// Deletes a role, returning it if it existed
    pub async fn delete(&self, name: &str) -> Option<Role> {
        let mut roles = self.roles.write().await;
        roles.remove(name)
    }

    pub async fn len(&self) -> usize {
        self.roles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.roles.read().await.is_empty()
    }
}

#[async_trait]
impl RoleStore for InMemoryRoleStore {
    async fn get_role(&self, name: &str) -> Result<Option<Role>, CredentialError> {
        let roles = self.roles.read().await;
        Ok(roles.get(name).cloned())
    }
}

/// In-memory connection configuration store
#[derive(Clone, Default)]
pub struct InMemoryConnectionConfigStore {
    configs: Arc<RwLock<HashMap<String, ConnectionConfig>>>,
}

impl InMemoryConnectionConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a configuration
    ///
    /// A cached handle for the same name keeps the old settings until the
    /// registry entry is invalidated.
    pub async fn put(&self, config: ConnectionConfig) {
        let mut configs = self.configs.write().await;
        configs.insert(config.name.clone(), config);
    }

    pub async fn delete(&self, name: &str) -> Option<ConnectionConfig> {
        let mut configs = self.configs.write().await;
        configs.remove(name)
    }
}

#[async_trait]
impl ConnectionConfigStore for InMemoryConnectionConfigStore {
    async fn get_connection_config(
        &self,
        name: &str,
    ) -> Result<Option<ConnectionConfig>, CredentialError> {
        let configs = self.configs.read().await;
        Ok(configs.get(name).cloned())
    }
}
