//! Database connection ports
//!
//! Defines the abstraction for the databases credentials are issued on.
//! Implementations live in the infrastructure layer (PostgreSQL today).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::error::CredentialError;
use super::statements::Statements;

/// Configuration of a named database connection
///
/// # Security Note
///
/// `connection_url` usually embeds the privileged account's password. The
/// Debug implementation redacts it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Connection name referenced by roles
    pub name: String,
    /// Database plugin handling this connection (e.g. "postgresql")
    pub plugin: String,
    /// Connection URL of the privileged account
    pub connection_url: String,
    /// Pool size override; the factory default applies when unset
    #[serde(default)]
    pub max_open_connections: Option<u32>,
    /// Acquire timeout override; the factory default applies when unset
    #[serde(default)]
    pub connect_timeout: Option<Duration>,
}

impl ConnectionConfig {
    pub fn new(
        name: impl Into<String>,
        plugin: impl Into<String>,
        connection_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            plugin: plugin.into(),
            connection_url: connection_url.into(),
            max_open_connections: None,
            connect_timeout: None,
        }
    }

    pub fn with_max_open_connections(mut self, max: u32) -> Self {
        self.max_open_connections = Some(max);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("name", &self.name)
            .field("plugin", &self.plugin)
            .field("connection_url", &"[REDACTED]")
            .field("max_open_connections", &self.max_open_connections)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// A live, reusable session against one configured database
///
/// Implementations must be thread-safe (Send + Sync). Callers serialise
/// mutations on one handle; implementations need not.
#[async_trait]
pub trait DatabaseConnection: Send + Sync {
    /// Returns the plugin name (e.g. "postgresql")
    fn plugin_name(&self) -> &str;

    /// Extends the account's validity to the absolute `expiration`
    ///
    /// `expiration` is formatted as `YYYY-MM-DD HH:MM:SS±HHMM`. An empty
    /// renew template selects the plugin's default statement.
    ///
    /// # Errors
    ///
    /// - `CredentialError::DatabaseMutation` if the statements fail
    async fn renew_user(
        &self,
        statements: &Statements,
        username: &str,
        expiration: &str,
    ) -> Result<(), CredentialError>;

    /// Revokes and drops the account
    ///
    /// An empty revoke template selects the plugin's default revocation.
    ///
    /// # Errors
    ///
    /// - `CredentialError::DatabaseMutation` if the statements fail or the
    ///   account does not exist
    async fn revoke_user(&self, statements: &Statements, username: &str)
    -> Result<(), CredentialError>;

    /// Releases the underlying sessions
    async fn close(&self) -> Result<(), CredentialError> {
        Ok(())
    }
}

/// Opens live connections from configuration
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    /// Establishes a connection
    ///
    /// # Errors
    ///
    /// - `CredentialError::ConnectionFailed` if the database is unreachable
    ///   or the plugin is not supported
    async fn connect(
        &self,
        config: &ConnectionConfig,
    ) -> Result<Arc<dyn DatabaseConnection>, CredentialError>;
}

/// Read-only access to connection configurations
#[async_trait]
pub trait ConnectionConfigStore: Send + Sync {
    /// Looks up a connection configuration by name; `Ok(None)` if absent
    async fn get_connection_config(
        &self,
        name: &str,
    ) -> Result<Option<ConnectionConfig>, CredentialError>;
}
