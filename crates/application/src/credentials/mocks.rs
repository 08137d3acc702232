//! Mock ports for testing the credential services

use async_trait::async_trait;
use dbcreds_domain::credentials::{
    ConnectionConfig, ConnectionConfigStore, ConnectionFactory, CredentialError,
    DatabaseConnection, MutationKind, Role, RoleStore, Statements,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Tracks how many mutations run at the same time across all mock databases
#[derive(Debug, Default)]
pub struct ConcurrencyProbe {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ConcurrencyProbe {
    fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Recorded database call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbCall {
    Renew {
        username: String,
        expiration: String,
        statements: Statements,
    },
    Revoke {
        username: String,
        statements: Statements,
    },
}

/// Mock database recording every mutation
pub struct MockDatabase {
    connection: String,
    calls: Mutex<Vec<DbCall>>,
    close_calls: AtomicUsize,
    /// When set, only these accounts exist; revoking others fails
    known_users: Option<HashSet<String>>,
    fail_renew: bool,
    mutation_delay: Duration,
    probe: Arc<ConcurrencyProbe>,
    connection_probe: Arc<ConcurrencyProbe>,
}

impl MockDatabase {
    pub fn connection(&self) -> &str {
        &self.connection
    }

    pub fn calls(&self) -> Vec<DbCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    /// Highest number of overlapping mutations on this one handle
    pub fn max_in_flight(&self) -> usize {
        self.connection_probe.max_in_flight()
    }

    async fn mutate(&self, call: DbCall) {
        self.probe.enter();
        self.connection_probe.enter();
        if !self.mutation_delay.is_zero() {
            tokio::time::sleep(self.mutation_delay).await;
        }
        self.calls.lock().unwrap().push(call);
        self.connection_probe.exit();
        self.probe.exit();
    }
}

#[async_trait]
impl DatabaseConnection for MockDatabase {
    fn plugin_name(&self) -> &str {
        "mock"
    }

    async fn renew_user(
        &self,
        statements: &Statements,
        username: &str,
        expiration: &str,
    ) -> Result<(), CredentialError> {
        if self.fail_renew {
            return Err(CredentialError::database_mutation(
                MutationKind::Renew,
                username,
                "mock renew failure",
            ));
        }

        self.mutate(DbCall::Renew {
            username: username.to_string(),
            expiration: expiration.to_string(),
            statements: statements.clone(),
        })
        .await;
        Ok(())
    }

    async fn revoke_user(
        &self,
        statements: &Statements,
        username: &str,
    ) -> Result<(), CredentialError> {
        if let Some(users) = &self.known_users {
            if !users.contains(username) {
                return Err(CredentialError::database_mutation(
                    MutationKind::Revoke,
                    username,
                    format!("role \"{}\" does not exist", username),
                ));
            }
        }

        self.mutate(DbCall::Revoke {
            username: username.to_string(),
            statements: statements.clone(),
        })
        .await;
        Ok(())
    }

    async fn close(&self) -> Result<(), CredentialError> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Mock factory creating [`MockDatabase`] handles and counting connects
#[derive(Default)]
pub struct MockConnectionFactory {
    connect_calls: AtomicUsize,
    fail_first: usize,
    connect_delay: Duration,
    mutation_delay: Duration,
    known_users: Option<HashSet<String>>,
    fail_renew: bool,
    probe: Arc<ConcurrencyProbe>,
    created: Mutex<Vec<Arc<MockDatabase>>>,
}

impl MockConnectionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first `n` connects fail with `ConnectionFailed`
    pub fn failing_first(mut self, n: usize) -> Self {
        self.fail_first = n;
        self
    }

    pub fn with_connect_delay_ms(mut self, ms: u64) -> Self {
        self.connect_delay = Duration::from_millis(ms);
        self
    }

    pub fn with_mutation_delay_ms(mut self, ms: u64) -> Self {
        self.mutation_delay = Duration::from_millis(ms);
        self
    }

    pub fn with_known_users(mut self, users: &[&str]) -> Self {
        self.known_users = Some(users.iter().map(|u| u.to_string()).collect());
        self
    }

    pub fn failing_renew(mut self) -> Self {
        self.fail_renew = true;
        self
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    /// The `index`-th database created by this factory
    pub fn database(&self, index: usize) -> Arc<MockDatabase> {
        self.created.lock().unwrap()[index].clone()
    }

    pub fn database_for(&self, connection: &str) -> Option<Arc<MockDatabase>> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .find(|db| db.connection() == connection)
            .cloned()
    }

    pub fn probe(&self) -> Arc<ConcurrencyProbe> {
        self.probe.clone()
    }
}

#[async_trait]
impl ConnectionFactory for MockConnectionFactory {
    async fn connect(
        &self,
        config: &ConnectionConfig,
    ) -> Result<Arc<dyn DatabaseConnection>, CredentialError> {
        let attempt = self.connect_calls.fetch_add(1, Ordering::SeqCst);
        if !self.connect_delay.is_zero() {
            tokio::time::sleep(self.connect_delay).await;
        }
        if attempt < self.fail_first {
            return Err(CredentialError::connection_failed(
                &config.name,
                "mock connection refused",
            ));
        }

        let db = Arc::new(MockDatabase {
            connection: config.name.clone(),
            calls: Mutex::new(Vec::new()),
            close_calls: AtomicUsize::new(0),
            known_users: self.known_users.clone(),
            fail_renew: self.fail_renew,
            mutation_delay: self.mutation_delay,
            probe: self.probe.clone(),
            connection_probe: Arc::new(ConcurrencyProbe::default()),
        });
        self.created.lock().unwrap().push(db.clone());
        Ok(db)
    }
}

/// Mock connection configuration store
pub struct MockConfigStore {
    configs: HashMap<String, ConnectionConfig>,
    lookups: AtomicUsize,
}

impl MockConfigStore {
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectionConfigStore for MockConfigStore {
    async fn get_connection_config(
        &self,
        name: &str,
    ) -> Result<Option<ConnectionConfig>, CredentialError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.configs.get(name).cloned())
    }
}

pub fn config_store(names: &[&str]) -> Arc<MockConfigStore> {
    let configs = names
        .iter()
        .map(|name| {
            (
                name.to_string(),
                ConnectionConfig::new(*name, "mock", format!("mock://{}", name)),
            )
        })
        .collect();

    Arc::new(MockConfigStore {
        configs,
        lookups: AtomicUsize::new(0),
    })
}

/// Mock role store whose roles can be deleted mid-test
#[derive(Default)]
pub struct MockRoleStore {
    roles: Mutex<HashMap<String, Role>>,
    lookups: AtomicUsize,
    fail: bool,
}

impl MockRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_role(self, role: Role) -> Self {
        self.roles
            .lock()
            .unwrap()
            .insert(role.name().to_string(), role);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn delete(&self, name: &str) {
        self.roles.lock().unwrap().remove(name);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoleStore for MockRoleStore {
    async fn get_role(&self, name: &str) -> Result<Option<Role>, CredentialError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CredentialError::role_store("mock storage unavailable"));
        }
        Ok(self.roles.lock().unwrap().get(name).cloned())
    }
}
