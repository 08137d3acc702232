//! Connection Registry Service
//!
//! Resolves connection names to live, pooled database handles. Handles are
//! created lazily on first use and reused afterwards.

use dashmap::DashMap;
use dbcreds_domain::credentials::{
    ConnectionConfigStore, ConnectionFactory, CredentialError, DatabaseConnection,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, warn};

/// Single-initialisation cell for one connection name
#[derive(Default)]
struct ConnectionSlot {
    handle: OnceCell<Arc<dyn DatabaseConnection>>,
    closed: Mutex<bool>,
}

impl ConnectionSlot {
    /// Waits for an initialisation already in progress, without starting one
    async fn settled(&self) -> Option<&Arc<dyn DatabaseConnection>> {
        self.handle
            .get_or_try_init(|| async { Err(()) })
            .await
            .ok()
    }

    /// Closes the handle at most once
    ///
    /// Returns true once the slot's handle is closed, whichever caller closed
    /// it; false if the slot never held a handle.
    async fn retire(&self) -> Result<bool, CredentialError> {
        let Some(handle) = self.handle.get() else {
            return Ok(false);
        };

        let mut closed = self.closed.lock().await;
        if !*closed {
            handle.close().await?;
            *closed = true;
        }
        Ok(true)
    }
}

/// Statistics about the connection registry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionRegistryStats {
    /// Number of connection names with a live handle
    pub cached_connections: usize,
    /// Handles opened since the registry was created
    pub connections_created: u64,
}

/// Registry of live database connections, keyed by connection name
///
/// # Invariant
///
/// At most one tracked handle exists per connection name. Each name owns a
/// single-initialisation slot: concurrent first resolutions of the same name
/// wait on one factory call instead of racing to create duplicates. A failed
/// initialisation drops the slot so a later call can retry.
///
/// A slot invalidated while its handle is still being opened is retired:
/// the late handle is closed and the resolution starts over on a fresh slot.
///
/// # Staleness
///
/// The registry does not detect configuration changes. The reconfiguration
/// path must call [`ConnectionRegistry::invalidate`].
///
/// # Example
///
/// ```ignore
/// let registry = ConnectionRegistry::new(config_store, postgres_factory);
/// let db = registry.resolve("analytics-pg").await?;
/// db.revoke_user(role.statements(), "v-readonly-x1y2").await?;
/// ```
pub struct ConnectionRegistry {
    configs: Arc<dyn ConnectionConfigStore>,
    factory: Arc<dyn ConnectionFactory>,
    connections: DashMap<String, Arc<ConnectionSlot>>,
    connections_created: AtomicU64,
}

impl ConnectionRegistry {
    /// Creates a new empty registry
    pub fn new(
        configs: Arc<dyn ConnectionConfigStore>,
        factory: Arc<dyn ConnectionFactory>,
    ) -> Self {
        Self {
            configs,
            factory,
            connections: DashMap::new(),
            connections_created: AtomicU64::new(0),
        }
    }

    /// Returns the handle for `name`, opening it on first use
    ///
    /// # Errors
    ///
    /// - `CredentialError::ConnectionNotFound` if no configuration exists
    /// - `CredentialError::ConnectionFailed` if the factory cannot connect
    pub async fn resolve(
        &self,
        name: &str,
    ) -> Result<Arc<dyn DatabaseConnection>, CredentialError> {
        loop {
            // Clone the slot out so no map shard lock is held across the await.
            let slot = self.connections.entry(name.to_string()).or_default().clone();

            let handle = match slot.handle.get_or_try_init(|| self.open(name)).await {
                Ok(handle) => handle.clone(),
                Err(e) => {
                    self.connections.remove_if(name, |_, current| {
                        Arc::ptr_eq(current, &slot) && !current.handle.initialized()
                    });
                    return Err(e);
                }
            };

            if self.is_current(name, &slot) {
                return Ok(handle);
            }

            debug!(connection = %name, "Connection invalidated while opening, retrying");
            if let Err(e) = slot.retire().await {
                warn!(connection = %name, error = %e, "Failed to close stale database connection");
            }
        }
    }

    fn is_current(&self, name: &str, slot: &Arc<ConnectionSlot>) -> bool {
        self.connections
            .get(name)
            .map(|current| Arc::ptr_eq(current.value(), slot))
            .unwrap_or(false)
    }

    async fn open(&self, name: &str) -> Result<Arc<dyn DatabaseConnection>, CredentialError> {
        let config = self
            .configs
            .get_connection_config(name)
            .await?
            .ok_or_else(|| CredentialError::connection_not_found(name))?;

        debug!(connection = %name, plugin = %config.plugin, "Opening database connection");
        let handle = self.factory.connect(&config).await?;
        self.connections_created.fetch_add(1, Ordering::Relaxed);

        info!(connection = %name, plugin = %handle.plugin_name(), "Opened database connection");
        Ok(handle)
    }

    /// Drops and closes the cached handle for `name`
    ///
    /// A handle still being opened is waited for and closed. The next
    /// [`resolve`](Self::resolve) opens a fresh handle. Operations still
    /// holding the old handle may fail once it is closed.
    pub async fn invalidate(&self, name: &str) -> Result<bool, CredentialError> {
        let Some((_, slot)) = self.connections.remove(name) else {
            return Ok(false);
        };

        if slot.settled().await.is_none() {
            return Ok(false);
        }

        let closed = slot.retire().await?;
        if closed {
            info!(connection = %name, "Invalidated database connection");
        }
        Ok(closed)
    }

    /// Closes every cached handle
    ///
    /// All handles are attempted; the first close failure is returned.
    pub async fn close_all(&self) -> Result<(), CredentialError> {
        let names: Vec<String> = self.connections.iter().map(|e| e.key().clone()).collect();
        let mut first_error = None;

        for name in names {
            if let Err(e) = self.invalidate(&name).await {
                warn!(connection = %name, error = %e, "Failed to close database connection");
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Returns true if a live handle is cached for `name`
    pub fn is_cached(&self, name: &str) -> bool {
        self.connections
            .get(name)
            .map(|slot| slot.handle.initialized())
            .unwrap_or(false)
    }

    /// Lists connection names with a live handle
    pub fn cached_connections(&self) -> Vec<String> {
        self.connections
            .iter()
            .filter(|e| e.value().handle.initialized())
            .map(|e| e.key().clone())
            .collect()
    }

    /// Gets registry statistics
    pub fn stats(&self) -> ConnectionRegistryStats {
        ConnectionRegistryStats {
            cached_connections: self.cached_connections().len(),
            connections_created: self.connections_created.load(Ordering::Relaxed),
        }
    }
}
