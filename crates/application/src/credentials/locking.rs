//! Operation locks around connection resolution and database mutation
//!
//! A renew or revoke holds one of these guards from connection resolution
//! until its mutation finishes, so two mutations never interleave on one
//! handle.

use dashmap::DashMap;
use dbcreds_shared::config::LockStrategy;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Locks serialising renew/revoke operations
///
/// - `Global`: one lock for every connection. Simple, and the throughput
///   ceiling is one database mutation at a time.
/// - `PerConnection`: one lock per connection name, created on demand.
///   Operations on different connections proceed in parallel.
///
/// Neither strategy is fair; waiters are woken in no particular order.
pub enum OperationLocks {
    Global(Arc<Mutex<()>>),
    PerConnection(DashMap<String, Arc<Mutex<()>>>),
}

impl OperationLocks {
    pub fn new(strategy: LockStrategy) -> Self {
        match strategy {
            LockStrategy::Global => Self::Global(Arc::new(Mutex::new(()))),
            LockStrategy::PerConnection => Self::PerConnection(DashMap::new()),
        }
    }

    pub fn strategy(&self) -> LockStrategy {
        match self {
            Self::Global(_) => LockStrategy::Global,
            Self::PerConnection(_) => LockStrategy::PerConnection,
        }
    }

    /// Waits for the lock guarding `connection`
    pub async fn acquire(&self, connection: &str) -> OwnedMutexGuard<()> {
        let lock = match self {
            Self::Global(lock) => lock.clone(),
            Self::PerConnection(locks) => locks.entry(connection.to_string()).or_default().clone(),
        };
        lock.lock_owned().await
    }
}
