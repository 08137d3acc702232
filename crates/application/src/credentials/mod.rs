//! Credential Lifecycle Application Services
//!
//! Provides application-level services for database credential leases:
//! - `ConnectionRegistry`: Lazily opens and caches one handle per connection
//! - `OperationLocks`: Serialises renew/revoke, globally or per connection
//! - `CredentialLifecycleManager`: Renews and revokes leased database users
//!
//! # Example
//!
//! ```ignore
//! use dbcreds_application::credentials::{ConnectionRegistry, CredentialLifecycleManager};
//!
//! let registry = Arc::new(ConnectionRegistry::new(config_store, postgres_factory));
//! let manager = CredentialLifecycleManager::from_config(role_store, registry, &config.leases);
//!
//! let response = manager.renew(&lease).await?;
//! ```

mod lifecycle;
mod locking;
mod registry;

#[cfg(test)]
pub(crate) mod mocks;

pub use lifecycle::CredentialLifecycleManager;
pub use locking::OperationLocks;
pub use registry::{ConnectionRegistry, ConnectionRegistryStats};
