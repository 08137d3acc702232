//! Credential Lifecycle Manager
//!
//! Renews and revokes dynamically issued database accounts on behalf of the
//! enclosing lease manager.
//!
//! # Flow
//!
//! 1. Decode the lease's internal data (`username`, `role`)
//! 2. Look up the role by name; roles are never cached across calls
//! 3. Renew only: compute the new expiration with the lease extender
//! 4. Take the operation lock for the role's connection
//! 5. Resolve the connection and run the database mutation
//!
//! Steps 1-3 fail without touching the lock or the registry.

use dbcreds_domain::credentials::{
    CredentialError, LeaseInternalData, LeaseRequest, LeaseResponse, RevokeResponse, RoleStore,
    Statements,
};
use dbcreds_domain::leasing::{LeaseExtender, SystemView, TtlLeaseExtender};
use dbcreds_shared::config::{LeaseConfig, LockStrategy, MissingRolePolicy};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::locking::OperationLocks;
use super::registry::ConnectionRegistry;

/// Renew/revoke orchestration for database credential leases
///
/// # Example
///
/// ```ignore
/// let manager = CredentialLifecycleManager::new(roles, registry, SystemView::from(&config.leases))
///     .with_lock_strategy(config.leases.lock_strategy);
///
/// let response = manager.renew(&lease).await?;
/// manager.revoke(&lease).await?;
/// ```
pub struct CredentialLifecycleManager {
    roles: Arc<dyn RoleStore>,
    registry: Arc<ConnectionRegistry>,
    extender: Arc<dyn LeaseExtender>,
    system: SystemView,
    locks: OperationLocks,
    missing_role_policy: MissingRolePolicy,
}

impl CredentialLifecycleManager {
    /// Creates a manager with the global lock, the wall-clock extender and
    /// the fail-on-missing-role revocation policy
    pub fn new(
        roles: Arc<dyn RoleStore>,
        registry: Arc<ConnectionRegistry>,
        system: SystemView,
    ) -> Self {
        Self {
            roles,
            registry,
            extender: Arc::new(TtlLeaseExtender::default()),
            system,
            locks: OperationLocks::new(LockStrategy::Global),
            missing_role_policy: MissingRolePolicy::Fail,
        }
    }

    /// Creates a manager configured from the lease settings
    pub fn from_config(
        roles: Arc<dyn RoleStore>,
        registry: Arc<ConnectionRegistry>,
        config: &LeaseConfig,
    ) -> Self {
        Self::new(roles, registry, SystemView::from(config))
            .with_lock_strategy(config.lock_strategy)
            .with_missing_role_policy(config.missing_role_policy)
    }

    pub fn with_extender(mut self, extender: Arc<dyn LeaseExtender>) -> Self {
        self.extender = extender;
        self
    }

    pub fn with_lock_strategy(mut self, strategy: LockStrategy) -> Self {
        self.locks = OperationLocks::new(strategy);
        self
    }

    pub fn with_missing_role_policy(mut self, policy: MissingRolePolicy) -> Self {
        self.missing_role_policy = policy;
        self
    }

    pub fn lock_strategy(&self) -> LockStrategy {
        self.locks.strategy()
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Extends the database account's validity to the lease's new expiration
    ///
    /// Either the new expiration is both computed and written to the
    /// database, or an error is returned and the previous expiration stays
    /// authoritative.
    ///
    /// # Errors
    ///
    /// - `MalformedLease` if `username` is missing
    /// - `RoleNotFound` if the lease names no role or the role was deleted
    /// - `ExtensionRejected` from the extension policy, unchanged
    /// - `ConnectionNotFound` / `ConnectionFailed` from the registry
    /// - `DatabaseMutation` if the renew statements fail
    #[instrument(skip(self, lease), fields(lease_id = %lease.lease_id()))]
    pub async fn renew(&self, lease: &LeaseRequest) -> Result<LeaseResponse, CredentialError> {
        let data = LeaseInternalData::decode(lease.internal_data())?;

        let role = self
            .roles
            .get_role(&data.role)
            .await?
            .ok_or_else(|| CredentialError::role_not_found(&data.role))?;

        let extension =
            self.extender
                .extend(role.default_ttl(), role.max_ttl(), &self.system, lease)?;

        {
            let _guard = self.locks.acquire(role.connection_name()).await;

            let db = self.registry.resolve(role.connection_name()).await?;

            if let Some(deadline) = extension.validity_deadline() {
                db.renew_user(role.statements(), &data.username, &deadline)
                    .await?;
                debug!(
                    username = %data.username,
                    connection = %role.connection_name(),
                    valid_until = %deadline,
                    "Extended database user validity"
                );
            }
        }

        info!(
            role = %role.name(),
            ttl_secs = extension.ttl.as_secs(),
            "Renewed database credential lease"
        );

        Ok(LeaseResponse {
            lease_id: lease.lease_id().to_string(),
            ttl: extension.ttl,
            expiration_time: extension.expiration_time,
        })
    }

    /// Revokes and drops the database account behind the lease
    ///
    /// # Missing roles
    ///
    /// With [`MissingRolePolicy::Fail`] a deleted role fails the revocation
    /// with `RoleNotFound` before any connection is resolved. With
    /// [`MissingRolePolicy::DefaultStatements`] the account is revoked on the
    /// connection recorded in the lease's `db_name` using the plugin's
    /// default statements, and the response carries a warning. Leases without
    /// `db_name` still fail with `RoleNotFound`.
    ///
    /// # Errors
    ///
    /// - `MalformedLease` if `username` is missing
    /// - `RoleNotFound` if the lease names no role, or the role was deleted
    ///   (see above)
    /// - `ConnectionNotFound` / `ConnectionFailed` from the registry
    /// - `DatabaseMutation` if the revoke statements fail; the account must
    ///   be assumed to still exist
    #[instrument(skip(self, lease), fields(lease_id = %lease.lease_id()))]
    pub async fn revoke(&self, lease: &LeaseRequest) -> Result<RevokeResponse, CredentialError> {
        let data = LeaseInternalData::decode(lease.internal_data())?;
        let mut response = RevokeResponse::new(lease.lease_id());

        let (connection, statements) = match self.roles.get_role(&data.role).await? {
            Some(role) => (role.connection_name().to_string(), role.statements().clone()),
            None => {
                let db_name = match (self.missing_role_policy, data.db_name.as_deref()) {
                    (MissingRolePolicy::DefaultStatements, Some(db_name)) => db_name,
                    _ => return Err(CredentialError::role_not_found(&data.role)),
                };

                let warning = format!(
                    "Role {:?} cannot be found. Using default revocation statements.",
                    data.role
                );
                warn!(role = %data.role, connection = %db_name, "{}", warning);
                response.add_warning(warning);
                (db_name.to_string(), Statements::default())
            }
        };

        {
            let _guard = self.locks.acquire(&connection).await;

            let db = self.registry.resolve(&connection).await?;
            db.revoke_user(&statements, &data.username).await?;
        }

        info!(
            role = %data.role,
            connection = %connection,
            username = %data.username,
            "Revoked database credential lease"
        );

        Ok(response)
    }
}
