//! Credential lease errors
//!
//! Every failure of a renew or revoke is surfaced to the caller through
//! [`CredentialError`]. Nothing at this layer is logged and swallowed: an
//! unrevoked database account is a live credential.

use thiserror::Error;

/// Errors that can occur while renewing or revoking a database credential
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialError {
    /// The lease's internal data is missing a field or holds the wrong type
    #[error("Malformed lease: field '{field}' {reason}")]
    MalformedLease {
        /// Name of the offending internal-data field
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// The role that produced the lease no longer exists
    #[error("Could not find role with name: {role}")]
    RoleNotFound { role: String },

    /// Role lookup failed in the backing store
    #[error("Role store error: {message}")]
    RoleStore { message: String },

    /// A role definition violates its invariants
    #[error("Invalid role '{role}': {reason}")]
    InvalidRole { role: String, reason: String },

    /// No configuration exists for the connection name
    #[error("Could not find connection with name: {connection}")]
    ConnectionNotFound { connection: String },

    /// The connection is configured but could not be established
    #[error("Failed to connect to '{connection}': {message}")]
    ConnectionFailed { connection: String, message: String },

    /// The lease-extension calculation refused the renewal
    #[error("Lease extension rejected: {message}")]
    ExtensionRejected { message: String },

    /// Executing the renew or revoke statements failed at the database
    #[error("Failed to {operation} database user '{username}': {message}")]
    DatabaseMutation {
        operation: MutationKind,
        username: String,
        message: String,
    },
}

/// The database mutation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Renew,
    Revoke,
}

impl std::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Renew => write!(f, "renew"),
            Self::Revoke => write!(f, "revoke"),
        }
    }
}

/// Coarse classification used by callers deciding on retry or alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialErrorKind {
    MalformedLease,
    RoleNotFound,
    ConnectionResolution,
    ExtensionComputation,
    DatabaseMutation,
    Storage,
}

impl CredentialError {
    pub fn malformed_lease(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedLease {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn role_not_found(role: impl Into<String>) -> Self {
        Self::RoleNotFound { role: role.into() }
    }

    pub fn role_store(message: impl Into<String>) -> Self {
        Self::RoleStore {
            message: message.into(),
        }
    }

    pub fn invalid_role(role: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRole {
            role: role.into(),
            reason: reason.into(),
        }
    }

    pub fn connection_not_found(connection: impl Into<String>) -> Self {
        Self::ConnectionNotFound {
            connection: connection.into(),
        }
    }

    pub fn connection_failed(connection: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            connection: connection.into(),
            message: message.into(),
        }
    }

    pub fn extension_rejected(message: impl Into<String>) -> Self {
        Self::ExtensionRejected {
            message: message.into(),
        }
    }

    pub fn database_mutation(
        operation: MutationKind,
        username: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::DatabaseMutation {
            operation,
            username: username.into(),
            message: message.into(),
        }
    }

    /// Returns the error classification
    pub fn kind(&self) -> CredentialErrorKind {
        match self {
            Self::MalformedLease { .. } => CredentialErrorKind::MalformedLease,
            Self::RoleNotFound { .. } => CredentialErrorKind::RoleNotFound,
            Self::RoleStore { .. } | Self::InvalidRole { .. } => CredentialErrorKind::Storage,
            Self::ConnectionNotFound { .. } | Self::ConnectionFailed { .. } => {
                CredentialErrorKind::ConnectionResolution
            }
            Self::ExtensionRejected { .. } => CredentialErrorKind::ExtensionComputation,
            Self::DatabaseMutation { .. } => CredentialErrorKind::DatabaseMutation,
        }
    }

    /// Returns true if this error is retryable
    ///
    /// Retryable errors are transient failures that might succeed if the
    /// enclosing lease manager retries later. This layer never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::RoleStore { .. } | Self::DatabaseMutation { .. }
        )
    }
}
