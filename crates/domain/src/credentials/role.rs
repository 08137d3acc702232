//! Role definitions and the role store port
//!
//! A role binds issued credentials to a connection name, TTL bounds and the
//! statement templates used to renew and revoke accounts. Roles are owned by
//! an external role-management API; this crate only reads them, by name, on
//! every call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::CredentialError;
use super::statements::Statements;

/// A database role definition
///
/// A zero `default_ttl` or `max_ttl` means "not set": the system default or
/// system maximum applies instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    name: String,
    connection_name: String,
    default_ttl: Duration,
    max_ttl: Duration,
    statements: Statements,
}

impl Role {
    /// Creates a new RoleBuilder
    pub fn builder(name: impl Into<String>) -> RoleBuilder {
        RoleBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the connection credentials of this role live on
    pub fn connection_name(&self) -> &str {
        &self.connection_name
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn max_ttl(&self) -> Duration {
        self.max_ttl
    }

    pub fn statements(&self) -> &Statements {
        &self.statements
    }
}

/// Builder for [`Role`]
///
/// # Example
///
/// ```ignore
/// let role = Role::builder("readonly")
///     .connection_name("analytics-pg")
///     .default_ttl(Duration::from_secs(3600))
///     .max_ttl(Duration::from_secs(86400))
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct RoleBuilder {
    name: String,
    connection_name: Option<String>,
    default_ttl: Duration,
    max_ttl: Duration,
    statements: Statements,
}

impl RoleBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            connection_name: None,
            default_ttl: Duration::ZERO,
            max_ttl: Duration::ZERO,
            statements: Statements::default(),
        }
    }

    pub fn connection_name(mut self, connection_name: impl Into<String>) -> Self {
        self.connection_name = Some(connection_name.into());
        self
    }

    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn max_ttl(mut self, ttl: Duration) -> Self {
        self.max_ttl = ttl;
        self
    }

    pub fn renew_statements(mut self, template: impl Into<String>) -> Self {
        self.statements.renew = template.into();
        self
    }

    pub fn revoke_statements(mut self, template: impl Into<String>) -> Self {
        self.statements.revoke = template.into();
        self
    }

    pub fn statements(mut self, statements: Statements) -> Self {
        self.statements = statements;
        self
    }

    /// Builds the Role
    ///
    /// # Errors
    ///
    /// `CredentialError::InvalidRole` if the name or connection name is empty,
    /// or if `default_ttl` exceeds a non-zero `max_ttl`.
    pub fn build(self) -> Result<Role, CredentialError> {
        if self.name.trim().is_empty() {
            return Err(CredentialError::invalid_role(
                self.name,
                "role name cannot be empty",
            ));
        }

        let connection_name = match self.connection_name {
            Some(c) if !c.trim().is_empty() => c,
            _ => {
                return Err(CredentialError::invalid_role(
                    self.name,
                    "connection name is required",
                ));
            }
        };

        if !self.max_ttl.is_zero() && self.default_ttl > self.max_ttl {
            return Err(CredentialError::invalid_role(
                self.name,
                format!(
                    "default TTL ({}s) cannot exceed max TTL ({}s)",
                    self.default_ttl.as_secs(),
                    self.max_ttl.as_secs()
                ),
            ));
        }

        Ok(Role {
            name: self.name,
            connection_name,
            default_ttl: self.default_ttl,
            max_ttl: self.max_ttl,
            statements: self.statements,
        })
    }
}

/// Read-only access to role definitions
///
/// Implementations must be thread-safe. A deleted role is reported as
/// `Ok(None)`, not as an error: leases can outlive their roles.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Looks up a role by name
    ///
    /// # Errors
    ///
    /// `CredentialError::RoleStore` for backend failures
    async fn get_role(&self, name: &str) -> Result<Option<Role>, CredentialError>;
}
