//! Configuration Data Transfer Objects (DTOs)
//!
//! Immutable configuration handed to the lease lifecycle services via
//! dependency injection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// Service Configuration DTOs
// ============================================================================

/// Configuration DTO for the credential lease service
///
/// # Example
///
/// ```ignore
/// use dbcreds_shared::config::ServiceConfigDto;
///
/// let config = ServiceConfigDto::from_env()?;
/// println!("Lock strategy: {}", config.leases.lock_strategy);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfigDto {
    /// Lease TTL caps and lifecycle policies
    pub leases: LeaseConfig,

    /// Defaults for pools opened against target databases
    pub database: DatabasePoolConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// System-wide lease settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseConfig {
    /// TTL used when a role does not define a default (seconds)
    pub default_lease_ttl_secs: u64,

    /// Hard ceiling for any lease, counted from its issue time (seconds)
    pub max_lease_ttl_secs: u64,

    /// How renew/revoke operations are serialised
    pub lock_strategy: LockStrategy,

    /// What revocation does when the lease's role no longer exists
    pub missing_role_policy: MissingRolePolicy,
}

impl LeaseConfig {
    pub fn default_lease_ttl(&self) -> Duration {
        Duration::from_secs(self.default_lease_ttl_secs)
    }

    pub fn max_lease_ttl(&self) -> Duration {
        Duration::from_secs(self.max_lease_ttl_secs)
    }
}

impl Default for LeaseConfig {
    fn default() -> Self {
        Self {
            default_lease_ttl_secs: 3600,
            max_lease_ttl_secs: 86400,
            lock_strategy: LockStrategy::default(),
            missing_role_policy: MissingRolePolicy::default(),
        }
    }
}

/// Locking discipline around the shared connection registry
///
/// `Global` serialises every renew/revoke regardless of the target
/// connection. `PerConnection` keeps one lock per connection name so that
/// operations against different databases can overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LockStrategy {
    #[default]
    Global,
    PerConnection,
}

impl fmt::Display for LockStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockStrategy::Global => write!(f, "global"),
            LockStrategy::PerConnection => write!(f, "per-connection"),
        }
    }
}

impl FromStr for LockStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "global" => Ok(LockStrategy::Global),
            "per-connection" | "per_connection" => Ok(LockStrategy::PerConnection),
            other => Err(format!("Invalid LockStrategy: {}", other)),
        }
    }
}

/// Revocation behaviour when the role referenced by a lease was deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingRolePolicy {
    /// Fail the revocation with `RoleNotFound`
    #[default]
    Fail,
    /// Revoke with the database plugin's default statements and return a
    /// warning. Requires the lease to have recorded its connection name.
    DefaultStatements,
}

impl fmt::Display for MissingRolePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingRolePolicy::Fail => write!(f, "fail"),
            MissingRolePolicy::DefaultStatements => write!(f, "default-statements"),
        }
    }
}

impl FromStr for MissingRolePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(MissingRolePolicy::Fail),
            "default-statements" | "default_statements" => {
                Ok(MissingRolePolicy::DefaultStatements)
            }
            other => Err(format!("Invalid MissingRolePolicy: {}", other)),
        }
    }
}

/// Pool settings for connections opened against target databases
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabasePoolConfig {
    /// Maximum number of pooled sessions per connection name
    pub max_connections: u32,

    /// Timeout for acquiring a session (seconds)
    pub connect_timeout_secs: u64,
}

impl DatabasePoolConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for DatabasePoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 4,
            connect_timeout_secs: 30,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log filter (trace, debug, info, warn, error or an EnvFilter directive)
    pub level: String,

    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("Invalid LogFormat: {}", other)),
        }
    }
}
