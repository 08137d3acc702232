//! Configuration validation
//!
//! This module provides validation logic for configuration DTOs.

use super::dto::{DatabasePoolConfig, LeaseConfig, ServiceConfigDto};
use super::error::{ConfigError, Result};

/// Validate lease TTL caps
///
/// The system maximum must be non-zero and the system default may not
/// exceed it.
pub fn validate_lease_config(config: &LeaseConfig) -> Result<()> {
    if config.max_lease_ttl_secs == 0 {
        return Err(ConfigError::Validation(
            "DBCREDS_MAX_LEASE_TTL_SECS must be > 0".to_string(),
        ));
    }

    if config.default_lease_ttl_secs > config.max_lease_ttl_secs {
        return Err(ConfigError::Validation(format!(
            "DBCREDS_DEFAULT_LEASE_TTL_SECS ({}) cannot exceed DBCREDS_MAX_LEASE_TTL_SECS ({})",
            config.default_lease_ttl_secs, config.max_lease_ttl_secs
        )));
    }

    Ok(())
}

/// Validate pool settings for target databases
pub fn validate_pool_config(config: &DatabasePoolConfig) -> Result<()> {
    if config.max_connections == 0 {
        return Err(ConfigError::Validation(
            "DBCREDS_DB_MAX_CONNECTIONS must be > 0".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "DBCREDS_DB_CONNECT_TIMEOUT_SECS must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate complete service configuration
pub fn validate_service_config(config: &ServiceConfigDto) -> Result<()> {
    validate_lease_config(&config.leases)?;
    validate_pool_config(&config.database)?;
    Ok(())
}
