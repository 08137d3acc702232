//! Configuration error types
//!
//! This module defines all error types that can occur during configuration loading and validation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading or validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A configuration variable has an invalid value
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: String, value: String },

    /// Failed to load .env file
    #[error("Failed to load .env file from {}: {source}", .path.display())]
    EnvFileLoad {
        path: PathBuf,
        #[source]
        source: dotenv::Error,
    },

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    Validation(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_display() {
        let err = ConfigError::InvalidValue {
            var: "DBCREDS_LOCK_STRATEGY".to_string(),
            value: "sometimes".to_string(),
        };
        assert!(err.to_string().contains("DBCREDS_LOCK_STRATEGY"));
        assert!(err.to_string().contains("sometimes"));
    }

    #[test]
    fn test_validation_display() {
        let err = ConfigError::Validation("max TTL must be > 0".to_string());
        assert!(err.to_string().contains("max TTL must be > 0"));
    }
}
