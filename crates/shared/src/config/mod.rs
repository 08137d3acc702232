//! Configuration module for the dbcreds lease service
//!
//! This module provides centralized configuration loading, validation, and
//! Data Transfer Objects (DTOs) for the credential lease lifecycle.
//!
//! # Architecture
//!
//! 1. **Single Source of Truth**: All configuration is loaded once at startup
//! 2. **Fail Fast**: Errors are reported immediately, no silent fallbacks
//! 3. **DTO Pattern**: Configuration is immutable and passed via dependency injection
//! 4. **Environment Priority**: environment variables > `.env` file > defaults
//!
//! # Usage
//!
//! ```ignore
//! use dbcreds_shared::config::ConfigLoader;
//! use std::path::PathBuf;
//!
//! let loader = ConfigLoader::new(Some(PathBuf::from(".env")));
//! let config = loader.load_service_config()?;
//! println!("Max lease TTL: {}s", config.leases.max_lease_ttl_secs);
//! ```
//!
//! # Environment Variables
//!
//! All variables are optional:
//!
//! - `DBCREDS_DEFAULT_LEASE_TTL_SECS`: System default lease TTL (default: 3600)
//! - `DBCREDS_MAX_LEASE_TTL_SECS`: System maximum lease TTL (default: 86400)
//! - `DBCREDS_LOCK_STRATEGY`: `global` or `per-connection` (default: `global`)
//! - `DBCREDS_REVOKE_MISSING_ROLE`: `fail` or `default-statements` (default: `fail`)
//! - `DBCREDS_DB_MAX_CONNECTIONS`: Pool size per database connection (default: 4)
//! - `DBCREDS_DB_CONNECT_TIMEOUT_SECS`: Pool acquire timeout (default: 30)
//! - `RUST_LOG`: Log level (default: "info")
//! - `DBCREDS_LOG_FORMAT`: `pretty` or `json` (default: `pretty`)

pub mod dto;
pub mod error;
pub mod loader;
pub mod validator;

pub use dto::{
    DatabasePoolConfig, LeaseConfig, LockStrategy, LogFormat, LoggingConfig, MissingRolePolicy,
    ServiceConfigDto,
};
pub use error::{ConfigError, Result};
pub use loader::ConfigLoader;
pub use validator::{validate_lease_config, validate_pool_config, validate_service_config};
