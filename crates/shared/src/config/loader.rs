//! Configuration loader
//!
//! This module provides the ConfigLoader which is responsible for loading
//! configuration from .env files and environment variables.

use std::path::Path;
use std::str::FromStr;

use super::dto::{DatabasePoolConfig, LeaseConfig, LoggingConfig, ServiceConfigDto};
use super::error::{ConfigError, Result};
use super::validator::validate_service_config;

/// Configuration loader
///
/// This loader handles loading configuration from:
/// 1. Environment variables (highest priority)
/// 2. .env file (optional; only fills variables that are not already set)
/// 3. Built-in defaults
///
/// # Example
///
/// ```ignore
/// use dbcreds_shared::config::ConfigLoader;
/// use std::path::PathBuf;
///
/// let loader = ConfigLoader::new(Some(PathBuf::from(".env")));
/// let config = loader.load_service_config()?;
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Optional path to .env file
    env_file_path: Option<std::path::PathBuf>,
}

impl ConfigLoader {
    /// Create a new ConfigLoader
    ///
    /// # Arguments
    ///
    /// * `env_file_path` - Optional path to .env file. If provided, the file
    ///                     will be loaded before reading environment variables.
    pub fn new(env_file_path: Option<std::path::PathBuf>) -> Self {
        Self { env_file_path }
    }

    /// Load service configuration
    ///
    /// # Returns
    ///
    /// `Ok(ServiceConfigDto)` if configuration is valid
    /// `Err(ConfigError)` if the .env file cannot be read or a value is invalid
    pub fn load_service_config(&self) -> Result<ServiceConfigDto> {
        if let Some(path) = &self.env_file_path {
            self.load_env_file(path)?;
        }

        let config = ServiceConfigDto::from_env()?;

        validate_service_config(&config)?;

        Ok(config)
    }

    fn load_env_file(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(ConfigError::EnvFileLoad {
                path: path.to_path_buf(),
                source: dotenv::Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path.display()),
                )),
            });
        }

        dotenv::from_path(path).map_err(|e| ConfigError::EnvFileLoad {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }
}

impl Default for ConfigLoader {
    /// Create a ConfigLoader without .env file support
    fn default() -> Self {
        Self::new(None)
    }
}

// ============================================================================
// Implementation: ServiceConfigDto::from_env
// ============================================================================

impl ServiceConfigDto {
    /// Build service configuration from environment variables
    ///
    /// Every variable is optional; see the module documentation for defaults.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            leases: LeaseConfig::from_env()?,
            database: DatabasePoolConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }
}

impl LeaseConfig {
    /// # Optional Variables
    ///
    /// - `DBCREDS_DEFAULT_LEASE_TTL_SECS`: Default 3600
    /// - `DBCREDS_MAX_LEASE_TTL_SECS`: Default 86400
    /// - `DBCREDS_LOCK_STRATEGY`: Default `global`
    /// - `DBCREDS_REVOKE_MISSING_ROLE`: Default `fail`
    pub fn from_env() -> Result<Self> {
        let defaults = LeaseConfig::default();

        Ok(Self {
            default_lease_ttl_secs: parse_optional_var(
                "DBCREDS_DEFAULT_LEASE_TTL_SECS",
                defaults.default_lease_ttl_secs,
            )?,
            max_lease_ttl_secs: parse_optional_var(
                "DBCREDS_MAX_LEASE_TTL_SECS",
                defaults.max_lease_ttl_secs,
            )?,
            lock_strategy: parse_optional_var("DBCREDS_LOCK_STRATEGY", defaults.lock_strategy)?,
            missing_role_policy: parse_optional_var(
                "DBCREDS_REVOKE_MISSING_ROLE",
                defaults.missing_role_policy,
            )?,
        })
    }
}

impl DatabasePoolConfig {
    /// # Optional Variables
    ///
    /// - `DBCREDS_DB_MAX_CONNECTIONS`: Default 4
    /// - `DBCREDS_DB_CONNECT_TIMEOUT_SECS`: Default 30
    pub fn from_env() -> Result<Self> {
        let defaults = DatabasePoolConfig::default();

        Ok(Self {
            max_connections: parse_optional_var(
                "DBCREDS_DB_MAX_CONNECTIONS",
                defaults.max_connections,
            )?,
            connect_timeout_secs: parse_optional_var(
                "DBCREDS_DB_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            )?,
        })
    }
}

impl LoggingConfig {
    /// # Optional Variables
    ///
    /// - `RUST_LOG`: Log level (default: "info")
    /// - `DBCREDS_LOG_FORMAT`: `pretty` or `json` (default: `pretty`)
    pub fn from_env() -> Result<Self> {
        let level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let format = parse_optional_var("DBCREDS_LOG_FORMAT", Default::default())?;

        Ok(Self { level, format })
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse an optional environment variable, falling back to `default` when unset.
///
/// A variable that is set but cannot be parsed is an error: a typo in a
/// lock strategy must not silently select the default one.
fn parse_optional_var<T>(var: &str, default: T) -> Result<T>
where
    T: FromStr,
{
    match std::env::var(var) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    var: var.to_string(),
                    value: raw,
                })
        }
        _ => Ok(default),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LockStrategy, LogFormat, MissingRolePolicy};
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Mutex;

    // Tests in this module mutate process-wide environment variables.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const LEASE_VARS: [&str; 4] = [
        "DBCREDS_DEFAULT_LEASE_TTL_SECS",
        "DBCREDS_MAX_LEASE_TTL_SECS",
        "DBCREDS_LOCK_STRATEGY",
        "DBCREDS_REVOKE_MISSING_ROLE",
    ];

    fn clear_lease_vars() {
        for var in LEASE_VARS {
            unsafe { std::env::remove_var(var) };
        }
    }

    #[test]
    fn test_config_loader_new() {
        let loader = ConfigLoader::new(None);
        assert!(loader.env_file_path.is_none());

        let loader = ConfigLoader::new(Some(PathBuf::from(".env")));
        assert!(loader.env_file_path.is_some());
    }

    #[test]
    fn test_config_loader_default() {
        let loader = ConfigLoader::default();
        assert!(loader.env_file_path.is_none());
    }

    #[test]
    fn test_parse_optional_var() {
        let _guard = ENV_LOCK.lock().unwrap();

        unsafe { std::env::set_var("DBCREDS_TEST_VAR", "42") };
        let result: Result<u32> = parse_optional_var("DBCREDS_TEST_VAR", 10);
        assert_eq!(result.unwrap(), 42);

        unsafe { std::env::remove_var("DBCREDS_TEST_VAR") };
        let result: Result<u32> = parse_optional_var("DBCREDS_TEST_VAR", 10);
        assert_eq!(result.unwrap(), 10);

        unsafe { std::env::set_var("DBCREDS_TEST_VAR", "invalid") };
        let result: Result<u32> = parse_optional_var("DBCREDS_TEST_VAR", 10);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

        unsafe { std::env::remove_var("DBCREDS_TEST_VAR") };
    }

    #[test]
    fn test_lease_config_from_env_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_lease_vars();

        let config = LeaseConfig::from_env().unwrap();
        assert_eq!(config.default_lease_ttl_secs, 3600);
        assert_eq!(config.max_lease_ttl_secs, 86400);
        assert_eq!(config.lock_strategy, LockStrategy::Global);
        assert_eq!(config.missing_role_policy, MissingRolePolicy::Fail);
    }

    #[test]
    fn test_lease_config_from_env_overrides() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_lease_vars();
        unsafe {
            std::env::set_var("DBCREDS_DEFAULT_LEASE_TTL_SECS", "600");
            std::env::set_var("DBCREDS_MAX_LEASE_TTL_SECS", "7200");
            std::env::set_var("DBCREDS_LOCK_STRATEGY", "per-connection");
            std::env::set_var("DBCREDS_REVOKE_MISSING_ROLE", "default-statements");
        }

        let config = LeaseConfig::from_env().unwrap();
        assert_eq!(config.default_lease_ttl_secs, 600);
        assert_eq!(config.max_lease_ttl_secs, 7200);
        assert_eq!(config.lock_strategy, LockStrategy::PerConnection);
        assert_eq!(
            config.missing_role_policy,
            MissingRolePolicy::DefaultStatements
        );

        clear_lease_vars();
    }

    #[test]
    fn test_lease_config_rejects_unknown_lock_strategy() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_lease_vars();
        unsafe { std::env::set_var("DBCREDS_LOCK_STRATEGY", "optimistic") };

        let result = LeaseConfig::from_env();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

        clear_lease_vars();
    }

    #[test]
    fn test_logging_config_from_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        unsafe { std::env::set_var("DBCREDS_LOG_FORMAT", "json") };

        let config = LoggingConfig::from_env().unwrap();
        assert_eq!(config.format, LogFormat::Json);

        unsafe { std::env::remove_var("DBCREDS_LOG_FORMAT") };
    }

    #[test]
    fn test_load_service_config_missing_env_file_fails() {
        let loader = ConfigLoader::new(Some(PathBuf::from("/nonexistent/dbcreds.env")));
        let result = loader.load_service_config();
        assert!(matches!(result, Err(ConfigError::EnvFileLoad { .. })));
    }

    #[test]
    fn test_load_service_config_from_env_file() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_lease_vars();

        let path = std::env::temp_dir().join(format!("dbcreds-{}.env", std::process::id()));
        {
            let mut file = std::fs::File::create(&path).unwrap();
            writeln!(file, "DBCREDS_DEFAULT_LEASE_TTL_SECS=120").unwrap();
            writeln!(file, "DBCREDS_MAX_LEASE_TTL_SECS=240").unwrap();
        }

        let config = ConfigLoader::new(Some(path.clone()))
            .load_service_config()
            .unwrap();
        assert_eq!(config.leases.default_lease_ttl_secs, 120);
        assert_eq!(config.leases.max_lease_ttl_secs, 240);

        std::fs::remove_file(&path).ok();
        clear_lease_vars();
    }

    #[test]
    fn test_environment_wins_over_env_file() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_lease_vars();
        unsafe { std::env::set_var("DBCREDS_MAX_LEASE_TTL_SECS", "7200") };

        let path =
            std::env::temp_dir().join(format!("dbcreds-priority-{}.env", std::process::id()));
        {
            let mut file = std::fs::File::create(&path).unwrap();
            writeln!(file, "DBCREDS_DEFAULT_LEASE_TTL_SECS=60").unwrap();
            writeln!(file, "DBCREDS_MAX_LEASE_TTL_SECS=240").unwrap();
        }

        let config = ConfigLoader::new(Some(path.clone()))
            .load_service_config()
            .unwrap();
        assert_eq!(config.leases.max_lease_ttl_secs, 7200);
        assert_eq!(config.leases.default_lease_ttl_secs, 60);

        std::fs::remove_file(&path).ok();
        clear_lease_vars();
    }
}
