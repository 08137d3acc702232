pub mod config;

pub use config::{
    ConfigError, ConfigLoader, DatabasePoolConfig, LeaseConfig, LockStrategy, LogFormat,
    LoggingConfig, MissingRolePolicy, ServiceConfigDto,
};
