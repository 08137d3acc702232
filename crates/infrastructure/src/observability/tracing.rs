//! Tracing Module - Structured logging setup
//!
//! Installs a global `tracing` subscriber with:
//! - An `EnvFilter` built from the configured level or directive
//! - A human-readable or JSON `fmt` layer

use dbcreds_shared::config::{LogFormat, LoggingConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;

const FALLBACK_LEVEL: &str = "info";

/// Result of tracing initialization
#[derive(Debug, Default)]
pub struct TracingResult {
    pub initialized: bool,
    pub errors: Vec<String>,
}

impl TracingResult {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Parses the configured filter, falling back to `info` on a bad directive
pub fn build_env_filter(level: &str, result: &mut TracingResult) -> EnvFilter {
    match EnvFilter::try_new(level) {
        Ok(filter) => filter,
        Err(e) => {
            result
                .errors
                .push(format!("Invalid log filter '{}': {}", level, e));
            EnvFilter::new(FALLBACK_LEVEL)
        }
    }
}

/// Initialize tracing
///
/// Safe to call more than once; only the first call installs a subscriber,
/// later calls report the failure in [`TracingResult::errors`].
pub fn init_tracing(config: &LoggingConfig) -> TracingResult {
    let mut result = TracingResult::new();
    let env_filter = build_env_filter(&config.level, &mut result);

    let logging_layer = match config.format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(true)
            .with_target(true)
            .with_writer(std::io::stdout)
            .with_filter(env_filter)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_writer(std::io::stdout)
            .with_filter(env_filter)
            .boxed(),
    };

    let subscriber = tracing_subscriber::Registry::default().with(logging_layer);
    match tracing::subscriber::set_global_default(subscriber) {
        Ok(()) => {
            result.initialized = true;
            info!(format = ?config.format, "Tracing initialized");
        }
        Err(e) => result.errors.push(e.to_string()),
    }

    result
}
