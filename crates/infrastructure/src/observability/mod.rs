//! Observability
//!
//! Tracing subscriber setup for hosts embedding the credential services.

pub mod tracing;

pub use self::tracing::{TracingResult, build_env_filter, init_tracing};
