//! Database plugins
//!
//! Concrete `ConnectionFactory` / `DatabaseConnection` implementations.

mod error;
mod postgres;

pub use error::{DatabaseError, Result};
pub use postgres::{
    DEFAULT_RENEW_STATEMENT, PLUGIN_NAME, PostgresConnectionFactory, PostgresDatabase,
    privilege_revocations, quote_identifier,
};
