// dbcreds - Infrastructure Layer
// PostgreSQL plugin, in-memory stores and tracing setup

pub mod database;
pub mod memory;
pub mod observability;

pub use database::{DatabaseError, PostgresConnectionFactory, PostgresDatabase};
pub use memory::{InMemoryConnectionConfigStore, InMemoryRoleStore};
pub use observability::{TracingResult, init_tracing};
