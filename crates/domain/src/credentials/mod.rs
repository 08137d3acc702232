//! Credentials Module - Database credential leases
//!
//! Types and ports for renewing and revoking dynamically issued database
//! accounts.
//!
//! # Design Principles
//!
//! - **LeaseInternalData**: untyped lease data is decoded once, at the boundary
//! - **Role**: looked up by name on every call, never cached
//! - **DatabaseConnection**: trait for pluggable database backends
//!
//! # Security Features
//!
//! - Connection URLs are never logged (Debug impl shows [REDACTED])
//! - Every renew/revoke failure is surfaced, never swallowed

mod connection;
mod error;
mod lease;
mod role;
mod statements;

pub use connection::{ConnectionConfig, ConnectionConfigStore, ConnectionFactory, DatabaseConnection};
pub use error::{CredentialError, CredentialErrorKind, MutationKind};
pub use lease::{
    DB_NAME_KEY, LeaseInternalData, LeaseRequest, LeaseResponse, ROLE_KEY, RevokeResponse,
    USERNAME_KEY,
};
pub use role::{Role, RoleBuilder, RoleStore};
pub use statements::{
    EXPIRATION_PLACEHOLDER, NAME_PLACEHOLDER, Statements, render_template, split_statements,
};
