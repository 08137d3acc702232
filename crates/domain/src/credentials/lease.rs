//! Lease types exchanged with the enclosing lease manager
//!
//! The lease manager hands over an opaque lease with an untyped internal-data
//! map. [`LeaseInternalData::decode`] turns that map into typed fields once, at
//! the boundary; everything past it works on strongly typed values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

use super::error::CredentialError;

/// Internal-data key holding the database account name
pub const USERNAME_KEY: &str = "username";
/// Internal-data key holding the role that issued the lease
pub const ROLE_KEY: &str = "role";
/// Optional internal-data key holding the connection the account lives on
pub const DB_NAME_KEY: &str = "db_name";

/// A renewal or revocation event for one issued credential
///
/// # Example
///
/// ```ignore
/// let lease = LeaseRequest::new("database/creds/readonly/abc123", issued_at)
///     .with_internal_data("username", "v-readonly-x1y2")
///     .with_internal_data("role", "readonly")
///     .with_increment(Duration::from_secs(3600));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LeaseRequest {
    lease_id: String,
    internal_data: Map<String, Value>,
    issue_time: DateTime<Utc>,
    increment: Option<Duration>,
}

impl LeaseRequest {
    pub fn new(lease_id: impl Into<String>, issue_time: DateTime<Utc>) -> Self {
        Self {
            lease_id: lease_id.into(),
            internal_data: Map::new(),
            issue_time,
            increment: None,
        }
    }

    /// Replaces the whole internal-data map
    pub fn with_internal_data_map(mut self, data: Map<String, Value>) -> Self {
        self.internal_data = data;
        self
    }

    /// Adds one internal-data entry
    pub fn with_internal_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.internal_data.insert(key.into(), value.into());
        self
    }

    /// Sets the TTL increment requested by the caller
    pub fn with_increment(mut self, increment: Duration) -> Self {
        self.increment = Some(increment);
        self
    }

    pub fn lease_id(&self) -> &str {
        &self.lease_id
    }

    pub fn internal_data(&self) -> &Map<String, Value> {
        &self.internal_data
    }

    /// When the lease was originally issued; the role max TTL counts from here
    pub fn issue_time(&self) -> DateTime<Utc> {
        self.issue_time
    }

    /// Requested increment, if any. Zero is treated as "not requested".
    pub fn increment(&self) -> Option<Duration> {
        self.increment.filter(|d| !d.is_zero())
    }
}

/// Typed view of the internal data a database credential lease carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseInternalData {
    pub username: String,
    pub role: String,
    /// Connection name recorded at issue time, if the issuer stored it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_name: Option<String>,
}

impl LeaseInternalData {
    /// Decodes and validates the untyped internal data
    ///
    /// # Errors
    ///
    /// - `CredentialError::MalformedLease` if `username` is missing, not a
    ///   string, or empty, or if `role` or `db_name` is present but not a string
    /// - `CredentialError::RoleNotFound` if `role` is missing or empty; a lease
    ///   without a role name refers to no role at all
    pub fn decode(data: &Map<String, Value>) -> Result<Self, CredentialError> {
        let username = required_string(data, USERNAME_KEY)?;
        let role = match data.get(ROLE_KEY) {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            None | Some(Value::Null) | Some(Value::String(_)) => {
                return Err(CredentialError::role_not_found(""));
            }
            Some(_) => {
                return Err(CredentialError::malformed_lease(
                    ROLE_KEY,
                    "is not a string",
                ));
            }
        };

        let db_name = match data.get(DB_NAME_KEY) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                return Err(CredentialError::malformed_lease(
                    DB_NAME_KEY,
                    "is not a string",
                ));
            }
        };

        Ok(Self {
            username,
            role,
            db_name,
        })
    }
}

fn required_string(data: &Map<String, Value>, field: &str) -> Result<String, CredentialError> {
    match data.get(field) {
        None | Some(Value::Null) => Err(CredentialError::malformed_lease(field, "is missing")),
        Some(Value::String(s)) if s.is_empty() => {
            Err(CredentialError::malformed_lease(field, "is empty"))
        }
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(CredentialError::malformed_lease(field, "is not a string")),
    }
}

/// Result of a successful renewal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseResponse {
    pub lease_id: String,
    /// Granted TTL counted from the renewal time
    pub ttl: Duration,
    /// New absolute expiration; `None` when the lease does not expire
    pub expiration_time: Option<DateTime<Utc>>,
}

/// Result of a successful revocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokeResponse {
    pub lease_id: String,
    /// Non-fatal notices, e.g. that default revocation statements were used
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl RevokeResponse {
    pub fn new(lease_id: impl Into<String>) -> Self {
        Self {
            lease_id: lease_id.into(),
            warnings: Vec::new(),
        }
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}
