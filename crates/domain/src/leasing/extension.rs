//! Lease extension policy
//!
//! [`TtlLeaseExtender`] is the generic TTL-extension calculation shared by
//! every secret type: the granted increment is the smallest of the requested
//! increment, the role (or system) default and what is left until the lease's
//! maximum lifetime, counted from its original issue time.
//!
//! [`LeaseExtension::validity_deadline`] is the credential-specific part: it
//! only decides whether and how the computed expiration is written to the
//! database.

use chrono::{DateTime, TimeDelta, Utc};
use dbcreds_shared::config::LeaseConfig;
use std::sync::Arc;
use std::time::Duration;

use super::clock::{Clock, SystemClock};
use crate::credentials::{CredentialError, LeaseRequest};

/// Absolute, timezone-aware deadline format understood by the database
pub const VALIDITY_DEADLINE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%z";

/// System-wide lease caps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemView {
    pub default_lease_ttl: Duration,
    pub max_lease_ttl: Duration,
}

impl SystemView {
    pub fn new(default_lease_ttl: Duration, max_lease_ttl: Duration) -> Self {
        Self {
            default_lease_ttl,
            max_lease_ttl,
        }
    }
}

impl From<&LeaseConfig> for SystemView {
    fn from(config: &LeaseConfig) -> Self {
        Self::new(config.default_lease_ttl(), config.max_lease_ttl())
    }
}

/// Outcome of the TTL calculation for one renewal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaseExtension {
    pub ttl: Duration,
    pub expiration_time: Option<DateTime<Utc>>,
}

impl LeaseExtension {
    /// The expiration to persist on the database account, if any
    ///
    /// A zero TTL means the lease does not expire, so nothing is written.
    pub fn validity_deadline(&self) -> Option<String> {
        self.expiration_time.map(format_validity_deadline)
    }
}

/// Formats an instant as `YYYY-MM-DD HH:MM:SS±HHMM`
pub fn format_validity_deadline(at: DateTime<Utc>) -> String {
    at.format(VALIDITY_DEADLINE_FORMAT).to_string()
}

/// Generic lease-extension calculation
pub trait LeaseExtender: Send + Sync {
    /// Computes the new TTL and expiration of `lease`
    ///
    /// `default_ttl` and `max_ttl` come from the role; zero means unset.
    ///
    /// # Errors
    ///
    /// `CredentialError::ExtensionRejected` if the lease is already past its
    /// maximum lifetime.
    fn extend(
        &self,
        default_ttl: Duration,
        max_ttl: Duration,
        system: &SystemView,
        lease: &LeaseRequest,
    ) -> Result<LeaseExtension, CredentialError>;
}

/// The standard extension policy, reading time from a [`Clock`]
#[derive(Clone)]
pub struct TtlLeaseExtender {
    clock: Arc<dyn Clock>,
}

impl TtlLeaseExtender {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl Default for TtlLeaseExtender {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl LeaseExtender for TtlLeaseExtender {
    fn extend(
        &self,
        default_ttl: Duration,
        max_ttl: Duration,
        system: &SystemView,
        lease: &LeaseRequest,
    ) -> Result<LeaseExtension, CredentialError> {
        // The role may only tighten the system maximum.
        let mut max = system.max_lease_ttl;
        if !max_ttl.is_zero() && max_ttl < max {
            max = max_ttl;
        }

        let max_valid = lease
            .issue_time()
            .checked_add_signed(to_delta(max)?)
            .ok_or_else(|| CredentialError::extension_rejected("max TTL overflows"))?;

        let now = self.clock.now();
        if max_valid < now {
            return Err(CredentialError::extension_rejected(
                "past the max TTL, cannot renew",
            ));
        }

        let mut increment = if default_ttl.is_zero() {
            system.default_lease_ttl
        } else {
            default_ttl
        };
        if let Some(requested) = lease.increment() {
            increment = increment.min(requested);
        }

        // max_valid >= now, so the conversion cannot fail.
        let remaining = (max_valid - now).to_std().unwrap_or(Duration::ZERO);
        if increment > remaining {
            increment = remaining;
        }

        let expiration_time = if increment.is_zero() {
            None
        } else {
            Some(now + to_delta(increment)?)
        };

        Ok(LeaseExtension {
            ttl: increment,
            expiration_time,
        })
    }
}

fn to_delta(duration: Duration) -> Result<TimeDelta, CredentialError> {
    TimeDelta::from_std(duration)
        .map_err(|_| CredentialError::extension_rejected("TTL out of range"))
}
