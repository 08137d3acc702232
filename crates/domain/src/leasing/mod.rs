//! Leasing Module - TTL arithmetic shared by every secret type
//!
//! - `TtlLeaseExtender`: computes the granted TTL and expiration of a renewal
//! - `Clock`: injected time source so calculations are deterministic in tests

mod clock;
mod extension;

pub use clock::{Clock, FixedClock, SystemClock};
pub use extension::{
    LeaseExtender, LeaseExtension, SystemView, TtlLeaseExtender, VALIDITY_DEADLINE_FORMAT,
    format_validity_deadline,
};
