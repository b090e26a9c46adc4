//! # Grantkit Core
//!
//! Pure domain types for time-bounded access grants and their redemptions.
//!
//! This crate contains no I/O and no storage. It defines the entities,
//! their lazy-expiry predicates, the validated creation request, and the
//! human-typeable code generator.
//!
//! ## Key Types
//!
//! - [`Grant`] - An issued access code with lifecycle, capacity, and
//!   (for personal grants) a permission set
//! - [`Redemption`] - One user consuming one seat of a grant
//! - [`GrantSpec`] - A validated grant creation request
//! - [`CodeGenerator`] - Collision-resistant, human-typeable codes
//!
//! ## Lazy expiry
//!
//! Time-based validity is a computed predicate ([`Grant::is_expired`])
//! evaluated at read/write time. There is no background sweep and no
//! stored expired status.

pub mod code;
pub mod error;
pub mod grant;
pub mod ids;
pub mod spec;

pub use code::{normalize_code, CodeGenerator, CODE_ALPHABET, DEFAULT_CODE_LENGTH};
pub use error::SpecError;
pub use grant::{Grant, GrantKind, GrantStatus, GrantSummary, Redemption, RedemptionStatus};
pub use ids::{GrantId, PrincipalId, RedemptionId};
pub use spec::GrantSpec;

/// Get current time in milliseconds.
pub fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}
