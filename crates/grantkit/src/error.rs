//! Error types for the grant service.
//!
//! Every failure a caller can act on is a distinct variant, so a UI can
//! explain why a redemption failed without parsing messages. Only
//! [`ServiceError::Store`] is transient; everything else is terminal for
//! that call.

use grantkit_core::{GrantStatus, SpecError};
use grantkit_store::StoreError;
use thiserror::Error;

/// Errors that can occur during grant service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The creation request was incoherent for its kind. Caller error,
    /// never retried.
    #[error("invalid grant spec: {0}")]
    InvalidSpec(#[from] SpecError),

    /// No non-deleted grant matches the code or id.
    #[error("grant not found")]
    GrantNotFound,

    /// The grant's expiry time has passed. New redemptions are blocked;
    /// standing redemptions are unaffected unless the expiry policy says
    /// otherwise.
    #[error("grant expired at {expired_at}")]
    GrantExpired {
        /// When the grant expired (Unix ms).
        expired_at: i64,
    },

    /// The grant is deactivated or deleted.
    #[error("grant is not active (status: {status:?})")]
    GrantInactive {
        /// The lifecycle state that blocked the call.
        status: GrantStatus,
    },

    /// The user already holds an active redemption of this grant.
    #[error("grant already redeemed by this user")]
    AlreadyRedeemed,

    /// All seats are taken.
    #[error("grant capacity of {max} exceeded")]
    CapacityExceeded {
        /// The seat cap that was hit.
        max: u32,
    },

    /// No redemption with that id exists.
    #[error("redemption not found")]
    RedemptionNotFound,

    /// The redemption was already revoked.
    #[error("redemption already revoked")]
    AlreadyRevoked,

    /// The bounded code-collision retry loop ran out of attempts.
    /// Operational signal (alphabet/length too small for volume), not a
    /// user error.
    #[error("code space exhausted after {attempts} attempts")]
    CodeSpaceExhausted {
        /// How many codes were generated and rejected.
        attempts: u32,
    },

    /// Storage error. The transient kind: callers may retry with
    /// backoff.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// Whether retrying the call may help.
    pub fn is_transient(&self) -> bool {
        matches!(self, ServiceError::Store(_))
    }
}

/// Result type for grant service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
