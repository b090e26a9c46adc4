//! Error types for grantkit core.

use thiserror::Error;

/// Reasons a grant creation request is incoherent.
///
/// These are caller errors, never retried automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SpecError {
    /// A personal grant has no supported subject.
    #[error("personal grant requires a subject")]
    MissingSubject,

    /// A personal grant carries no permissions.
    #[error("personal grant requires a non-empty permission set")]
    MissingPermissions,

    /// A personal grant tried to configure its fixed single seat.
    #[error("personal grant capacity is fixed at 1")]
    PersonalCapacityNotOne,

    /// An organizational grant has no display label.
    #[error("organizational grant requires an org name")]
    MissingOrgName,

    /// A seat cap of zero can never be redeemed.
    #[error("max redemptions must be a positive integer")]
    ZeroCapacity,
}
