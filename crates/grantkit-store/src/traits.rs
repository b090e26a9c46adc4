//! GrantStore trait: the abstract interface for grant persistence.
//!
//! This trait keeps the service storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests). Contended
//! outcomes (code collision, duplicate redemption, full capacity) are
//! expressed as enum values rather than errors so the service can react
//! without string-matching.

use async_trait::async_trait;
use grantkit_core::{
    Grant, GrantId, GrantStatus, PrincipalId, Redemption, RedemptionId,
};

use crate::error::Result;

/// Result of inserting a grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertGrantOutcome {
    /// Grant was inserted with its code.
    Inserted,
    /// The code is already held by a non-deleted grant. The caller
    /// regenerates and retries.
    CodeTaken,
}

/// Result of the atomic redemption check-and-insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedeemOutcome {
    /// The redemption row was created; the seat is held.
    Redeemed,
    /// An active redemption already exists for this (grant, user) pair.
    AlreadyRedeemed,
    /// The grant's active-redemption count has reached its cap.
    CapacityExceeded {
        /// The seat cap that was hit.
        max: u32,
    },
    /// No grant row with this id exists.
    GrantMissing,
    /// The grant stopped accepting redemptions (deactivated or deleted,
    /// possibly after the caller last looked at it).
    GrantClosed {
        /// The lifecycle state that blocked the insert.
        status: GrantStatus,
    },
    /// The grant expired before this redemption's timestamp.
    GrantExpired {
        /// When the grant expired (Unix ms).
        expired_at: i64,
    },
}

/// Result of revoking a redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevokeOutcome {
    /// The redemption was active and is now revoked.
    Revoked,
    /// The redemption was already revoked.
    AlreadyRevoked,
    /// No redemption with that id exists.
    NotFound,
}

/// The GrantStore trait: async interface for grant persistence.
///
/// All methods are async to support both sync (SQLite) and async
/// backends. For SQLite, we use `spawn_blocking` internally to avoid
/// blocking the runtime.
///
/// # Design Notes
///
/// - **Store-level uniqueness**: the code constraint (scoped to
///   non-deleted grants) and the active `(grant, user)` redemption
///   constraint live in the store, which is what makes collision retry
///   and `AlreadyRedeemed` race-free.
/// - **Atomic redemption**: [`insert_redemption`](GrantStore::insert_redemption)
///   re-reads the grant's status, expiry, and seat cap and performs the
///   capacity check and the insert as one atomic unit per grant. Under N
///   concurrent redeemers of a grant with capacity K, exactly K succeed,
///   and none succeed once the grant is closed.
/// - **Audit-preserving revocation**: redemption rows are never deleted,
///   only flipped to revoked.
#[async_trait]
pub trait GrantStore: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Grant Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a new grant.
    ///
    /// Returns `CodeTaken` if a non-deleted grant already holds the code.
    async fn insert_grant(&self, grant: &Grant) -> Result<InsertGrantOutcome>;

    /// Get a grant by id.
    async fn get_grant(&self, id: &GrantId) -> Result<Option<Grant>>;

    /// Get a non-deleted grant by its code.
    async fn get_grant_by_code(&self, code: &str) -> Result<Option<Grant>>;

    /// List grants issued by an owner, newest first. Excludes deleted
    /// grants unless `include_deleted` is set.
    async fn list_grants_by_owner(
        &self,
        owner: &PrincipalId,
        include_deleted: bool,
    ) -> Result<Vec<Grant>>;

    /// Set a grant's lifecycle status. Returns false if no such grant.
    async fn set_grant_status(&self, id: &GrantId, status: GrantStatus) -> Result<bool>;

    // ─────────────────────────────────────────────────────────────────────────
    // Redemption Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Atomically re-check the grant and insert a redemption.
    ///
    /// The grant's status, expiry, and seat cap are read in the same
    /// transaction as the active-count comparison and the insert, so a
    /// deactivation or delete that commits after the caller validated
    /// cannot be overtaken by a racing redeemer. The active
    /// `(grant, user)` uniqueness constraint resolves concurrent
    /// same-user attempts to exactly one success.
    async fn insert_redemption(&self, redemption: &Redemption) -> Result<RedeemOutcome>;

    /// Get a redemption by id.
    async fn get_redemption(&self, id: &RedemptionId) -> Result<Option<Redemption>>;

    /// Get the active redemption for a (grant, user) pair, if any.
    async fn active_redemption(
        &self,
        grant_id: &GrantId,
        user: &PrincipalId,
    ) -> Result<Option<Redemption>>;

    /// List all redemptions of a grant (active and revoked), oldest first.
    async fn list_redemptions(&self, grant_id: &GrantId) -> Result<Vec<Redemption>>;

    /// List a user's active redemptions across all grants.
    async fn list_active_redemptions_for_user(
        &self,
        user: &PrincipalId,
    ) -> Result<Vec<Redemption>>;

    /// Count the active redemptions of a grant.
    async fn count_active_redemptions(&self, grant_id: &GrantId) -> Result<u32>;

    /// Revoke a single redemption.
    async fn revoke_redemption(
        &self,
        id: &RedemptionId,
        revoked_by: &PrincipalId,
        at: i64,
    ) -> Result<RevokeOutcome>;

    /// Revoke every active redemption of a grant (cascade for delete).
    ///
    /// Returns the number of redemptions revoked.
    async fn revoke_all_active(
        &self,
        grant_id: &GrantId,
        revoked_by: &PrincipalId,
        at: i64,
    ) -> Result<u32>;
}
