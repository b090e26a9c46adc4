//! The grant service: create, validate, redeem, revoke, expire.
//!
//! All invariants are enforced here or pushed down to the store's
//! constraints. The service holds no mutable state of its own; every
//! operation is a single short request/response against the store, so
//! any number of request handlers can share one service instance.

use std::sync::Arc;

use tracing::{info, warn};

use grantkit_core::{
    normalize_code, now_millis, CodeGenerator, Grant, GrantId, GrantSpec, GrantStatus,
    PrincipalId, Redemption, RedemptionId, DEFAULT_CODE_LENGTH,
};
use grantkit_store::{GrantStore, InsertGrantOutcome, RedeemOutcome, RevokeOutcome};

use crate::error::{Result, ServiceError};
use crate::resolver::AccessResolver;

/// Configuration for the grant service.
#[derive(Debug, Clone)]
pub struct GrantServiceConfig {
    /// Length of generated access codes.
    pub code_length: usize,
    /// How many codes to try before giving up with `CodeSpaceExhausted`.
    pub max_code_attempts: u32,
    /// Whether grant expiry retroactively revokes standing access.
    ///
    /// The reference behavior is `false`: expiry blocks new redemptions
    /// only, and already-redeemed users keep access until explicitly
    /// revoked or the grant is deleted.
    pub expiry_revokes_standing_access: bool,
}

impl Default for GrantServiceConfig {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_CODE_LENGTH,
            max_code_attempts: 5,
            expiry_revokes_standing_access: false,
        }
    }
}

/// The grant service.
///
/// Provides the full grant lifecycle:
/// - Issuing grants with collision-checked codes
/// - Validating codes (pure preview, no side effects)
/// - Redeeming codes with atomic capacity enforcement
/// - Revoking single redemptions and whole grants
pub struct GrantService<S: GrantStore> {
    /// The storage backend.
    store: Arc<S>,
    /// Configuration.
    config: GrantServiceConfig,
    /// Access code generator.
    codes: CodeGenerator,
}

impl<S: GrantStore> Clone for GrantService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
            codes: self.codes,
        }
    }
}

impl<S: GrantStore> GrantService<S> {
    /// Create a new service over the given store.
    pub fn new(store: S, config: GrantServiceConfig) -> Self {
        Self {
            store: Arc::new(store),
            config,
            codes: CodeGenerator::new(),
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// A read-side resolver sharing this service's store and policy.
    pub fn resolver(&self) -> AccessResolver<S> {
        AccessResolver::new(
            Arc::clone(&self.store),
            self.config.expiry_revokes_standing_access,
        )
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Grant Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a grant from a validated request.
    ///
    /// Generates a code and inserts the grant; on a code collision the
    /// store reports `CodeTaken` and we regenerate, bounded by
    /// `max_code_attempts`.
    pub async fn create_grant(&self, spec: GrantSpec) -> Result<Grant> {
        spec.validate()?;

        let now = now_millis();
        let expires_at = spec.ttl.map(|ttl| now + ttl.as_millis() as i64);
        let capacity = spec.effective_capacity();

        for attempt in 1..=self.config.max_code_attempts {
            let grant = Grant {
                id: GrantId::generate(),
                kind: spec.kind,
                code: self.codes.generate(self.config.code_length),
                owner: spec.owner.clone(),
                subject: spec.subject.clone(),
                org_name: spec.org_name.clone(),
                permissions: spec.permissions.clone(),
                max_redemptions: capacity,
                status: GrantStatus::Active,
                created_at: now,
                expires_at,
            };

            match self.store.insert_grant(&grant).await? {
                InsertGrantOutcome::Inserted => {
                    info!(
                        grant_id = %grant.id,
                        kind = ?grant.kind,
                        owner = %grant.owner,
                        capacity = ?grant.max_redemptions,
                        expires_at = ?grant.expires_at,
                        "grant created"
                    );
                    return Ok(grant);
                }
                InsertGrantOutcome::CodeTaken => {
                    warn!(attempt, "access code collision, regenerating");
                }
            }
        }

        Err(ServiceError::CodeSpaceExhausted {
            attempts: self.config.max_code_attempts,
        })
    }

    /// Look up a grant by code and check it can accept redemptions.
    ///
    /// Pure read-only preview for callers that show grant details before
    /// committing. Capacity is deliberately not checked here; only the
    /// atomic redeem path decides seat availability.
    pub async fn validate_grant(&self, code: &str) -> Result<Grant> {
        let code = normalize_code(code);
        let grant = self
            .store
            .get_grant_by_code(&code)
            .await?
            .ok_or(ServiceError::GrantNotFound)?;

        let now = now_millis();
        if grant.is_expired(now) {
            return Err(ServiceError::GrantExpired {
                expired_at: grant.expires_at.unwrap_or(now),
            });
        }
        if grant.status != GrantStatus::Active {
            return Err(ServiceError::GrantInactive {
                status: grant.status,
            });
        }

        Ok(grant)
    }

    /// Redeem a code for a user, consuming one seat.
    ///
    /// Re-resolves the grant by code rather than trusting any previously
    /// validated snapshot. The store then re-checks the grant's status,
    /// expiry, and seat cap inside the same transaction as the insert,
    /// so a deactivation or delete committing between the lookup here
    /// and the insert still wins.
    pub async fn redeem_grant(&self, code: &str, user: impl Into<PrincipalId>) -> Result<Redemption> {
        let user = user.into();
        let grant = self.validate_grant(code).await?;

        let redemption = Redemption::new(grant.id, user.clone(), now_millis());
        match self.store.insert_redemption(&redemption).await? {
            RedeemOutcome::Redeemed => {
                info!(
                    grant_id = %grant.id,
                    redemption_id = %redemption.id,
                    user = %user,
                    "grant redeemed"
                );
                Ok(redemption)
            }
            RedeemOutcome::AlreadyRedeemed => Err(ServiceError::AlreadyRedeemed),
            RedeemOutcome::CapacityExceeded { max } => {
                Err(ServiceError::CapacityExceeded { max })
            }
            // Deleted grants read as gone, matching validate_grant.
            RedeemOutcome::GrantMissing
            | RedeemOutcome::GrantClosed {
                status: GrantStatus::Deleted,
            } => Err(ServiceError::GrantNotFound),
            RedeemOutcome::GrantClosed { status } => {
                Err(ServiceError::GrantInactive { status })
            }
            RedeemOutcome::GrantExpired { expired_at } => {
                Err(ServiceError::GrantExpired { expired_at })
            }
        }
    }

    /// Revoke a single redemption, freeing its seat.
    ///
    /// Revoking an already-revoked redemption fails with
    /// [`ServiceError::AlreadyRevoked`] rather than silently succeeding,
    /// so a caller acting on stale state finds out.
    pub async fn revoke_redemption(
        &self,
        id: &RedemptionId,
        revoked_by: &PrincipalId,
    ) -> Result<()> {
        match self
            .store
            .revoke_redemption(id, revoked_by, now_millis())
            .await?
        {
            RevokeOutcome::Revoked => {
                info!(redemption_id = %id, revoked_by = %revoked_by, "redemption revoked");
                Ok(())
            }
            RevokeOutcome::AlreadyRevoked => Err(ServiceError::AlreadyRevoked),
            RevokeOutcome::NotFound => Err(ServiceError::RedemptionNotFound),
        }
    }

    /// Toggle a grant between Active and Deactivated.
    ///
    /// Does not touch existing redemptions: a deactivated grant simply
    /// stops accepting new ones. Deleted grants are treated as gone.
    pub async fn set_grant_active(&self, id: &GrantId, is_active: bool) -> Result<()> {
        let grant = self
            .store
            .get_grant(id)
            .await?
            .ok_or(ServiceError::GrantNotFound)?;

        if grant.status == GrantStatus::Deleted {
            return Err(ServiceError::GrantNotFound);
        }

        let status = if is_active {
            GrantStatus::Active
        } else {
            GrantStatus::Deactivated
        };

        if !self.store.set_grant_status(id, status).await? {
            return Err(ServiceError::GrantNotFound);
        }

        info!(grant_id = %id, ?status, "grant status changed");
        Ok(())
    }

    /// Delete a grant: terminal, and revokes every active redemption
    /// under it on behalf of the caller.
    ///
    /// Returns the number of redemptions the cascade revoked. A new
    /// grant with a new code must be created to restore access.
    pub async fn delete_grant(&self, id: &GrantId, deleted_by: &PrincipalId) -> Result<u32> {
        let grant = self
            .store
            .get_grant(id)
            .await?
            .ok_or(ServiceError::GrantNotFound)?;

        if grant.status == GrantStatus::Deleted {
            return Err(ServiceError::GrantNotFound);
        }

        // Flip the status first so no new redemption can slip in while
        // the cascade runs.
        self.store.set_grant_status(id, GrantStatus::Deleted).await?;
        let revoked = self
            .store
            .revoke_all_active(id, deleted_by, now_millis())
            .await?;

        info!(
            grant_id = %id,
            deleted_by = %deleted_by,
            revoked_redemptions = revoked,
            "grant deleted"
        );
        Ok(revoked)
    }
}
