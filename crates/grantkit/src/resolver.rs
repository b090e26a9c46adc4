//! Read-side access queries.
//!
//! Other features of the surrounding product gate behavior on "does this
//! user currently have valid access." Those answers are computed fresh
//! from grant and redemption state on every call; nothing here caches,
//! so a revocation is visible immediately.
//!
//! A user has valid access via a grant when an active redemption exists
//! for the pair and the grant has not been deleted. Deactivation blocks
//! new redemptions but leaves standing redeemers untouched, and expiry
//! does the same unless the expiry policy flag says otherwise.

use std::sync::Arc;

use grantkit_core::{GrantId, GrantStatus, GrantSummary, PrincipalId, now_millis};
use grantkit_store::GrantStore;

use crate::error::Result;

/// Read-side resolver over the grant store.
pub struct AccessResolver<S> {
    store: Arc<S>,
    /// When set, expired grants stop conferring access even to users who
    /// redeemed before expiry.
    expiry_revokes_standing_access: bool,
}

impl<S> Clone for AccessResolver<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            expiry_revokes_standing_access: self.expiry_revokes_standing_access,
        }
    }
}

impl<S: GrantStore> AccessResolver<S> {
    /// Create a resolver over a shared store.
    pub fn new(store: Arc<S>, expiry_revokes_standing_access: bool) -> Self {
        Self {
            store,
            expiry_revokes_standing_access,
        }
    }

    /// Whether a standing redemption of this grant still confers access.
    fn standing_access(&self, status: GrantStatus, expires_at: Option<i64>, now: i64) -> bool {
        if status == GrantStatus::Deleted {
            return false;
        }
        if self.expiry_revokes_standing_access {
            if let Some(at) = expires_at {
                if now > at {
                    return false;
                }
            }
        }
        true
    }

    /// Does the user currently have valid access?
    ///
    /// With a grant id: via that specific grant. Without: via any grant.
    pub async fn has_valid_access(
        &self,
        user: &PrincipalId,
        grant_id: Option<&GrantId>,
    ) -> Result<bool> {
        let now = now_millis();

        match grant_id {
            Some(id) => {
                let Some(_redemption) = self.store.active_redemption(id, user).await? else {
                    return Ok(false);
                };
                let Some(grant) = self.store.get_grant(id).await? else {
                    return Ok(false);
                };
                Ok(self.standing_access(grant.status, grant.expires_at, now))
            }
            None => {
                for redemption in self.store.list_active_redemptions_for_user(user).await? {
                    if let Some(grant) = self.store.get_grant(&redemption.grant_id).await? {
                        if self.standing_access(grant.status, grant.expires_at, now) {
                            return Ok(true);
                        }
                    }
                }
                Ok(false)
            }
        }
    }

    /// Summaries of every grant currently conferring access to the user.
    pub async fn active_grants_for(&self, user: &PrincipalId) -> Result<Vec<GrantSummary>> {
        let now = now_millis();
        let mut summaries = Vec::new();

        for redemption in self.store.list_active_redemptions_for_user(user).await? {
            if let Some(grant) = self.store.get_grant(&redemption.grant_id).await? {
                if self.standing_access(grant.status, grant.expires_at, now) {
                    summaries.push(grant.summarize(redemption.redeemed_at));
                }
            }
        }

        Ok(summaries)
    }
}
