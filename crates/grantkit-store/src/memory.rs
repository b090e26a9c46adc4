//! In-memory implementation of the GrantStore trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence. All operations
//! take the single RwLock, so the capacity check-and-insert is atomic
//! here for the same reason it is under the SQLite connection mutex.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use grantkit_core::{
    Grant, GrantId, GrantStatus, PrincipalId, Redemption, RedemptionId, RedemptionStatus,
};

use crate::error::{Result, StoreError};
use crate::traits::{GrantStore, InsertGrantOutcome, RedeemOutcome, RevokeOutcome};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Grants indexed by id.
    grants: HashMap<GrantId, Grant>,

    /// Code index: code -> grant_id, non-deleted grants only.
    codes: HashMap<String, GrantId>,

    /// Redemptions indexed by id.
    redemptions: HashMap<RedemptionId, Redemption>,
}

impl MemoryStoreInner {
    fn active_count(&self, grant_id: &GrantId) -> u32 {
        self.redemptions
            .values()
            .filter(|r| r.grant_id == *grant_id && r.is_active())
            .count() as u32
    }

    fn active_for(&self, grant_id: &GrantId, user: &PrincipalId) -> Option<&Redemption> {
        self.redemptions
            .values()
            .find(|r| r.grant_id == *grant_id && r.user == *user && r.is_active())
    }
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::InvalidData(format!("lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::InvalidData(format!("lock poisoned: {}", e)))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GrantStore for MemoryStore {
    async fn insert_grant(&self, grant: &Grant) -> Result<InsertGrantOutcome> {
        let mut inner = self.write()?;

        if inner.codes.contains_key(&grant.code) {
            return Ok(InsertGrantOutcome::CodeTaken);
        }

        inner.codes.insert(grant.code.clone(), grant.id);
        inner.grants.insert(grant.id, grant.clone());
        Ok(InsertGrantOutcome::Inserted)
    }

    async fn get_grant(&self, id: &GrantId) -> Result<Option<Grant>> {
        let inner = self.read()?;
        Ok(inner.grants.get(id).cloned())
    }

    async fn get_grant_by_code(&self, code: &str) -> Result<Option<Grant>> {
        let inner = self.read()?;
        Ok(inner
            .codes
            .get(code)
            .and_then(|id| inner.grants.get(id))
            .cloned())
    }

    async fn list_grants_by_owner(
        &self,
        owner: &PrincipalId,
        include_deleted: bool,
    ) -> Result<Vec<Grant>> {
        let inner = self.read()?;

        let mut grants: Vec<Grant> = inner
            .grants
            .values()
            .filter(|g| g.owner == *owner)
            .filter(|g| include_deleted || g.status != GrantStatus::Deleted)
            .cloned()
            .collect();

        grants.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(grants)
    }

    async fn set_grant_status(&self, id: &GrantId, status: GrantStatus) -> Result<bool> {
        let mut inner = self.write()?;

        let Some(grant) = inner.grants.get_mut(id) else {
            return Ok(false);
        };
        let code = grant.code.clone();
        grant.status = status;

        // Keep the code index scoped to non-deleted grants.
        if status == GrantStatus::Deleted {
            inner.codes.remove(&code);
        } else {
            inner.codes.insert(code, *id);
        }
        Ok(true)
    }

    async fn insert_redemption(&self, redemption: &Redemption) -> Result<RedeemOutcome> {
        let mut inner = self.write()?;

        // Re-check the grant under the write lock so a concurrent
        // deactivation or delete wins over this insert.
        let Some(grant) = inner.grants.get(&redemption.grant_id) else {
            return Ok(RedeemOutcome::GrantMissing);
        };
        if grant.status != GrantStatus::Active {
            return Ok(RedeemOutcome::GrantClosed {
                status: grant.status,
            });
        }
        if let Some(at) = grant.expires_at {
            if redemption.redeemed_at > at {
                return Ok(RedeemOutcome::GrantExpired { expired_at: at });
            }
        }
        let capacity = grant.max_redemptions;

        if inner
            .active_for(&redemption.grant_id, &redemption.user)
            .is_some()
        {
            return Ok(RedeemOutcome::AlreadyRedeemed);
        }

        if let Some(max) = capacity {
            if inner.active_count(&redemption.grant_id) >= max {
                return Ok(RedeemOutcome::CapacityExceeded { max });
            }
        }

        inner.redemptions.insert(redemption.id, redemption.clone());
        Ok(RedeemOutcome::Redeemed)
    }

    async fn get_redemption(&self, id: &RedemptionId) -> Result<Option<Redemption>> {
        let inner = self.read()?;
        Ok(inner.redemptions.get(id).cloned())
    }

    async fn active_redemption(
        &self,
        grant_id: &GrantId,
        user: &PrincipalId,
    ) -> Result<Option<Redemption>> {
        let inner = self.read()?;
        Ok(inner.active_for(grant_id, user).cloned())
    }

    async fn list_redemptions(&self, grant_id: &GrantId) -> Result<Vec<Redemption>> {
        let inner = self.read()?;

        let mut redemptions: Vec<Redemption> = inner
            .redemptions
            .values()
            .filter(|r| r.grant_id == *grant_id)
            .cloned()
            .collect();

        redemptions.sort_by_key(|r| r.redeemed_at);
        Ok(redemptions)
    }

    async fn list_active_redemptions_for_user(
        &self,
        user: &PrincipalId,
    ) -> Result<Vec<Redemption>> {
        let inner = self.read()?;

        let mut redemptions: Vec<Redemption> = inner
            .redemptions
            .values()
            .filter(|r| r.user == *user && r.is_active())
            .cloned()
            .collect();

        redemptions.sort_by_key(|r| r.redeemed_at);
        Ok(redemptions)
    }

    async fn count_active_redemptions(&self, grant_id: &GrantId) -> Result<u32> {
        let inner = self.read()?;
        Ok(inner.active_count(grant_id))
    }

    async fn revoke_redemption(
        &self,
        id: &RedemptionId,
        revoked_by: &PrincipalId,
        at: i64,
    ) -> Result<RevokeOutcome> {
        let mut inner = self.write()?;

        let Some(redemption) = inner.redemptions.get_mut(id) else {
            return Ok(RevokeOutcome::NotFound);
        };

        if !redemption.is_active() {
            return Ok(RevokeOutcome::AlreadyRevoked);
        }

        redemption.status = RedemptionStatus::Revoked;
        redemption.revoked_at = Some(at);
        redemption.revoked_by = Some(revoked_by.clone());
        Ok(RevokeOutcome::Revoked)
    }

    async fn revoke_all_active(
        &self,
        grant_id: &GrantId,
        revoked_by: &PrincipalId,
        at: i64,
    ) -> Result<u32> {
        let mut inner = self.write()?;

        let mut revoked = 0u32;
        for redemption in inner.redemptions.values_mut() {
            if redemption.grant_id == *grant_id && redemption.is_active() {
                redemption.status = RedemptionStatus::Revoked;
                redemption.revoked_at = Some(at);
                redemption.revoked_by = Some(revoked_by.clone());
                revoked += 1;
            }
        }
        Ok(revoked)
    }
}
