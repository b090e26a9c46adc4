//! Thin admin operations over the grant service.
//!
//! No independent logic lives here: every method delegates to the
//! service or the store, adding only the aggregation an admin dashboard
//! needs.

use grantkit_core::{Grant, GrantId, PrincipalId, Redemption, RedemptionId};
use grantkit_store::GrantStore;

use crate::error::{Result, ServiceError};
use crate::service::GrantService;

/// A grant with its redemption history and seat usage, for dashboards.
#[derive(Debug, Clone)]
pub struct GrantOverview {
    /// The grant itself.
    pub grant: Grant,
    /// All redemptions, active and revoked, oldest first.
    pub redemptions: Vec<Redemption>,
    /// Currently held seats.
    pub active_redemptions: u32,
    /// Seats left. `None` means unlimited.
    pub remaining_capacity: Option<u32>,
}

/// Admin control surface.
pub struct AdminSurface<S: GrantStore> {
    service: GrantService<S>,
}

impl<S: GrantStore> AdminSurface<S> {
    /// Wrap a service.
    pub fn new(service: GrantService<S>) -> Self {
        Self { service }
    }

    /// List an owner's grants, newest first.
    pub async fn list_grants(
        &self,
        owner: &PrincipalId,
        include_deleted: bool,
    ) -> Result<Vec<Grant>> {
        Ok(self
            .service
            .store()
            .list_grants_by_owner(owner, include_deleted)
            .await?)
    }

    /// List all redemptions of a grant.
    pub async fn list_redemptions(&self, grant_id: &GrantId) -> Result<Vec<Redemption>> {
        Ok(self.service.store().list_redemptions(grant_id).await?)
    }

    /// A grant plus its redemption rows and remaining capacity.
    pub async fn grant_overview(&self, grant_id: &GrantId) -> Result<GrantOverview> {
        let grant = self
            .service
            .store()
            .get_grant(grant_id)
            .await?
            .ok_or(ServiceError::GrantNotFound)?;

        let redemptions = self.service.store().list_redemptions(grant_id).await?;
        let active_redemptions = self
            .service
            .store()
            .count_active_redemptions(grant_id)
            .await?;
        let remaining_capacity = grant.remaining_capacity(active_redemptions);

        Ok(GrantOverview {
            grant,
            redemptions,
            active_redemptions,
            remaining_capacity,
        })
    }

    /// Toggle a grant between Active and Deactivated.
    pub async fn set_active(&self, grant_id: &GrantId, is_active: bool) -> Result<()> {
        self.service.set_grant_active(grant_id, is_active).await
    }

    /// Delete a grant, revoking its active redemptions.
    pub async fn delete(&self, grant_id: &GrantId, deleted_by: &PrincipalId) -> Result<u32> {
        self.service.delete_grant(grant_id, deleted_by).await
    }

    /// Revoke a single redemption.
    pub async fn revoke_redemption(
        &self,
        id: &RedemptionId,
        revoked_by: &PrincipalId,
    ) -> Result<()> {
        self.service.revoke_redemption(id, revoked_by).await
    }
}
