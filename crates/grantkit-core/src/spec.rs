//! Validated grant creation requests.
//!
//! A [`GrantSpec`] captures everything a caller provides when issuing a
//! grant, before the service assigns an id, a code, and timestamps. The
//! per-kind field requirements are enforced here so an incoherent request
//! fails before touching the store.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SpecError;
use crate::grant::GrantKind;
use crate::ids::PrincipalId;

/// A request to create a grant.
///
/// Build with [`GrantSpec::personal`] or [`GrantSpec::organizational`];
/// both produce a shape that passes [`validate`](GrantSpec::validate).
/// Constructing the struct by hand is possible but then validation may
/// reject it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantSpec {
    /// Which grant shape is being issued.
    pub kind: GrantKind,
    /// The issuing principal.
    pub owner: PrincipalId,
    /// The supported user (Personal only).
    pub subject: Option<PrincipalId>,
    /// Sponsor display label (Organizational only).
    pub org_name: Option<String>,
    /// Capability tokens (Personal only).
    pub permissions: BTreeSet<String>,
    /// Seat cap. Ignored for Personal, which is fixed at one seat.
    pub max_redemptions: Option<u32>,
    /// Time to live. Absent means the grant never expires.
    pub ttl: Option<Duration>,
}

impl GrantSpec {
    /// A personal invitation: one caregiver supporting one subject.
    pub fn personal(
        owner: impl Into<PrincipalId>,
        subject: impl Into<PrincipalId>,
        permissions: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            kind: GrantKind::Personal,
            owner: owner.into(),
            subject: Some(subject.into()),
            org_name: None,
            permissions: permissions.into_iter().collect(),
            max_redemptions: Some(1),
            ttl: None,
        }
    }

    /// An organizational code: one sponsor, many redeemers.
    pub fn organizational(owner: impl Into<PrincipalId>, org_name: impl Into<String>) -> Self {
        Self {
            kind: GrantKind::Organizational,
            owner: owner.into(),
            subject: None,
            org_name: Some(org_name.into()),
            permissions: BTreeSet::new(),
            max_redemptions: None,
            ttl: None,
        }
    }

    /// Cap the number of concurrently active redemptions.
    pub fn with_max_redemptions(mut self, max: u32) -> Self {
        self.max_redemptions = Some(max);
        self
    }

    /// Expire the grant `ttl` after creation.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Check per-kind field requirements.
    pub fn validate(&self) -> Result<(), SpecError> {
        match self.kind {
            GrantKind::Personal => {
                if self.subject.is_none() {
                    return Err(SpecError::MissingSubject);
                }
                if self.permissions.is_empty() {
                    return Err(SpecError::MissingPermissions);
                }
                // Personal capacity is fixed; reject attempts to widen it.
                if self.max_redemptions != Some(1) {
                    return Err(SpecError::PersonalCapacityNotOne);
                }
            }
            GrantKind::Organizational => {
                match &self.org_name {
                    Some(name) if !name.trim().is_empty() => {}
                    _ => return Err(SpecError::MissingOrgName),
                }
                if self.max_redemptions == Some(0) {
                    return Err(SpecError::ZeroCapacity);
                }
            }
        }
        Ok(())
    }

    /// The effective seat cap this request carries.
    pub fn effective_capacity(&self) -> Option<u32> {
        match self.kind {
            GrantKind::Personal => Some(1),
            GrantKind::Organizational => self.max_redemptions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn personal_spec_is_valid() {
        let spec = GrantSpec::personal("carer", "recipient", ["view_progress".to_string()]);
        assert!(spec.validate().is_ok());
        assert_eq!(spec.effective_capacity(), Some(1));
    }

    #[test]
    fn personal_spec_requires_subject() {
        let mut spec = GrantSpec::personal("carer", "recipient", ["view_progress".to_string()]);
        spec.subject = None;
        assert_eq!(spec.validate(), Err(SpecError::MissingSubject));
    }

    #[test]
    fn personal_spec_requires_permissions() {
        let spec = GrantSpec::personal("carer", "recipient", []);
        assert_eq!(spec.validate(), Err(SpecError::MissingPermissions));
    }

    #[test]
    fn personal_capacity_is_not_configurable() {
        let spec =
            GrantSpec::personal("carer", "recipient", ["chat".to_string()]).with_max_redemptions(5);
        assert_eq!(spec.validate(), Err(SpecError::PersonalCapacityNotOne));
    }

    #[test]
    fn organizational_spec_requires_name() {
        let mut spec = GrantSpec::organizational("admin", "Acme Care");
        assert!(spec.validate().is_ok());

        spec.org_name = Some("   ".to_string());
        assert_eq!(spec.validate(), Err(SpecError::MissingOrgName));

        spec.org_name = None;
        assert_eq!(spec.validate(), Err(SpecError::MissingOrgName));
    }

    #[test]
    fn organizational_rejects_zero_capacity() {
        let spec = GrantSpec::organizational("admin", "Acme Care").with_max_redemptions(0);
        assert_eq!(spec.validate(), Err(SpecError::ZeroCapacity));
    }

    #[test]
    fn organizational_unlimited_by_default() {
        let spec = GrantSpec::organizational("admin", "Acme Care");
        assert_eq!(spec.effective_capacity(), None);
    }
}
