//! Grant and redemption domain types.
//!
//! A grant is an issued access code with a lifecycle and a seat capacity.
//! A redemption records one user consuming one seat. Both shapes the
//! surrounding product needs (a personal invitation and an organizational
//! code) share this single representation, discriminated by [`GrantKind`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ids::{GrantId, PrincipalId, RedemptionId};

/// Discriminator for the two grant shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrantKind {
    /// One caregiver supporting one subject, carrying a permission set.
    /// Capacity is fixed at a single seat.
    Personal,
    /// One sponsoring organization, many redeemers, optional seat cap.
    /// Conveys paid-tier access implicitly rather than fine-grained
    /// permissions.
    Organizational,
}

impl GrantKind {
    /// Encode as a stable integer for storage.
    pub fn to_u8(self) -> u8 {
        match self {
            GrantKind::Personal => 0,
            GrantKind::Organizational => 1,
        }
    }

    /// Decode from the stored integer.
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(GrantKind::Personal),
            1 => Some(GrantKind::Organizational),
            _ => None,
        }
    }
}

/// Administrator-controlled grant lifecycle state.
///
/// Independent of time-based expiry, which is a computed predicate
/// (see [`Grant::is_expired`]), never a stored transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrantStatus {
    /// Accepting new redemptions.
    Active,
    /// Temporarily closed to new redemptions; reversible.
    Deactivated,
    /// Terminal. Set by delete, which also revokes standing redemptions.
    Deleted,
}

impl GrantStatus {
    /// Encode as a stable integer for storage.
    pub fn to_u8(self) -> u8 {
        match self {
            GrantStatus::Active => 0,
            GrantStatus::Deactivated => 1,
            GrantStatus::Deleted => 2,
        }
    }

    /// Decode from the stored integer.
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(GrantStatus::Active),
            1 => Some(GrantStatus::Deactivated),
            2 => Some(GrantStatus::Deleted),
            _ => None,
        }
    }
}

/// An issued access grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// Stable identifier.
    pub id: GrantId,

    /// Personal invitation or organizational code.
    pub kind: GrantKind,

    /// Short human-enterable code, unique among non-deleted grants.
    pub code: String,

    /// The issuing principal: caregiver for Personal, administrator for
    /// Organizational.
    pub owner: PrincipalId,

    /// The supported user. Required for Personal, absent otherwise.
    pub subject: Option<PrincipalId>,

    /// Display label for Organizational grants.
    pub org_name: Option<String>,

    /// Opaque capability tokens carried by Personal grants. Empty for
    /// Organizational grants.
    pub permissions: BTreeSet<String>,

    /// Seat cap. `None` means unlimited. Personal grants are always
    /// `Some(1)`.
    pub max_redemptions: Option<u32>,

    /// Lifecycle state.
    pub status: GrantStatus,

    /// Creation time (Unix ms).
    pub created_at: i64,

    /// Expiry time (Unix ms). `None` means never expires.
    pub expires_at: Option<i64>,
}

impl Grant {
    /// Whether the grant's expiry time has passed.
    ///
    /// Expiry is evaluated lazily at validate/redeem/resolve time; there
    /// is no background sweep and no stored expired state.
    pub fn is_expired(&self, now: i64) -> bool {
        match self.expires_at {
            Some(at) => now > at,
            None => false,
        }
    }

    /// Whether the grant can accept a new redemption right now, ignoring
    /// capacity (capacity is only checked atomically at the store).
    pub fn is_open(&self, now: i64) -> bool {
        self.status == GrantStatus::Active && !self.is_expired(now)
    }

    /// Remaining seats given the current active-redemption count.
    /// `None` means unlimited.
    pub fn remaining_capacity(&self, active_redemptions: u32) -> Option<u32> {
        self.max_redemptions
            .map(|max| max.saturating_sub(active_redemptions))
    }

    /// Read-side summary for resolver callers.
    pub fn summarize(&self, redeemed_at: i64) -> GrantSummary {
        GrantSummary {
            grant_id: self.id,
            kind: self.kind,
            code: self.code.clone(),
            org_name: self.org_name.clone(),
            permissions: self.permissions.clone(),
            redeemed_at,
        }
    }
}

/// Lifecycle state of a single redemption.
///
/// Redemptions are never deleted; revocation flips the status and keeps
/// the row as an audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RedemptionStatus {
    /// The seat is held.
    Active,
    /// The seat was released by explicit revocation or cascade delete.
    Revoked,
}

impl RedemptionStatus {
    /// Encode as a stable integer for storage.
    pub fn to_u8(self) -> u8 {
        match self {
            RedemptionStatus::Active => 0,
            RedemptionStatus::Revoked => 1,
        }
    }

    /// Decode from the stored integer.
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(RedemptionStatus::Active),
            1 => Some(RedemptionStatus::Revoked),
            _ => None,
        }
    }
}

/// A record of one user consuming one seat of a grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redemption {
    /// Stable identifier.
    pub id: RedemptionId,

    /// The grant this redemption belongs to.
    pub grant_id: GrantId,

    /// The redeemer.
    pub user: PrincipalId,

    /// Active or revoked.
    pub status: RedemptionStatus,

    /// When the code was redeemed (Unix ms).
    pub redeemed_at: i64,

    /// When the redemption was revoked, if it was.
    pub revoked_at: Option<i64>,

    /// Who revoked it, if it was.
    pub revoked_by: Option<PrincipalId>,
}

impl Redemption {
    /// Create a fresh active redemption.
    pub fn new(grant_id: GrantId, user: PrincipalId, redeemed_at: i64) -> Self {
        Self {
            id: RedemptionId::generate(),
            grant_id,
            user,
            status: RedemptionStatus::Active,
            redeemed_at,
            revoked_at: None,
            revoked_by: None,
        }
    }

    /// Whether this redemption still holds its seat.
    pub fn is_active(&self) -> bool {
        self.status == RedemptionStatus::Active
    }
}

/// Grant view returned by access queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantSummary {
    /// The grant.
    pub grant_id: GrantId,
    /// Personal or Organizational.
    pub kind: GrantKind,
    /// The code the user redeemed.
    pub code: String,
    /// Sponsor label for Organizational grants.
    pub org_name: Option<String>,
    /// Capabilities the relationship carries.
    pub permissions: BTreeSet<String>,
    /// When the querying user redeemed it (Unix ms).
    pub redeemed_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_grant(expires_at: Option<i64>) -> Grant {
        Grant {
            id: GrantId::from_bytes([1; 16]),
            kind: GrantKind::Organizational,
            code: "ABCD2345".to_string(),
            owner: PrincipalId::new("admin"),
            subject: None,
            org_name: Some("Acme Care".to_string()),
            permissions: BTreeSet::new(),
            max_redemptions: Some(3),
            status: GrantStatus::Active,
            created_at: 1_000,
            expires_at,
        }
    }

    #[test]
    fn expiry_is_lazy_and_exclusive_of_boundary() {
        let grant = sample_grant(Some(5_000));
        assert!(!grant.is_expired(4_999));
        assert!(!grant.is_expired(5_000)); // at the boundary: not yet expired
        assert!(grant.is_expired(5_001));
    }

    #[test]
    fn no_expiry_never_expires() {
        let grant = sample_grant(None);
        assert!(!grant.is_expired(i64::MAX));
    }

    #[test]
    fn open_requires_active_status() {
        let mut grant = sample_grant(None);
        assert!(grant.is_open(2_000));

        grant.status = GrantStatus::Deactivated;
        assert!(!grant.is_open(2_000));

        grant.status = GrantStatus::Deleted;
        assert!(!grant.is_open(2_000));
    }

    #[test]
    fn remaining_capacity_saturates() {
        let grant = sample_grant(None);
        assert_eq!(grant.remaining_capacity(0), Some(3));
        assert_eq!(grant.remaining_capacity(3), Some(0));
        assert_eq!(grant.remaining_capacity(5), Some(0));

        let mut unlimited = sample_grant(None);
        unlimited.max_redemptions = None;
        assert_eq!(unlimited.remaining_capacity(1_000), None);
    }

    #[test]
    fn status_codes_roundtrip() {
        for status in [
            GrantStatus::Active,
            GrantStatus::Deactivated,
            GrantStatus::Deleted,
        ] {
            assert_eq!(GrantStatus::from_u8(status.to_u8()), Some(status));
        }
        assert_eq!(GrantStatus::from_u8(9), None);

        for kind in [GrantKind::Personal, GrantKind::Organizational] {
            assert_eq!(GrantKind::from_u8(kind.to_u8()), Some(kind));
        }
        for status in [RedemptionStatus::Active, RedemptionStatus::Revoked] {
            assert_eq!(RedemptionStatus::from_u8(status.to_u8()), Some(status));
        }
    }
}
