//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use grantkit::{GrantService, GrantServiceConfig};
use grantkit_core::{Grant, GrantSpec, PrincipalId, Redemption};
use grantkit_store::MemoryStore;

/// A test fixture with a memory-backed grant service.
pub struct TestFixture {
    pub service: GrantService<MemoryStore>,
}

impl TestFixture {
    /// Create a fixture with the default configuration.
    pub fn new() -> Self {
        Self::with_config(GrantServiceConfig::default())
    }

    /// Create a fixture with a custom configuration.
    pub fn with_config(config: GrantServiceConfig) -> Self {
        Self {
            service: GrantService::new(MemoryStore::new(), config),
        }
    }

    /// An opaque principal id for test users.
    pub fn principal(name: &str) -> PrincipalId {
        PrincipalId::new(name)
    }

    /// Issue a personal invitation from `owner` to `subject`.
    pub async fn make_personal(&self, owner: &str, subject: &str) -> Grant {
        self.service
            .create_grant(GrantSpec::personal(
                owner,
                subject,
                ["view_progress".to_string()],
            ))
            .await
            .expect("create personal grant")
    }

    /// Issue an organizational code with an optional seat cap.
    pub async fn make_org(&self, owner: &str, org_name: &str, cap: Option<u32>) -> Grant {
        let mut spec = GrantSpec::organizational(owner, org_name);
        if let Some(cap) = cap {
            spec = spec.with_max_redemptions(cap);
        }
        self.service
            .create_grant(spec)
            .await
            .expect("create organizational grant")
    }

    /// Redeem a grant's code as the given user.
    pub async fn redeem(&self, grant: &Grant, user: &str) -> Redemption {
        self.service
            .redeem_grant(&grant.code, user)
            .await
            .expect("redeem grant")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
