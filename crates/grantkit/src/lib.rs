//! # Grantkit
//!
//! Time-bounded access grants for support networks and sponsored access.
//!
//! A **grant** is an issued, human-typeable access code with a
//! lifecycle, a seat capacity, and (for personal grants) a permission
//! set. A **redemption** records one user consuming one seat. Two grant
//! shapes share the one abstraction: a personal invitation (one
//! caregiver, one recipient) and an organizational code (one sponsor,
//! many redeemers).
//!
//! ## Key Concepts
//!
//! - **Lazy expiry**: time-based validity is computed at read/write
//!   time; there is no background sweeper.
//! - **Atomic capacity**: the seat check and the redemption insert are
//!   one atomic unit per grant, so concurrent redeemers never overshoot
//!   the cap.
//! - **Audit-preserving revocation**: redemptions are revoked, never
//!   deleted.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use grantkit::{GrantService, GrantServiceConfig};
//! use grantkit::core::GrantSpec;
//! use grantkit::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("grants.db").unwrap();
//!     let service = GrantService::new(store, GrantServiceConfig::default());
//!
//!     // A caregiver invites a recipient
//!     let grant = service
//!         .create_grant(GrantSpec::personal(
//!             "caregiver-1",
//!             "recipient-1",
//!             ["view_progress".to_string()],
//!         ))
//!         .await
//!         .unwrap();
//!
//!     // The recipient redeems the code out-of-band
//!     let redemption = service.redeem_grant(&grant.code, "recipient-1").await.unwrap();
//!
//!     // Other features consult the resolver
//!     let resolver = service.resolver();
//!     assert!(resolver
//!         .has_valid_access(&redemption.user, Some(&grant.id))
//!         .await
//!         .unwrap());
//! }
//! ```

pub mod admin;
pub mod error;
pub mod resolver;
pub mod service;

pub use admin::{AdminSurface, GrantOverview};
pub use error::{Result, ServiceError};
pub use resolver::AccessResolver;
pub use service::{GrantService, GrantServiceConfig};

/// Re-export of the domain types.
pub use grantkit_core as core;
/// Re-export of the storage backends.
pub use grantkit_store as store;
