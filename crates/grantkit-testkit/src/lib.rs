//! # Grantkit Testkit
//!
//! Testing utilities for grantkit.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a memory-backed service with one-line grant issuance
//! - **Generators**: proptest strategies for codes, principals, and
//!   grant specs
//!
//! ## Test Fixtures
//!
//! ```rust,ignore
//! use grantkit_testkit::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let grant = fixture.make_org("admin", "Acme Care", Some(5)).await;
//! let redemption = fixture.redeem(&grant, "member").await;
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use grantkit_testkit::generators::grant_spec;
//!
//! proptest! {
//!     #[test]
//!     fn specs_validate(spec in grant_spec()) {
//!         prop_assert!(spec.validate().is_ok());
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::TestFixture;
