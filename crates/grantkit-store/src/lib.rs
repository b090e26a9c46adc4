//! # Grantkit Store
//!
//! Storage abstraction for grantkit. Provides a trait-based interface
//! for grant and redemption persistence with SQLite and in-memory
//! implementations.
//!
//! ## Overview
//!
//! The store module abstracts persistence behind the [`GrantStore`]
//! trait, keeping the service storage-agnostic. The primary
//! implementation is [`SqliteStore`], with [`MemoryStore`] for testing.
//!
//! ## Key Types
//!
//! - [`GrantStore`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`InsertGrantOutcome`] / [`RedeemOutcome`] / [`RevokeOutcome`] -
//!   contended outcomes as values, not errors
//!
//! ## Design Notes
//!
//! - **Store-level constraints**: code uniqueness is scoped to
//!   non-deleted grants, and at most one active redemption exists per
//!   `(grant, user)` pair; both are enforced by partial unique indexes,
//!   not just application logic.
//! - **Atomic redemption**: the grant's status, expiry, and seat cap are
//!   re-read in the same atomic unit as the redemption insert, so
//!   concurrent redeemers can never overshoot the cap or land a seat
//!   under a grant that was deactivated or deleted mid-flight.
//! - **Audit trail**: redemptions are never deleted, only revoked.

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{GrantStore, InsertGrantOutcome, RedeemOutcome, RevokeOutcome};
