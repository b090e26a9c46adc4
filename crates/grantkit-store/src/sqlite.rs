//! SQLite implementation of the GrantStore trait.
//!
//! This is the primary storage backend. It uses rusqlite with bundled
//! SQLite, wrapped in async via tokio::spawn_blocking. The connection
//! mutex serializes all operations, so the grant re-check and the
//! capacity check-and-insert in
//! [`insert_redemption`](SqliteStore::insert_redemption) are atomic with
//! respect to concurrent redeemers; the partial unique indexes created
//! by the migrations back the same guarantees at the schema level.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

use grantkit_core::{
    Grant, GrantId, GrantKind, GrantStatus, PrincipalId, Redemption, RedemptionId,
    RedemptionStatus,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{GrantStore, InsertGrantOutcome, RedeemOutcome, RevokeOutcome};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking closure against the connection on the blocking pool.
    async fn on_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|e| {
                StoreError::Database(rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
                    Some(format!("mutex poisoned: {}", e)),
                ))
            })?;
            f(&mut conn)
        })
        .await
        .map_err(|e| {
            StoreError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
                Some(format!("spawn_blocking failed: {}", e)),
            ))
        })?
    }
}

/// Whether an error is a uniqueness-constraint violation.
fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

fn id_column<const N: usize>(bytes: Vec<u8>, name: &str) -> rusqlite::Result<[u8; N]> {
    bytes.try_into().map_err(|_| {
        rusqlite::Error::InvalidColumnType(0, name.into(), rusqlite::types::Type::Blob)
    })
}

// Helper to convert a row to Grant
fn row_to_grant(row: &rusqlite::Row<'_>) -> rusqlite::Result<Grant> {
    let grant_id_bytes: Vec<u8> = row.get("grant_id")?;
    let permissions_json: String = row.get("permissions")?;
    let permissions: BTreeSet<String> =
        serde_json::from_str(&permissions_json).unwrap_or_default();
    let subject: Option<String> = row.get("subject_id")?;

    Ok(Grant {
        id: GrantId::from_bytes(id_column(grant_id_bytes, "grant_id")?),
        kind: GrantKind::from_u8(row.get::<_, u8>("kind")?).unwrap_or(GrantKind::Personal),
        code: row.get("code")?,
        owner: PrincipalId::new(row.get::<_, String>("owner_id")?),
        subject: subject.map(PrincipalId::new),
        org_name: row.get("org_name")?,
        permissions,
        max_redemptions: row.get("max_redemptions")?,
        status: GrantStatus::from_u8(row.get::<_, u8>("status")?)
            .unwrap_or(GrantStatus::Deleted),
        created_at: row.get("created_at")?,
        expires_at: row.get("expires_at")?,
    })
}

// Helper to convert a row to Redemption
fn row_to_redemption(row: &rusqlite::Row<'_>) -> rusqlite::Result<Redemption> {
    let redemption_id_bytes: Vec<u8> = row.get("redemption_id")?;
    let grant_id_bytes: Vec<u8> = row.get("grant_id")?;
    let revoked_by: Option<String> = row.get("revoked_by")?;

    Ok(Redemption {
        id: RedemptionId::from_bytes(id_column(redemption_id_bytes, "redemption_id")?),
        grant_id: GrantId::from_bytes(id_column(grant_id_bytes, "grant_id")?),
        user: PrincipalId::new(row.get::<_, String>("user_id")?),
        status: RedemptionStatus::from_u8(row.get::<_, u8>("status")?)
            .unwrap_or(RedemptionStatus::Revoked),
        redeemed_at: row.get("redeemed_at")?,
        revoked_at: row.get("revoked_at")?,
        revoked_by: revoked_by.map(PrincipalId::new),
    })
}

const GRANT_COLUMNS: &str = "grant_id, kind, code, owner_id, subject_id, org_name, \
                             permissions, max_redemptions, status, created_at, expires_at";

const REDEMPTION_COLUMNS: &str =
    "redemption_id, grant_id, user_id, status, redeemed_at, revoked_at, revoked_by";

#[async_trait]
impl GrantStore for SqliteStore {
    async fn insert_grant(&self, grant: &Grant) -> Result<InsertGrantOutcome> {
        let grant = grant.clone();

        self.on_conn(move |conn| {
            let permissions_json = serde_json::to_string(&grant.permissions)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;

            let inserted = conn.execute(
                "INSERT INTO grants (
                    grant_id, kind, code, owner_id, subject_id, org_name,
                    permissions, max_redemptions, status, created_at, expires_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    grant.id.as_bytes().as_slice(),
                    grant.kind.to_u8(),
                    &grant.code,
                    grant.owner.as_str(),
                    grant.subject.as_ref().map(|s| s.as_str()),
                    grant.org_name.as_deref(),
                    permissions_json,
                    grant.max_redemptions,
                    grant.status.to_u8(),
                    grant.created_at,
                    grant.expires_at,
                ],
            );

            match inserted {
                Ok(_) => Ok(InsertGrantOutcome::Inserted),
                Err(e) if is_constraint_violation(&e) => Ok(InsertGrantOutcome::CodeTaken),
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    async fn get_grant(&self, id: &GrantId) -> Result<Option<Grant>> {
        let id = *id;

        self.on_conn(move |conn| {
            conn.query_row(
                &format!("SELECT {GRANT_COLUMNS} FROM grants WHERE grant_id = ?1"),
                params![id.as_bytes().as_slice()],
                row_to_grant,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn get_grant_by_code(&self, code: &str) -> Result<Option<Grant>> {
        let code = code.to_string();

        self.on_conn(move |conn| {
            conn.query_row(
                &format!("SELECT {GRANT_COLUMNS} FROM grants WHERE code = ?1 AND status != 2"),
                params![code],
                row_to_grant,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn list_grants_by_owner(
        &self,
        owner: &PrincipalId,
        include_deleted: bool,
    ) -> Result<Vec<Grant>> {
        let owner = owner.clone();

        self.on_conn(move |conn| {
            let sql = if include_deleted {
                format!(
                    "SELECT {GRANT_COLUMNS} FROM grants WHERE owner_id = ?1 \
                     ORDER BY created_at DESC"
                )
            } else {
                format!(
                    "SELECT {GRANT_COLUMNS} FROM grants WHERE owner_id = ?1 AND status != 2 \
                     ORDER BY created_at DESC"
                )
            };

            let mut stmt = conn.prepare(&sql)?;
            let grants = stmt
                .query_map(params![owner.as_str()], row_to_grant)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(grants)
        })
        .await
    }

    async fn set_grant_status(&self, id: &GrantId, status: GrantStatus) -> Result<bool> {
        let id = *id;

        self.on_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE grants SET status = ?2 WHERE grant_id = ?1",
                params![id.as_bytes().as_slice(), status.to_u8()],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    async fn insert_redemption(&self, redemption: &Redemption) -> Result<RedeemOutcome> {
        let redemption = redemption.clone();

        self.on_conn(move |conn| {
            let tx = conn.transaction()?;

            // Grant re-check, duplicate check, capacity check, and
            // insert inside one transaction. The grant row is read fresh
            // here so a deactivation or cascade delete that committed
            // after the caller validated wins over this insert. The
            // connection mutex already serializes writers; the partial
            // unique index on (grant_id, user_id) catches duplicate
            // active redemptions regardless.
            let grant_row: Option<(u8, Option<i64>, Option<u32>)> = tx
                .query_row(
                    "SELECT status, expires_at, max_redemptions FROM grants \
                     WHERE grant_id = ?1",
                    params![redemption.grant_id.as_bytes().as_slice()],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )
                .optional()?;

            let Some((status, expires_at, capacity)) = grant_row else {
                return Ok(RedeemOutcome::GrantMissing);
            };
            let status = GrantStatus::from_u8(status).ok_or_else(|| {
                StoreError::InvalidData(format!("unknown grant status: {status}"))
            })?;
            if status != GrantStatus::Active {
                return Ok(RedeemOutcome::GrantClosed { status });
            }
            if let Some(at) = expires_at {
                if redemption.redeemed_at > at {
                    return Ok(RedeemOutcome::GrantExpired { expired_at: at });
                }
            }

            let existing: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM redemptions \
                     WHERE grant_id = ?1 AND user_id = ?2 AND status = 0",
                    params![
                        redemption.grant_id.as_bytes().as_slice(),
                        redemption.user.as_str(),
                    ],
                    |row| row.get(0),
                )
                .optional()?;

            if existing.is_some() {
                return Ok(RedeemOutcome::AlreadyRedeemed);
            }

            if let Some(max) = capacity {
                let active: u32 = tx.query_row(
                    "SELECT COUNT(*) FROM redemptions WHERE grant_id = ?1 AND status = 0",
                    params![redemption.grant_id.as_bytes().as_slice()],
                    |row| row.get(0),
                )?;

                if active >= max {
                    return Ok(RedeemOutcome::CapacityExceeded { max });
                }
            }

            let inserted = tx.execute(
                "INSERT INTO redemptions (
                    redemption_id, grant_id, user_id, status, redeemed_at,
                    revoked_at, revoked_by
                ) VALUES (?1, ?2, ?3, ?4, ?5, NULL, NULL)",
                params![
                    redemption.id.as_bytes().as_slice(),
                    redemption.grant_id.as_bytes().as_slice(),
                    redemption.user.as_str(),
                    RedemptionStatus::Active.to_u8(),
                    redemption.redeemed_at,
                ],
            );

            match inserted {
                Ok(_) => {
                    tx.commit()?;
                    Ok(RedeemOutcome::Redeemed)
                }
                Err(e) if is_constraint_violation(&e) => Ok(RedeemOutcome::AlreadyRedeemed),
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    async fn get_redemption(&self, id: &RedemptionId) -> Result<Option<Redemption>> {
        let id = *id;

        self.on_conn(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {REDEMPTION_COLUMNS} FROM redemptions WHERE redemption_id = ?1"
                ),
                params![id.as_bytes().as_slice()],
                row_to_redemption,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn active_redemption(
        &self,
        grant_id: &GrantId,
        user: &PrincipalId,
    ) -> Result<Option<Redemption>> {
        let grant_id = *grant_id;
        let user = user.clone();

        self.on_conn(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {REDEMPTION_COLUMNS} FROM redemptions \
                     WHERE grant_id = ?1 AND user_id = ?2 AND status = 0"
                ),
                params![grant_id.as_bytes().as_slice(), user.as_str()],
                row_to_redemption,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn list_redemptions(&self, grant_id: &GrantId) -> Result<Vec<Redemption>> {
        let grant_id = *grant_id;

        self.on_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REDEMPTION_COLUMNS} FROM redemptions \
                 WHERE grant_id = ?1 ORDER BY redeemed_at"
            ))?;

            let redemptions = stmt
                .query_map(params![grant_id.as_bytes().as_slice()], row_to_redemption)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(redemptions)
        })
        .await
    }

    async fn list_active_redemptions_for_user(
        &self,
        user: &PrincipalId,
    ) -> Result<Vec<Redemption>> {
        let user = user.clone();

        self.on_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REDEMPTION_COLUMNS} FROM redemptions \
                 WHERE user_id = ?1 AND status = 0 ORDER BY redeemed_at"
            ))?;

            let redemptions = stmt
                .query_map(params![user.as_str()], row_to_redemption)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(redemptions)
        })
        .await
    }

    async fn count_active_redemptions(&self, grant_id: &GrantId) -> Result<u32> {
        let grant_id = *grant_id;

        self.on_conn(move |conn| {
            let count: u32 = conn.query_row(
                "SELECT COUNT(*) FROM redemptions WHERE grant_id = ?1 AND status = 0",
                params![grant_id.as_bytes().as_slice()],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
    }

    async fn revoke_redemption(
        &self,
        id: &RedemptionId,
        revoked_by: &PrincipalId,
        at: i64,
    ) -> Result<RevokeOutcome> {
        let id = *id;
        let revoked_by = revoked_by.clone();

        self.on_conn(move |conn| {
            let tx = conn.transaction()?;

            let status: Option<u8> = tx
                .query_row(
                    "SELECT status FROM redemptions WHERE redemption_id = ?1",
                    params![id.as_bytes().as_slice()],
                    |row| row.get(0),
                )
                .optional()?;

            let outcome = match status {
                None => RevokeOutcome::NotFound,
                Some(s) if s == RedemptionStatus::Revoked.to_u8() => {
                    RevokeOutcome::AlreadyRevoked
                }
                Some(_) => {
                    tx.execute(
                        "UPDATE redemptions
                         SET status = ?2, revoked_at = ?3, revoked_by = ?4
                         WHERE redemption_id = ?1 AND status = 0",
                        params![
                            id.as_bytes().as_slice(),
                            RedemptionStatus::Revoked.to_u8(),
                            at,
                            revoked_by.as_str(),
                        ],
                    )?;
                    RevokeOutcome::Revoked
                }
            };

            tx.commit()?;
            Ok(outcome)
        })
        .await
    }

    async fn revoke_all_active(
        &self,
        grant_id: &GrantId,
        revoked_by: &PrincipalId,
        at: i64,
    ) -> Result<u32> {
        let grant_id = *grant_id;
        let revoked_by = revoked_by.clone();

        self.on_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE redemptions
                 SET status = ?2, revoked_at = ?3, revoked_by = ?4
                 WHERE grant_id = ?1 AND status = 0",
                params![
                    grant_id.as_bytes().as_slice(),
                    RedemptionStatus::Revoked.to_u8(),
                    at,
                    revoked_by.as_str(),
                ],
            )?;
            Ok(changed as u32)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grantkit_core::{CodeGenerator, GrantSpec, DEFAULT_CODE_LENGTH};

    fn make_grant(code: &str, capacity: Option<u32>) -> Grant {
        let spec = GrantSpec::organizational("admin", "Acme Care");
        Grant {
            id: GrantId::generate(),
            kind: spec.kind,
            code: code.to_string(),
            owner: spec.owner,
            subject: None,
            org_name: spec.org_name,
            permissions: Default::default(),
            max_redemptions: capacity,
            status: GrantStatus::Active,
            created_at: 1_000,
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn insert_and_get_grant() {
        let store = SqliteStore::open_memory().unwrap();
        let grant = make_grant("AAAA2345", Some(2));

        let outcome = store.insert_grant(&grant).await.unwrap();
        assert_eq!(outcome, InsertGrantOutcome::Inserted);

        let by_id = store.get_grant(&grant.id).await.unwrap().unwrap();
        assert_eq!(by_id, grant);

        let by_code = store.get_grant_by_code("AAAA2345").await.unwrap().unwrap();
        assert_eq!(by_code.id, grant.id);
    }

    #[tokio::test]
    async fn duplicate_code_is_code_taken() {
        let store = SqliteStore::open_memory().unwrap();
        store
            .insert_grant(&make_grant("BBBB2345", None))
            .await
            .unwrap();

        let outcome = store
            .insert_grant(&make_grant("BBBB2345", None))
            .await
            .unwrap();
        assert_eq!(outcome, InsertGrantOutcome::CodeTaken);
    }

    #[tokio::test]
    async fn deleted_grant_frees_its_code() {
        let store = SqliteStore::open_memory().unwrap();
        let grant = make_grant("CCCC2345", None);
        store.insert_grant(&grant).await.unwrap();

        store
            .set_grant_status(&grant.id, GrantStatus::Deleted)
            .await
            .unwrap();
        assert!(store.get_grant_by_code("CCCC2345").await.unwrap().is_none());

        let outcome = store
            .insert_grant(&make_grant("CCCC2345", None))
            .await
            .unwrap();
        assert_eq!(outcome, InsertGrantOutcome::Inserted);
    }

    #[tokio::test]
    async fn redeem_enforces_capacity() {
        let store = SqliteStore::open_memory().unwrap();
        let grant = make_grant("DDDD2345", Some(2));
        store.insert_grant(&grant).await.unwrap();

        for user in ["x", "y"] {
            let r = Redemption::new(grant.id, PrincipalId::new(user), 2_000);
            assert_eq!(
                store.insert_redemption(&r).await.unwrap(),
                RedeemOutcome::Redeemed
            );
        }

        let r = Redemption::new(grant.id, PrincipalId::new("z"), 2_000);
        assert_eq!(
            store.insert_redemption(&r).await.unwrap(),
            RedeemOutcome::CapacityExceeded { max: 2 }
        );
        assert_eq!(store.count_active_redemptions(&grant.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn same_user_cannot_hold_two_seats() {
        let store = SqliteStore::open_memory().unwrap();
        let grant = make_grant("EEEE2345", None);
        store.insert_grant(&grant).await.unwrap();

        let first = Redemption::new(grant.id, PrincipalId::new("u"), 2_000);
        assert_eq!(
            store.insert_redemption(&first).await.unwrap(),
            RedeemOutcome::Redeemed
        );

        let second = Redemption::new(grant.id, PrincipalId::new("u"), 2_001);
        assert_eq!(
            store.insert_redemption(&second).await.unwrap(),
            RedeemOutcome::AlreadyRedeemed
        );
        assert_eq!(store.count_active_redemptions(&grant.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_reported_before_capacity_on_full_grant() {
        let store = SqliteStore::open_memory().unwrap();
        let grant = make_grant("HHHH2345", Some(1));
        store.insert_grant(&grant).await.unwrap();

        let first = Redemption::new(grant.id, PrincipalId::new("u"), 2_000);
        store.insert_redemption(&first).await.unwrap();

        // The grant is full, but the holder retrying sees AlreadyRedeemed,
        // not CapacityExceeded.
        let again = Redemption::new(grant.id, PrincipalId::new("u"), 2_001);
        assert_eq!(
            store.insert_redemption(&again).await.unwrap(),
            RedeemOutcome::AlreadyRedeemed
        );
    }

    #[tokio::test]
    async fn redeem_after_delete_is_rejected_in_the_store() {
        let store = SqliteStore::open_memory().unwrap();
        let grant = make_grant("JJJJ2345", None);
        store.insert_grant(&grant).await.unwrap();

        store
            .set_grant_status(&grant.id, GrantStatus::Deleted)
            .await
            .unwrap();

        // A redeemer working from a snapshot taken before the delete.
        let r = Redemption::new(grant.id, PrincipalId::new("late"), 2_000);
        assert_eq!(
            store.insert_redemption(&r).await.unwrap(),
            RedeemOutcome::GrantClosed {
                status: GrantStatus::Deleted
            }
        );
        assert_eq!(store.count_active_redemptions(&grant.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn redeem_after_expiry_is_rejected_in_the_store() {
        let store = SqliteStore::open_memory().unwrap();
        let mut grant = make_grant("KKKK2345", None);
        grant.expires_at = Some(1_500);
        store.insert_grant(&grant).await.unwrap();

        let r = Redemption::new(grant.id, PrincipalId::new("late"), 2_000);
        assert_eq!(
            store.insert_redemption(&r).await.unwrap(),
            RedeemOutcome::GrantExpired { expired_at: 1_500 }
        );
    }

    #[tokio::test]
    async fn redeem_of_missing_grant_is_grant_missing() {
        let store = SqliteStore::open_memory().unwrap();
        let r = Redemption::new(GrantId::generate(), PrincipalId::new("u"), 2_000);
        assert_eq!(
            store.insert_redemption(&r).await.unwrap(),
            RedeemOutcome::GrantMissing
        );
    }

    #[tokio::test]
    async fn revoke_frees_the_seat_and_preserves_the_row() {
        let store = SqliteStore::open_memory().unwrap();
        let grant = make_grant("FFFF2345", Some(1));
        store.insert_grant(&grant).await.unwrap();

        let r = Redemption::new(grant.id, PrincipalId::new("u"), 2_000);
        store.insert_redemption(&r).await.unwrap();

        let admin = PrincipalId::new("admin");
        assert_eq!(
            store.revoke_redemption(&r.id, &admin, 3_000).await.unwrap(),
            RevokeOutcome::Revoked
        );
        assert_eq!(
            store.revoke_redemption(&r.id, &admin, 3_001).await.unwrap(),
            RevokeOutcome::AlreadyRevoked
        );

        // Audit row survives with revocation metadata
        let row = store.get_redemption(&r.id).await.unwrap().unwrap();
        assert_eq!(row.status, RedemptionStatus::Revoked);
        assert_eq!(row.revoked_at, Some(3_000));
        assert_eq!(row.revoked_by, Some(admin));

        // Seat is free again
        let next = Redemption::new(grant.id, PrincipalId::new("v"), 4_000);
        assert_eq!(
            store.insert_redemption(&next).await.unwrap(),
            RedeemOutcome::Redeemed
        );
    }

    #[tokio::test]
    async fn revoke_all_active_cascades() {
        let store = SqliteStore::open_memory().unwrap();
        let grant = make_grant("GGGG2345", None);
        store.insert_grant(&grant).await.unwrap();

        for user in ["a", "b", "c"] {
            let r = Redemption::new(grant.id, PrincipalId::new(user), 2_000);
            store.insert_redemption(&r).await.unwrap();
        }

        let revoked = store
            .revoke_all_active(&grant.id, &PrincipalId::new("admin"), 3_000)
            .await
            .unwrap();
        assert_eq!(revoked, 3);
        assert_eq!(store.count_active_redemptions(&grant.id).await.unwrap(), 0);
        assert_eq!(store.list_redemptions(&grant.id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn revoke_missing_redemption_is_not_found() {
        let store = SqliteStore::open_memory().unwrap();
        let outcome = store
            .revoke_redemption(&RedemptionId::generate(), &PrincipalId::new("admin"), 1)
            .await
            .unwrap();
        assert_eq!(outcome, RevokeOutcome::NotFound);
    }

    #[tokio::test]
    async fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grants.db");

        let grant = make_grant(&CodeGenerator::new().generate(DEFAULT_CODE_LENGTH), Some(1));
        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert_grant(&grant).await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let loaded = store.get_grant(&grant.id).await.unwrap().unwrap();
        assert_eq!(loaded, grant);
    }
}
