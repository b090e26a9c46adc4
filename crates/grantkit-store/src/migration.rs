//! SQLite schema setup.
//!
//! Migrations are numbered and run in order inside a single transaction,
//! with applied versions recorded in a bookkeeping table so every open
//! of the database converges on the same schema.

use rusqlite::Connection;
use tracing::info;

use crate::error::{Result, StoreError};

/// Schema version this build writes.
pub const CURRENT_VERSION: u32 = 1;

/// Bring the schema up to [`CURRENT_VERSION`].
///
/// Versions already recorded in the bookkeeping table are skipped, so
/// running this on every open is harmless.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            info!(version, "applying schema migration");
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, grantkit_core::now_millis()],
            )?;
        }

        tx.commit()?;
    }

    Ok(())
}

/// Run one numbered migration.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// v1: grants, redemptions, and the constraint indexes behind code
/// uniqueness and single-active-redemption-per-user.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Grants: one row per issued access code
        CREATE TABLE grants (
            grant_id BLOB PRIMARY KEY,        -- 16 bytes
            kind INTEGER NOT NULL,            -- 0=personal, 1=organizational
            code TEXT NOT NULL,               -- human-enterable, uppercase
            owner_id TEXT NOT NULL,           -- issuing principal
            subject_id TEXT,                  -- supported user (personal only)
            org_name TEXT,                    -- sponsor label (organizational only)
            permissions TEXT NOT NULL DEFAULT '[]',  -- JSON array of capability tokens
            max_redemptions INTEGER,          -- NULL = unlimited
            status INTEGER NOT NULL DEFAULT 0,  -- 0=active, 1=deactivated, 2=deleted
            created_at INTEGER NOT NULL,      -- Unix ms
            expires_at INTEGER                -- Unix ms, NULL = never expires
        );

        -- Redemptions: one row per seat consumption, never deleted
        CREATE TABLE redemptions (
            redemption_id BLOB PRIMARY KEY,   -- 16 bytes
            grant_id BLOB NOT NULL REFERENCES grants(grant_id),
            user_id TEXT NOT NULL,            -- the redeemer
            status INTEGER NOT NULL DEFAULT 0,  -- 0=active, 1=revoked
            redeemed_at INTEGER NOT NULL,     -- Unix ms
            revoked_at INTEGER,               -- Unix ms, set on revocation
            revoked_by TEXT                   -- principal that revoked
        );

        -- Code uniqueness scoped to non-deleted grants: deleting a grant
        -- frees its code for reuse
        CREATE UNIQUE INDEX idx_grants_code_live ON grants(code) WHERE status != 2;

        -- At most one active redemption per (grant, user): this is what
        -- makes concurrent same-user redemption race-free
        CREATE UNIQUE INDEX idx_redemptions_active
            ON redemptions(grant_id, user_id) WHERE status = 0;

        -- Indexes for common queries
        CREATE INDEX idx_grants_owner ON grants(owner_id);
        CREATE INDEX idx_redemptions_grant ON redemptions(grant_id, status);
        CREATE INDEX idx_redemptions_user ON redemptions(user_id, status);
        "#,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_creates_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"grants".to_string()));
        assert!(tables.contains(&"redemptions".to_string()));
        assert!(tables.contains(&"schema_migrations".to_string()));
    }

    #[test]
    fn migration_creates_partial_unique_indexes() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        let indexes: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='index' AND name LIKE 'idx_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert!(indexes.contains(&"idx_grants_code_live".to_string()));
        assert!(indexes.contains(&"idx_redemptions_active".to_string()));
    }

    #[test]
    fn repeated_migration_is_a_no_op() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        // Later opens see the recorded version and skip straight through.
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();

        let version: u32 = conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }
}
