//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL string
//! that transforms the schema from version N to N+1.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
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
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
        }

        tx.commit()?;
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
///
/// Indexed scalar columns drive the listing queries and the optimistic
/// version check; the full aggregate lives in the `doc` JSON column.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Content items and their lifecycle/audit state
        CREATE TABLE content_items (
            content_id INTEGER PRIMARY KEY,
            author INTEGER NOT NULL,
            category INTEGER NOT NULL,
            status TEXT NOT NULL,             -- LifecycleStatus code
            audit_status TEXT NOT NULL,       -- AuditStatus code
            soft_deleted INTEGER NOT NULL DEFAULT 0,
            version INTEGER NOT NULL,         -- optimistic-concurrency version
            doc TEXT NOT NULL,                -- full aggregate as JSON
            updated_at INTEGER NOT NULL
        );

        -- User standing records (one per user, never deleted)
        CREATE TABLE user_standings (
            user_id INTEGER PRIMARY KEY,
            permission_level TEXT NOT NULL,   -- PostPermissionLevel code
            permission_expires_at INTEGER,    -- NULL = no expiry
            ban_active INTEGER NOT NULL DEFAULT 0,
            ban_ends_at INTEGER,              -- NULL = indefinite
            version INTEGER NOT NULL,
            doc TEXT NOT NULL,                -- full aggregate as JSON, history included
            updated_at INTEGER NOT NULL
        );

        -- Indexes for common queries
        CREATE INDEX idx_content_status ON content_items(status, soft_deleted);
        CREATE INDEX idx_content_author ON content_items(author, soft_deleted);
        CREATE INDEX idx_content_category ON content_items(category, soft_deleted);
        CREATE INDEX idx_standing_ban ON user_standings(ban_active);
        CREATE INDEX idx_standing_level ON user_standings(permission_level);
        "#,
    )?;

    Ok(())
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_creates_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"content_items".to_string()));
        assert!(tables.contains(&"user_standings".to_string()));
        assert!(tables.contains(&"schema_migrations".to_string()));
    }

    #[test]
    fn test_unknown_version_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        let err = apply_migration(&conn, CURRENT_VERSION + 1).unwrap_err();
        assert!(matches!(err, StoreError::Migration(_)));
    }

    #[test]
    fn test_migration_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();

        let version: u32 = conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, 1);
    }
}
