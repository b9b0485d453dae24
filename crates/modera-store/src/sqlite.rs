//! SQLite implementation of the store traits.
//!
//! This is the primary storage backend for the moderation kernel. It uses
//! rusqlite with bundled SQLite, wrapped in async via tokio::spawn_blocking.
//! Aggregates are stored as JSON documents alongside the scalar columns the
//! listing queries and version checks need.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use modera_core::{
    CategoryId, ContentId, ContentItem, LifecycleStatus, PostPermissionLevel, Timestamp, UserId,
    UserStanding,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{ContentStore, StandingStore};

/// SQLite-based store implementing both [`ContentStore`] and
/// [`StandingStore`].
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
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

    /// Run a blocking operation against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| StoreError::Serialization(format!("mutex poisoned: {}", e)))?;
            f(&conn)
        })
        .await
        .map_err(|e| {
            StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("spawn_blocking failed: {}", e),
            ))
        })?
    }
}

fn status_code(status: LifecycleStatus) -> &'static str {
    match status {
        LifecycleStatus::Draft => "draft",
        LifecycleStatus::Pending => "pending",
        LifecycleStatus::Published => "published",
        LifecycleStatus::Rejected => "rejected",
        LifecycleStatus::Archived => "archived",
        LifecycleStatus::Banned => "banned",
    }
}

fn audit_code(status: modera_core::AuditStatus) -> &'static str {
    match status {
        modera_core::AuditStatus::Pending => "pending",
        modera_core::AuditStatus::Approved => "approved",
        modera_core::AuditStatus::Rejected => "rejected",
    }
}

fn level_code(level: PostPermissionLevel) -> &'static str {
    match level {
        PostPermissionLevel::None => "none",
        PostPermissionLevel::Limited => "limited",
        PostPermissionLevel::Full => "full",
    }
}

/// Resolve the version check for an update that matched no row: either the
/// record is absent (found 0) or a concurrent writer bumped it.
fn conflict_for(
    conn: &Connection,
    table: &str,
    key_col: &str,
    entity: &'static str,
    id_display: String,
    key: i64,
    expected: u64,
) -> StoreError {
    let found: Option<u64> = conn
        .query_row(
            &format!("SELECT version FROM {} WHERE {} = ?1", table, key_col),
            params![key],
            |row| row.get(0),
        )
        .optional()
        .unwrap_or(None);

    StoreError::Conflict {
        entity,
        id: id_display,
        expected,
        found: found.unwrap_or(0),
    }
}

#[async_trait]
impl ContentStore for SqliteStore {
    async fn load_content(&self, id: ContentId) -> Result<Option<ContentItem>> {
        self.with_conn(move |conn| {
            let doc: Option<String> = conn
                .query_row(
                    "SELECT doc FROM content_items WHERE content_id = ?1",
                    params![id.get() as i64],
                    |row| row.get(0),
                )
                .optional()?;

            doc.map(|d| serde_json::from_str(&d).map_err(StoreError::from))
                .transpose()
        })
        .await
    }

    async fn save_content(&self, item: &ContentItem) -> Result<u64> {
        let item = item.clone();
        self.with_conn(move |conn| {
            let next = item.version + 1;
            let mut saved = item.clone();
            saved.version = next;
            let doc = serde_json::to_string(&saved)?;

            if item.version == 0 {
                let inserted = conn.execute(
                    "INSERT OR IGNORE INTO content_items (
                        content_id, author, category, status, audit_status,
                        soft_deleted, version, doc, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    params![
                        item.id.get() as i64,
                        item.author.get() as i64,
                        item.category.get() as i64,
                        status_code(item.status),
                        audit_code(item.audit_status),
                        item.soft_deleted as i64,
                        next,
                        doc,
                        item.updated_at,
                    ],
                )?;
                if inserted == 0 {
                    return Err(conflict_for(
                        conn,
                        "content_items",
                        "content_id",
                        "content",
                        item.id.to_string(),
                        item.id.get() as i64,
                        item.version,
                    ));
                }
            } else {
                let updated = conn.execute(
                    "UPDATE content_items
                     SET author = ?2, category = ?3, status = ?4, audit_status = ?5,
                         soft_deleted = ?6, version = ?7, doc = ?8, updated_at = ?9
                     WHERE content_id = ?1 AND version = ?10",
                    params![
                        item.id.get() as i64,
                        item.author.get() as i64,
                        item.category.get() as i64,
                        status_code(item.status),
                        audit_code(item.audit_status),
                        item.soft_deleted as i64,
                        next,
                        doc,
                        item.updated_at,
                        item.version,
                    ],
                )?;
                if updated == 0 {
                    return Err(conflict_for(
                        conn,
                        "content_items",
                        "content_id",
                        "content",
                        item.id.to_string(),
                        item.id.get() as i64,
                        item.version,
                    ));
                }
            }

            Ok(next)
        })
        .await
    }

    async fn list_by_status(&self, status: LifecycleStatus) -> Result<Vec<ContentId>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT content_id FROM content_items
                 WHERE status = ?1 AND soft_deleted = 0 ORDER BY content_id",
            )?;
            let ids = stmt
                .query_map(params![status_code(status)], |row| {
                    row.get::<_, i64>(0).map(|v| ContentId::new(v as u64))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(ids)
        })
        .await
    }

    async fn list_by_author(&self, author: UserId) -> Result<Vec<ContentId>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT content_id FROM content_items
                 WHERE author = ?1 AND soft_deleted = 0 ORDER BY content_id",
            )?;
            let ids = stmt
                .query_map(params![author.get() as i64], |row| {
                    row.get::<_, i64>(0).map(|v| ContentId::new(v as u64))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(ids)
        })
        .await
    }

    async fn list_by_category(&self, category: CategoryId) -> Result<Vec<ContentId>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT content_id FROM content_items
                 WHERE category = ?1 AND soft_deleted = 0 ORDER BY content_id",
            )?;
            let ids = stmt
                .query_map(params![category.get() as i64], |row| {
                    row.get::<_, i64>(0).map(|v| ContentId::new(v as u64))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(ids)
        })
        .await
    }
}

#[async_trait]
impl StandingStore for SqliteStore {
    async fn load_standing(&self, user: UserId) -> Result<Option<UserStanding>> {
        self.with_conn(move |conn| {
            let doc: Option<String> = conn
                .query_row(
                    "SELECT doc FROM user_standings WHERE user_id = ?1",
                    params![user.get() as i64],
                    |row| row.get(0),
                )
                .optional()?;

            doc.map(|d| serde_json::from_str(&d).map_err(StoreError::from))
                .transpose()
        })
        .await
    }

    async fn save_standing(&self, standing: &UserStanding) -> Result<u64> {
        let standing = standing.clone();
        self.with_conn(move |conn| {
            let next = standing.version + 1;
            let mut saved = standing.clone();
            saved.version = next;
            let doc = serde_json::to_string(&saved)?;

            if standing.version == 0 {
                let inserted = conn.execute(
                    "INSERT OR IGNORE INTO user_standings (
                        user_id, permission_level, permission_expires_at,
                        ban_active, ban_ends_at, version, doc, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        standing.user_id.get() as i64,
                        level_code(standing.permission_level),
                        standing.permission_expires_at,
                        standing.ban_active as i64,
                        standing.ban_ends_at,
                        next,
                        doc,
                        standing.updated_at,
                    ],
                )?;
                if inserted == 0 {
                    return Err(conflict_for(
                        conn,
                        "user_standings",
                        "user_id",
                        "standing",
                        standing.user_id.to_string(),
                        standing.user_id.get() as i64,
                        standing.version,
                    ));
                }
            } else {
                let updated = conn.execute(
                    "UPDATE user_standings
                     SET permission_level = ?2, permission_expires_at = ?3,
                         ban_active = ?4, ban_ends_at = ?5, version = ?6,
                         doc = ?7, updated_at = ?8
                     WHERE user_id = ?1 AND version = ?9",
                    params![
                        standing.user_id.get() as i64,
                        level_code(standing.permission_level),
                        standing.permission_expires_at,
                        standing.ban_active as i64,
                        standing.ban_ends_at,
                        next,
                        doc,
                        standing.updated_at,
                        standing.version,
                    ],
                )?;
                if updated == 0 {
                    return Err(conflict_for(
                        conn,
                        "user_standings",
                        "user_id",
                        "standing",
                        standing.user_id.to_string(),
                        standing.user_id.get() as i64,
                        standing.version,
                    ));
                }
            }

            Ok(next)
        })
        .await
    }

    async fn list_banned(&self) -> Result<Vec<UserId>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id FROM user_standings WHERE ban_active = 1 ORDER BY user_id",
            )?;
            let ids = stmt
                .query_map([], |row| row.get::<_, i64>(0).map(|v| UserId::new(v as u64)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(ids)
        })
        .await
    }

    async fn list_with_permission(&self) -> Result<Vec<UserId>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id FROM user_standings
                 WHERE permission_level != 'none' ORDER BY user_id",
            )?;
            let ids = stmt
                .query_map([], |row| row.get::<_, i64>(0).map(|v| UserId::new(v as u64)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(ids)
        })
        .await
    }

    async fn list_stale(&self, now: Timestamp) -> Result<Vec<UserId>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id FROM user_standings
                 WHERE (permission_level != 'none'
                        AND permission_expires_at IS NOT NULL
                        AND permission_expires_at < ?1)
                    OR (ban_active = 1
                        AND ban_ends_at IS NOT NULL
                        AND ban_ends_at < ?1)
                 ORDER BY user_id",
            )?;
            let ids = stmt
                .query_map(params![now], |row| {
                    row.get::<_, i64>(0).map(|v| UserId::new(v as u64))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(ids)
        })
        .await
    }
}
