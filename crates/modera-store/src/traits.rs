//! Store traits: the abstract interfaces for moderation-state persistence.
//!
//! These traits keep the lifecycle machines storage-agnostic.
//! Implementations include SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use modera_core::{
    CategoryId, ContentId, ContentItem, LifecycleStatus, Timestamp, UserId, UserStanding,
};

use crate::error::Result;

/// Durable record of content items and their lifecycle/audit state.
///
/// # Design Notes
///
/// - **Optimistic concurrency**: each aggregate carries a `version`. A save
///   whose version does not match the stored row fails with
///   `StoreError::Conflict` and writes nothing; the caller re-reads and
///   retries. This gives at-most-one-writer-at-a-time per record.
/// - **Soft deletion**: `load` returns soft-deleted items (restore needs
///   them); the `list_*` methods exclude them from all read paths.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Load an item by id, including soft-deleted ones.
    async fn load_content(&self, id: ContentId) -> Result<Option<ContentItem>>;

    /// Persist an item, enforcing the version check. A new item must carry
    /// version 0. Returns the stored version.
    async fn save_content(&self, item: &ContentItem) -> Result<u64>;

    /// List non-deleted items with the given lifecycle status.
    async fn list_by_status(&self, status: LifecycleStatus) -> Result<Vec<ContentId>>;

    /// List non-deleted items by author.
    async fn list_by_author(&self, author: UserId) -> Result<Vec<ContentId>>;

    /// List non-deleted items by category.
    async fn list_by_category(&self, category: CategoryId) -> Result<Vec<ContentId>>;
}

/// Durable record of user standing: permission level, ban state, counters,
/// and the append-only history log.
///
/// Standing rows are created lazily; `load_standing` returns None for a
/// user with no record yet and callers substitute the default. Rows are
/// never deleted. The same version-check contract as [`ContentStore`]
/// applies to `save_standing`.
#[async_trait]
pub trait StandingStore: Send + Sync {
    /// Load a standing record, or None if the user has none yet.
    async fn load_standing(&self, user: UserId) -> Result<Option<UserStanding>>;

    /// Persist a standing record, enforcing the version check. A new record
    /// must carry version 0. Returns the stored version.
    async fn save_standing(&self, standing: &UserStanding) -> Result<u64>;

    /// Users whose stored record has `ban_active` set. Stored state, not
    /// lazily resolved; callers filter with `is_banned(now)`.
    async fn list_banned(&self) -> Result<Vec<UserId>>;

    /// Users whose stored permission level is not None.
    async fn list_with_permission(&self) -> Result<Vec<UserId>>;

    /// Users whose stored record holds an expired permission or ban as of
    /// `now`. Drives the cleanup sweep.
    async fn list_stale(&self, now: Timestamp) -> Result<Vec<UserId>>;
}

/// Extension methods shared by all standing stores.
#[async_trait]
pub trait StandingStoreExt: StandingStore {
    /// Load a standing record, substituting the lazily-created default for
    /// an absent user. The default is not persisted until first written.
    async fn load_or_default(&self, user: UserId, now: Timestamp) -> Result<UserStanding> {
        Ok(self
            .load_standing(user)
            .await?
            .unwrap_or_else(|| UserStanding::default_for(user, now)))
    }
}

impl<S: StandingStore + ?Sized> StandingStoreExt for S {}
