//! In-memory implementation of the store traits.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use modera_core::{
    CategoryId, ContentId, ContentItem, LifecycleStatus, PostPermissionLevel, Timestamp, UserId,
    UserStanding,
};

use crate::error::{Result, StoreError};
use crate::traits::{ContentStore, StandingStore};

/// In-memory store implementing both [`ContentStore`] and [`StandingStore`].
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    content: HashMap<ContentId, ContentItem>,
    standings: HashMap<UserId, UserStanding>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Version check shared by both aggregates: a new record must carry
/// version 0, an update must match the stored version exactly.
fn check_version(
    entity: &'static str,
    id: String,
    incoming: u64,
    stored: Option<u64>,
) -> Result<u64> {
    match stored {
        None if incoming == 0 => Ok(1),
        None => Err(StoreError::Conflict {
            entity,
            id,
            expected: incoming,
            found: 0,
        }),
        Some(found) if found == incoming => Ok(incoming + 1),
        Some(found) => Err(StoreError::Conflict {
            entity,
            id,
            expected: incoming,
            found,
        }),
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn load_content(&self, id: ContentId) -> Result<Option<ContentItem>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.content.get(&id).cloned())
    }

    async fn save_content(&self, item: &ContentItem) -> Result<u64> {
        let mut inner = self.inner.write().unwrap();
        let stored = inner.content.get(&item.id).map(|c| c.version);
        let next = check_version("content", item.id.to_string(), item.version, stored)?;

        let mut saved = item.clone();
        saved.version = next;
        inner.content.insert(item.id, saved);
        Ok(next)
    }

    async fn list_by_status(&self, status: LifecycleStatus) -> Result<Vec<ContentId>> {
        let inner = self.inner.read().unwrap();
        let mut ids: Vec<ContentId> = inner
            .content
            .values()
            .filter(|c| !c.soft_deleted && c.status == status)
            .map(|c| c.id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn list_by_author(&self, author: UserId) -> Result<Vec<ContentId>> {
        let inner = self.inner.read().unwrap();
        let mut ids: Vec<ContentId> = inner
            .content
            .values()
            .filter(|c| !c.soft_deleted && c.author == author)
            .map(|c| c.id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn list_by_category(&self, category: CategoryId) -> Result<Vec<ContentId>> {
        let inner = self.inner.read().unwrap();
        let mut ids: Vec<ContentId> = inner
            .content
            .values()
            .filter(|c| !c.soft_deleted && c.category == category)
            .map(|c| c.id)
            .collect();
        ids.sort();
        Ok(ids)
    }
}

#[async_trait]
impl StandingStore for MemoryStore {
    async fn load_standing(&self, user: UserId) -> Result<Option<UserStanding>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.standings.get(&user).cloned())
    }

    async fn save_standing(&self, standing: &UserStanding) -> Result<u64> {
        let mut inner = self.inner.write().unwrap();
        let stored = inner.standings.get(&standing.user_id).map(|s| s.version);
        let next = check_version(
            "standing",
            standing.user_id.to_string(),
            standing.version,
            stored,
        )?;

        let mut saved = standing.clone();
        saved.version = next;
        inner.standings.insert(standing.user_id, saved);
        Ok(next)
    }

    async fn list_banned(&self) -> Result<Vec<UserId>> {
        let inner = self.inner.read().unwrap();
        let mut ids: Vec<UserId> = inner
            .standings
            .values()
            .filter(|s| s.ban_active)
            .map(|s| s.user_id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn list_with_permission(&self) -> Result<Vec<UserId>> {
        let inner = self.inner.read().unwrap();
        let mut ids: Vec<UserId> = inner
            .standings
            .values()
            .filter(|s| s.permission_level != PostPermissionLevel::None)
            .map(|s| s.user_id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn list_stale(&self, now: Timestamp) -> Result<Vec<UserId>> {
        let inner = self.inner.read().unwrap();
        let mut ids: Vec<UserId> = inner
            .standings
            .values()
            .filter(|s| s.is_stale(now))
            .map(|s| s.user_id)
            .collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modera_core::{AccessLevel, Actor};

    const NOW: Timestamp = 1_700_000_000_000;

    fn item(id: u64) -> ContentItem {
        ContentItem::new(
            ContentId::new(id),
            UserId::new(10),
            CategoryId::new(1),
            AccessLevel::Free,
            NOW,
        )
    }

    #[tokio::test]
    async fn test_save_and_load_content() {
        let store = MemoryStore::new();
        let saved = store.save_content(&item(1)).await.unwrap();
        assert_eq!(saved, 1);

        let loaded = store.load_content(ContentId::new(1)).await.unwrap().unwrap();
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.status, LifecycleStatus::Draft);
    }

    #[tokio::test]
    async fn test_stale_save_conflicts() {
        let store = MemoryStore::new();
        let fresh = item(1);
        store.save_content(&fresh).await.unwrap();

        // A second writer saving from the stale version-0 copy loses.
        let err = store.save_content(&fresh).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { found: 1, .. }));
    }

    #[tokio::test]
    async fn test_list_excludes_soft_deleted() {
        let store = MemoryStore::new();
        store.save_content(&item(1)).await.unwrap();

        let mut deleted = item(2);
        deleted
            .soft_delete("dup", Actor::admin(UserId::new(30)), NOW)
            .unwrap();
        store.save_content(&deleted).await.unwrap();

        let drafts = store.list_by_status(LifecycleStatus::Draft).await.unwrap();
        assert_eq!(drafts, vec![ContentId::new(1)]);

        // But load still returns the soft-deleted row for restore.
        assert!(store.load_content(ContentId::new(2)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_standing_round_trip_and_stale_listing() {
        let store = MemoryStore::new();
        let mut s = UserStanding::default_for(UserId::new(5), NOW);
        s.apply_ban("spam", Some(NOW + 1000), UserId::new(9), NOW).unwrap();
        store.save_standing(&s).await.unwrap();

        assert_eq!(store.list_banned().await.unwrap(), vec![UserId::new(5)]);
        assert!(store.list_stale(NOW).await.unwrap().is_empty());
        assert_eq!(
            store.list_stale(NOW + 2000).await.unwrap(),
            vec![UserId::new(5)]
        );
    }

    #[tokio::test]
    async fn test_load_standing_absent() {
        let store = MemoryStore::new();
        assert!(store.load_standing(UserId::new(404)).await.unwrap().is_none());
    }
}
