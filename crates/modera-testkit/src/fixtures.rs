//! Test fixtures and helpers.
//!
//! Common setup code for unit and integration tests: a shared in-memory
//! store, a manual clock, canned actors, and builders that walk content
//! through the lifecycle to a wanted state.

use std::sync::Arc;

use modera_core::{
    AccessLevel, Actor, AuditVerdict, CategoryId, Clock, ContentId, ContentItem,
    PostPermissionLevel, Timestamp, UserId, UserStanding,
};
use modera_store::MemoryStore;

use crate::clock::ManualClock;

/// The frozen starting time used by fixtures.
pub const EPOCH: Timestamp = 1_700_000_000_000;

/// One hour in milliseconds.
pub const HOUR: Timestamp = 3_600_000;

/// A test fixture with a shared memory store, manual clock, and one actor
/// per role.
pub struct TestFixture {
    pub store: Arc<MemoryStore>,
    pub clock: ManualClock,
    pub admin: Actor,
    pub auditor: Actor,
    pub author: Actor,
    pub reader: Actor,
}

impl TestFixture {
    /// Create a fresh fixture with the clock frozen at [`EPOCH`].
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            clock: ManualClock::new(EPOCH),
            admin: Actor::admin(UserId::new(1)),
            auditor: Actor::auditor(UserId::new(2)),
            author: Actor::user(UserId::new(10)),
            reader: Actor::user(UserId::new(20)),
        }
    }

    /// A fresh draft authored by the fixture's author.
    pub fn make_draft(&self, id: u64) -> ContentItem {
        ContentItem::new(
            ContentId::new(id),
            self.author.id,
            CategoryId::new(1),
            AccessLevel::Free,
            self.clock.now(),
        )
    }

    /// A draft walked through submit, approval, and publish.
    ///
    /// Panics on a guard failure, which would mean the fixture itself is
    /// wrong.
    pub fn make_published(&self, id: u64) -> ContentItem {
        let now = self.clock.now();
        let mut item = self.make_draft(id);
        item.submit_for_audit(self.author, now)
            .expect("fixture draft must be submittable");
        item.audit(AuditVerdict::Approved, None, self.auditor, now)
            .expect("fixture submission must be auditable");
        item.publish(self.author, now)
            .expect("fixture approved item must be publishable");
        item
    }

    /// A standing record holding the given permission level, granted by
    /// the fixture's admin with no expiry.
    pub fn make_standing(&self, user: UserId, level: PostPermissionLevel) -> UserStanding {
        let now = self.clock.now();
        let mut standing = UserStanding::default_for(user, now);
        if level != PostPermissionLevel::None {
            standing.grant(level, None, self.admin.id, now);
        }
        standing
    }

    /// A standing record carrying an indefinite ban.
    pub fn make_banned_standing(&self, user: UserId, reason: &str) -> UserStanding {
        let now = self.clock.now();
        let mut standing = UserStanding::default_for(user, now);
        standing
            .apply_ban(reason, None, self.admin.id, now)
            .expect("fixture ban reason must be valid");
        standing
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
