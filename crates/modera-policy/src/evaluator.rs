//! The policy evaluator.
//!
//! [`evaluate_rules`] is the pure decision function over already-loaded
//! state; [`PolicyEvaluator`] is the store-backed wrapper that re-reads
//! current standing and target content on every call. No decision is ever
//! cached: standing and content mutate between calls, and the mutating
//! operations carry their own guards, so a stale Allow can never be
//! silently applied.

use std::sync::Arc;

use modera_core::{Actor, Clock, ContentId, ContentItem, MembershipTier, Timestamp, UserStanding};
use modera_store::{ContentStore, StandingStore, StandingStoreExt};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::action::Action;
use crate::decision::{Decision, DenyReason};
use crate::error::{PolicyError, Result};

/// The explicit requester context: who is asking, in what role, at what
/// membership tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub actor: Actor,
    pub tier: MembershipTier,
}

impl Requester {
    pub const fn new(actor: Actor, tier: MembershipTier) -> Self {
        Self { actor, tier }
    }
}

/// Decide one action against a snapshot of standing and (optional) target
/// content. Pure: no I/O, no mutation, deterministic for a given `now`.
///
/// Rules fire in order; the first match wins:
///
/// 1. a banned requester is denied any content write (reads unaffected)
/// 2. writes to someone else's item are denied unless the requester is
///    admin; creation-type actions are exempt
/// 3. creation-type actions require the matching permission level
/// 4. reads require the requester's tier to satisfy the item's access level
/// 5. audit/admin actions require the matching role
/// 6. otherwise, allow
///
/// Target-requiring rules are skipped when `target` is None; the
/// store-backed [`PolicyEvaluator`] rejects such calls up front with
/// [`PolicyError::TargetRequired`].
pub fn evaluate_rules(
    action: Action,
    requester: Requester,
    standing: &UserStanding,
    target: Option<&ContentItem>,
    now: Timestamp,
) -> Decision {
    if action.is_content_write() && standing.is_banned(now) {
        return Decision::Deny(DenyReason::UserBanned);
    }

    if action.is_content_write() && !action.is_creation() {
        if let Some(item) = target {
            if item.author != requester.actor.id && !requester.actor.role.is_admin() {
                return Decision::Deny(DenyReason::NotOwner);
            }
        }
    }

    if let Some(required) = action.required_level() {
        if standing.effective_permission_level(now) < required {
            return Decision::Deny(DenyReason::InsufficientPermission);
        }
    }

    if action == Action::ReadContent {
        if let Some(item) = target {
            if !requester.tier.satisfies(item.required_access) {
                return Decision::Deny(DenyReason::AccessLevelTooLow);
            }
        }
    }

    let role_ok = match action {
        Action::Audit => requester.actor.role.can_audit(),
        Action::Admin => requester.actor.role.is_admin(),
        _ => true,
    };
    if !role_ok {
        return Decision::Deny(DenyReason::RoleRequired);
    }

    Decision::Allow
}

/// Store-backed evaluator: loads current state, then applies
/// [`evaluate_rules`].
pub struct PolicyEvaluator<S, C> {
    store: Arc<S>,
    clock: C,
}

impl<S, C> PolicyEvaluator<S, C>
where
    S: ContentStore + StandingStore,
    C: Clock,
{
    pub fn new(store: Arc<S>, clock: C) -> Self {
        Self { store, clock }
    }

    /// Evaluate one action request. `target` must be given for actions
    /// that operate on an existing item; a soft-deleted target reads as
    /// not found, since deleted items are excluded from every read path.
    pub async fn evaluate(
        &self,
        action: Action,
        requester: Requester,
        target: Option<ContentId>,
    ) -> Result<Decision> {
        if action.needs_target() && target.is_none() {
            return Err(PolicyError::TargetRequired { action });
        }

        let now = self.clock.now();
        let standing = self.store.load_or_default(requester.actor.id, now).await?;

        let item = match target {
            Some(id) => {
                let item = self
                    .store
                    .load_content(id)
                    .await?
                    .filter(|item| !item.soft_deleted)
                    .ok_or(PolicyError::ContentNotFound(id))?;
                Some(item)
            }
            None => None,
        };

        let decision = evaluate_rules(action, requester, &standing, item.as_ref(), now);
        debug!(%action, requester = %requester.actor.id, %decision, "policy evaluated");
        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modera_core::{AccessLevel, CategoryId, PostPermissionLevel, UserId};
    use modera_store::MemoryStore;
    use modera_testkit::ManualClock;

    const NOW: Timestamp = 1_700_000_000_000;
    const HOUR: Timestamp = 3_600_000;

    const ALICE: UserId = UserId::new(10);
    const BOB: UserId = UserId::new(11);

    fn free_user(id: UserId) -> Requester {
        Requester::new(Actor::user(id), MembershipTier::Free)
    }

    fn standing_with(level: PostPermissionLevel) -> UserStanding {
        let mut s = UserStanding::default_for(ALICE, NOW);
        if level != PostPermissionLevel::None {
            s.grant(level, None, UserId::new(1), NOW);
        }
        s
    }

    fn article_by(author: UserId, access: AccessLevel) -> ContentItem {
        ContentItem::new(ContentId::new(1), author, CategoryId::new(1), access, NOW)
    }

    #[test]
    fn test_create_article_requires_full_level() {
        let req = free_user(ALICE);

        let none = standing_with(PostPermissionLevel::None);
        assert_eq!(
            evaluate_rules(Action::CreateArticle, req, &none, None, NOW),
            Decision::Deny(DenyReason::InsufficientPermission)
        );

        let limited = standing_with(PostPermissionLevel::Limited);
        assert_eq!(
            evaluate_rules(Action::CreateArticle, req, &limited, None, NOW),
            Decision::Deny(DenyReason::InsufficientPermission)
        );

        let full = standing_with(PostPermissionLevel::Full);
        assert_eq!(
            evaluate_rules(Action::CreateArticle, req, &full, None, NOW),
            Decision::Allow
        );
    }

    #[test]
    fn test_limited_level_permits_comments_and_ratings() {
        let req = free_user(ALICE);
        let limited = standing_with(PostPermissionLevel::Limited);
        let others_article = article_by(BOB, AccessLevel::Free);

        assert_eq!(
            evaluate_rules(Action::CreateComment, req, &limited, None, NOW),
            Decision::Allow
        );
        assert_eq!(
            evaluate_rules(Action::RateContent, req, &limited, Some(&others_article), NOW),
            Decision::Allow
        );
    }

    #[test]
    fn test_ban_blocks_writes_before_everything_else() {
        let req = free_user(ALICE);
        let mut s = standing_with(PostPermissionLevel::Full);
        s.apply_ban("spam", None, UserId::new(1), NOW).unwrap();

        // Denied even with Full permission, and even on someone else's
        // article where NotOwner would otherwise fire first.
        assert_eq!(
            evaluate_rules(Action::CreateComment, req, &s, None, NOW),
            Decision::Deny(DenyReason::UserBanned)
        );
        let others = article_by(BOB, AccessLevel::Free);
        assert_eq!(
            evaluate_rules(Action::EditArticle, req, &s, Some(&others), NOW),
            Decision::Deny(DenyReason::UserBanned)
        );
    }

    #[test]
    fn test_ban_does_not_block_reads() {
        let req = free_user(ALICE);
        let mut s = standing_with(PostPermissionLevel::None);
        s.apply_ban("spam", None, UserId::new(1), NOW).unwrap();
        let article = article_by(BOB, AccessLevel::Free);

        assert_eq!(
            evaluate_rules(Action::ReadContent, req, &s, Some(&article), NOW),
            Decision::Allow
        );
    }

    #[test]
    fn test_expired_ban_no_longer_blocks() {
        let req = free_user(ALICE);
        let mut s = standing_with(PostPermissionLevel::Limited);
        s.apply_ban("spam", Some(NOW + HOUR), UserId::new(1), NOW).unwrap();

        assert_eq!(
            evaluate_rules(Action::CreateComment, req, &s, None, NOW + 2 * HOUR),
            Decision::Allow
        );
    }

    #[test]
    fn test_ownership_rule() {
        let req = free_user(ALICE);
        let s = standing_with(PostPermissionLevel::Full);
        let own = article_by(ALICE, AccessLevel::Free);
        let others = article_by(BOB, AccessLevel::Free);

        assert_eq!(
            evaluate_rules(Action::EditArticle, req, &s, Some(&own), NOW),
            Decision::Allow
        );
        assert_eq!(
            evaluate_rules(Action::EditArticle, req, &s, Some(&others), NOW),
            Decision::Deny(DenyReason::NotOwner)
        );

        // Admins bypass ownership.
        let admin = Requester::new(Actor::admin(ALICE), MembershipTier::Free);
        assert_eq!(
            evaluate_rules(Action::SoftDeleteArticle, admin, &s, Some(&others), NOW),
            Decision::Allow
        );
    }

    #[test]
    fn test_read_access_gating() {
        let s = standing_with(PostPermissionLevel::None);
        let premium = article_by(BOB, AccessLevel::Premium);

        assert_eq!(
            evaluate_rules(Action::ReadContent, free_user(ALICE), &s, Some(&premium), NOW),
            Decision::Deny(DenyReason::AccessLevelTooLow)
        );

        let premium_reader = Requester::new(Actor::user(ALICE), MembershipTier::Premium);
        assert_eq!(
            evaluate_rules(Action::ReadContent, premium_reader, &s, Some(&premium), NOW),
            Decision::Allow
        );
    }

    #[test]
    fn test_role_gated_actions() {
        let s = standing_with(PostPermissionLevel::None);

        assert_eq!(
            evaluate_rules(Action::Audit, free_user(ALICE), &s, None, NOW),
            Decision::Deny(DenyReason::RoleRequired)
        );
        let auditor = Requester::new(Actor::auditor(ALICE), MembershipTier::Free);
        assert_eq!(
            evaluate_rules(Action::Audit, auditor, &s, None, NOW),
            Decision::Allow
        );
        // Audit role does not imply admin.
        assert_eq!(
            evaluate_rules(Action::Admin, auditor, &s, None, NOW),
            Decision::Deny(DenyReason::RoleRequired)
        );
    }

    #[test]
    fn test_banned_admin_keeps_admin_powers() {
        let admin = Requester::new(Actor::admin(ALICE), MembershipTier::Free);
        let mut s = standing_with(PostPermissionLevel::None);
        s.apply_ban("conduct", None, UserId::new(1), NOW).unwrap();

        assert_eq!(
            evaluate_rules(Action::Admin, admin, &s, None, NOW),
            Decision::Allow
        );
        assert_eq!(
            evaluate_rules(Action::Audit, admin, &s, None, NOW),
            Decision::Allow
        );
        // But their own content writes are still blocked.
        assert_eq!(
            evaluate_rules(Action::CreateComment, admin, &s, None, NOW),
            Decision::Deny(DenyReason::UserBanned)
        );
    }

    #[tokio::test]
    async fn test_evaluator_rereads_state_between_calls() {
        let store = Arc::new(MemoryStore::new());
        let clock = ManualClock::new(NOW);
        let evaluator = PolicyEvaluator::new(store.clone(), clock);
        let req = free_user(ALICE);

        let denied = evaluator
            .evaluate(Action::CreateArticle, req, None)
            .await
            .unwrap();
        assert_eq!(denied, Decision::Deny(DenyReason::InsufficientPermission));

        let mut s = UserStanding::default_for(ALICE, NOW);
        s.grant(PostPermissionLevel::Full, None, UserId::new(1), NOW);
        store.save_standing(&s).await.unwrap();

        let allowed = evaluator
            .evaluate(Action::CreateArticle, req, None)
            .await
            .unwrap();
        assert_eq!(allowed, Decision::Allow);
    }

    #[tokio::test]
    async fn test_evaluator_requires_target_for_item_actions() {
        let store = Arc::new(MemoryStore::new());
        let evaluator = PolicyEvaluator::new(store, ManualClock::new(NOW));

        let err = evaluator
            .evaluate(Action::EditArticle, free_user(ALICE), None)
            .await
            .unwrap_err();
        assert!(matches!(err, PolicyError::TargetRequired { .. }));
    }

    #[tokio::test]
    async fn test_evaluator_treats_soft_deleted_target_as_missing() {
        let store = Arc::new(MemoryStore::new());
        let mut item = article_by(BOB, AccessLevel::Free);
        item.soft_delete("cleanup", Actor::admin(UserId::new(1)), NOW)
            .unwrap();
        store.save_content(&item).await.unwrap();

        let evaluator = PolicyEvaluator::new(store, ManualClock::new(NOW));
        let err = evaluator
            .evaluate(Action::ReadContent, free_user(ALICE), Some(item.id))
            .await
            .unwrap_err();
        assert!(matches!(err, PolicyError::ContentNotFound(_)));
    }

    #[tokio::test]
    async fn test_evaluator_missing_content_is_an_error() {
        let store = Arc::new(MemoryStore::new());
        let evaluator = PolicyEvaluator::new(store, ManualClock::new(NOW));

        let err = evaluator
            .evaluate(
                Action::ReadContent,
                free_user(ALICE),
                Some(ContentId::new(404)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PolicyError::ContentNotFound(_)));
    }
}
