//! The moderation facade: unified API over content lifecycle, user
//! standing, and policy evaluation.
//!
//! Every mutating operation follows the same shape as the standing
//! service: load the aggregate, apply the pure transition (whose guard
//! re-validates whatever a policy decision observed earlier), and save
//! under the optimistic version check. A conflict means a concurrent
//! writer won; the caller re-reads and retries.

use std::sync::Arc;

use modera_core::{
    AccessLevel, Actor, AuditVerdict, CategoryId, Clock, ContentId, ContentItem, LifecycleStatus,
    MembershipTier, UserId,
};
use modera_policy::{evaluate_rules, Action, Decision, PolicyEvaluator, Requester};
use modera_standing::StandingService;
use modera_store::{ContentStore, StandingStore, StandingStoreExt};
use tracing::info;

use crate::error::{Error, Result};

/// Configuration for the moderation facade.
#[derive(Debug, Clone)]
pub struct ModerationConfig {
    /// Whether creating a draft requires the Full permission level. Off by
    /// default: drafts are private until submitted, so only the ban check
    /// applies. The permission level always gates the policy evaluator's
    /// create-article decision regardless of this setting.
    pub draft_requires_permission: bool,
    /// Whether the retention job may archive published content.
    pub retention_archive_enabled: bool,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            draft_requires_permission: false,
            retention_archive_enabled: true,
        }
    }
}

/// The main moderation facade.
///
/// Provides a unified API for:
/// - Walking content through its lifecycle (draft, audit, publish, ban,
///   restore, archive, soft delete)
/// - Managing user standing (grants, bans, warnings) via [`Self::standing`]
/// - Evaluating authorization decisions via [`Self::policy`]
pub struct ContentModeration<S, C> {
    store: Arc<S>,
    clock: C,
    config: ModerationConfig,
    standing: StandingService<S, C>,
    policy: PolicyEvaluator<S, C>,
}

impl<S, C> ContentModeration<S, C>
where
    S: ContentStore + StandingStore,
    C: Clock + Clone,
{
    /// Create a new facade over the given store and clock.
    pub fn new(store: Arc<S>, clock: C, config: ModerationConfig) -> Self {
        let standing = StandingService::new(store.clone(), clock.clone());
        let policy = PolicyEvaluator::new(store.clone(), clock.clone());
        Self {
            store,
            clock,
            config,
            standing,
            policy,
        }
    }

    /// The standing service sharing this facade's store and clock.
    pub fn standing(&self) -> &StandingService<S, C> {
        &self.standing
    }

    /// The policy evaluator sharing this facade's store and clock.
    pub fn policy(&self) -> &PolicyEvaluator<S, C> {
        &self.policy
    }

    /// The storage backend.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The active configuration.
    pub fn config(&self) -> &ModerationConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────
    // Authoring operations
    // ─────────────────────────────────────────────────────────────────────

    /// Create a new draft.
    ///
    /// Checks the author's standing first: a banned author is always
    /// refused, and with [`ModerationConfig::draft_requires_permission`]
    /// set the Full permission level is required as well. Membership tier
    /// never gates writes, so none is taken.
    pub async fn create_draft(
        &self,
        id: ContentId,
        category: CategoryId,
        required_access: AccessLevel,
        author: Actor,
    ) -> Result<ContentItem> {
        let now = self.clock.now();
        let standing = self.store.load_or_default(author.id, now).await?;

        let requester = Requester::new(author, MembershipTier::Free);
        let decision = if self.config.draft_requires_permission {
            evaluate_rules(Action::CreateArticle, requester, &standing, None, now)
        } else if standing.is_banned(now) {
            Decision::Deny(modera_policy::DenyReason::UserBanned)
        } else {
            Decision::Allow
        };
        if let Decision::Deny(reason) = decision {
            return Err(Error::Denied(reason));
        }

        let mut item = ContentItem::new(id, author.id, category, required_access, now);
        item.version = self.store.save_content(&item).await?;
        info!(%id, author = %author.id, "draft created");
        Ok(item)
    }

    /// Submit a draft or rejected item for audit.
    pub async fn submit_for_audit(&self, id: ContentId, actor: Actor) -> Result<()> {
        let now = self.clock.now();
        let mut item = self.load_item(id).await?;
        item.submit_for_audit(actor, now)?;
        self.store.save_content(&item).await?;
        info!(%id, actor = %actor.id, "submitted for audit");
        Ok(())
    }

    /// Render an audit verdict on a pending item.
    pub async fn audit(
        &self,
        id: ContentId,
        verdict: AuditVerdict,
        comment: Option<&str>,
        actor: Actor,
    ) -> Result<()> {
        let now = self.clock.now();
        let mut item = self.load_item(id).await?;
        item.audit(verdict, comment, actor, now)?;
        self.store.save_content(&item).await?;
        info!(%id, ?verdict, actor = %actor.id, "audit verdict recorded");
        Ok(())
    }

    /// Publish an approved item.
    pub async fn publish(&self, id: ContentId, actor: Actor) -> Result<()> {
        let now = self.clock.now();
        let mut item = self.load_item(id).await?;
        item.publish(actor, now)?;
        self.store.save_content(&item).await?;
        info!(%id, actor = %actor.id, "published");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Moderation operations
    // ─────────────────────────────────────────────────────────────────────

    /// Ban a content item, recording its prior status for restore.
    pub async fn ban_content(&self, id: ContentId, reason: &str, actor: Actor) -> Result<()> {
        let now = self.clock.now();
        let mut item = self.load_item(id).await?;
        item.ban(reason, actor, now)?;
        self.store.save_content(&item).await?;
        info!(%id, actor = %actor.id, "content banned");
        Ok(())
    }

    /// Restore a banned item to its pre-ban status.
    pub async fn restore_content(&self, id: ContentId, actor: Actor) -> Result<()> {
        let now = self.clock.now();
        let mut item = self.load_item(id).await?;
        item.restore(actor, now)?;
        self.store.save_content(&item).await?;
        info!(%id, actor = %actor.id, status = ?item.status, "content restored");
        Ok(())
    }

    /// Archive a published or banned item.
    pub async fn archive(&self, id: ContentId, actor: Actor) -> Result<()> {
        let now = self.clock.now();
        let mut item = self.load_item(id).await?;
        item.archive(actor, now)?;
        self.store.save_content(&item).await?;
        info!(%id, actor = %actor.id, "archived");
        Ok(())
    }

    /// Archive on behalf of the retention job. No actor; gated by
    /// [`ModerationConfig::retention_archive_enabled`].
    pub async fn retention_archive(&self, id: ContentId) -> Result<()> {
        if !self.config.retention_archive_enabled {
            return Err(Error::RetentionDisabled);
        }
        let now = self.clock.now();
        let mut item = self.load_item(id).await?;
        item.archive_by_retention(now)?;
        self.store.save_content(&item).await?;
        info!(%id, "archived by retention");
        Ok(())
    }

    /// Soft-delete an item. It disappears from read paths but remains
    /// restorable.
    pub async fn soft_delete(&self, id: ContentId, reason: &str, actor: Actor) -> Result<()> {
        let now = self.clock.now();
        let mut item = self.load_item(id).await?;
        item.soft_delete(reason, actor, now)?;
        self.store.save_content(&item).await?;
        info!(%id, actor = %actor.id, "soft deleted");
        Ok(())
    }

    /// Restore a soft-deleted item.
    pub async fn restore_soft_deleted(&self, id: ContentId, actor: Actor) -> Result<()> {
        let now = self.clock.now();
        let mut item = self.load_item(id).await?;
        item.restore_soft_deleted(actor, now)?;
        self.store.save_content(&item).await?;
        info!(%id, actor = %actor.id, "soft delete restored");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Batch operations
    // ─────────────────────────────────────────────────────────────────────

    /// Move many items to a target status. Failures do not abort the
    /// batch; each id gets its own outcome, in input order, and items
    /// already transitioned stay transitioned.
    pub async fn batch_update_status(
        &self,
        ids: &[ContentId],
        target: LifecycleStatus,
        reason: Option<&str>,
        actor: Actor,
    ) -> Result<Vec<(ContentId, Result<()>)>> {
        self.require_non_empty(ids)?;
        let mut outcomes = Vec::with_capacity(ids.len());
        for &id in ids {
            let outcome = self.update_one_status(id, target, reason, actor).await;
            outcomes.push((id, outcome));
        }
        Ok(outcomes)
    }

    /// Render one audit verdict on many items, with per-id outcomes.
    pub async fn batch_update_audit_status(
        &self,
        ids: &[ContentId],
        verdict: AuditVerdict,
        comment: Option<&str>,
        actor: Actor,
    ) -> Result<Vec<(ContentId, Result<()>)>> {
        self.require_non_empty(ids)?;
        let mut outcomes = Vec::with_capacity(ids.len());
        for &id in ids {
            let outcome = self.audit(id, verdict, comment, actor).await;
            outcomes.push((id, outcome));
        }
        Ok(outcomes)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Read operations
    // ─────────────────────────────────────────────────────────────────────

    /// Load an item for a requester. Soft-deleted items read as not
    /// found; the requester's tier must satisfy the item's access level.
    pub async fn load_visible(&self, id: ContentId, requester: Requester) -> Result<ContentItem> {
        let now = self.clock.now();
        let item = self.load_item(id).await?;
        if item.soft_deleted {
            return Err(Error::ContentNotFound(id));
        }
        let standing = self.store.load_or_default(requester.actor.id, now).await?;
        match evaluate_rules(Action::ReadContent, requester, &standing, Some(&item), now) {
            Decision::Allow => Ok(item),
            Decision::Deny(reason) => Err(Error::Denied(reason)),
        }
    }

    /// Non-deleted items with the given lifecycle status.
    pub async fn list_by_status(&self, status: LifecycleStatus) -> Result<Vec<ContentId>> {
        Ok(self.store.list_by_status(status).await?)
    }

    /// Non-deleted items by author.
    pub async fn list_by_author(&self, author: UserId) -> Result<Vec<ContentId>> {
        Ok(self.store.list_by_author(author).await?)
    }

    /// Non-deleted items by category.
    pub async fn list_by_category(&self, category: CategoryId) -> Result<Vec<ContentId>> {
        Ok(self.store.list_by_category(category).await?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────

    async fn load_item(&self, id: ContentId) -> Result<ContentItem> {
        self.store
            .load_content(id)
            .await?
            .ok_or(Error::ContentNotFound(id))
    }

    async fn update_one_status(
        &self,
        id: ContentId,
        target: LifecycleStatus,
        reason: Option<&str>,
        actor: Actor,
    ) -> Result<()> {
        let now = self.clock.now();
        let mut item = self.load_item(id).await?;
        item.transition_to(target, reason, actor, now)?;
        self.store.save_content(&item).await?;
        Ok(())
    }

    fn require_non_empty(&self, ids: &[ContentId]) -> Result<()> {
        if ids.is_empty() {
            return Err(modera_core::TransitionError::Validation(
                "content id list must not be empty".into(),
            )
            .into());
        }
        Ok(())
    }
}
