//! Content lifecycle state machine.
//!
//! A [`ContentItem`] moves through an editorial status machine
//! (Draft → Pending → Published, with Rejected/Archived/Banned branches)
//! while carrying an orthogonal audit verdict. All transitions are pure
//! `&mut self` methods validated against the transition table; violating
//! attempts fail with [`TransitionError::InvalidTransition`], never silently.
//!
//! Invariant: `status == Published` implies `audit_status == Approved`.
//! `Banned` is reachable from any non-terminal status and overrides the
//! audit state until restored.

use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;
use crate::error::{TransitionError, TransitionResult};
use crate::types::{AccessLevel, Actor, CategoryId, ContentId, UserId};

/// Editorial state of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    Draft,
    Pending,
    Published,
    Rejected,
    Archived,
    Banned,
}

impl LifecycleStatus {
    /// Whether a ban may be applied from this status.
    ///
    /// Archived is terminal; an already-banned item cannot be re-banned.
    pub fn bannable(&self) -> bool {
        !matches!(self, LifecycleStatus::Archived | LifecycleStatus::Banned)
    }
}

/// Review verdict, distinct from (but gating) the lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    Pending,
    Approved,
    Rejected,
}

/// A final audit verdict to apply to an item under review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditVerdict {
    Approved,
    Rejected,
}

impl From<AuditVerdict> for AuditStatus {
    fn from(v: AuditVerdict) -> Self {
        match v {
            AuditVerdict::Approved => AuditStatus::Approved,
            AuditVerdict::Rejected => AuditStatus::Rejected,
        }
    }
}

/// A content item and its moderation state.
///
/// Soft deletion is an orthogonal flag: a deleted item keeps its last
/// lifecycle/audit state for the audit trail but is excluded from read
/// paths until explicitly restored. Items are never hard-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ContentId,
    pub author: UserId,
    pub category: CategoryId,

    pub status: LifecycleStatus,
    pub audit_status: AuditStatus,

    /// Reader access gate, independent of the author workflow.
    pub required_access: AccessLevel,

    pub soft_deleted: bool,
    pub deleted_reason: Option<String>,
    pub deleted_by: Option<UserId>,
    pub deleted_at: Option<Timestamp>,

    pub audit_comment: Option<String>,
    pub audited_by: Option<UserId>,
    pub audited_at: Option<Timestamp>,

    pub ban_reason: Option<String>,
    pub banned_by: Option<UserId>,
    pub banned_at: Option<Timestamp>,
    /// Status the item held when it was banned, used by restore.
    pub prior_status: Option<LifecycleStatus>,

    pub published_at: Option<Timestamp>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,

    /// Optimistic-concurrency version, bumped by the store on save.
    pub version: u64,
}

impl ContentItem {
    /// Create a new item in Draft, authored by `author`.
    pub fn new(
        id: ContentId,
        author: UserId,
        category: CategoryId,
        required_access: AccessLevel,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            author,
            category,
            status: LifecycleStatus::Draft,
            audit_status: AuditStatus::Pending,
            required_access,
            soft_deleted: false,
            deleted_reason: None,
            deleted_by: None,
            deleted_at: None,
            audit_comment: None,
            audited_by: None,
            audited_at: None,
            ban_reason: None,
            banned_by: None,
            banned_at: None,
            prior_status: None,
            published_at: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// The Published ⇒ Approved invariant. Must hold after every transition.
    pub fn invariant_holds(&self) -> bool {
        self.status != LifecycleStatus::Published || self.audit_status == AuditStatus::Approved
    }

    /// Submit a Draft (or an edited Rejected item) for audit.
    ///
    /// Guard: actor must be the author.
    pub fn submit_for_audit(&mut self, actor: Actor, now: Timestamp) -> TransitionResult<()> {
        if actor.id != self.author {
            return Err(TransitionError::NotOwner {
                actor: actor.id,
                event: "submit_for_audit",
            });
        }
        match self.status {
            LifecycleStatus::Draft | LifecycleStatus::Rejected => {
                self.status = LifecycleStatus::Pending;
                self.audit_status = AuditStatus::Pending;
                self.audit_comment = None;
                self.audited_by = None;
                self.audited_at = None;
                self.updated_at = now;
                Ok(())
            }
            status => Err(TransitionError::InvalidTransition {
                event: "submit_for_audit",
                status,
            }),
        }
    }

    /// Apply an audit verdict to an item under review.
    ///
    /// Approval only marks the audit status; the lifecycle status stays
    /// Pending until a separate publish. Rejection moves the item to
    /// Rejected, from which the author may edit and resubmit.
    ///
    /// Reapplying an identical verdict is idempotent. Applying a differing
    /// verdict after a final rejection fails with `AlreadyFinalized` until
    /// the item is resubmitted.
    ///
    /// Guard: actor must have the AuditActor or AdminActor role.
    pub fn audit(
        &mut self,
        verdict: AuditVerdict,
        comment: Option<&str>,
        actor: Actor,
        now: Timestamp,
    ) -> TransitionResult<()> {
        if !actor.role.can_audit() {
            return Err(TransitionError::RoleRequired {
                actor: actor.id,
                event: "audit",
            });
        }
        match self.status {
            LifecycleStatus::Pending => {
                self.audit_status = verdict.into();
                self.audit_comment = comment.map(String::from);
                self.audited_by = Some(actor.id);
                self.audited_at = Some(now);
                if verdict == AuditVerdict::Rejected {
                    self.status = LifecycleStatus::Rejected;
                }
                self.updated_at = now;
                Ok(())
            }
            // Already finally rejected: same verdict is a no-op, a differing
            // one requires a resubmit first.
            LifecycleStatus::Rejected if verdict == AuditVerdict::Rejected => Ok(()),
            LifecycleStatus::Rejected => Err(TransitionError::AlreadyFinalized {
                verdict: AuditStatus::Rejected,
            }),
            status => Err(TransitionError::InvalidTransition {
                event: "audit",
                status,
            }),
        }
    }

    /// Publish an approved item.
    ///
    /// Guard: actor must be the author or an admin, and the item must hold
    /// an Approved audit verdict.
    pub fn publish(&mut self, actor: Actor, now: Timestamp) -> TransitionResult<()> {
        if actor.id != self.author && !actor.role.is_admin() {
            return Err(TransitionError::NotOwner {
                actor: actor.id,
                event: "publish",
            });
        }
        if self.status != LifecycleStatus::Pending || self.audit_status != AuditStatus::Approved {
            return Err(TransitionError::InvalidTransition {
                event: "publish",
                status: self.status,
            });
        }
        self.status = LifecycleStatus::Published;
        self.published_at = Some(now);
        self.updated_at = now;
        debug_assert!(self.invariant_holds());
        Ok(())
    }

    /// Ban an item from any non-terminal status, recording the prior status
    /// for a later restore.
    ///
    /// Guard: admin only; a non-blank reason is required.
    pub fn ban(&mut self, reason: &str, actor: Actor, now: Timestamp) -> TransitionResult<()> {
        if !actor.role.is_admin() {
            return Err(TransitionError::RoleRequired {
                actor: actor.id,
                event: "ban",
            });
        }
        if reason.trim().is_empty() {
            return Err(TransitionError::Validation(
                "ban reason must not be blank".into(),
            ));
        }
        if !self.status.bannable() {
            return Err(TransitionError::InvalidTransition {
                event: "ban",
                status: self.status,
            });
        }
        self.prior_status = Some(self.status);
        self.status = LifecycleStatus::Banned;
        self.ban_reason = Some(reason.trim().to_string());
        self.banned_by = Some(actor.id);
        self.banned_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Restore a banned item to its recorded prior status.
    ///
    /// When the prior status was never recorded, an Approved audit restores
    /// to Pending and anything else restores to Draft.
    ///
    /// Guard: admin only.
    pub fn restore(&mut self, actor: Actor, now: Timestamp) -> TransitionResult<()> {
        if !actor.role.is_admin() {
            return Err(TransitionError::RoleRequired {
                actor: actor.id,
                event: "restore",
            });
        }
        if self.status != LifecycleStatus::Banned {
            return Err(TransitionError::InvalidTransition {
                event: "restore",
                status: self.status,
            });
        }
        self.status = self.prior_status.take().unwrap_or({
            if self.audit_status == AuditStatus::Approved {
                LifecycleStatus::Pending
            } else {
                LifecycleStatus::Draft
            }
        });
        self.ban_reason = None;
        self.banned_by = None;
        self.banned_at = None;
        self.updated_at = now;
        debug_assert!(self.invariant_holds());
        Ok(())
    }

    /// Archive a published or banned item.
    ///
    /// Guard: admin only. The retention sweep uses
    /// [`ContentItem::archive_by_retention`] instead.
    pub fn archive(&mut self, actor: Actor, now: Timestamp) -> TransitionResult<()> {
        if !actor.role.is_admin() {
            return Err(TransitionError::RoleRequired {
                actor: actor.id,
                event: "archive",
            });
        }
        self.archive_unchecked(now)
    }

    /// Archive on behalf of the system retention policy (no actor guard;
    /// the state guard still applies).
    pub fn archive_by_retention(&mut self, now: Timestamp) -> TransitionResult<()> {
        self.archive_unchecked(now)
    }

    fn archive_unchecked(&mut self, now: Timestamp) -> TransitionResult<()> {
        match self.status {
            LifecycleStatus::Published | LifecycleStatus::Banned => {
                self.status = LifecycleStatus::Archived;
                self.prior_status = None;
                self.updated_at = now;
                Ok(())
            }
            status => Err(TransitionError::InvalidTransition {
                event: "archive",
                status,
            }),
        }
    }

    /// Soft-delete the item, keeping its lifecycle/audit state for the
    /// audit trail.
    ///
    /// Guard: actor must be the author or an admin; a non-blank reason is
    /// required.
    pub fn soft_delete(
        &mut self,
        reason: &str,
        actor: Actor,
        now: Timestamp,
    ) -> TransitionResult<()> {
        if actor.id != self.author && !actor.role.is_admin() {
            return Err(TransitionError::NotOwner {
                actor: actor.id,
                event: "soft_delete",
            });
        }
        if reason.trim().is_empty() {
            return Err(TransitionError::Validation(
                "deletion reason must not be blank".into(),
            ));
        }
        if self.soft_deleted {
            return Err(TransitionError::InvalidTransition {
                event: "soft_delete",
                status: self.status,
            });
        }
        self.soft_deleted = true;
        self.deleted_reason = Some(reason.trim().to_string());
        self.deleted_by = Some(actor.id);
        self.deleted_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Restore a soft-deleted item into read paths.
    ///
    /// Guard: actor must be the original author or an admin.
    pub fn restore_soft_deleted(&mut self, actor: Actor, now: Timestamp) -> TransitionResult<()> {
        if actor.id != self.author && !actor.role.is_admin() {
            return Err(TransitionError::NotOwner {
                actor: actor.id,
                event: "restore_soft_deleted",
            });
        }
        if !self.soft_deleted {
            return Err(TransitionError::InvalidTransition {
                event: "restore_soft_deleted",
                status: self.status,
            });
        }
        self.soft_deleted = false;
        self.deleted_reason = None;
        self.deleted_by = None;
        self.deleted_at = None;
        self.updated_at = now;
        Ok(())
    }

    /// Dispatch a target status to its single-item transition. Used by the
    /// batch update path; Draft and Rejected are not direct targets.
    pub fn transition_to(
        &mut self,
        target: LifecycleStatus,
        reason: Option<&str>,
        actor: Actor,
        now: Timestamp,
    ) -> TransitionResult<()> {
        match target {
            LifecycleStatus::Pending => self.submit_for_audit(actor, now),
            LifecycleStatus::Published => self.publish(actor, now),
            LifecycleStatus::Archived => self.archive(actor, now),
            LifecycleStatus::Banned => self.ban(reason.unwrap_or(""), actor, now),
            LifecycleStatus::Draft | LifecycleStatus::Rejected => {
                Err(TransitionError::InvalidTransition {
                    event: "transition_to",
                    status: self.status,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: Timestamp = 1_700_000_000_000;

    fn draft() -> ContentItem {
        ContentItem::new(
            ContentId::new(1),
            UserId::new(10),
            CategoryId::new(1),
            AccessLevel::Free,
            NOW,
        )
    }

    fn author() -> Actor {
        Actor::user(UserId::new(10))
    }

    fn auditor() -> Actor {
        Actor::auditor(UserId::new(20))
    }

    fn admin() -> Actor {
        Actor::admin(UserId::new(30))
    }

    #[test]
    fn test_submit_requires_author() {
        let mut item = draft();
        let err = item.submit_for_audit(Actor::user(UserId::new(99)), NOW);
        assert!(matches!(err, Err(TransitionError::NotOwner { .. })));

        item.submit_for_audit(author(), NOW).unwrap();
        assert_eq!(item.status, LifecycleStatus::Pending);
        assert_eq!(item.audit_status, AuditStatus::Pending);
    }

    #[test]
    fn test_approve_keeps_lifecycle_pending() {
        let mut item = draft();
        item.submit_for_audit(author(), NOW).unwrap();
        item.audit(AuditVerdict::Approved, Some("ok"), auditor(), NOW)
            .unwrap();

        assert_eq!(item.status, LifecycleStatus::Pending);
        assert_eq!(item.audit_status, AuditStatus::Approved);
        assert_eq!(item.audited_by, Some(UserId::new(20)));
    }

    #[test]
    fn test_audit_requires_role() {
        let mut item = draft();
        item.submit_for_audit(author(), NOW).unwrap();

        let err = item.audit(AuditVerdict::Approved, None, author(), NOW);
        assert!(matches!(err, Err(TransitionError::RoleRequired { .. })));
    }

    #[test]
    fn test_reject_then_resubmit_not_stuck() {
        let mut item = draft();
        item.submit_for_audit(author(), NOW).unwrap();
        item.audit(AuditVerdict::Rejected, Some("thin"), auditor(), NOW)
            .unwrap();
        assert_eq!(item.status, LifecycleStatus::Rejected);

        item.submit_for_audit(author(), NOW + 1).unwrap();
        assert_eq!(item.status, LifecycleStatus::Pending);
        assert_eq!(item.audit_status, AuditStatus::Pending);
    }

    #[test]
    fn test_audit_idempotent_and_finalized() {
        let mut item = draft();
        item.submit_for_audit(author(), NOW).unwrap();
        item.audit(AuditVerdict::Rejected, None, auditor(), NOW).unwrap();

        // Same verdict again: no-op.
        item.audit(AuditVerdict::Rejected, None, auditor(), NOW).unwrap();
        assert_eq!(item.status, LifecycleStatus::Rejected);

        // Differing verdict after final rejection: must resubmit first.
        let err = item.audit(AuditVerdict::Approved, None, auditor(), NOW);
        assert!(matches!(err, Err(TransitionError::AlreadyFinalized { .. })));
    }

    #[test]
    fn test_publish_requires_approval() {
        let mut item = draft();
        item.submit_for_audit(author(), NOW).unwrap();

        let err = item.publish(author(), NOW);
        assert!(matches!(err, Err(TransitionError::InvalidTransition { .. })));

        item.audit(AuditVerdict::Approved, None, auditor(), NOW).unwrap();
        item.publish(author(), NOW).unwrap();
        assert_eq!(item.status, LifecycleStatus::Published);
        assert!(item.invariant_holds());
    }

    #[test]
    fn test_publish_from_draft_rejected() {
        let mut item = draft();
        let err = item.publish(author(), NOW);
        assert!(matches!(err, Err(TransitionError::InvalidTransition { .. })));
    }

    #[test]
    fn test_ban_records_prior_status_and_restore_returns_it() {
        let mut item = draft();
        item.submit_for_audit(author(), NOW).unwrap();
        item.audit(AuditVerdict::Approved, None, auditor(), NOW).unwrap();
        item.publish(author(), NOW).unwrap();

        item.ban("spam", admin(), NOW).unwrap();
        assert_eq!(item.status, LifecycleStatus::Banned);
        assert_eq!(item.prior_status, Some(LifecycleStatus::Published));

        item.restore(admin(), NOW).unwrap();
        assert_eq!(item.status, LifecycleStatus::Published);
        assert!(item.ban_reason.is_none());
        assert!(item.invariant_holds());
    }

    #[test]
    fn test_restore_defaults_by_audit_status() {
        let mut item = draft();
        item.submit_for_audit(author(), NOW).unwrap();
        item.audit(AuditVerdict::Approved, None, auditor(), NOW).unwrap();
        item.ban("spam", admin(), NOW).unwrap();
        item.prior_status = None; // legacy row without a recorded prior status

        item.restore(admin(), NOW).unwrap();
        assert_eq!(item.status, LifecycleStatus::Pending);
    }

    #[test]
    fn test_ban_guards() {
        let mut item = draft();
        assert!(matches!(
            item.ban("spam", auditor(), NOW),
            Err(TransitionError::RoleRequired { .. })
        ));
        assert!(matches!(
            item.ban("   ", admin(), NOW),
            Err(TransitionError::Validation(_))
        ));

        item.ban("spam", admin(), NOW).unwrap();
        assert!(matches!(
            item.ban("again", admin(), NOW),
            Err(TransitionError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_archive_only_published_or_banned() {
        let mut item = draft();
        assert!(matches!(
            item.archive(admin(), NOW),
            Err(TransitionError::InvalidTransition { .. })
        ));

        item.ban("spam", admin(), NOW).unwrap();
        item.archive(admin(), NOW).unwrap();
        assert_eq!(item.status, LifecycleStatus::Archived);

        // Archived is terminal: no further ban.
        assert!(matches!(
            item.ban("spam", admin(), NOW),
            Err(TransitionError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_soft_delete_keeps_status() {
        let mut item = draft();
        item.soft_delete("duplicate", author(), NOW).unwrap();
        assert!(item.soft_deleted);
        assert_eq!(item.status, LifecycleStatus::Draft);
        assert_eq!(item.deleted_by, Some(UserId::new(10)));

        item.restore_soft_deleted(admin(), NOW).unwrap();
        assert!(!item.soft_deleted);
        assert!(item.deleted_reason.is_none());
    }

    #[test]
    fn test_soft_delete_guards() {
        let mut item = draft();
        assert!(matches!(
            item.soft_delete("x", Actor::user(UserId::new(99)), NOW),
            Err(TransitionError::NotOwner { .. })
        ));
        assert!(matches!(
            item.soft_delete("", author(), NOW),
            Err(TransitionError::Validation(_))
        ));
        assert!(matches!(
            item.restore_soft_deleted(author(), NOW),
            Err(TransitionError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_item_survives_json_round_trip() {
        let mut item = draft();
        item.submit_for_audit(author(), NOW).unwrap();
        item.audit(AuditVerdict::Approved, Some("ok"), auditor(), NOW)
            .unwrap();

        let json = serde_json::to_string(&item).unwrap();
        let back: ContentItem = serde_json::from_str(&json).unwrap();
        assert_eq!(item, back);
    }
}
