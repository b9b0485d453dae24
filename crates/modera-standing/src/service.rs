//! The standing service: store-backed orchestration of [`UserStanding`].
//!
//! Every mutating call follows the same shape: read the current record
//! (lazily creating the default), normalize any expired state, apply the
//! pure mutation, and save under the optimistic version check. A conflict
//! means a concurrent writer won; the caller re-reads and retries.
//!
//! Role enforcement lives here, not in the aggregate: all standing
//! mutations require an admin actor.

use std::sync::Arc;

use modera_core::{
    Actor, Clock, HistoryEntry, PostPermissionLevel, StandingError, Timestamp, UserId, UserStanding,
};
use modera_store::{StandingStore, StandingStoreExt, StoreError};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// A point-in-time view of a user's standing with all expirations resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingSnapshot {
    pub user_id: UserId,
    pub effective_level: PostPermissionLevel,
    pub permission_expires_at: Option<Timestamp>,
    pub banned: bool,
    pub ban_ends_at: Option<Timestamp>,
    pub warning_count: u32,
    pub cumulative_ban_count: u32,
}

/// Details of a currently active ban.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BanInfo {
    pub reason: String,
    pub started_at: Timestamp,
    /// None means the ban is indefinite.
    pub ends_at: Option<Timestamp>,
}

/// Outcome of a cleanup sweep over stale standing records.
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Records the stale listing returned.
    pub scanned: usize,
    /// Expirations persisted into stored state.
    pub normalized: usize,
    /// Users skipped because a concurrent writer got there first. The
    /// next sweep (or their next mutation) picks them up.
    pub skipped: Vec<UserId>,
    /// Users whose record could not be read or rewritten, with the store
    /// failure. One bad record never aborts the rest of the sweep.
    pub failed: Vec<(UserId, StoreError)>,
}

/// Store-backed service for permission grants, bans, and warnings.
pub struct StandingService<S, C> {
    store: Arc<S>,
    clock: C,
}

impl<S, C> StandingService<S, C>
where
    S: StandingStore,
    C: Clock,
{
    pub fn new(store: Arc<S>, clock: C) -> Self {
        Self { store, clock }
    }

    // --- permission grants -------------------------------------------------

    /// Grant a post-permission level, optionally time-boxed. Overwrites any
    /// existing grant and its expiry.
    pub async fn grant_permission(
        &self,
        user: UserId,
        level: PostPermissionLevel,
        expires_at: Option<Timestamp>,
        granted_by: Actor,
    ) -> Result<()> {
        ensure_admin(granted_by)?;
        let now = self.clock.now();
        let mut standing = self.store.load_or_default(user, now).await?;
        standing.normalize(now);
        standing.grant(level, expires_at, granted_by.id, now);
        self.store.save_standing(&standing).await?;
        info!(%user, ?level, ?expires_at, granted_by = %granted_by.id, "permission granted");
        Ok(())
    }

    /// Revoke the user's post permission. Idempotent: revoking a user at
    /// level None still succeeds and is recorded in the history.
    pub async fn revoke_permission(&self, user: UserId, revoked_by: Actor) -> Result<()> {
        ensure_admin(revoked_by)?;
        let now = self.clock.now();
        let mut standing = self.store.load_or_default(user, now).await?;
        standing.normalize(now);
        standing.revoke(revoked_by.id, now);
        self.store.save_standing(&standing).await?;
        info!(%user, revoked_by = %revoked_by.id, "permission revoked");
        Ok(())
    }

    /// Change the permission level while keeping the current expiry.
    pub async fn update_permission_level(
        &self,
        user: UserId,
        level: PostPermissionLevel,
        updated_by: Actor,
    ) -> Result<()> {
        ensure_admin(updated_by)?;
        let now = self.clock.now();
        let mut standing = self.store.load_or_default(user, now).await?;
        standing.normalize(now);
        let expires_at = standing.permission_expires_at;
        standing.grant(level, expires_at, updated_by.id, now);
        self.store.save_standing(&standing).await?;
        info!(%user, ?level, updated_by = %updated_by.id, "permission level updated");
        Ok(())
    }

    /// Apply one permission level to many users. Failures do not abort the
    /// batch; each user gets its own outcome, in input order.
    pub async fn batch_update_permissions(
        &self,
        users: &[UserId],
        level: PostPermissionLevel,
        expires_at: Option<Timestamp>,
        updated_by: Actor,
    ) -> Result<Vec<(UserId, Result<()>)>> {
        ensure_admin(updated_by)?;
        if users.is_empty() {
            return Err(StandingError::Validation("user list must not be empty".into()).into());
        }

        let mut outcomes = Vec::with_capacity(users.len());
        for &user in users {
            let outcome = self
                .grant_permission(user, level, expires_at, updated_by)
                .await;
            if let Err(err) = &outcome {
                warn!(%user, %err, "batch permission update failed for user");
            }
            outcomes.push((user, outcome));
        }
        Ok(outcomes)
    }

    // --- bans and warnings -------------------------------------------------

    /// Ban a user. `ends_at` of None means indefinite. Re-banning an
    /// already-banned user overwrites the ban and still bumps the
    /// cumulative counter.
    pub async fn ban(
        &self,
        user: UserId,
        reason: &str,
        ends_at: Option<Timestamp>,
        admin: Actor,
    ) -> Result<()> {
        ensure_admin(admin)?;
        let now = self.clock.now();
        let mut standing = self.store.load_or_default(user, now).await?;
        standing.normalize(now);
        standing.apply_ban(reason, ends_at, admin.id, now)?;
        self.store.save_standing(&standing).await?;
        info!(%user, ?ends_at, admin = %admin.id, "user banned");
        Ok(())
    }

    /// Lift a user's ban. Fails with `NotBanned` if no ban record is held;
    /// an expired-but-unnormalized ban is still clearable, so only the
    /// permission side is normalized before the check.
    pub async fn unban(&self, user: UserId, admin: Actor) -> Result<()> {
        ensure_admin(admin)?;
        let now = self.clock.now();
        let mut standing = self.store.load_or_default(user, now).await?;
        standing.normalize_permission(now);
        standing.apply_unban(admin.id, now)?;
        self.store.save_standing(&standing).await?;
        info!(%user, admin = %admin.id, "user unbanned");
        Ok(())
    }

    /// Record a warning. Bumps the counter and history only; any escalation
    /// to a ban is a separate, explicit admin decision.
    pub async fn warn_user(&self, user: UserId, reason: &str, admin: Actor) -> Result<()> {
        ensure_admin(admin)?;
        if reason.trim().is_empty() {
            return Err(StandingError::Validation("warning reason must not be blank".into()).into());
        }
        let now = self.clock.now();
        let mut standing = self.store.load_or_default(user, now).await?;
        standing.normalize(now);
        standing.warn(reason.trim(), admin.id, now);
        self.store.save_standing(&standing).await?;
        info!(%user, admin = %admin.id, "user warned");
        Ok(())
    }

    // --- reads -------------------------------------------------------------
    //
    // All reads resolve expirations lazily and never write.

    /// The user's permission level with expiry resolved.
    pub async fn effective_permission_level(&self, user: UserId) -> Result<PostPermissionLevel> {
        let now = self.clock.now();
        let standing = self.store.load_or_default(user, now).await?;
        Ok(standing.effective_permission_level(now))
    }

    /// Whether the user is currently banned.
    pub async fn is_banned(&self, user: UserId) -> Result<bool> {
        let now = self.clock.now();
        let standing = self.store.load_or_default(user, now).await?;
        Ok(standing.is_banned(now))
    }

    /// Details of the active ban, or None if the user is not banned.
    pub async fn ban_info(&self, user: UserId) -> Result<Option<BanInfo>> {
        let now = self.clock.now();
        let standing = self.store.load_or_default(user, now).await?;
        if !standing.is_banned(now) {
            return Ok(None);
        }
        let (Some(reason), Some(started_at)) =
            (standing.ban_reason.clone(), standing.ban_started_at)
        else {
            return Ok(None);
        };
        Ok(Some(BanInfo {
            reason,
            started_at,
            ends_at: standing.ban_ends_at,
        }))
    }

    /// Lifetime warning count. Monotonic, never reset.
    pub async fn warning_count(&self, user: UserId) -> Result<u32> {
        let now = self.clock.now();
        let standing = self.store.load_or_default(user, now).await?;
        Ok(standing.warning_count)
    }

    /// Lifetime ban count. Bumped on every ban, untouched by unban.
    pub async fn ban_count(&self, user: UserId) -> Result<u32> {
        let now = self.clock.now();
        let standing = self.store.load_or_default(user, now).await?;
        Ok(standing.cumulative_ban_count)
    }

    /// The append-only history of standing changes, oldest first.
    pub async fn permission_history(&self, user: UserId) -> Result<Vec<HistoryEntry>> {
        let now = self.clock.now();
        let standing = self.store.load_or_default(user, now).await?;
        Ok(standing.history)
    }

    /// Full point-in-time view with all expirations resolved.
    pub async fn snapshot(&self, user: UserId) -> Result<StandingSnapshot> {
        let now = self.clock.now();
        let standing = self.store.load_or_default(user, now).await?;
        Ok(StandingSnapshot {
            user_id: user,
            effective_level: standing.effective_permission_level(now),
            permission_expires_at: standing.permission_expires_at,
            banned: standing.is_banned(now),
            ban_ends_at: standing.ban_ends_at,
            warning_count: standing.warning_count,
            cumulative_ban_count: standing.cumulative_ban_count,
        })
    }

    /// Users whose stored record holds an unexpired-or-stale ban flag.
    pub async fn banned_users(&self) -> Result<Vec<UserId>> {
        Ok(self.store.list_banned().await?)
    }

    /// Users holding any stored permission grant.
    pub async fn users_with_permission(&self) -> Result<Vec<UserId>> {
        Ok(self.store.list_with_permission().await?)
    }

    // --- maintenance -------------------------------------------------------

    /// Sweep stale records, persisting lazy expirations. Records are
    /// processed independently: version conflicts are skipped and other
    /// store failures collected per user, so one bad record never blocks
    /// the rest. Safe to run concurrently with live traffic and with
    /// itself; a re-run on a clean store is a no-op.
    pub async fn cleanup_expired(&self) -> Result<CleanupReport> {
        let now = self.clock.now();
        let stale = self.store.list_stale(now).await?;
        let mut report = CleanupReport {
            scanned: stale.len(),
            ..CleanupReport::default()
        };

        for user in stale {
            let mut standing = match self.store.load_standing(user).await {
                Ok(Some(standing)) => standing,
                Ok(None) => continue,
                Err(err) => {
                    warn!(%user, %err, "cleanup failed to load standing");
                    report.failed.push((user, err));
                    continue;
                }
            };
            let corrections = standing.normalize(now);
            if corrections == 0 {
                continue;
            }
            match self.store.save_standing(&standing).await {
                Ok(_) => report.normalized += corrections,
                Err(StoreError::Conflict { .. }) => {
                    debug!(%user, "cleanup lost the version race, skipping");
                    report.skipped.push(user);
                }
                Err(err) => {
                    warn!(%user, %err, "cleanup failed to persist normalization");
                    report.failed.push((user, err));
                }
            }
        }

        info!(
            scanned = report.scanned,
            normalized = report.normalized,
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "standing cleanup sweep finished"
        );
        Ok(report)
    }
}

fn ensure_admin(actor: Actor) -> Result<()> {
    if actor.role.is_admin() {
        Ok(())
    } else {
        Err(StandingError::Forbidden { actor: actor.id }.into())
    }
}
