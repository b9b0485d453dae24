//! User standing: the forum permission/ban/warning record.
//!
//! One [`UserStanding`] exists per user, created lazily with defaults on
//! first permission-relevant action and never deleted. It carries two
//! orthogonal sub-machines in one aggregate — the post-permission level
//! (optionally time-boxed) and the ban state (time-boxed or indefinite) —
//! plus monotonic warning/ban counters and an append-only history log.
//!
//! Expiration is lazy: [`UserStanding::effective_permission_level`] and
//! [`UserStanding::is_banned`] *compute* the effective value without
//! mutating anything; the explicit [`UserStanding::normalize`] path persists
//! the downgrade and is invoked on the next mutating call or by the
//! cleanup sweep, never from a read.

use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;
use crate::error::{StandingError, StandingResult};
use crate::types::UserId;

/// Post-permission level of a user.
///
/// `Limited` permits comments and ratings but not new top-level articles;
/// `Full` permits all content-write actions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum PostPermissionLevel {
    #[default]
    None,
    Limited,
    Full,
}

/// A standing-changing event, as recorded in the history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum StandingEvent {
    PermissionGranted {
        level: PostPermissionLevel,
        expires_at: Option<Timestamp>,
    },
    PermissionRevoked,
    PermissionExpired,
    Banned {
        ends_at: Option<Timestamp>,
    },
    Unbanned,
    BanExpired,
    Warned,
}

/// One entry in the append-only standing history.
///
/// `actor` is None for system-originated corrections (lazy expiration,
/// cleanup sweep).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub event: StandingEvent,
    pub actor: Option<UserId>,
    pub at: Timestamp,
    pub reason: Option<String>,
}

/// A user's aggregate forum standing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStanding {
    pub user_id: UserId,

    pub permission_level: PostPermissionLevel,
    /// When set and in the past, the effective level is None.
    pub permission_expires_at: Option<Timestamp>,
    pub permission_granted_by: Option<UserId>,
    pub permission_granted_at: Option<Timestamp>,

    pub ban_active: bool,
    pub ban_reason: Option<String>,
    pub ban_started_at: Option<Timestamp>,
    /// None means an indefinite ban.
    pub ban_ends_at: Option<Timestamp>,

    /// Monotonic; never reset automatically.
    pub warning_count: u32,
    /// Incremented on every ban application, untouched by unban.
    pub cumulative_ban_count: u32,

    pub history: Vec<HistoryEntry>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,

    /// Optimistic-concurrency version, bumped by the store on save.
    pub version: u64,
}

impl UserStanding {
    /// The lazily-created default record: level None, unbanned, no history.
    pub fn default_for(user_id: UserId, now: Timestamp) -> Self {
        Self {
            user_id,
            permission_level: PostPermissionLevel::None,
            permission_expires_at: None,
            permission_granted_by: None,
            permission_granted_at: None,
            ban_active: false,
            ban_reason: None,
            ban_started_at: None,
            ban_ends_at: None,
            warning_count: 0,
            cumulative_ban_count: 0,
            history: Vec::new(),
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// The permission level after resolving any expiry. Pure read.
    pub fn effective_permission_level(&self, now: Timestamp) -> PostPermissionLevel {
        match self.permission_expires_at {
            Some(expires) if now > expires => PostPermissionLevel::None,
            _ => self.permission_level,
        }
    }

    /// Whether the user is currently banned, resolving any expired ban.
    /// Pure read.
    pub fn is_banned(&self, now: Timestamp) -> bool {
        if !self.ban_active {
            return false;
        }
        match self.ban_ends_at {
            Some(ends) if now > ends => false,
            _ => true,
        }
    }

    /// Whether any stored field is stale relative to `now`.
    pub fn is_stale(&self, now: Timestamp) -> bool {
        self.permission_is_stale(now) || self.ban_is_stale(now)
    }

    fn permission_is_stale(&self, now: Timestamp) -> bool {
        self.permission_level != PostPermissionLevel::None
            && matches!(self.permission_expires_at, Some(expires) if now > expires)
    }

    fn ban_is_stale(&self, now: Timestamp) -> bool {
        self.ban_active && matches!(self.ban_ends_at, Some(ends) if now > ends)
    }

    /// Persist lazily-resolved expirations into stored state, appending one
    /// history entry per correction. Returns the number of corrections.
    /// Idempotent: already-normalized records are untouched.
    pub fn normalize(&mut self, now: Timestamp) -> usize {
        self.normalize_permission(now) + self.normalize_ban(now)
    }

    /// Normalize an expired permission grant. See [`UserStanding::normalize`].
    pub fn normalize_permission(&mut self, now: Timestamp) -> usize {
        if !self.permission_is_stale(now) {
            return 0;
        }
        self.permission_level = PostPermissionLevel::None;
        self.permission_expires_at = None;
        self.permission_granted_by = None;
        self.permission_granted_at = None;
        self.push_history(StandingEvent::PermissionExpired, None, None, now);
        1
    }

    /// Normalize an expired ban. See [`UserStanding::normalize`].
    pub fn normalize_ban(&mut self, now: Timestamp) -> usize {
        if !self.ban_is_stale(now) {
            return 0;
        }
        self.ban_active = false;
        self.ban_reason = None;
        self.ban_started_at = None;
        self.ban_ends_at = None;
        self.push_history(StandingEvent::BanExpired, None, None, now);
        1
    }

    /// Set the permission level and expiry. Role enforcement happens in the
    /// service layer; this records the mutation.
    pub fn grant(
        &mut self,
        level: PostPermissionLevel,
        expires_at: Option<Timestamp>,
        granted_by: UserId,
        now: Timestamp,
    ) {
        self.permission_level = level;
        self.permission_expires_at = expires_at;
        self.permission_granted_by = Some(granted_by);
        self.permission_granted_at = Some(now);
        self.push_history(
            StandingEvent::PermissionGranted { level, expires_at },
            Some(granted_by),
            None,
            now,
        );
    }

    /// Revoke the permission, clearing the expiry. Idempotent on level —
    /// revoking an already-None user is a no-op on state but still appends
    /// an audit entry.
    pub fn revoke(&mut self, revoked_by: UserId, now: Timestamp) {
        self.permission_level = PostPermissionLevel::None;
        self.permission_expires_at = None;
        self.permission_granted_by = None;
        self.permission_granted_at = None;
        self.push_history(StandingEvent::PermissionRevoked, Some(revoked_by), None, now);
    }

    /// Apply a ban. The reason is mandatory; `ends_at` of None means
    /// indefinite. Increments the cumulative ban counter.
    pub fn apply_ban(
        &mut self,
        reason: &str,
        ends_at: Option<Timestamp>,
        admin: UserId,
        now: Timestamp,
    ) -> StandingResult<()> {
        if reason.trim().is_empty() {
            return Err(StandingError::Validation(
                "ban reason must not be blank".into(),
            ));
        }
        self.ban_active = true;
        self.ban_reason = Some(reason.trim().to_string());
        self.ban_started_at = Some(now);
        self.ban_ends_at = ends_at;
        self.cumulative_ban_count += 1;
        self.push_history(
            StandingEvent::Banned { ends_at },
            Some(admin),
            Some(reason.trim().to_string()),
            now,
        );
        Ok(())
    }

    /// Lift a ban. Clears reason and end time but leaves both counters
    /// untouched. An expired-but-unnormalized ban is still clearable; a
    /// user with no active ban record fails with `NotBanned`.
    pub fn apply_unban(&mut self, admin: UserId, now: Timestamp) -> StandingResult<()> {
        if !self.ban_active {
            return Err(StandingError::NotBanned { user: self.user_id });
        }
        self.ban_active = false;
        self.ban_reason = None;
        self.ban_started_at = None;
        self.ban_ends_at = None;
        self.push_history(StandingEvent::Unbanned, Some(admin), None, now);
        Ok(())
    }

    /// Record a warning. Bumps the counter and appends history; never
    /// touches ban or permission state — escalation is a caller policy.
    pub fn warn(&mut self, reason: &str, admin: UserId, now: Timestamp) {
        self.warning_count += 1;
        self.push_history(
            StandingEvent::Warned,
            Some(admin),
            Some(reason.to_string()),
            now,
        );
    }

    fn push_history(
        &mut self,
        event: StandingEvent,
        actor: Option<UserId>,
        reason: Option<String>,
        now: Timestamp,
    ) {
        self.history.push(HistoryEntry {
            event,
            actor,
            at: now,
            reason,
        });
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: Timestamp = 1_700_000_000_000;
    const HOUR: Timestamp = 3_600_000;

    fn standing() -> UserStanding {
        UserStanding::default_for(UserId::new(1), NOW)
    }

    #[test]
    fn test_default_record() {
        let s = standing();
        assert_eq!(s.effective_permission_level(NOW), PostPermissionLevel::None);
        assert!(!s.is_banned(NOW));
        assert!(s.history.is_empty());
    }

    #[test]
    fn test_grant_and_effective_level() {
        let mut s = standing();
        s.grant(PostPermissionLevel::Full, None, UserId::new(9), NOW);
        assert_eq!(s.effective_permission_level(NOW), PostPermissionLevel::Full);

        s.revoke(UserId::new(9), NOW);
        assert_eq!(s.effective_permission_level(NOW), PostPermissionLevel::None);
        assert_eq!(s.history.len(), 2);
    }

    #[test]
    fn test_expired_permission_reads_as_none_without_mutation() {
        let mut s = standing();
        s.grant(PostPermissionLevel::Full, Some(NOW + HOUR), UserId::new(9), NOW);

        assert_eq!(
            s.effective_permission_level(NOW + 2 * HOUR),
            PostPermissionLevel::None
        );
        // Stored state is untouched by the read.
        assert_eq!(s.permission_level, PostPermissionLevel::Full);
        assert!(s.is_stale(NOW + 2 * HOUR));
    }

    #[test]
    fn test_revoke_idempotent_but_audited() {
        let mut s = standing();
        s.revoke(UserId::new(9), NOW);
        s.revoke(UserId::new(9), NOW + 1);

        assert_eq!(s.permission_level, PostPermissionLevel::None);
        assert_eq!(s.history.len(), 2);
    }

    #[test]
    fn test_ban_and_lazy_expiry() {
        let mut s = standing();
        s.apply_ban("spam", Some(NOW + HOUR), UserId::new(9), NOW).unwrap();

        assert!(s.is_banned(NOW));
        assert!(s.is_banned(NOW + HOUR)); // boundary: still banned at ends_at
        assert!(!s.is_banned(NOW + HOUR + 1));
        assert_eq!(s.cumulative_ban_count, 1);
    }

    #[test]
    fn test_indefinite_ban() {
        let mut s = standing();
        s.apply_ban("abuse", None, UserId::new(9), NOW).unwrap();
        assert!(s.is_banned(NOW + 1000 * HOUR));
    }

    #[test]
    fn test_blank_ban_reason_rejected() {
        let mut s = standing();
        let err = s.apply_ban("  ", None, UserId::new(9), NOW);
        assert!(matches!(err, Err(StandingError::Validation(_))));
        assert_eq!(s.cumulative_ban_count, 0);
    }

    #[test]
    fn test_unban_clears_state_not_counters() {
        let mut s = standing();
        s.apply_ban("spam", None, UserId::new(9), NOW).unwrap();
        s.warn("first", UserId::new(9), NOW);

        s.apply_unban(UserId::new(9), NOW + 1).unwrap();
        assert!(!s.is_banned(NOW + 1));
        assert!(s.ban_reason.is_none());
        assert_eq!(s.cumulative_ban_count, 1);
        assert_eq!(s.warning_count, 1);
    }

    #[test]
    fn test_unban_when_not_banned_fails() {
        let mut s = standing();
        assert!(matches!(
            s.apply_unban(UserId::new(9), NOW),
            Err(StandingError::NotBanned { .. })
        ));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut s = standing();
        s.grant(PostPermissionLevel::Limited, Some(NOW + HOUR), UserId::new(9), NOW);
        s.apply_ban("spam", Some(NOW + HOUR), UserId::new(9), NOW).unwrap();

        let later = NOW + 2 * HOUR;
        assert_eq!(s.normalize(later), 2);
        assert_eq!(s.permission_level, PostPermissionLevel::None);
        assert!(!s.ban_active);

        let snapshot = s.clone();
        assert_eq!(s.normalize(later), 0);
        assert_eq!(s, snapshot);
    }

    #[test]
    fn test_warning_counter_monotonic() {
        let mut s = standing();
        s.warn("a", UserId::new(9), NOW);
        s.warn("b", UserId::new(9), NOW + 1);
        assert_eq!(s.warning_count, 2);
        assert!(!s.is_banned(NOW + 1));
        assert_eq!(s.effective_permission_level(NOW + 1), PostPermissionLevel::None);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_grant_expiry_boundary(ttl in 1i64..1_000_000, delta in 0i64..2_000_000) {
                let mut s = standing();
                s.grant(PostPermissionLevel::Full, Some(NOW + ttl), UserId::new(9), NOW);

                let now = NOW + delta;
                let expected = if now > NOW + ttl {
                    PostPermissionLevel::None
                } else {
                    PostPermissionLevel::Full
                };
                prop_assert_eq!(s.effective_permission_level(now), expected);
            }

            #[test]
            fn test_ban_expiry_boundary(ttl in 1i64..1_000_000, delta in 0i64..2_000_000) {
                let mut s = standing();
                s.apply_ban("spam", Some(NOW + ttl), UserId::new(9), NOW).unwrap();

                let now = NOW + delta;
                prop_assert_eq!(s.is_banned(now), now <= NOW + ttl);
            }
        }
    }
}
