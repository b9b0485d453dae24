//! Proptest generators for property-based testing.

use proptest::prelude::*;

use modera_core::{
    AccessLevel, CategoryId, ContentId, ContentItem, MembershipTier, PostPermissionLevel, Role,
    Timestamp, UserId, UserStanding,
};

/// Generate a random UserId.
pub fn user_id() -> impl Strategy<Value = UserId> {
    (1u64..10_000).prop_map(UserId::new)
}

/// Generate a random ContentId.
pub fn content_id() -> impl Strategy<Value = ContentId> {
    (1u64..10_000).prop_map(ContentId::new)
}

/// Generate a random CategoryId.
pub fn category_id() -> impl Strategy<Value = CategoryId> {
    (1u64..100).prop_map(CategoryId::new)
}

/// Generate a Role.
pub fn role() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::RegularUser),
        Just(Role::AuditActor),
        Just(Role::AdminActor),
    ]
}

/// Generate a MembershipTier.
pub fn membership_tier() -> impl Strategy<Value = MembershipTier> {
    prop_oneof![
        Just(MembershipTier::Free),
        Just(MembershipTier::Member),
        Just(MembershipTier::Premium),
    ]
}

/// Generate an AccessLevel.
pub fn access_level() -> impl Strategy<Value = AccessLevel> {
    prop_oneof![
        Just(AccessLevel::Free),
        Just(AccessLevel::Member),
        Just(AccessLevel::Premium),
    ]
}

/// Generate a PostPermissionLevel.
pub fn permission_level() -> impl Strategy<Value = PostPermissionLevel> {
    prop_oneof![
        Just(PostPermissionLevel::None),
        Just(PostPermissionLevel::Limited),
        Just(PostPermissionLevel::Full),
    ]
}

/// Generate a reasonable timestamp.
pub fn timestamp() -> impl Strategy<Value = Timestamp> {
    1_000_000_000_000i64..2_000_000_000_000i64
}

/// Generate a fresh draft item.
pub fn draft_item() -> impl Strategy<Value = ContentItem> {
    (content_id(), user_id(), category_id(), access_level(), timestamp())
        .prop_map(|(id, author, category, access, now)| {
            ContentItem::new(id, author, category, access, now)
        })
}

/// Parameters describing one user-standing history, used to build records
/// in arbitrary (possibly stale) states.
#[derive(Debug, Clone)]
pub struct StandingParams {
    pub user: UserId,
    pub created_at: Timestamp,
    pub level: PostPermissionLevel,
    /// Offset from `created_at`; None means no expiry.
    pub permission_ttl: Option<Timestamp>,
    pub banned: bool,
    /// Offset from `created_at`; None means indefinite.
    pub ban_ttl: Option<Timestamp>,
    pub warnings: u32,
}

impl Arbitrary for StandingParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            user_id(),
            timestamp(),
            permission_level(),
            prop::option::of(1i64..10_000_000),
            any::<bool>(),
            prop::option::of(1i64..10_000_000),
            0u32..5,
        )
            .prop_map(
                |(user, created_at, level, permission_ttl, banned, ban_ttl, warnings)| {
                    StandingParams {
                        user,
                        created_at,
                        level,
                        permission_ttl,
                        banned,
                        ban_ttl,
                        warnings,
                    }
                },
            )
            .boxed()
    }
}

/// Build a standing record from parameters by replaying the mutations.
pub fn standing_from_params(params: &StandingParams) -> UserStanding {
    let admin = UserId::new(1);
    let now = params.created_at;
    let mut standing = UserStanding::default_for(params.user, now);

    if params.level != PostPermissionLevel::None {
        let expires_at = params.permission_ttl.map(|ttl| now + ttl);
        standing.grant(params.level, expires_at, admin, now);
    }
    if params.banned {
        let ends_at = params.ban_ttl.map(|ttl| now + ttl);
        standing
            .apply_ban("generated", ends_at, admin, now)
            .expect("generated ban reason is non-blank");
    }
    for _ in 0..params.warnings {
        standing.warn("generated", admin, now);
    }
    standing
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn test_normalize_is_idempotent(params: StandingParams, offset in 0i64..100_000_000) {
            let mut standing = standing_from_params(&params);
            let later = params.created_at + offset;

            standing.normalize(later);
            let snapshot = standing.clone();
            standing.normalize(later);
            prop_assert_eq!(standing, snapshot);
        }

        #[test]
        fn test_normalize_agrees_with_lazy_reads(
            params: StandingParams,
            offset in 0i64..100_000_000,
        ) {
            let mut standing = standing_from_params(&params);
            let later = params.created_at + offset;

            let lazy_level = standing.effective_permission_level(later);
            let lazy_banned = standing.is_banned(later);

            standing.normalize(later);
            prop_assert_eq!(standing.permission_level, lazy_level);
            prop_assert_eq!(standing.ban_active, lazy_banned);
        }

        #[test]
        fn test_counters_survive_normalization(
            params: StandingParams,
            offset in 0i64..100_000_000,
        ) {
            let mut standing = standing_from_params(&params);
            let warnings = standing.warning_count;
            let bans = standing.cumulative_ban_count;

            standing.normalize(params.created_at + offset);
            prop_assert_eq!(standing.warning_count, warnings);
            prop_assert_eq!(standing.cumulative_ban_count, bans);
        }

        #[test]
        fn test_standing_survives_json_round_trip(params: StandingParams) {
            let standing = standing_from_params(&params);
            let json = serde_json::to_string(&standing).unwrap();
            let back: UserStanding = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(standing, back);
        }

        #[test]
        fn test_new_draft_upholds_invariant(item in draft_item()) {
            prop_assert!(item.invariant_holds());
            prop_assert!(!item.soft_deleted);
        }
    }
}
