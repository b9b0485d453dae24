//! Strong type definitions for the moderation kernel.
//!
//! All identifiers are newtypes to prevent misuse at compile time, and all
//! requester attributes (role, membership tier) are closed enums so that
//! adding a variant is a compile-time-visible change.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl UserId {
    /// Create a new UserId from a raw value.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw value.
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user:{}", self.0)
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Identifier for a content item (article, post).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentId(pub u64);

impl ContentId {
    /// Create a new ContentId from a raw value.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw value.
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "content:{}", self.0)
    }
}

impl From<u64> for ContentId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Identifier for a content category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoryId(pub u64);

impl CategoryId {
    /// Create a new CategoryId from a raw value.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw value.
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "category:{}", self.0)
    }
}

impl From<u64> for CategoryId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Requester role, orthogonal to forum standing.
///
/// A banned admin is still an admin for role-evaluation purposes; ban state
/// only gates content-write actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Ordinary forum participant.
    RegularUser,
    /// May approve or reject content under review.
    AuditActor,
    /// Full moderation powers: ban, restore, archive, standing changes.
    AdminActor,
}

impl Role {
    /// Whether this role may perform audit verdicts.
    pub fn can_audit(&self) -> bool {
        matches!(self, Role::AuditActor | Role::AdminActor)
    }

    /// Whether this role carries admin powers.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::AdminActor)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::RegularUser => "regular_user",
            Role::AuditActor => "audit_actor",
            Role::AdminActor => "admin_actor",
        };
        write!(f, "{}", s)
    }
}

/// Membership tier of a requester, used only for read-access gating.
///
/// Ordering: Free < Member < Premium.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum MembershipTier {
    #[default]
    Free,
    Member,
    Premium,
}

impl MembershipTier {
    /// Whether this tier satisfies a content item's required access level.
    pub fn satisfies(&self, required: AccessLevel) -> bool {
        self.rank() >= required.rank()
    }

    fn rank(&self) -> u8 {
        match self {
            MembershipTier::Free => 0,
            MembershipTier::Member => 1,
            MembershipTier::Premium => 2,
        }
    }
}

/// Reader access level required by a content item.
///
/// Independent of the author workflow: it gates who may *read* the item
/// once published, against the requester's [`MembershipTier`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    #[default]
    Free,
    Member,
    Premium,
}

impl AccessLevel {
    fn rank(&self) -> u8 {
        match self {
            AccessLevel::Free => 0,
            AccessLevel::Member => 1,
            AccessLevel::Premium => 2,
        }
    }
}

/// The explicit requester context passed into every lifecycle and policy
/// call. Replaces any ambient "current session" lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    /// Create an actor with the given id and role.
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// Convenience constructor for a regular user.
    pub const fn user(id: UserId) -> Self {
        Self::new(id, Role::RegularUser)
    }

    /// Convenience constructor for an audit actor.
    pub const fn auditor(id: UserId) -> Self {
        Self::new(id, Role::AuditActor)
    }

    /// Convenience constructor for an admin actor.
    pub const fn admin(id: UserId) -> Self {
        Self::new(id, Role::AdminActor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ordering() {
        assert!(MembershipTier::Free < MembershipTier::Member);
        assert!(MembershipTier::Member < MembershipTier::Premium);
    }

    #[test]
    fn test_tier_satisfies_access_level() {
        assert!(MembershipTier::Free.satisfies(AccessLevel::Free));
        assert!(!MembershipTier::Free.satisfies(AccessLevel::Member));
        assert!(MembershipTier::Member.satisfies(AccessLevel::Member));
        assert!(!MembershipTier::Member.satisfies(AccessLevel::Premium));
        assert!(MembershipTier::Premium.satisfies(AccessLevel::Premium));
        assert!(MembershipTier::Premium.satisfies(AccessLevel::Free));
    }

    #[test]
    fn test_role_powers() {
        assert!(!Role::RegularUser.can_audit());
        assert!(Role::AuditActor.can_audit());
        assert!(Role::AdminActor.can_audit());
        assert!(!Role::AuditActor.is_admin());
        assert!(Role::AdminActor.is_admin());
    }

    #[test]
    fn test_id_display() {
        assert_eq!(UserId::new(7).to_string(), "user:7");
        assert_eq!(ContentId::new(3).to_string(), "content:3");
    }
}
