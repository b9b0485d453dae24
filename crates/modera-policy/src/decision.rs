//! Allow/deny decisions and their reasons.
//!
//! A denial is a decision, not an error: callers branch on it, log it,
//! and surface it to the requester. Errors are reserved for malformed
//! requests and store failures.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why an action was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// The requester is banned and the action is a content write.
    UserBanned,
    /// The target belongs to someone else and the requester is not admin.
    NotOwner,
    /// The requester's effective permission level is below the action's.
    InsufficientPermission,
    /// The content requires a higher membership tier to read.
    AccessLevelTooLow,
    /// The action requires the audit or admin role.
    RoleRequired,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DenyReason::UserBanned => "user_banned",
            DenyReason::NotOwner => "not_owner",
            DenyReason::InsufficientPermission => "insufficient_permission",
            DenyReason::AccessLevelTooLow => "access_level_too_low",
            DenyReason::RoleRequired => "role_required",
        };
        write!(f, "{}", s)
    }
}

/// The evaluator's verdict on one action request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "decision", content = "reason")]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Allow => write!(f, "allow"),
            Decision::Deny(reason) => write!(f, "deny({})", reason),
        }
    }
}
