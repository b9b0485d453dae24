//! Error types for the core lifecycle machines.

use thiserror::Error;

use crate::content::{AuditStatus, LifecycleStatus};
use crate::types::UserId;

/// Errors from the content lifecycle state machine.
///
/// Every guard failure carries the attempted event and the state it was
/// attempted from; transitions outside the table are never silently ignored.
#[derive(Debug, Error)]
pub enum TransitionError {
    /// The event is not allowed from the item's current status.
    #[error("invalid transition: {event} not allowed from {status:?}")]
    InvalidTransition {
        event: &'static str,
        status: LifecycleStatus,
    },

    /// An audit verdict was reapplied after a differing final verdict.
    #[error("audit already finalized as {verdict:?}; item must be resubmitted")]
    AlreadyFinalized { verdict: AuditStatus },

    /// The actor is not the item's author.
    #[error("{actor} is not the owner; {event} requires the author")]
    NotOwner {
        actor: UserId,
        event: &'static str,
    },

    /// The actor's role does not permit this event.
    #[error("{actor} lacks the role required for {event}")]
    RoleRequired {
        actor: UserId,
        event: &'static str,
    },

    /// Malformed or missing required input (e.g. a blank reason).
    #[error("validation error: {0}")]
    Validation(String),
}

/// Errors from the user standing lifecycle machine.
#[derive(Debug, Error)]
pub enum StandingError {
    /// The acting user lacks the role required for this operation.
    #[error("{actor} lacks the role required to change standing")]
    Forbidden { actor: UserId },

    /// Unban was requested for a user who is not banned.
    #[error("{user} is not banned")]
    NotBanned { user: UserId },

    /// Malformed or missing required input (e.g. a blank ban reason).
    #[error("validation error: {0}")]
    Validation(String),
}

/// Result type for content transitions.
pub type TransitionResult<T> = std::result::Result<T, TransitionError>;

/// Result type for standing mutations.
pub type StandingResult<T> = std::result::Result<T, StandingError>;
