//! Error types for the moderation facade.

use modera_core::{ContentId, StandingError, TransitionError};
use modera_policy::DenyReason;
use modera_store::StoreError;
use thiserror::Error;

/// Errors from facade operations.
///
/// Authorization denials surface as [`Error::Denied`] with the policy
/// reason; they are decisions, not faults, but the facade's mutating
/// operations refuse to proceed past one.
#[derive(Debug, Error)]
pub enum Error {
    /// A content lifecycle guard rejected the transition.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// A standing rule rejected the operation.
    #[error(transparent)]
    Standing(#[from] StandingError),

    /// Storage error, including optimistic-concurrency conflicts.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// The policy evaluator denied the action.
    #[error("denied: {0}")]
    Denied(DenyReason),

    /// The content item does not exist, or is soft-deleted on a read path.
    #[error("content {0} not found")]
    ContentNotFound(ContentId),

    /// Retention archiving is disabled in the configuration.
    #[error("retention archiving is disabled")]
    RetentionDisabled,
}

impl Error {
    /// Whether re-reading current state and re-applying could succeed.
    /// True only for version conflicts; every transition is re-derivable
    /// from current state, so a retry after a conflict is always safe.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Store(StoreError::Conflict { .. }))
    }
}

impl From<modera_standing::Error> for Error {
    fn from(err: modera_standing::Error) -> Self {
        match err {
            modera_standing::Error::Standing(e) => Error::Standing(e),
            modera_standing::Error::Store(e) => Error::Store(e),
        }
    }
}

/// Result type for facade operations.
pub type Result<T> = std::result::Result<T, Error>;
