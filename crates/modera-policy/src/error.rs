//! Error types for policy evaluation.

use modera_core::ContentId;
use modera_store::StoreError;
use thiserror::Error;

use crate::action::Action;

/// Errors from the store-backed evaluator. Denials are not errors; they
/// come back as [`crate::Decision::Deny`].
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The action operates on a content item but no target id was given.
    #[error("action {action} requires a target content id")]
    TargetRequired { action: Action },

    /// The target content item does not exist.
    #[error("content {0} not found")]
    ContentNotFound(ContentId),

    /// The underlying store failed.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, PolicyError>;
