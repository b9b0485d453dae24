//! Error types for the standing service.

use modera_core::StandingError;
use modera_store::StoreError;
use thiserror::Error;

/// Errors from standing-service operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A domain rule rejected the operation.
    #[error(transparent)]
    Standing(#[from] StandingError),

    /// The underlying store failed or reported a version conflict.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl Error {
    /// Whether a retry with a fresh read could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Store(StoreError::Conflict { .. }))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
