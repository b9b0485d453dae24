//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Aggregate serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Schema migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// Record not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A concurrent writer won the race on this record. The caller may
    /// safely retry the whole operation: re-read, re-evaluate, re-apply.
    #[error("version conflict on {entity} {id}: expected {expected}, found {found}")]
    Conflict {
        entity: &'static str,
        id: String,
        expected: u64,
        found: u64,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
