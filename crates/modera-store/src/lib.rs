//! # Modera Store
//!
//! Storage abstraction for the moderation kernel. Provides trait-based
//! interfaces for content and standing persistence with SQLite and
//! in-memory implementations.
//!
//! ## Key Types
//!
//! - [`ContentStore`] / [`StandingStore`] - The async storage traits
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//!
//! ## Design Notes
//!
//! - **Optimistic concurrency**: every aggregate carries a version; a save
//!   from a stale copy returns [`StoreError::Conflict`] and writes nothing.
//!   The caller re-reads current state and re-applies — all transitions are
//!   re-derivable, so retry is always safe.
//! - **Soft deletion**: `load` returns soft-deleted items for restore;
//!   listing queries exclude them from read paths.

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{ContentStore, StandingStore, StandingStoreExt};
