//! # Modera
//!
//! The unified API for the moderation kernel: content lifecycle, user
//! standing, and authorization policy behind one facade.
//!
//! ## Overview
//!
//! The kernel is built from three machines:
//!
//! - **Content lifecycle**: draft, audit, publish, ban, restore, archive,
//!   soft delete. Audit status gates publishing: Published always implies
//!   Approved.
//! - **User standing**: post-permission grants (optionally time-boxed),
//!   bans (time-boxed or indefinite), warnings, with lazy expiration.
//! - **Policy**: a pure allow/deny function over current standing, role,
//!   and membership tier, re-reading state on every call.
//!
//! ## Key Concepts
//!
//! - **Lazy expiration**: reads compute effective values without writing;
//!   the cleanup sweep and mutating calls persist the correction.
//! - **Optimistic concurrency**: every aggregate carries a version; a
//!   conflicting save fails retryably instead of losing an update.
//! - **Explicit requester context**: every call takes the acting user's
//!   id, role, and tier. No ambient session state.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use modera::{ContentModeration, ModerationConfig};
//! use modera::core::{AccessLevel, Actor, CategoryId, ContentId, SystemClock, UserId};
//! use modera::store::SqliteStore;
//!
//! async fn example() {
//!     let store = Arc::new(SqliteStore::open("moderation.db").unwrap());
//!     let modera = ContentModeration::new(store, SystemClock, ModerationConfig::default());
//!
//!     let author = Actor::user(UserId::new(10));
//!     let item = modera
//!         .create_draft(ContentId::new(1), CategoryId::new(1), AccessLevel::Free, author)
//!         .await
//!         .unwrap();
//!
//!     modera.submit_for_audit(item.id, author).await.unwrap();
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `modera::core` - Types, state machines, and errors
//! - `modera::store` - Storage abstraction, SQLite, and in-memory stores
//! - `modera::standing` - The standing service
//! - `modera::policy` - The authorization policy evaluator

pub mod error;
pub mod moderation;

// Re-export component crates
pub use modera_core as core;
pub use modera_policy as policy;
pub use modera_standing as standing;
pub use modera_store as store;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use moderation::{ContentModeration, ModerationConfig};

// Re-export commonly used component types
pub use modera_core::{
    AccessLevel, Actor, AuditStatus, AuditVerdict, CategoryId, Clock, ContentId, ContentItem,
    LifecycleStatus, MembershipTier, PostPermissionLevel, Role, SystemClock, Timestamp, UserId,
    UserStanding,
};
pub use modera_policy::{Action, Decision, DenyReason, Requester};
pub use modera_standing::{StandingService, StandingSnapshot};
