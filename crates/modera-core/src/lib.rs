//! # Modera Core
//!
//! Pure domain model for the moderation kernel: content lifecycle and user
//! standing state machines, plus the strong types they share.
//!
//! This crate contains no I/O, no storage, no async. It is pure computation
//! over moderation state; time enters only through the [`Clock`] trait or as
//! explicit `now` arguments to state methods.
//!
//! ## Key Types
//!
//! - [`ContentItem`] - A content item and its editorial/audit state machine
//! - [`UserStanding`] - A user's permission/ban/warning record
//! - [`Actor`] - Explicit requester context (id + role) for every call
//! - [`Clock`] - Injected time source for deterministic expiry logic

pub mod clock;
pub mod content;
pub mod error;
pub mod standing;
pub mod types;

pub use clock::{Clock, SystemClock, Timestamp};
pub use content::{AuditStatus, AuditVerdict, ContentItem, LifecycleStatus};
pub use error::{StandingError, StandingResult, TransitionError, TransitionResult};
pub use standing::{HistoryEntry, PostPermissionLevel, StandingEvent, UserStanding};
pub use types::{AccessLevel, Actor, CategoryId, ContentId, MembershipTier, Role, UserId};
