//! # Modera Standing
//!
//! The user-standing lifecycle: post-permission grants (optionally
//! time-boxed), bans (time-boxed or indefinite), warnings, and the cleanup
//! sweep that persists lazy expirations.
//!
//! The pure state machine lives in `modera-core`
//! ([`modera_core::UserStanding`]); this crate wires it to a
//! [`modera_store::StandingStore`] and enforces the admin-role requirement
//! on every mutation.

pub mod error;
pub mod service;

pub use error::{Error, Result};
pub use service::{BanInfo, CleanupReport, StandingService, StandingSnapshot};
