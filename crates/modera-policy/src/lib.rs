//! # Modera Policy
//!
//! The authorization policy evaluator: combines a requester's standing,
//! role, and membership tier with (optionally) a target content item into
//! an allow/deny decision with a reason.
//!
//! The core is the pure [`evaluate_rules`] function; [`PolicyEvaluator`]
//! wraps it with store reads so every invocation sees current state.
//! Decisions are advisory: the lifecycle operations re-validate with
//! their own guards, so an Allow observed here can still fail there if
//! state moved in between.

pub mod action;
pub mod decision;
pub mod error;
pub mod evaluator;

pub use action::Action;
pub use decision::{Decision, DenyReason};
pub use error::{PolicyError, Result};
pub use evaluator::{evaluate_rules, PolicyEvaluator, Requester};
