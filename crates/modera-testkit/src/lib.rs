//! # Modera Testkit
//!
//! Testing utilities for the moderation kernel.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a shared memory store, canned actors per role, and
//!   builders that walk content to a wanted lifecycle state
//! - **ManualClock**: deterministic time that only moves when told to,
//!   for exercising expiry and the cleanup sweep
//! - **Generators**: proptest strategies for property-based testing
//!
//! ## Fixtures
//!
//! ```rust
//! use modera_testkit::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let item = fixture.make_published(1);
//! assert!(item.invariant_holds());
//! ```
//!
//! ## Deterministic time
//!
//! ```rust
//! use modera_core::Clock;
//! use modera_testkit::{ManualClock, HOUR};
//!
//! let clock = ManualClock::new(0);
//! clock.advance(2 * HOUR);
//! assert_eq!(clock.now(), 2 * HOUR);
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use modera_testkit::generators::{standing_from_params, StandingParams};
//!
//! proptest! {
//!     #[test]
//!     fn normalize_is_idempotent(params: StandingParams) {
//!         let mut standing = standing_from_params(&params);
//!         standing.normalize(params.created_at);
//!         let snapshot = standing.clone();
//!         standing.normalize(params.created_at);
//!         prop_assert_eq!(standing, snapshot);
//!     }
//! }
//! ```

pub mod clock;
pub mod fixtures;
pub mod generators;

pub use clock::ManualClock;
pub use fixtures::{TestFixture, EPOCH, HOUR};
pub use generators::{standing_from_params, StandingParams};
