//! A manually-driven clock for deterministic time in tests.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use modera_core::{Clock, Timestamp};

/// A [`Clock`] whose time only moves when the test says so.
///
/// Clones share the same underlying time, so a clone handed to a service
/// under test can be advanced from the test body.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start)),
        }
    }

    /// Move time forward by `delta` milliseconds.
    pub fn advance(&self, delta: Timestamp) {
        self.now.fetch_add(delta, Ordering::SeqCst);
    }

    /// Jump to an absolute time.
    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}
