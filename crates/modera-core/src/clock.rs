//! Time source abstraction.
//!
//! All expiry and history logic takes time from an injected [`Clock`] so
//! that lifecycle behavior is deterministic under test. Timestamps are Unix
//! milliseconds throughout.

/// A timestamp in Unix milliseconds.
pub type Timestamp = i64;

/// Supplies the current time.
pub trait Clock: Send + Sync {
    /// Current time in Unix milliseconds.
    fn now(&self) -> Timestamp;
}

/// Wall-clock implementation backed by `SystemTime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_millis() as i64
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}
