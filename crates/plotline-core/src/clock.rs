//! Injected time sources.
//!
//! The compactor never reads the clock itself; the driving
//! [`Recorder`](crate::session::Recorder) does, through this trait, so
//! every decision is deterministic and testable without real waiting.

use std::cell::Cell;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::record::Timestamp;

/// A time source supplying non-decreasing tick timestamps.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time as seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before Unix epoch")
            .as_secs_f64()
    }
}

/// A settable clock for deterministic tests and replay drivers.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Timestamp>,
}

impl ManualClock {
    #[must_use]
    pub const fn starting_at(now: Timestamp) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.now.set(now);
    }

    pub fn advance(&self, seconds: f64) {
        self.now.set(self.now.get() + seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_set_and_advance() {
        let clock = ManualClock::starting_at(10.0);
        assert_eq!(clock.now(), 10.0);
        clock.advance(0.5);
        assert_eq!(clock.now(), 10.5);
        clock.set(42.0);
        assert_eq!(clock.now(), 42.0);
    }

    #[test]
    fn system_clock_is_past_epoch() {
        assert!(SystemClock.now() > 0.0);
    }
}
