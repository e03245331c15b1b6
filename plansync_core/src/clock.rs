//! Sleep seam for retry backoff and rate-limit delays.

use std::cell::RefCell;
use std::time::Duration;

/// Something that can pause the current thread
pub trait Clock {
    fn sleep(&self, duration: Duration);
}

/// Real wall-clock sleeping
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Returns immediately
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopClock;

impl Clock for NoopClock {
    fn sleep(&self, _duration: Duration) {}
}

/// Records every requested sleep without waiting
#[derive(Debug, Default)]
pub struct RecordingClock {
    sleeps: RefCell<Vec<Duration>>,
}

impl RecordingClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }

    pub fn total(&self) -> Duration {
        self.sleeps.borrow().iter().sum()
    }
}

impl Clock for RecordingClock {
    fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
    }
}
