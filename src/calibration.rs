//! Recalibration deadline
//!
//! The PLL should be recalibrated periodically after a channel change. The
//! driver only keeps the deadline; an external periodic caller polls
//! [`CalibrationDeadline::is_due`] and runs the calibration itself.

use core::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationDeadline {
    interval: Duration,
    deadline: Option<Duration>,
}

impl CalibrationDeadline {
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    /// Restarts the interval from `now`. Called on every channel change.
    pub fn arm(&mut self, now: Duration) {
        self.deadline = Some(now.saturating_add(self.interval));
    }

    /// Returns `true` once the interval has elapsed, or when no channel was ever set.
    pub fn is_due(&self, now: Duration) -> bool {
        self.deadline.map_or(true, |deadline| now >= deadline)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }
}
