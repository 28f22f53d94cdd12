#![forbid(unsafe_code)]

//! Trailing-edge debounce driven by a host clock.
//!
//! A [`Debouncer`] collapses a burst of triggers into a single firing once the
//! trigger source has been quiet for `delay`. Every trigger cancels the pending
//! deadline and schedules a new one ("last call wins").
//!
//! The debouncer owns no timer. The host passes a monotonic `now` to
//! [`Debouncer::trigger`] and [`Debouncer::poll`], and may read
//! [`Debouncer::deadline`] to schedule its own wake-up. This keeps the quiet
//! periods testable with a fake clock.
//!
//! ```
//! use core::time::Duration;
//! use feednav_core::debounce::Debouncer;
//!
//! let mut refocus = Debouncer::new(Duration::from_millis(150));
//! refocus.trigger(Duration::from_millis(0));
//! refocus.trigger(Duration::from_millis(100));
//!
//! assert!(!refocus.poll(Duration::from_millis(200)));
//! assert!(refocus.poll(Duration::from_millis(250)));
//! assert!(!refocus.poll(Duration::from_millis(400))); // fires once
//! ```

use core::time::Duration;

/// Cancel-and-reschedule coalescing timer.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Duration>,
}

impl Debouncer {
    /// Create an idle debouncer with the given quiet period.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Quiet period required before firing.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a trigger at `now`, replacing any pending deadline.
    pub fn trigger(&mut self, now: Duration) {
        self.deadline = Some(now.saturating_add(self.delay));
    }

    /// Drop the pending firing, if any.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Whether a firing is scheduled.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Instant at which the pending firing becomes due.
    #[must_use]
    pub const fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Returns `true` exactly once when the pending deadline has passed.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
