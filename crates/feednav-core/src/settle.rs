#![forbid(unsafe_code)]

//! Scroll-settle detection.
//!
//! After an animated `scrollTo`, the browser emits a stream of `scroll`
//! events. [`ScrollSettle`] turns that stream into a single resolution:
//!
//! - [`SettleOutcome::Settled`]: at least one scroll event was seen and the
//!   stream has then been quiet for `quiet`.
//! - [`SettleOutcome::TimedOut`]: `timeout` elapsed since [`ScrollSettle::begin`]
//!   without settling. The in-flight scroll is left alone.
//! - [`SettleOutcome::Superseded`]: a new `begin` replaced the pending wait.
//!
//! Each wait is identified by a [`SettleTicket`] so the caller can tell which
//! continuation a resolution belongs to. Like [`crate::debounce::Debouncer`],
//! the primitive is driven entirely by host-supplied timestamps.
//!
//! # State machine
//!
//! ```text
//!            begin              scroll (before timeout)
//!   Idle ───────────▶ Pending ◀─────────────────┐
//!    ▲                  │  │                     │
//!    │                  │  └─────────────────────┘
//!    │   quiet elapsed  │  timeout elapsed │ begin again
//!    └── Settled ◀──────┘  TimedOut ◀──────┘ Superseded (+ new Pending)
//! ```

use core::time::Duration;

/// Default quiet window after the last scroll event.
pub const DEFAULT_SETTLE_QUIET: Duration = Duration::from_millis(50);

/// Default bound on the whole wait.
pub const DEFAULT_SETTLE_TIMEOUT: Duration = Duration::from_millis(3000);

/// Identifies one settle wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SettleTicket(u64);

impl SettleTicket {
    /// Raw sequence number, for logs.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// How a settle wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    Settled,
    TimedOut,
    Superseded,
}

impl SettleOutcome {
    /// Stable label for structured logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Settled => "settled",
            Self::TimedOut => "timed_out",
            Self::Superseded => "superseded",
        }
    }
}

/// A resolved wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub ticket: SettleTicket,
    pub outcome: SettleOutcome,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    ticket: SettleTicket,
    timeout_at: Duration,
    last_scroll: Option<Duration>,
}

/// Cancellable wait for an animated scroll to come to rest.
#[derive(Debug, Clone)]
pub struct ScrollSettle {
    quiet: Duration,
    timeout: Duration,
    next_ticket: u64,
    pending: Option<Pending>,
}

impl Default for ScrollSettle {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE_QUIET, DEFAULT_SETTLE_TIMEOUT)
    }
}

impl ScrollSettle {
    #[must_use]
    pub const fn new(quiet: Duration, timeout: Duration) -> Self {
        Self {
            quiet,
            timeout,
            next_ticket: 0,
            pending: None,
        }
    }

    /// Start a new wait at `now`.
    ///
    /// Returns the new ticket and, if a wait was already pending, its
    /// `Superseded` resolution.
    pub fn begin(&mut self, now: Duration) -> (SettleTicket, Option<Resolution>) {
        let superseded = self.pending.take().map(|old| Resolution {
            ticket: old.ticket,
            outcome: SettleOutcome::Superseded,
        });
        let ticket = SettleTicket(self.next_ticket);
        self.next_ticket = self.next_ticket.wrapping_add(1);
        self.pending = Some(Pending {
            ticket,
            timeout_at: now.saturating_add(self.timeout),
            last_scroll: None,
        });
        (ticket, superseded)
    }

    /// Abandon the pending wait without a new one. Resolves as `Superseded`.
    pub fn cancel(&mut self) -> Option<Resolution> {
        self.pending.take().map(|old| Resolution {
            ticket: old.ticket,
            outcome: SettleOutcome::Superseded,
        })
    }

    /// Record a scroll event at `now`.
    ///
    /// Events at or after the timeout do not extend the wait.
    pub fn on_scroll(&mut self, now: Duration) {
        if let Some(pending) = &mut self.pending
            && now < pending.timeout_at
        {
            pending.last_scroll = Some(now);
        }
    }

    /// Ticket of the pending wait, if any.
    #[must_use]
    pub fn pending_ticket(&self) -> Option<SettleTicket> {
        self.pending.map(|p| p.ticket)
    }

    /// Whether a wait is in flight.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Earliest instant at which [`poll`](Self::poll) may resolve.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.pending.map(|p| match self.settle_at(&p) {
            Some(settle_at) => settle_at.min(p.timeout_at),
            None => p.timeout_at,
        })
    }

    /// Resolve the pending wait if it is due at `now`.
    ///
    /// When both the quiet window and the timeout have elapsed, whichever
    /// became due first wins; a tie goes to the timeout.
    pub fn poll(&mut self, now: Duration) -> Option<Resolution> {
        let pending = self.pending?;
        let settled = self
            .settle_at(&pending)
            .filter(|&at| at < pending.timeout_at && now >= at);
        let outcome = if settled.is_some() {
            SettleOutcome::Settled
        } else if now >= pending.timeout_at {
            SettleOutcome::TimedOut
        } else {
            return None;
        };
        self.pending = None;
        Some(Resolution {
            ticket: pending.ticket,
            outcome,
        })
    }

    fn settle_at(&self, pending: &Pending) -> Option<Duration> {
        pending
            .last_scroll
            .map(|last| last.saturating_add(self.quiet))
    }
}
