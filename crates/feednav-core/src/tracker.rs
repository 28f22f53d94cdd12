#![forbid(unsafe_code)]

//! Active-post tracking.
//!
//! The tracker owns the single "active post" slot, the highlight class on
//! that post and the registration of the drift-check scroll listener.
//!
//! # States
//!
//! ```text
//!              set_active(p)                      set_active(q)
//!   ┌──────┐ ───────────────▶ ┌─────────────┐ ───────────────────┐
//!   │ Idle │                  │ Focused(p)  │   (unset p first)  │
//!   └──────┘ ◀─────────────── └─────────────┘ ◀──────────────────┘
//!              unset / drift
//! ```
//!
//! # Invariants
//!
//! 1. At most one element carries the highlight class, and only while it is
//!    the active post.
//! 2. Unsetting while `Idle` is a no-op.
//! 3. The drift listener is never registered while `Idle`.

use tracing::trace;

use crate::page::{Page, ScrollListener, ScrollListeners};

/// Observable tracker state.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerState<E> {
    Idle,
    Focused(E),
}

/// Holds at most one focused post and its scroll-listener registrations.
#[derive(Debug)]
pub struct ActivePostTracker<E> {
    class: &'static str,
    active: Option<E>,
    listeners: ScrollListeners,
}

impl<E: Clone + PartialEq + core::fmt::Debug> ActivePostTracker<E> {
    /// Create an idle tracker that marks the active post with `class`.
    #[must_use]
    pub const fn new(class: &'static str) -> Self {
        Self {
            class,
            active: None,
            listeners: ScrollListeners::empty(),
        }
    }

    /// Currently focused post.
    #[must_use]
    pub fn active(&self) -> Option<&E> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn state(&self) -> TrackerState<E> {
        match &self.active {
            Some(post) => TrackerState::Focused(post.clone()),
            None => TrackerState::Idle,
        }
    }

    /// Scroll listeners this tracker has registered with the page.
    #[must_use]
    pub const fn listeners(&self) -> ScrollListeners {
        self.listeners
    }

    /// Whether the drift-check listener is attached.
    #[must_use]
    pub const fn drift_armed(&self) -> bool {
        self.listeners.has(ScrollListener::Drift)
    }

    /// Focus `post`: clear the previous focus, then highlight `post`.
    ///
    /// The drift listener is not armed here; see [`arm_drift`](Self::arm_drift).
    /// Re-focusing the current post is allowed and refreshes the highlight.
    pub fn set_active<P>(&mut self, page: &mut P, post: E)
    where
        P: Page<Element = E> + ?Sized,
    {
        self.unset(page);
        page.add_class(&post, self.class);
        trace!(post = ?post, "post focused");
        self.active = Some(post);
    }

    /// Clear the focus: drop the highlight and disarm the drift listener.
    ///
    /// Returns the post that was active, if any.
    pub fn unset<P>(&mut self, page: &mut P) -> Option<E>
    where
        P: Page<Element = E> + ?Sized,
    {
        let previous = self.active.take()?;
        page.remove_class(&previous, self.class);
        self.disarm_drift(page);
        trace!(post = ?previous, "post unfocused");
        Some(previous)
    }

    /// Attach the drift listener. Does nothing while `Idle`.
    pub fn arm_drift<P>(&mut self, page: &mut P) -> bool
    where
        P: Page<Element = E> + ?Sized,
    {
        if self.active.is_none() {
            return false;
        }
        self.listeners.attach(page, ScrollListener::Drift)
    }

    pub fn disarm_drift<P>(&mut self, page: &mut P) -> bool
    where
        P: Page<Element = E> + ?Sized,
    {
        self.listeners.detach(page, ScrollListener::Drift)
    }

    /// Attach the settle-detection listener.
    pub fn listen_settle<P>(&mut self, page: &mut P) -> bool
    where
        P: Page<Element = E> + ?Sized,
    {
        self.listeners.attach(page, ScrollListener::Settle)
    }

    pub fn unlisten_settle<P>(&mut self, page: &mut P) -> bool
    where
        P: Page<Element = E> + ?Sized,
    {
        self.listeners.detach(page, ScrollListener::Settle)
    }
}
