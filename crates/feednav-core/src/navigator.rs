#![forbid(unsafe_code)]

//! The feed navigator: one explicit context object per page.
//!
//! [`Navigator`] wires the post locator, the active-post tracker, the scroll
//! settle wait and the two debounced follow-ups (drift check, refocus after
//! hide/restore) around a [`Page`]. The host owns it and feeds it three kinds
//! of input:
//!
//! - key presses via [`Navigator::handle_key`],
//! - window scroll events via [`Navigator::on_scroll`], tagged with the
//!   listener that received them,
//! - clock ticks via [`Navigator::tick`], scheduled at
//!   [`Navigator::next_deadline`].
//!
//! # Focus flow
//!
//! ```text
//! key ─▶ next/prev ─▶ locate posts ─▶ scroll_to_post
//!                                        │ unset old focus, highlight new
//!                                        │ smooth scroll + settle wait
//!                                        ▼
//!                     settled ─▶ arm drift listener
//!                     timed out / superseded ─▶ (nothing)
//!
//! scroll (drift) ─▶ debounce 100ms ─▶ active post out of view? ─▶ unset
//! ```
//!
//! Arming the drift listener only after the scroll settles keeps the
//! in-flight animation from unsetting the post it is scrolling to.

use core::time::Duration;

use tracing::{debug, debug_span, trace, warn};

use crate::config::{Config, FirstPostPolicy};
use crate::debounce::Debouncer;
use crate::geometry;
use crate::input::{Action, Dispatch, IgnoredReason, KeyInput};
use crate::locator::{PostLocator, find_visible_post};
use crate::page::{Page, ScrollListener, ScrollListeners};
use crate::settle::{Resolution, ScrollSettle, SettleOutcome, SettleTicket};
use crate::tracker::{ActivePostTracker, TrackerState};

/// Scroll distances below this are treated as "already there".
const IN_PLACE_EPSILON: f64 = 0.5;

/// Where next/prev navigation starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    /// The active post, at this index.
    Active(usize),
    /// No focus; the first post below the header, at this index.
    Visible(usize),
}

/// Keyboard-driven feed navigator over a host [`Page`].
#[derive(Debug)]
pub struct Navigator<P: Page> {
    page: P,
    config: Config,
    header_height: f64,
    tracker: ActivePostTracker<P::Element>,
    drift_check: Debouncer,
    refocus: Debouncer,
    settle: ScrollSettle,
    /// Settle wait whose success arms the drift listener.
    focus_ticket: Option<SettleTicket>,
}

impl<P: Page> Navigator<P> {
    /// Measure the fixed header and inject the highlight style.
    pub fn new(mut page: P, config: Config) -> Self {
        let header_height = match page.query(config.selectors.header) {
            Some(header) => page.client_height(&header),
            None => {
                warn!(selector = config.selectors.header, "header not found, using zero offset");
                0.0
            }
        };
        page.inject_style(&config.highlight.style_sheet());
        debug!(header_height, "navigator ready");

        Self {
            page,
            header_height,
            tracker: ActivePostTracker::new(config.highlight.class),
            drift_check: Debouncer::new(config.timing.drift_check),
            refocus: Debouncer::new(config.timing.refocus),
            settle: ScrollSettle::new(config.timing.settle_quiet, config.timing.settle_timeout),
            focus_ticket: None,
            config,
        }
    }

    #[must_use]
    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Header height measured at construction.
    #[must_use]
    pub fn header_height(&self) -> f64 {
        self.header_height
    }

    #[must_use]
    pub fn active_post(&self) -> Option<&P::Element> {
        self.tracker.active()
    }

    #[must_use]
    pub fn state(&self) -> TrackerState<P::Element> {
        self.tracker.state()
    }

    /// Scroll listeners currently attached to the window.
    #[must_use]
    pub fn listeners(&self) -> ScrollListeners {
        self.tracker.listeners()
    }

    /// Whether a modal layer covers the feed.
    #[must_use]
    pub fn is_layer_shown(&self) -> bool {
        self.page.query(self.config.selectors.layer).is_some()
    }

    // ---------------------------------------------------------------------
    // Input
    // ---------------------------------------------------------------------

    /// Dispatch a key press.
    ///
    /// Unbound keys and shortcut chords are ignored first; bound keys are
    /// then suppressed while a text field has focus or a layer is shown.
    pub fn handle_key(&mut self, key: &KeyInput, now: Duration) -> Dispatch {
        let action = match self.config.keymap.map(key) {
            Ok(action) => action,
            Err(reason) => return Dispatch::Ignored(reason),
        };
        let suppressed = if self.page.is_text_entry_focused() {
            Some(IgnoredReason::TextEntryFocused)
        } else if self.is_layer_shown() {
            Some(IgnoredReason::LayerShown)
        } else {
            None
        };
        if let Some(reason) = suppressed {
            trace!(code = %key.code, reason = reason.as_str(), "key suppressed");
            return Dispatch::Ignored(reason);
        }
        self.perform(action, now);
        Dispatch::Performed(action)
    }

    /// Run `action` unconditionally.
    pub fn perform(&mut self, action: Action, now: Duration) {
        let _span = debug_span!("feednav.action", action = action.as_str()).entered();
        let changed = match action {
            Action::PrevPost => self.prev_post(now),
            Action::NextPost => self.next_post(now),
            Action::PrevPhoto => self.prev_photo(),
            Action::NextPhoto => self.next_photo(),
            Action::Like => self.like_post(),
            Action::HideOrRestore => self.hide_or_restore_post(now),
        };
        if !changed {
            trace!("nothing to do");
        }
    }

    // ---------------------------------------------------------------------
    // Post navigation
    // ---------------------------------------------------------------------

    /// Focus the post after the active one, or the first post below the
    /// header when nothing is focused. Returns `false` if there is none.
    pub fn next_post(&mut self, now: Duration) -> bool {
        let posts = self.locate();
        let index = match self.anchor(&posts) {
            Some(Anchor::Active(i)) => i + 1,
            Some(Anchor::Visible(i)) => i,
            None => return false,
        };
        let Some(post) = posts.get(index).cloned() else {
            trace!(count = posts.len(), "no next post");
            return false;
        };
        debug!(index, count = posts.len(), "next post");
        self.scroll_to_post(post, now);
        true
    }

    /// Focus the post before the anchor (active post, or first post below the
    /// header). At the first post the [`FirstPostPolicy`] decides.
    pub fn prev_post(&mut self, now: Duration) -> bool {
        let posts = self.locate();
        let anchor = match self.anchor(&posts) {
            Some(Anchor::Active(i) | Anchor::Visible(i)) => i,
            None => return false,
        };
        let index = match (anchor.checked_sub(1), self.config.first_post) {
            (Some(i), _) => i,
            (None, FirstPostPolicy::Refocus) => 0,
            (None, FirstPostPolicy::Stay) => {
                trace!("already at first post");
                return false;
            }
        };
        let Some(post) = posts.get(index).cloned() else {
            return false;
        };
        debug!(index, count = posts.len(), "previous post");
        self.scroll_to_post(post, now);
        true
    }

    /// Scroll `post` under the header and make it the active post.
    ///
    /// The drift listener is armed once the scroll settles. If the page is
    /// already at the target offset, it is armed immediately.
    pub fn scroll_to_post(&mut self, post: P::Element, now: Duration) {
        let rect = self.page.bounding_rect(&post);
        let viewport = self.page.viewport();
        let target = viewport.clamp_scroll(geometry::scroll_target(
            &viewport,
            &rect,
            self.header_height,
        ));

        self.clear_focus();
        self.tracker.set_active(&mut self.page, post);

        if (target - viewport.scroll_y).abs() < IN_PLACE_EPSILON {
            if let Some(resolution) = self.settle.cancel() {
                self.log_resolution(resolution);
            }
            self.tracker.unlisten_settle(&mut self.page);
            self.tracker.arm_drift(&mut self.page);
            debug!(target_y = target, "post already in place");
            return;
        }

        self.page.scroll_to(target);
        let (ticket, superseded) = self.settle.begin(now);
        if let Some(resolution) = superseded {
            self.log_resolution(resolution);
        }
        self.focus_ticket = Some(ticket);
        self.tracker.listen_settle(&mut self.page);
        debug!(target_y = target, ticket = ticket.get(), "scrolling to post");
    }

    // ---------------------------------------------------------------------
    // Post actions
    // ---------------------------------------------------------------------

    /// Click the like control of the active post.
    pub fn like_post(&mut self) -> bool {
        let Some(control) = self.active_control(self.config.selectors.like) else {
            return false;
        };
        self.page.click(&control);
        // Close the reactions popup the click opened under the pointer.
        self.page.mouse_out(&control);
        debug!("liked active post");
        true
    }

    /// Trigger restore, delete, unignore or ignore on the active post,
    /// whichever is found first, then refocus it once the layout calms down.
    pub fn hide_or_restore_post(&mut self, now: Duration) -> bool {
        let Some(control) = self.active_control(self.config.selectors.hide_or_restore) else {
            return false;
        };
        self.page.click(&control);
        self.refocus.trigger(now);
        debug!("hide/restore triggered");
        true
    }

    /// Show the previous photo of the active post's carousel.
    pub fn prev_photo(&mut self) -> bool {
        self.click_active_control(self.config.selectors.photo_prev)
    }

    /// Show the next photo of the active post's carousel.
    pub fn next_photo(&mut self) -> bool {
        self.click_active_control(self.config.selectors.photo_next)
    }

    // ---------------------------------------------------------------------
    // Host events
    // ---------------------------------------------------------------------

    /// A window `scroll` event delivered to `listener`.
    pub fn on_scroll(&mut self, listener: ScrollListener, now: Duration) {
        match listener {
            ScrollListener::Drift => {
                if self.tracker.drift_armed() {
                    self.drift_check.trigger(now);
                }
            }
            ScrollListener::Settle => self.settle.on_scroll(now),
        }
    }

    /// Run everything that has become due at `now`.
    pub fn tick(&mut self, now: Duration) {
        if let Some(resolution) = self.settle.poll(now) {
            self.on_settled(resolution);
        }
        if self.drift_check.poll(now) {
            self.check_drift();
        }
        if self.refocus.poll(now) {
            self.refocus_active(now);
        }
    }

    /// Earliest instant at which [`tick`](Self::tick) has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        [
            self.settle.deadline(),
            self.drift_check.deadline(),
            self.refocus.deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn locate(&mut self) -> Vec<P::Element> {
        PostLocator::new(&self.config.selectors).find_posts(&mut self.page)
    }

    fn anchor(&mut self, posts: &[P::Element]) -> Option<Anchor> {
        let position = self
            .tracker
            .active()
            .map(|active| posts.iter().position(|post| post == active));
        match position {
            Some(Some(index)) => return Some(Anchor::Active(index)),
            Some(None) => {
                debug!("active post left the feed");
                self.clear_focus();
            }
            None => {}
        }
        find_visible_post(&self.page, posts, self.header_height).map(Anchor::Visible)
    }

    fn clear_focus(&mut self) -> Option<P::Element> {
        self.drift_check.cancel();
        self.focus_ticket = None;
        self.tracker.unset(&mut self.page)
    }

    fn active_control(&self, selectors: &[&str]) -> Option<P::Element> {
        let active = self.tracker.active()?;
        selectors
            .iter()
            .find_map(|selector| self.page.query_within(active, selector))
    }

    fn click_active_control(&mut self, selectors: &[&str]) -> bool {
        let Some(control) = self.active_control(selectors) else {
            return false;
        };
        self.page.click(&control);
        true
    }

    fn on_settled(&mut self, resolution: Resolution) {
        self.tracker.unlisten_settle(&mut self.page);
        self.log_resolution(resolution);
        if self.focus_ticket != Some(resolution.ticket) {
            return;
        }
        self.focus_ticket = None;
        if resolution.outcome == SettleOutcome::Settled {
            self.tracker.arm_drift(&mut self.page);
        }
    }

    fn check_drift(&mut self) {
        let Some(active) = self.tracker.active().cloned() else {
            return;
        };
        if self.is_layer_shown() {
            trace!("layer shown, drift check skipped");
            return;
        }
        let in_view = self.page.is_connected(&active)
            && self
                .page
                .bounding_rect(&active)
                .intersects_viewport(self.page.viewport().height);
        if !in_view {
            debug!("active post scrolled out of view");
            self.clear_focus();
        }
    }

    fn refocus_active(&mut self, now: Duration) {
        let Some(active) = self.tracker.active().cloned() else {
            return;
        };
        if !self.page.is_connected(&active) {
            debug!("active post detached before refocus");
            self.clear_focus();
            return;
        }
        self.scroll_to_post(active, now);
    }

    fn log_resolution(&self, resolution: Resolution) {
        debug!(
            ticket = resolution.ticket.get(),
            outcome = resolution.outcome.as_str(),
            "scroll settle resolved"
        );
    }
}
