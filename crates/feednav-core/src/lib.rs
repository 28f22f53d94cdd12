#![forbid(unsafe_code)]

//! Core: keyboard navigation between the posts of a social feed page.
//!
//! # Role in feednav
//! `feednav-core` holds every decision the navigator makes: which post comes
//! next, where to scroll, when a scroll has settled, when the focused post
//! has drifted out of view, and which keys do what. It never touches a
//! browser API directly; the host page is reached through the [`Page`] trait.
//!
//! # Primary responsibilities
//! - **PostLocator**: enumerate rendered, non-ad posts in document order.
//! - **ActivePostTracker**: at most one highlighted post plus its drift
//!   listener registration.
//! - **ScrollSettle**: bounded wait for an animated scroll to come to rest.
//! - **Keymap**: physical key codes to navigator actions.
//! - **Navigator**: the context object tying it all together.
//!
//! # How it fits
//! `feednav-web` implements [`Page`] over `web-sys`, forwards `keydown` and
//! `scroll` events, and drives [`Navigator::tick`] from a single
//! `setTimeout` scheduled at [`Navigator::next_deadline`]. Time is always an
//! explicit `Duration` argument, so every timing policy is testable with a
//! fake clock.

pub mod config;
pub mod debounce;
pub mod geometry;
pub mod input;
pub mod locator;
pub mod navigator;
pub mod page;
pub mod settle;
pub mod tracker;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use config::{Config, FirstPostPolicy};
pub use input::{Action, Dispatch, IgnoredReason, KeyInput, Keymap, Modifiers};
pub use navigator::Navigator;
pub use page::{Page, ScrollListener, ScrollListeners};
pub use tracker::TrackerState;
