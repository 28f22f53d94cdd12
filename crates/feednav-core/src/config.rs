#![forbid(unsafe_code)]

//! Fixed navigator configuration.
//!
//! There are no user-facing settings. [`Config::default`] carries the
//! bindings, selectors and timings for the target feed page; the struct is
//! public so harnesses can shorten timings or swap policies.

use core::time::Duration;

use crate::input::Keymap;
use crate::settle::{DEFAULT_SETTLE_QUIET, DEFAULT_SETTLE_TIMEOUT};

/// CSS selectors describing the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selectors {
    /// Post containers, tried in order; the first present one is used.
    pub containers: &'static [&'static str],
    /// Post entries inside the container.
    pub post: &'static str,
    /// Advertisement placeholder; its parent subtree is removed.
    pub ad_placeholder: &'static str,
    /// Fixed header whose height offsets all scroll math.
    pub header: &'static str,
    /// Matches while a modal layer covers the feed.
    pub layer: &'static str,
    /// Like / reaction controls inside a post, tried in order.
    pub like: &'static [&'static str],
    /// Hide-or-restore controls inside a post, in priority order.
    pub hide_or_restore: &'static [&'static str],
    /// Carousel "previous photo" arrows inside a post.
    pub photo_prev: &'static [&'static str],
    /// Carousel "next photo" arrows inside a post.
    pub photo_next: &'static [&'static str],
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            containers: &["#page_wall_posts", "#feed_rows"],
            post: r#"[data-post-id][class*="page"]:not([data-ad-block-uid])"#,
            ad_placeholder: "#ads_feed_placeholder",
            header: "#page_header_cont",
            layer: "body.layers_shown, body.article_body_layer",
            like: &[
                r#"a[onclick*="Likes.toggle"]"#,
                r#"button[data-like-button-type="like"]"#,
            ],
            hide_or_restore: &[
                r#"a[onclick*=".restorePost"]"#,
                r#"a[onclick*=".deletePost"]"#,
                r#"a[onclick*=".unignoreItem"]"#,
                r#"a[onclick*=".ignoreItem"]"#,
            ],
            photo_prev: &[
                r#"[class*="Carousel__arrow--prev"]"#,
                r#"[data-carousel-nav="prev"]"#,
            ],
            photo_next: &[
                r#"[class*="Carousel__arrow--next"]"#,
                r#"[data-carousel-nav="next"]"#,
            ],
        }
    }
}

/// Quiet periods and bounds for the deferred operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Debounce before re-checking that the active post is in view.
    pub drift_check: Duration,
    /// Debounce before refocusing after hide/restore.
    pub refocus: Duration,
    /// Scroll silence that counts as "settled".
    pub settle_quiet: Duration,
    /// Bound on waiting for a scroll to settle.
    pub settle_timeout: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            drift_check: Duration::from_millis(100),
            refocus: Duration::from_millis(150),
            settle_quiet: DEFAULT_SETTLE_QUIET,
            settle_timeout: DEFAULT_SETTLE_TIMEOUT,
        }
    }
}

/// Visual marker for the active post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    /// Class toggled on the active post.
    pub class: &'static str,
    /// Declarations applied to that class.
    pub declarations: &'static str,
}

impl Default for Highlight {
    fn default() -> Self {
        Self {
            class: "feednav-active-post",
            declarations: "box-shadow: rgba(89, 125, 163, 0.66) 0px 0px 5px 2px !important;",
        }
    }
}

impl Highlight {
    /// Style sheet injected once at startup.
    #[must_use]
    pub fn style_sheet(&self) -> String {
        format!(".{} {{ {} }}", self.class, self.declarations)
    }
}

/// What "previous post" does when the first post is already the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstPostPolicy {
    /// Scroll back to the first post and keep it focused.
    #[default]
    Refocus,
    /// Do nothing.
    Stay,
}

/// Complete navigator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    pub selectors: Selectors,
    pub keymap: Keymap,
    pub timing: Timing,
    pub highlight: Highlight,
    pub first_post: FirstPostPolicy,
}
