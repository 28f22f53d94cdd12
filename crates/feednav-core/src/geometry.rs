#![forbid(unsafe_code)]

//! Viewport geometry for post focusing.
//!
//! All rectangles are viewport-relative (the shape `getBoundingClientRect`
//! reports): `top == 0.0` is the upper edge of the visible area, negative
//! values lie above it. Only the vertical axis matters for a feed.

/// Vertical extent of an element relative to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Top edge in CSS pixels, relative to the viewport.
    pub top: f64,
    /// Rendered height in CSS pixels.
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Whether any part of the rectangle overlaps a viewport of
    /// `viewport_height` pixels. Touching the top edge still counts.
    #[inline]
    pub fn intersects_viewport(&self, viewport_height: f64) -> bool {
        self.top < viewport_height && self.bottom() >= 0.0
    }

    /// Whether the top edge sits at or below a fixed header of
    /// `header_height` pixels.
    #[inline]
    pub fn is_below_header(&self, header_height: f64) -> bool {
        self.top - header_height >= 0.0
    }
}

/// Scroll state of the window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Current vertical scroll offset (`window.scrollY`).
    pub scroll_y: f64,
    /// Visible height (`window.innerHeight`).
    pub height: f64,
    /// Total scrollable document height (`documentElement.scrollHeight`).
    pub scroll_height: f64,
}

impl Viewport {
    /// Create a viewport snapshot.
    #[inline]
    pub const fn new(scroll_y: f64, height: f64, scroll_height: f64) -> Self {
        Self {
            scroll_y,
            height,
            scroll_height,
        }
    }

    /// Largest offset the browser will actually scroll to.
    #[inline]
    pub fn max_scroll_y(&self) -> f64 {
        (self.scroll_height - self.height).max(0.0)
    }

    /// Clamp a requested offset into the scrollable range.
    #[inline]
    pub fn clamp_scroll(&self, y: f64) -> f64 {
        y.clamp(0.0, self.max_scroll_y())
    }
}

/// Offset to scroll to so that `post` ends up just below the fixed header.
///
/// The post's top is aligned under the header, then the offset is nudged up
/// by half of the slack left below the post. The nudge is never negative: a
/// post taller than the remaining viewport stays aligned to the header.
pub fn scroll_target(viewport: &Viewport, post: &Rect, header_height: f64) -> f64 {
    let aligned = (viewport.scroll_y + post.top - header_height).round();
    let slack = (viewport.height - header_height - post.height).ceil() / 2.0;
    aligned - slack.max(0.0)
}
