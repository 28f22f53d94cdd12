#![forbid(unsafe_code)]

//! The host page seen through the navigator's eyes.
//!
//! [`Page`] is the whole DOM surface the navigator reads and writes. A
//! wasm build implements it over `web-sys`; tests use the in-memory
//! `FakePage` from the `testing` module.
//!
//! Elements are opaque handles compared by identity: two handles are equal
//! iff they name the same node. The navigator never keys posts by their
//! `data-post-id`.

use core::fmt;

use bitflags::bitflags;

use crate::geometry::{Rect, Viewport};

/// One of the window-level `scroll` listeners the navigator registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollListener {
    /// Debounced check that the active post is still in view.
    Drift,
    /// Settle detection for an in-flight animated scroll.
    Settle,
}

impl ScrollListener {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Drift => "drift",
            Self::Settle => "settle",
        }
    }

    pub(crate) const fn flag(self) -> ScrollListeners {
        match self {
            Self::Drift => ScrollListeners::DRIFT,
            Self::Settle => ScrollListeners::SETTLE,
        }
    }
}

bitflags! {
    /// Set of scroll listeners currently attached to the window.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ScrollListeners: u8 {
        const DRIFT  = 0b01;
        const SETTLE = 0b10;
    }
}

impl ScrollListeners {
    /// Whether `listener` is registered.
    #[must_use]
    pub const fn has(self, listener: ScrollListener) -> bool {
        self.contains(listener.flag())
    }

    /// Register `listener` unless it already is. Returns `true` if the page
    /// was asked to attach it.
    pub fn attach<P: Page + ?Sized>(&mut self, page: &mut P, listener: ScrollListener) -> bool {
        if self.has(listener) {
            return false;
        }
        page.listen_scroll(listener);
        self.insert(listener.flag());
        true
    }

    /// Unregister `listener` if it is registered. Returns `true` if the page
    /// was asked to detach it.
    pub fn detach<P: Page + ?Sized>(&mut self, page: &mut P, listener: ScrollListener) -> bool {
        if !self.has(listener) {
            return false;
        }
        page.unlisten_scroll(listener);
        self.remove(listener.flag());
        true
    }
}

/// DOM read/write surface of the host page.
///
/// Every method is infallible: a lookup that fails in the browser is reported
/// as absence (`None`, empty `Vec`, `false`) and mutations that fail are
/// dropped by the implementation after logging.
pub trait Page {
    /// Handle to a DOM element, compared by node identity.
    type Element: Clone + PartialEq + fmt::Debug;

    /// First element in the document matching `selector`.
    fn query(&self, selector: &str) -> Option<Self::Element>;

    /// First descendant of `root` matching `selector`.
    fn query_within(&self, root: &Self::Element, selector: &str) -> Option<Self::Element>;

    /// All descendants of `root` matching `selector`, in document order.
    fn query_all_within(&self, root: &Self::Element, selector: &str) -> Vec<Self::Element>;

    /// Parent element, if any.
    fn parent(&self, element: &Self::Element) -> Option<Self::Element>;

    /// Detach `element` (and its subtree) from the document.
    fn remove(&mut self, element: &Self::Element);

    /// Whether `element` is still attached to the document.
    fn is_connected(&self, element: &Self::Element) -> bool;

    /// Inner layout height (`clientHeight`); zero for collapsed elements.
    fn client_height(&self, element: &Self::Element) -> f64;

    /// Viewport-relative bounding box.
    fn bounding_rect(&self, element: &Self::Element) -> Rect;

    fn add_class(&mut self, element: &Self::Element, class: &str);

    fn remove_class(&mut self, element: &Self::Element, class: &str);

    /// Synthesize a click on `element`.
    fn click(&mut self, element: &Self::Element);

    /// Dispatch a bubbling, cancelable `mouseout` on `element`.
    fn mouse_out(&mut self, element: &Self::Element);

    /// Current window scroll state.
    fn viewport(&self) -> Viewport;

    /// Start a smooth (animated) scroll to the absolute offset `top`.
    fn scroll_to(&mut self, top: f64);

    /// Whether the focused element accepts text input.
    fn is_text_entry_focused(&self) -> bool;

    /// Append a page-wide style sheet.
    fn inject_style(&mut self, css: &str);

    /// Attach the window `scroll` listener identified by `listener`.
    fn listen_scroll(&mut self, listener: ScrollListener);

    /// Detach the window `scroll` listener identified by `listener`.
    fn unlisten_scroll(&mut self, listener: ScrollListener);
}
