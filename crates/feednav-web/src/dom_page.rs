#![forbid(unsafe_code)]

//! [`Page`] over the live browser DOM.
//!
//! Failed browser calls are logged and reported as absence, so the
//! navigator sees the same "nothing there" it would on an empty page.

use feednav_core::geometry::{Rect, Viewport};
use feednav_core::{Page, ScrollListener};
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, HtmlElement, MouseEvent, MouseEventInit, Node, ScrollBehavior,
    ScrollToOptions, Window,
};

/// Tags whose focus means the user is typing.
const TEXT_ENTRY_TAGS: [&str; 3] = ["INPUT", "TEXTAREA", "SELECT"];

/// Best-effort text for a thrown JS value.
pub(crate) fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

fn ok_or_warn<T>(result: Result<T, JsValue>, op: &'static str) -> Option<T> {
    result
        .map_err(|err| warn!(op, error = %describe(&err), "DOM call failed"))
        .ok()
}

/// Callbacks the page attaches as window `scroll` listeners.
#[derive(Debug)]
pub struct ScrollHandlers {
    pub drift: Closure<dyn FnMut()>,
    pub settle: Closure<dyn FnMut()>,
}

impl ScrollHandlers {
    fn callback(&self, listener: ScrollListener) -> &js_sys::Function {
        let closure = match listener {
            ScrollListener::Drift => &self.drift,
            ScrollListener::Settle => &self.settle,
        };
        closure.as_ref().unchecked_ref()
    }
}

/// The host document as seen by the navigator.
#[derive(Debug)]
pub struct DomPage {
    window: Window,
    document: Document,
    handlers: ScrollHandlers,
}

impl DomPage {
    #[must_use]
    pub fn new(window: Window, document: Document, handlers: ScrollHandlers) -> Self {
        Self {
            window,
            document,
            handlers,
        }
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl Drop for DomPage {
    fn drop(&mut self) {
        // The closures die with the page; the window must not keep them.
        for listener in [ScrollListener::Drift, ScrollListener::Settle] {
            self.unlisten_scroll(listener);
        }
    }
}

impl Page for DomPage {
    type Element = Element;

    fn query(&self, selector: &str) -> Option<Element> {
        ok_or_warn(self.document.query_selector(selector), "querySelector").flatten()
    }

    fn query_within(&self, root: &Element, selector: &str) -> Option<Element> {
        ok_or_warn(root.query_selector(selector), "querySelector").flatten()
    }

    fn query_all_within(&self, root: &Element, selector: &str) -> Vec<Element> {
        let Some(list) = ok_or_warn(root.query_selector_all(selector), "querySelectorAll") else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn parent(&self, element: &Element) -> Option<Element> {
        element.parent_element()
    }

    fn remove(&mut self, element: &Element) {
        element.remove();
    }

    fn is_connected(&self, element: &Element) -> bool {
        element.is_connected()
    }

    fn client_height(&self, element: &Element) -> f64 {
        f64::from(element.client_height())
    }

    fn bounding_rect(&self, element: &Element) -> Rect {
        let rect = element.get_bounding_client_rect();
        Rect::new(rect.top(), rect.height())
    }

    fn add_class(&mut self, element: &Element, class: &str) {
        ok_or_warn(element.class_list().add_1(class), "classList.add");
    }

    fn remove_class(&mut self, element: &Element, class: &str) {
        ok_or_warn(element.class_list().remove_1(class), "classList.remove");
    }

    fn click(&mut self, element: &Element) {
        match element.dyn_ref::<HtmlElement>() {
            Some(html) => html.click(),
            None => warn!(tag = %element.tag_name(), "click target is not an HTML element"),
        }
    }

    fn mouse_out(&mut self, element: &Element) {
        let init = MouseEventInit::new();
        init.set_bubbles(true);
        init.set_cancelable(true);
        let Some(event) = ok_or_warn(
            MouseEvent::new_with_mouse_event_init_dict("mouseout", &init),
            "new MouseEvent(mouseout)",
        ) else {
            return;
        };
        ok_or_warn(element.dispatch_event(&event), "dispatchEvent(mouseout)");
    }

    fn viewport(&self) -> Viewport {
        let scroll_y = ok_or_warn(self.window.scroll_y(), "scrollY").unwrap_or(0.0);
        let height = ok_or_warn(self.window.inner_height(), "innerHeight")
            .and_then(|value| value.as_f64())
            .unwrap_or(0.0);
        let scroll_height = self
            .document
            .document_element()
            .map_or(height, |root| f64::from(root.scroll_height()));
        Viewport::new(scroll_y, height, scroll_height)
    }

    fn scroll_to(&mut self, top: f64) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn is_text_entry_focused(&self) -> bool {
        let Some(active) = self.document.active_element() else {
            return false;
        };
        let tag = active.tag_name();
        TEXT_ENTRY_TAGS.iter().any(|t| tag.eq_ignore_ascii_case(t))
            || active
                .dyn_ref::<HtmlElement>()
                .is_some_and(HtmlElement::is_content_editable)
    }

    fn inject_style(&mut self, css: &str) {
        let Some(style) = ok_or_warn(self.document.create_element("style"), "createElement(style)")
        else {
            return;
        };
        style.set_text_content(Some(css));
        let parent: Option<Node> = match self.document.head() {
            Some(head) => Some(head.into()),
            None => self.document.document_element().map(Into::into),
        };
        match parent {
            Some(parent) => {
                ok_or_warn(parent.append_child(&style), "appendChild(style)");
            }
            None => warn!("no element to hold the style sheet"),
        }
    }

    fn listen_scroll(&mut self, listener: ScrollListener) {
        let callback = self.handlers.callback(listener);
        ok_or_warn(
            self.window.add_event_listener_with_callback("scroll", callback),
            "addEventListener(scroll)",
        );
    }

    fn unlisten_scroll(&mut self, listener: ScrollListener) {
        let callback = self.handlers.callback(listener);
        ok_or_warn(
            self.window.remove_event_listener_with_callback("scroll", callback),
            "removeEventListener(scroll)",
        );
    }
}
