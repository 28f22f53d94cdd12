#![forbid(unsafe_code)]

//! In-memory page for deterministic tests.
//!
//! [`FakePage`] is a small DOM: a node tree with attributes, document-space
//! layout (top + height per element), a window scroll offset, and logs of
//! every side effect the navigator performs (scroll requests, clicks,
//! `mouseout`s, injected styles, listener registrations).
//!
//! Selector support is limited to what the navigator uses: comma-separated
//! lists of compound selectors made of a tag, `#id`, `.class`, `[attr]`,
//! `[attr="v"]`, `[attr*="v"]` and `:not(...)`. Combinators are rejected.
//!
//! Scrolling is manual: [`Page::scroll_to`] only records the request. Tests
//! move the window with [`FakePage::finish_scroll`] or
//! [`FakePage::set_scroll_y`] and deliver scroll events to the navigator
//! themselves, which keeps timing fully under test control.

use std::fmt::Write as _;

use crate::geometry::{Rect, Viewport};
use crate::page::{Page, ScrollListener, ScrollListeners};

/// Handle to a node in a [`FakePage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FakeNode(usize);

#[derive(Debug, Clone)]
struct NodeData {
    tag: String,
    attrs: Vec<(String, String)>,
    parent: Option<FakeNode>,
    children: Vec<FakeNode>,
    top: f64,
    height: f64,
}

impl NodeData {
    fn new(tag: &str, parent: Option<FakeNode>) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            parent,
            children: Vec::new(),
            top: 0.0,
            height: 0.0,
        }
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, slot)) => *slot = value.to_string(),
            None => self.attrs.push((name.to_string(), value.to_string())),
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }
}

/// In-memory DOM implementing [`Page`].
#[derive(Debug, Clone)]
pub struct FakePage {
    nodes: Vec<NodeData>,
    root: FakeNode,
    body: FakeNode,
    scroll_y: f64,
    viewport_height: f64,
    scroll_height: Option<f64>,
    text_entry_focused: bool,
    listening: ScrollListeners,
    listen_calls: usize,
    unlisten_calls: usize,
    scroll_requests: Vec<f64>,
    clicks: Vec<FakeNode>,
    mouse_outs: Vec<FakeNode>,
    styles: Vec<String>,
}

impl FakePage {
    /// An empty `<html><body></body></html>` document, scrolled to the top.
    #[must_use]
    pub fn new(viewport_height: f64) -> Self {
        let root = FakeNode(0);
        let body = FakeNode(1);
        let mut html = NodeData::new("html", None);
        html.children.push(body);
        Self {
            nodes: vec![html, NodeData::new("body", Some(root))],
            root,
            body,
            scroll_y: 0.0,
            viewport_height,
            scroll_height: None,
            text_entry_focused: false,
            listening: ScrollListeners::empty(),
            listen_calls: 0,
            unlisten_calls: 0,
            scroll_requests: Vec::new(),
            clicks: Vec::new(),
            mouse_outs: Vec::new(),
            styles: Vec::new(),
        }
    }

    #[must_use]
    pub fn body(&self) -> FakeNode {
        self.body
    }

    // -- building -----------------------------------------------------------

    /// Append a new element under `parent`.
    pub fn append(&mut self, parent: FakeNode, tag: &str, attrs: &[(&str, &str)]) -> FakeNode {
        let node = FakeNode(self.nodes.len());
        let mut data = NodeData::new(tag, Some(parent));
        for (name, value) in attrs {
            data.set_attr(name, value);
        }
        self.nodes.push(data);
        self.nodes[parent.0].children.push(node);
        node
    }

    /// Place `node` at document offset `top` with the given height.
    pub fn set_layout(&mut self, node: FakeNode, top: f64, height: f64) {
        let data = &mut self.nodes[node.0];
        data.top = top;
        data.height = height;
    }

    /// Append the fixed header with the given height.
    pub fn add_header(&mut self, height: f64) -> FakeNode {
        let body = self.body;
        let header = self.append(body, "div", &[("id", "page_header_cont")]);
        self.set_layout(header, 0.0, height);
        header
    }

    /// Append an element with the given `id` under the body.
    pub fn add_container(&mut self, id: &str) -> FakeNode {
        let body = self.body;
        self.append(body, "div", &[("id", id)])
    }

    /// Append a regular feed post.
    pub fn add_post(&mut self, container: FakeNode, post_id: &str, top: f64, height: f64) -> FakeNode {
        let post = self.append(
            container,
            "div",
            &[("data-post-id", post_id), ("class", "_post post page_block")],
        );
        self.set_layout(post, top, height);
        post
    }

    pub fn set_attr(&mut self, node: FakeNode, name: &str, value: &str) {
        self.nodes[node.0].set_attr(name, value);
    }

    /// Toggle a class on `<body>` (modal layers are signalled this way).
    pub fn set_body_class(&mut self, class: &str, on: bool) {
        let body = self.body;
        if on {
            self.add_class(&body, class);
        } else {
            self.remove_class(&body, class);
        }
    }

    pub fn set_text_entry_focused(&mut self, focused: bool) {
        self.text_entry_focused = focused;
    }

    pub fn set_scroll_y(&mut self, y: f64) {
        self.scroll_y = y;
    }

    /// Override the document scroll height.
    ///
    /// By default it is the lowest element bottom plus one viewport, so any
    /// post can be scrolled up under the header.
    pub fn set_scroll_height(&mut self, height: f64) {
        self.scroll_height = Some(height);
    }

    /// Jump to the last requested scroll target. Returns the new offset.
    pub fn finish_scroll(&mut self) -> Option<f64> {
        let target = *self.scroll_requests.last()?;
        self.scroll_y = self.viewport().clamp_scroll(target);
        Some(self.scroll_y)
    }

    // -- inspection ---------------------------------------------------------

    #[must_use]
    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    #[must_use]
    pub fn scroll_requests(&self) -> &[f64] {
        &self.scroll_requests
    }

    #[must_use]
    pub fn clicks(&self) -> &[FakeNode] {
        &self.clicks
    }

    #[must_use]
    pub fn mouse_outs(&self) -> &[FakeNode] {
        &self.mouse_outs
    }

    #[must_use]
    pub fn injected_styles(&self) -> &[String] {
        &self.styles
    }

    #[must_use]
    pub fn has_class(&self, node: FakeNode, class: &str) -> bool {
        self.nodes[node.0].has_class(class)
    }

    /// Number of attached elements carrying `class`.
    #[must_use]
    pub fn count_with_class(&self, class: &str) -> usize {
        self.descendants(self.root)
            .into_iter()
            .filter(|node| self.nodes[node.0].has_class(class))
            .count()
    }

    #[must_use]
    pub fn is_listening(&self, listener: ScrollListener) -> bool {
        self.listening.has(listener)
    }

    #[must_use]
    pub fn listening(&self) -> ScrollListeners {
        self.listening
    }

    #[must_use]
    pub fn listen_calls(&self) -> usize {
        self.listen_calls
    }

    #[must_use]
    pub fn unlisten_calls(&self) -> usize {
        self.unlisten_calls
    }

    /// Indented outline of the attached tree, for before/after comparisons.
    #[must_use]
    pub fn dom_snapshot(&self) -> String {
        let mut out = String::new();
        self.write_outline(self.root, 0, &mut out);
        out
    }

    fn write_outline(&self, node: FakeNode, depth: usize, out: &mut String) {
        let data = &self.nodes[node.0];
        let _ = write!(out, "{:indent$}<{}", "", data.tag, indent = depth * 2);
        for (name, value) in &data.attrs {
            let _ = write!(out, " {name}=\"{value}\"");
        }
        out.push_str(">\n");
        for &child in &data.children {
            self.write_outline(child, depth + 1, out);
        }
    }

    /// Descendants of `root` in document order, excluding `root`.
    fn descendants(&self, root: FakeNode) -> Vec<FakeNode> {
        let mut out = Vec::new();
        let mut stack: Vec<FakeNode> = self.nodes[root.0].children.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.nodes[node.0].children.iter().rev().copied());
        }
        out
    }

    fn matches(&self, node: FakeNode, list: &[Vec<Simple>]) -> bool {
        let data = &self.nodes[node.0];
        list.iter()
            .any(|compound| compound.iter().all(|simple| simple.matches(data)))
    }

    fn find_all(&self, root: FakeNode, selector: &str) -> Vec<FakeNode> {
        let list = parse_selector_list(selector);
        self.descendants(root)
            .into_iter()
            .filter(|&node| self.matches(node, &list))
            .collect()
    }
}

impl Page for FakePage {
    type Element = FakeNode;

    fn query(&self, selector: &str) -> Option<FakeNode> {
        let list = parse_selector_list(selector);
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .find(|&node| self.matches(node, &list))
    }

    fn query_within(&self, root: &FakeNode, selector: &str) -> Option<FakeNode> {
        self.find_all(*root, selector).into_iter().next()
    }

    fn query_all_within(&self, root: &FakeNode, selector: &str) -> Vec<FakeNode> {
        self.find_all(*root, selector)
    }

    fn parent(&self, element: &FakeNode) -> Option<FakeNode> {
        self.nodes[element.0].parent
    }

    fn remove(&mut self, element: &FakeNode) {
        if let Some(parent) = self.nodes[element.0].parent.take() {
            self.nodes[parent.0].children.retain(|child| child != element);
        }
    }

    fn is_connected(&self, element: &FakeNode) -> bool {
        let mut current = *element;
        loop {
            if current == self.root {
                return true;
            }
            match self.nodes[current.0].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn client_height(&self, element: &FakeNode) -> f64 {
        self.nodes[element.0].height
    }

    fn bounding_rect(&self, element: &FakeNode) -> Rect {
        let data = &self.nodes[element.0];
        Rect::new(data.top - self.scroll_y, data.height)
    }

    fn add_class(&mut self, element: &FakeNode, class: &str) {
        let data = &mut self.nodes[element.0];
        if data.has_class(class) {
            return;
        }
        let classes = match data.attr("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        data.set_attr("class", &classes);
    }

    fn remove_class(&mut self, element: &FakeNode, class: &str) {
        let data = &mut self.nodes[element.0];
        let Some(existing) = data.attr("class") else {
            return;
        };
        let classes = existing
            .split_whitespace()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        data.set_attr("class", &classes);
    }

    fn click(&mut self, element: &FakeNode) {
        self.clicks.push(*element);
    }

    fn mouse_out(&mut self, element: &FakeNode) {
        self.mouse_outs.push(*element);
    }

    fn viewport(&self) -> Viewport {
        let scroll_height = self.scroll_height.unwrap_or_else(|| {
            let lowest = self
                .descendants(self.root)
                .into_iter()
                .map(|node| self.nodes[node.0].top + self.nodes[node.0].height)
                .fold(0.0_f64, f64::max);
            lowest + self.viewport_height
        });
        Viewport::new(self.scroll_y, self.viewport_height, scroll_height)
    }

    fn scroll_to(&mut self, top: f64) {
        self.scroll_requests.push(top);
    }

    fn is_text_entry_focused(&self) -> bool {
        self.text_entry_focused
    }

    fn inject_style(&mut self, css: &str) {
        self.styles.push(css.to_string());
    }

    fn listen_scroll(&mut self, listener: ScrollListener) {
        assert!(
            !self.listening.has(listener),
            "{} scroll listener attached twice",
            listener.as_str()
        );
        self.listening.insert(listener.flag());
        self.listen_calls += 1;
    }

    fn unlisten_scroll(&mut self, listener: ScrollListener) {
        assert!(
            self.listening.has(listener),
            "{} scroll listener detached while not attached",
            listener.as_str()
        );
        self.listening.remove(listener.flag());
        self.unlisten_calls += 1;
    }
}

// ---------------------------------------------------------------------------
// Selector subset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Contains(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Simple {
    Tag(String),
    Id(String),
    Class(String),
    Attr { name: String, op: AttrOp },
    Not(Vec<Simple>),
}

impl Simple {
    fn matches(&self, data: &NodeData) -> bool {
        match self {
            Self::Tag(tag) => data.tag == *tag,
            Self::Id(id) => data.attr("id") == Some(id.as_str()),
            Self::Class(class) => data.has_class(class),
            Self::Attr { name, op } => match (data.attr(name), op) {
                (None, _) => false,
                (Some(_), AttrOp::Exists) => true,
                (Some(value), AttrOp::Equals(expected)) => value == expected,
                (Some(value), AttrOp::Contains(needle)) => value.contains(needle.as_str()),
            },
            Self::Not(inner) => !inner.iter().all(|simple| simple.matches(data)),
        }
    }
}

fn parse_selector_list(selector: &str) -> Vec<Vec<Simple>> {
    split_top_level(selector)
        .into_iter()
        .map(|part| parse_compound(part.trim()))
        .collect()
}

/// Split on commas outside brackets, parentheses and quotes.
fn split_top_level(selector: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (idx, ch) in selector.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '[' | '(') => depth += 1,
            (None, ']' | ')') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&selector[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&selector[start..]);
    parts
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

fn take_ident(rest: &str) -> (&str, &str) {
    let end = rest
        .char_indices()
        .find(|&(_, ch)| !is_ident_char(ch))
        .map_or(rest.len(), |(idx, _)| idx);
    rest.split_at(end)
}

/// Index just past the bracket matching the one `rest` starts with.
fn closing_index(rest: &str, open: char, close: char) -> usize {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (idx, ch) in rest.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, c) if c == open => depth += 1,
            (None, c) if c == close => {
                depth -= 1;
                if depth == 0 {
                    return idx + ch.len_utf8();
                }
            }
            _ => {}
        }
    }
    panic!("unbalanced selector: {rest}");
}

fn unquote(value: &str) -> String {
    let value = value.trim();
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value)
        .to_string()
}

fn parse_attr(body: &str) -> Simple {
    if let Some((name, value)) = body.split_once("*=") {
        return Simple::Attr {
            name: name.trim().to_string(),
            op: AttrOp::Contains(unquote(value)),
        };
    }
    if let Some((name, value)) = body.split_once('=') {
        return Simple::Attr {
            name: name.trim().to_string(),
            op: AttrOp::Equals(unquote(value)),
        };
    }
    Simple::Attr {
        name: body.trim().to_string(),
        op: AttrOp::Exists,
    }
}

fn parse_compound(selector: &str) -> Vec<Simple> {
    let mut out = Vec::new();
    let mut rest = selector;
    while let Some(ch) = rest.chars().next() {
        match ch {
            '#' | '.' => {
                let (ident, tail) = take_ident(&rest[1..]);
                out.push(if ch == '#' {
                    Simple::Id(ident.to_string())
                } else {
                    Simple::Class(ident.to_string())
                });
                rest = tail;
            }
            '[' => {
                let end = closing_index(rest, '[', ']');
                out.push(parse_attr(&rest[1..end - 1]));
                rest = &rest[end..];
            }
            ':' => {
                let tail = rest
                    .strip_prefix(":not")
                    .unwrap_or_else(|| panic!("unsupported pseudo-class in {selector}"));
                let end = closing_index(tail, '(', ')');
                out.push(Simple::Not(parse_compound(&tail[1..end - 1])));
                rest = &tail[end..];
            }
            c if is_ident_char(c) => {
                let (ident, tail) = take_ident(rest);
                out.push(Simple::Tag(ident.to_ascii_lowercase()));
                rest = tail;
            }
            _ => panic!("FakePage supports compound selectors only, got {selector:?}"),
        }
    }
    out
}
