#![forbid(unsafe_code)]

//! Post enumeration over the live DOM.
//!
//! Every navigation starts from a fresh query: the feed grows and mutates
//! as the page renders, so nothing is cached between key presses.

use tracing::trace;

use crate::config::Selectors;
use crate::page::Page;

/// Locates feed posts using the configured selectors.
#[derive(Debug, Clone, Copy)]
pub struct PostLocator<'a> {
    selectors: &'a Selectors,
}

impl<'a> PostLocator<'a> {
    #[must_use]
    pub const fn new(selectors: &'a Selectors) -> Self {
        Self { selectors }
    }

    /// First configured posts container present in the document.
    pub fn container<P: Page>(&self, page: &P) -> Option<P::Element> {
        self.selectors
            .containers
            .iter()
            .find_map(|selector| page.query(selector))
    }

    /// Remove the advertisement placeholder's parent subtree from `container`.
    ///
    /// Returns `true` if something was removed. Repeated calls are harmless:
    /// once the placeholder is gone there is nothing left to match.
    pub fn clear_garbage<P: Page>(&self, page: &mut P, container: &P::Element) -> bool {
        let Some(placeholder) = page.query_within(container, self.selectors.ad_placeholder) else {
            return false;
        };
        let Some(wrapper) = page.parent(&placeholder) else {
            return false;
        };
        trace!(selector = self.selectors.ad_placeholder, "removing ad placeholder");
        page.remove(&wrapper);
        true
    }

    /// Rendered, non-advertisement posts in document order.
    ///
    /// Clears the ad placeholder first. Posts with zero height (collapsed or
    /// hidden) are skipped. No container means no posts.
    pub fn find_posts<P: Page>(&self, page: &mut P) -> Vec<P::Element> {
        let Some(container) = self.container(page) else {
            trace!("no posts container");
            return Vec::new();
        };
        self.clear_garbage(page, &container);
        page.query_all_within(&container, self.selectors.post)
            .into_iter()
            .filter(|post| page.client_height(post) > 0.0)
            .collect()
    }
}

/// Index of the first post whose top edge is at or below the fixed header.
pub fn find_visible_post<P: Page>(page: &P, posts: &[P::Element], header_height: f64) -> Option<usize> {
    posts
        .iter()
        .position(|post| page.bounding_rect(post).is_below_header(header_height))
}
