//! End-to-end navigator scenarios against the in-memory page.
//!
//! Layout used throughout (document coordinates, header 42px, viewport
//! 800px, max scroll 1100px):
//!
//! ```text
//!   A: 100..400   B: 450..750   C: 800..1100
//! ```

use core::time::Duration;

use feednav_core::testing::{FakeNode, FakePage};
use feednav_core::{
    Action, Config, Dispatch, FirstPostPolicy, IgnoredReason, KeyInput, Modifiers, Navigator, Page,
    ScrollListener, TrackerState,
};
use pretty_assertions::assert_eq;

const HEADER: f64 = 42.0;
const VIEWPORT: f64 = 800.0;
const HIGHLIGHT: &str = "feednav-active-post";

struct Feed {
    nav: Navigator<FakePage>,
    posts: Vec<FakeNode>,
    now: Duration,
}

impl Feed {
    fn new() -> Self {
        Self::with_config(Config::default())
    }

    fn with_config(config: Config) -> Self {
        let mut page = FakePage::new(VIEWPORT);
        page.add_header(HEADER);
        let container = page.add_container("feed_rows");
        let posts = [("1_1", 100.0), ("1_2", 450.0), ("1_3", 800.0)]
            .into_iter()
            .map(|(id, top)| page.add_post(container, id, top, 300.0))
            .collect();
        Self {
            nav: Navigator::new(page, config),
            posts,
            now: Duration::ZERO,
        }
    }

    fn a(&self) -> FakeNode {
        self.posts[0]
    }

    fn b(&self) -> FakeNode {
        self.posts[1]
    }

    fn c(&self) -> FakeNode {
        self.posts[2]
    }

    fn page(&self) -> &FakePage {
        self.nav.page()
    }

    fn page_mut(&mut self) -> &mut FakePage {
        self.nav.page_mut()
    }

    fn key(&mut self, code: &str) -> Dispatch {
        let now = self.now;
        self.nav.handle_key(&KeyInput::new(code), now)
    }

    fn advance(&mut self, ms: u64) {
        self.now += Duration::from_millis(ms);
        let now = self.now;
        self.nav.tick(now);
    }

    /// Deliver one window scroll event to every attached listener.
    fn scroll_event(&mut self) {
        let now = self.now;
        for listener in [ScrollListener::Settle, ScrollListener::Drift] {
            if self.page().is_listening(listener) {
                self.nav.on_scroll(listener, now);
            }
        }
    }

    /// Let the browser finish the requested scroll and go quiet.
    fn settle(&mut self) {
        self.advance(16);
        self.page_mut().finish_scroll();
        self.scroll_event();
        self.advance(50);
    }

    fn scroll_window_to(&mut self, y: f64) {
        self.page_mut().set_scroll_y(y);
        self.scroll_event();
    }

    fn active(&self) -> Option<FakeNode> {
        self.nav.active_post().copied()
    }

    fn highlighted(&self) -> Vec<FakeNode> {
        self.posts
            .iter()
            .copied()
            .filter(|&post| self.page().has_class(post, HIGHLIGHT))
            .collect()
    }
}

fn add_link(page: &mut FakePage, post: FakeNode, onclick: &str) -> FakeNode {
    page.append(post, "a", &[("onclick", onclick)])
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

#[test]
fn header_is_measured_once() {
    let feed = Feed::new();
    assert_eq!(feed.nav.header_height(), HEADER);
}

#[test]
fn next_next_prev_walks_the_feed() {
    let mut feed = Feed::new();

    // A is already where it would be scrolled to, so no animation runs.
    assert_eq!(feed.key("KeyS"), Dispatch::Performed(Action::NextPost));
    assert_eq!(feed.active(), Some(feed.a()));
    assert!(feed.page().scroll_requests().is_empty());
    assert!(feed.page().is_listening(ScrollListener::Drift));

    feed.key("KeyS");
    assert_eq!(feed.active(), Some(feed.b()));
    // round(0 + 450 - 42) - ceil(800 - 42 - 300) / 2
    assert_eq!(feed.page().scroll_requests(), &[179.0]);
    assert!(!feed.page().is_listening(ScrollListener::Drift));
    assert!(feed.page().is_listening(ScrollListener::Settle));
    feed.settle();
    assert!(feed.page().is_listening(ScrollListener::Drift));
    assert!(!feed.page().is_listening(ScrollListener::Settle));

    feed.key("KeyW");
    assert_eq!(feed.active(), Some(feed.a()));
    assert_eq!(feed.page().scroll_requests().last(), Some(&0.0));
    feed.settle();
    assert_eq!(feed.highlighted(), vec![feed.a()]);
}

#[test]
fn next_from_idle_picks_first_post_below_header() {
    let mut feed = Feed::new();
    feed.page_mut().set_scroll_y(179.0);
    // A.top = -79 (above header), B.top = 271.
    feed.key("KeyS");
    assert_eq!(feed.active(), Some(feed.b()));
}

#[test]
fn next_at_last_post_is_noop() {
    let mut feed = Feed::new();
    for _ in 0..3 {
        feed.key("KeyS");
        feed.settle();
    }
    assert_eq!(feed.active(), Some(feed.c()));
    let requests = feed.page().scroll_requests().len();

    assert!(!feed.nav.next_post(feed.now));
    assert_eq!(feed.active(), Some(feed.c()));
    assert_eq!(feed.page().scroll_requests().len(), requests);
    assert!(feed.page().is_listening(ScrollListener::Drift));
}

#[test]
fn next_with_nothing_below_header_is_noop() {
    let mut feed = Feed::new();
    feed.page_mut().set_scroll_height(5000.0);
    feed.page_mut().set_scroll_y(2000.0);
    assert!(!feed.nav.next_post(feed.now));
    assert_eq!(feed.nav.state(), TrackerState::Idle);
}

#[test]
fn prev_from_idle_picks_post_above_first_visible() {
    let mut feed = Feed::new();
    feed.page_mut().set_scroll_y(179.0);
    feed.key("KeyW");
    assert_eq!(feed.active(), Some(feed.a()));
}

#[test]
fn prev_at_first_post_refocuses_it() {
    let mut feed = Feed::new();
    feed.key("KeyS");
    feed.page_mut().set_scroll_y(30.0);
    assert!(feed.nav.prev_post(feed.now));
    assert_eq!(feed.active(), Some(feed.a()));
    assert_eq!(feed.page().scroll_requests(), &[0.0]);
}

#[test]
fn prev_at_first_post_stays_with_strict_policy() {
    let mut feed = Feed::with_config(Config {
        first_post: FirstPostPolicy::Stay,
        ..Config::default()
    });
    feed.key("KeyS");
    assert!(!feed.nav.prev_post(feed.now));
    assert_eq!(feed.active(), Some(feed.a()));
    assert!(feed.page().is_listening(ScrollListener::Drift));
}

#[test]
fn stale_active_post_is_dropped_before_navigating() {
    let mut feed = Feed::new();
    feed.key("KeyS");
    feed.key("KeyS");
    feed.settle();
    let b = feed.b();
    feed.page_mut().remove(&b);

    // Scroll is 179: A.top = -79, C.top = 621.
    feed.key("KeyS");
    assert_eq!(feed.active(), Some(feed.c()));
}

#[test]
fn collapsed_active_post_is_treated_as_stale() {
    let mut feed = Feed::new();
    feed.key("KeyS");
    let a = feed.a();
    feed.page_mut().set_layout(a, 100.0, 0.0);
    feed.key("KeyS");
    // A no longer counts as a post; B is the first one below the header.
    assert_eq!(feed.active(), Some(feed.b()));
    assert!(!feed.page().has_class(a, HIGHLIGHT));
}

// ---------------------------------------------------------------------------
// Scroll settling
// ---------------------------------------------------------------------------

#[test]
fn drift_listener_waits_for_settle() {
    let mut feed = Feed::new();
    feed.key("KeyS");
    feed.key("KeyS");

    // Mid-animation events only feed the settle wait.
    for _ in 0..10 {
        feed.advance(16);
        feed.scroll_event();
        assert!(!feed.page().is_listening(ScrollListener::Drift));
    }
    feed.advance(49);
    assert!(feed.page().is_listening(ScrollListener::Settle));
    feed.advance(1);
    assert!(feed.page().is_listening(ScrollListener::Drift));
    assert!(!feed.page().is_listening(ScrollListener::Settle));
}

#[test]
fn stalled_scroll_times_out_without_leaking_listener() {
    let mut feed = Feed::new();
    feed.key("KeyS");
    feed.key("KeyS");
    assert!(feed.page().is_listening(ScrollListener::Settle));

    feed.advance(2999);
    assert!(feed.page().is_listening(ScrollListener::Settle));
    feed.advance(1);
    assert!(!feed.page().is_listening(ScrollListener::Settle));
    assert!(!feed.page().is_listening(ScrollListener::Drift));
    // The post stays focused; only the drift continuation is dropped.
    assert_eq!(feed.active(), Some(feed.b()));
    assert_eq!(feed.nav.next_deadline(), None);
    assert!(feed.page().listening().is_empty());
}

#[test]
fn rapid_presses_supersede_pending_settle() {
    let mut feed = Feed::new();
    feed.key("KeyS");
    feed.key("KeyS");
    feed.advance(16);
    feed.scroll_event();
    feed.key("KeyS");
    assert_eq!(feed.active(), Some(feed.c()));
    assert_eq!(feed.highlighted(), vec![feed.c()]);
    assert!(feed.page().is_listening(ScrollListener::Settle));

    feed.settle();
    assert!(feed.page().is_listening(ScrollListener::Drift));
    assert!(!feed.page().is_listening(ScrollListener::Settle));
}

// ---------------------------------------------------------------------------
// Drift
// ---------------------------------------------------------------------------

fn focused_on_b() -> Feed {
    let mut feed = Feed::new();
    feed.key("KeyS");
    feed.key("KeyS");
    feed.settle();
    assert_eq!(feed.active(), Some(feed.b()));
    assert!(feed.page().is_listening(ScrollListener::Drift));
    feed
}

#[test]
fn scrolling_post_out_of_view_unsets_it() {
    let mut feed = focused_on_b();
    feed.scroll_window_to(1100.0);
    feed.advance(99);
    assert_eq!(feed.active(), Some(feed.b()));
    feed.advance(1);
    assert_eq!(feed.nav.state(), TrackerState::Idle);
    assert!(feed.highlighted().is_empty());
    assert!(!feed.page().is_listening(ScrollListener::Drift));
}

#[test]
fn partially_visible_post_stays_focused() {
    let mut feed = focused_on_b();
    // B.top = -250, bottom = 50.
    feed.scroll_window_to(700.0);
    feed.advance(100);
    assert_eq!(feed.active(), Some(feed.b()));
    assert!(feed.page().is_listening(ScrollListener::Drift));
}

#[test]
fn drift_check_is_debounced() {
    let mut feed = focused_on_b();
    feed.scroll_window_to(1100.0);
    feed.advance(60);
    feed.scroll_event();
    feed.advance(60);
    assert_eq!(feed.active(), Some(feed.b()));
    feed.advance(40);
    assert_eq!(feed.active(), None);
}

#[test]
fn drift_check_skipped_while_layer_shown() {
    let mut feed = focused_on_b();
    feed.page_mut().set_body_class("layers_shown", true);
    feed.scroll_window_to(1100.0);
    feed.advance(100);
    assert_eq!(feed.active(), Some(feed.b()));
    assert!(feed.page().is_listening(ScrollListener::Drift));

    feed.page_mut().set_body_class("layers_shown", false);
    feed.scroll_event();
    feed.advance(100);
    assert_eq!(feed.active(), None);
}

#[test]
fn detached_active_post_is_unset_on_drift_check() {
    let mut feed = focused_on_b();
    let b = feed.b();
    feed.page_mut().remove(&b);
    feed.scroll_event();
    feed.advance(100);
    assert_eq!(feed.nav.state(), TrackerState::Idle);
}

#[test]
fn pending_drift_check_cancelled_by_new_focus() {
    let mut feed = focused_on_b();
    feed.scroll_window_to(1100.0);
    feed.advance(50);
    feed.key("KeyS");
    assert_eq!(feed.active(), Some(feed.c()));
    // The old check would have fired here.
    feed.advance(60);
    assert_eq!(feed.active(), Some(feed.c()));
}

// ---------------------------------------------------------------------------
// Post actions
// ---------------------------------------------------------------------------

#[test]
fn like_clicks_and_closes_popup() {
    let mut feed = focused_on_b();
    let b = feed.b();
    let link = add_link(feed.page_mut(), b, "return Likes.toggle(this, event, 'wall1_2');");
    assert_eq!(feed.key("KeyF"), Dispatch::Performed(Action::Like));
    assert_eq!(feed.page().clicks(), &[link]);
    assert_eq!(feed.page().mouse_outs(), &[link]);
}

#[test]
fn like_without_focus_does_nothing() {
    let mut feed = Feed::new();
    let a = feed.a();
    add_link(feed.page_mut(), a, "Likes.toggle(this)");
    assert!(!feed.nav.like_post());
    assert!(feed.page().clicks().is_empty());
}

#[test]
fn like_falls_back_to_reaction_button() {
    let mut feed = focused_on_b();
    let b = feed.b();
    let button = feed
        .page_mut()
        .append(b, "button", &[("data-like-button-type", "like")]);
    assert!(feed.nav.like_post());
    assert_eq!(feed.page().clicks(), &[button]);
}

#[test]
fn hide_or_restore_prefers_restore() {
    let mut feed = focused_on_b();
    let b = feed.b();
    let page = feed.page_mut();
    let _ignore = add_link(page, b, "wall.ignoreItem(this)");
    let _delete = add_link(page, b, "wall.deletePost(this)");
    let restore = add_link(page, b, "wall.restorePost(this)");
    feed.key("KeyQ");
    assert_eq!(feed.page().clicks(), &[restore]);
}

#[test]
fn hide_or_restore_probe_order() {
    let cases: [(&[&str], &str); 3] = [
        (&["feed.ignoreItem(1)", "wall.deletePost(1)"], "wall.deletePost(1)"),
        (&["feed.ignoreItem(1)", "feed.unignoreItem(1)"], "feed.unignoreItem(1)"),
        (&["feed.ignoreItem(1)"], "feed.ignoreItem(1)"),
    ];
    for (links, expected) in cases {
        let mut feed = focused_on_b();
        let b = feed.b();
        let nodes: Vec<_> = links
            .iter()
            .map(|onclick| (add_link(feed.page_mut(), b, onclick), *onclick))
            .collect();
        assert!(feed.nav.hide_or_restore_post(feed.now));
        let clicked = feed.page().clicks()[0];
        let label = nodes.iter().find(|(node, _)| *node == clicked).map(|(_, l)| *l);
        assert_eq!(label, Some(expected));
    }
}

#[test]
fn hide_or_restore_refocuses_after_layout_settles() {
    let mut feed = focused_on_b();
    let b = feed.b();
    add_link(feed.page_mut(), b, "wall.deletePost(this)");
    let requests = feed.page().scroll_requests().len();

    feed.key("KeyQ");
    // The post collapses into a short "post deleted" stub.
    feed.page_mut().set_layout(b, 450.0, 60.0);
    feed.advance(149);
    assert_eq!(feed.page().scroll_requests().len(), requests);
    feed.advance(1);
    assert_eq!(feed.page().scroll_requests().len(), requests + 1);
    // round(179 + 271 - 42) - ceil(800 - 42 - 60) / 2
    assert_eq!(feed.page().scroll_requests().last(), Some(&59.0));
    assert_eq!(feed.active(), Some(b));
    assert_eq!(feed.highlighted(), vec![b]);
}

#[test]
fn repeated_hide_presses_refocus_once() {
    let mut feed = focused_on_b();
    let b = feed.b();
    add_link(feed.page_mut(), b, "wall.deletePost(this)");
    feed.page_mut().set_scroll_y(300.0);
    let requests = feed.page().scroll_requests().len();
    feed.key("KeyQ");
    feed.advance(100);
    feed.key("KeyQ");
    feed.advance(100);
    assert_eq!(feed.page().scroll_requests().len(), requests);
    feed.advance(50);
    assert_eq!(feed.page().scroll_requests().len(), requests + 1);
}

#[test]
fn refocus_skipped_when_post_detached() {
    let mut feed = focused_on_b();
    let b = feed.b();
    add_link(feed.page_mut(), b, "wall.deletePost(this)");
    feed.key("KeyQ");
    feed.page_mut().remove(&b);
    feed.advance(150);
    assert_eq!(feed.nav.state(), TrackerState::Idle);
}

#[test]
fn photo_keys_click_carousel_arrows() {
    let mut feed = focused_on_b();
    let b = feed.b();
    let prev = feed
        .page_mut()
        .append(b, "div", &[("class", "Carousel__arrow Carousel__arrow--prev")]);
    let next = feed
        .page_mut()
        .append(b, "div", &[("class", "Carousel__arrow Carousel__arrow--next")]);
    assert_eq!(feed.key("KeyD"), Dispatch::Performed(Action::NextPhoto));
    assert_eq!(feed.key("KeyA"), Dispatch::Performed(Action::PrevPhoto));
    assert_eq!(feed.page().clicks(), &[next, prev]);
}

#[test]
fn photo_keys_without_carousel_do_nothing() {
    let mut feed = focused_on_b();
    assert!(!feed.nav.next_photo());
    assert!(!feed.nav.prev_photo());
    assert!(feed.page().clicks().is_empty());
}

// ---------------------------------------------------------------------------
// Input suppression
// ---------------------------------------------------------------------------

#[test]
fn keys_ignored_while_typing() {
    let mut feed = Feed::new();
    feed.page_mut().set_text_entry_focused(true);
    assert_eq!(
        feed.key("KeyS"),
        Dispatch::Ignored(IgnoredReason::TextEntryFocused)
    );
    assert_eq!(feed.nav.state(), TrackerState::Idle);
}

#[test]
fn keys_ignored_while_layer_shown() {
    let mut feed = Feed::new();
    feed.page_mut().set_body_class("article_body_layer", true);
    assert_eq!(feed.key("KeyS"), Dispatch::Ignored(IgnoredReason::LayerShown));
    assert_eq!(feed.nav.state(), TrackerState::Idle);
}

#[test]
fn shortcut_chords_are_left_to_the_browser() {
    let mut feed = Feed::new();
    let key = KeyInput::new("KeyF").with_modifiers(Modifiers::CTRL);
    assert_eq!(
        feed.nav.handle_key(&key, feed.now),
        Dispatch::Ignored(IgnoredReason::Shortcut)
    );
}

#[test]
fn unbound_keys_are_ignored() {
    let mut feed = Feed::new();
    assert_eq!(feed.key("KeyZ"), Dispatch::Ignored(IgnoredReason::Unbound));
}
