#![forbid(unsafe_code)]

//! Browser event wiring around one [`Navigator`].
//!
//! The runtime owns the navigator and every JS callback that reaches it:
//! the global `keydown` listener, the two `scroll` listeners the page
//! attaches on demand, and a single `setTimeout` wake-up re-armed after
//! each event at [`Navigator::next_deadline`]. Callbacks hold a `Weak`
//! back-reference, so the runtime is the only owner of itself.

use core::cell::{Cell, RefCell};
use core::time::Duration;
use std::rc::{Rc, Weak};

use feednav_core::{Config, Dispatch, KeyInput, Modifiers, Navigator, ScrollListener};
use tracing::{trace, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, KeyboardEvent, Window};
use web_time::Instant;

use crate::StartupError;
use crate::dom_page::{DomPage, ScrollHandlers, describe};

pub(crate) struct Runtime {
    window: Window,
    navigator: RefCell<Navigator<DomPage>>,
    epoch: Instant,
    /// Pending `setTimeout` handle and the deadline it was armed for.
    timer: Cell<Option<(i32, Duration)>>,
    on_timer: Closure<dyn FnMut()>,
    on_keydown: Closure<dyn FnMut(KeyboardEvent)>,
}

fn modifiers(event: &KeyboardEvent) -> Modifiers {
    let mut modifiers = Modifiers::empty();
    modifiers.set(Modifiers::SHIFT, event.shift_key());
    modifiers.set(Modifiers::ALT, event.alt_key());
    modifiers.set(Modifiers::CTRL, event.ctrl_key());
    modifiers.set(Modifiers::META, event.meta_key());
    modifiers
}

fn scroll_callback(weak: &Weak<Runtime>, listener: ScrollListener) -> Closure<dyn FnMut()> {
    let weak = weak.clone();
    Closure::<dyn FnMut()>::new(move || {
        if let Some(runtime) = weak.upgrade() {
            runtime.on_scroll(listener);
        }
    })
}

impl Runtime {
    /// Build the navigator over `document` and start listening for keys.
    pub(crate) fn install(
        window: Window,
        document: Document,
        config: Config,
    ) -> Result<Rc<Self>, StartupError> {
        let runtime = Rc::new_cyclic(|weak: &Weak<Self>| {
            let handlers = ScrollHandlers {
                drift: scroll_callback(weak, ScrollListener::Drift),
                settle: scroll_callback(weak, ScrollListener::Settle),
            };
            let on_timer = {
                let weak = weak.clone();
                Closure::<dyn FnMut()>::new(move || {
                    if let Some(runtime) = weak.upgrade() {
                        runtime.on_timer();
                    }
                })
            };
            let on_keydown = {
                let weak = weak.clone();
                Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
                    if let Some(runtime) = weak.upgrade() {
                        runtime.on_keydown(&event);
                    }
                })
            };
            let page = DomPage::new(window.clone(), document, handlers);
            Self {
                window,
                navigator: RefCell::new(Navigator::new(page, config)),
                epoch: Instant::now(),
                timer: Cell::new(None),
                on_timer,
                on_keydown,
            }
        });

        runtime
            .window
            .add_event_listener_with_callback("keydown", runtime.on_keydown.as_ref().unchecked_ref())
            .map_err(|err| StartupError::Dom {
                op: "addEventListener(keydown)",
                detail: describe(&err),
            })?;
        Ok(runtime)
    }

    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn on_keydown(&self, event: &KeyboardEvent) {
        let key = KeyInput::new(event.code()).with_modifiers(modifiers(event));
        let now = self.now();
        let dispatch = match self.navigator.try_borrow_mut() {
            Ok(mut navigator) => navigator.handle_key(&key, now),
            Err(_) => {
                warn!(code = %key.code, "navigator busy, key dropped");
                return;
            }
        };
        if let Dispatch::Performed(action) = dispatch {
            trace!(code = %key.code, action = action.as_str(), "key handled");
        }
        self.reschedule();
    }

    fn on_scroll(&self, listener: ScrollListener) {
        let now = self.now();
        match self.navigator.try_borrow_mut() {
            Ok(mut navigator) => navigator.on_scroll(listener, now),
            Err(_) => {
                trace!(listener = listener.as_str(), "navigator busy, scroll dropped");
                return;
            }
        }
        self.reschedule();
    }

    fn on_timer(&self) {
        self.timer.set(None);
        let now = self.now();
        match self.navigator.try_borrow_mut() {
            Ok(mut navigator) => navigator.tick(now),
            Err(_) => warn!("navigator busy at timer"),
        }
        self.reschedule();
    }

    /// Arm the wake-up timer for the navigator's next deadline.
    fn reschedule(&self) {
        let Ok(navigator) = self.navigator.try_borrow() else {
            return;
        };
        let deadline = navigator.next_deadline();
        drop(navigator);

        let armed = self.timer.get();
        if armed.map(|(_, at)| at) == deadline {
            return;
        }
        if let Some((handle, _)) = self.timer.take() {
            self.window.clear_timeout_with_handle(handle);
        }
        let Some(deadline) = deadline else {
            return;
        };
        let delay = deadline.saturating_sub(self.now());
        let millis = i32::try_from(delay.as_micros().div_ceil(1_000)).unwrap_or(i32::MAX);
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                self.on_timer.as_ref().unchecked_ref(),
                millis,
            ) {
            Ok(handle) => self.timer.set(Some((handle, deadline))),
            Err(err) => warn!(error = %describe(&err), "setTimeout failed"),
        }
    }
}
