#![forbid(unsafe_code)]

//! `wasm-bindgen` entry point. Only compiled on `wasm32` targets.

use std::cell::RefCell;
use std::rc::Rc;

use feednav_core::Config;
use tracing::{debug, error, info};
use tracing_subscriber::layer::SubscriberExt;
use wasm_bindgen::prelude::*;
use web_sys::Window;

use crate::StartupError;
use crate::console::{ConsoleLayer, browser_console};
use crate::runtime::Runtime;

thread_local! {
    static RUNTIME: RefCell<Option<Rc<Runtime>>> = const { RefCell::new(None) };
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            web_sys::console::error_1(&JsValue::from_str(&msg));
        }));
    });
}

fn install_tracing() {
    let subscriber = tracing_subscriber::registry().with(ConsoleLayer::new(browser_console));
    // A host page may already have installed one.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn is_top_frame(window: &Window) -> bool {
    matches!(window.top(), Ok(Some(top)) if top == *window)
}

/// Returns `false` when running in a nested frame.
fn boot() -> Result<bool, StartupError> {
    let window = web_sys::window().ok_or(StartupError::NoWindow)?;
    if !is_top_frame(&window) {
        return Ok(false);
    }
    let document = window.document().ok_or(StartupError::NoDocument)?;
    if document.body().is_none() {
        return Err(StartupError::NoBody);
    }
    let runtime = Runtime::install(window, document, Config::default())?;
    RUNTIME.with(|slot| slot.replace(Some(runtime)));
    Ok(true)
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    install_panic_hook();
    install_tracing();
    match boot() {
        Ok(true) => {
            info!("feednav ready");
            Ok(())
        }
        Ok(false) => {
            debug!("nested frame, feednav inactive");
            Ok(())
        }
        Err(err) => {
            error!(%err, "feednav failed to start");
            Err(JsValue::from_str(&err.to_string()))
        }
    }
}
