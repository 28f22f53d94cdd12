#![forbid(unsafe_code)]

//! Browser binding for the feed navigator.
//!
//! On `wasm32` the crate starts itself: it installs a console `tracing`
//! subscriber, builds a [`feednav_core::Navigator`] over `DomPage` and
//! wires `keydown`, `scroll` and a wake-up timer to it. Nested frames are
//! left alone.
//!
//! Native builds only carry the console layer and [`StartupError`], which
//! keeps their formatting testable without a browser.

pub mod console;
mod error;

pub use error::StartupError;

#[cfg(target_arch = "wasm32")]
mod dom_page;
#[cfg(target_arch = "wasm32")]
mod runtime;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use dom_page::{DomPage, ScrollHandlers};
