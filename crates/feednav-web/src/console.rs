#![forbid(unsafe_code)]

//! `tracing` layer that renders events as single console lines.
//!
//! Each event becomes `LEVEL target: span{k=v}: message k=v` and is handed to
//! a [`Sink`]. In the browser the sink is [`browser_console`], which picks
//! `console.error`, `console.warn`, `console.info` or `console.debug` by
//! level. Native builds plug in any `fn` so the formatting stays testable.

use core::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Metadata, Subscriber, span};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

/// Most verbose level forwarded by default.
pub const DEFAULT_MAX_LEVEL: Level = if cfg!(debug_assertions) {
    Level::DEBUG
} else {
    Level::INFO
};

/// Receives one rendered line per event.
pub type Sink = fn(Level, &str);

/// Layer forwarding formatted events to a [`Sink`].
#[derive(Clone, Copy)]
pub struct ConsoleLayer {
    max_level: Level,
    sink: Sink,
}

impl fmt::Debug for ConsoleLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleLayer")
            .field("max_level", &self.max_level)
            .finish_non_exhaustive()
    }
}

impl ConsoleLayer {
    #[must_use]
    pub const fn new(sink: Sink) -> Self {
        Self {
            max_level: DEFAULT_MAX_LEVEL,
            sink,
        }
    }

    #[must_use]
    pub const fn with_max_level(mut self, level: Level) -> Self {
        self.max_level = level;
        self
    }

    #[must_use]
    pub const fn max_level(&self) -> Level {
        self.max_level
    }
}

/// Pre-rendered `k=v` fields of a span, stored in its extensions.
struct SpanFields(String);

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }
}

impl<S> Layer<S> for ConsoleLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        *metadata.level() <= self.max_level
    }

    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut visitor = LineVisitor::default();
        attrs.record(&mut visitor);
        span.extensions_mut().insert(SpanFields(visitor.fields));
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut line = format!("{} {}: ", metadata.level(), metadata.target());
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                let extensions = span.extensions();
                match extensions.get::<SpanFields>().map(|f| f.0.trim_start()) {
                    Some(fields) if !fields.is_empty() => {
                        let _ = write!(line, "{}{{{fields}}}: ", span.name());
                    }
                    _ => {
                        let _ = write!(line, "{}: ", span.name());
                    }
                }
            }
        }
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        line.push_str(&visitor.message);
        line.push_str(&visitor.fields);
        (self.sink)(*metadata.level(), &line);
    }
}

/// Write `line` with the console method matching `level`.
#[cfg(target_arch = "wasm32")]
pub fn browser_console(level: Level, line: &str) {
    use wasm_bindgen::JsValue;
    use web_sys::console;

    let line = JsValue::from_str(line);
    match level {
        Level::ERROR => console::error_1(&line),
        Level::WARN => console::warn_1(&line),
        Level::INFO => console::info_1(&line),
        _ => console::debug_1(&line),
    }
}
