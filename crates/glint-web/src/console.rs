#![forbid(unsafe_code)]

//! `tracing` layer that writes events to the browser console.
//!
//! Each event becomes one line, `[target] message key=value ...`, handed to a
//! sink together with its level. The browser sink maps levels onto
//! `console.error` / `console.warn` / `console.info` / `console.debug`.

use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Receives one formatted line per event.
pub type Sink = fn(Level, &str);

/// Console-forwarding layer.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleLayer {
    sink: Sink,
}

impl ConsoleLayer {
    pub fn new(sink: Sink) -> Self {
        Self { sink }
    }

    /// Layer writing to the browser's `console`.
    #[cfg(target_arch = "wasm32")]
    pub fn browser() -> Self {
        Self::new(write_console)
    }
}

impl<S: Subscriber> Layer<S> for ConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let line = format_event(event);
        (self.sink)(*event.metadata().level(), &line);
    }
}

/// Render an event as `[target] message key=value ...`.
pub fn format_event(event: &Event<'_>) -> String {
    let mut visitor = LineVisitor::default();
    event.record(&mut visitor);
    let mut line = format!("[{}] {}", event.metadata().target(), visitor.message);
    if !visitor.fields.is_empty() {
        line.push_str(&visitor.fields);
    }
    line
}

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
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn write_console(level: Level, line: &str) {
    let line = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::ERROR => web_sys::console::error_1(&line),
        Level::WARN => web_sys::console::warn_1(&line),
        Level::INFO => web_sys::console::info_1(&line),
        _ => web_sys::console::debug_1(&line),
    }
}
