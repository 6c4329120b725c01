#![forbid(unsafe_code)]

//! `tracing` output for the browser.
//!
//! [`ConsoleLayer`] formats each event as `LEVEL target: message k=v ...` and
//! hands the line to a [`LineSink`]. On wasm32 the sink is the developer
//! console, routed by level; tests use an in-memory sink.

use std::fmt::{self, Write as _};
use tracing::Level;
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::Context;

/// Destination for formatted log lines.
pub trait LineSink: Send + Sync + 'static {
    fn write_line(&self, level: Level, line: &str);
}

/// Collects an event's message and fields into one line.
#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl LineVisitor {
    fn push_field(&mut self, name: &str, value: fmt::Arguments<'_>) {
        if name == "message" {
            let _ = self.message.write_fmt(value);
        } else {
            let _ = write!(self.fields, " {name}={value}");
        }
    }
}

impl Visit for LineVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.push_field(field.name(), format_args!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.push_field(field.name(), format_args!("{value}"));
    }
}

/// Format one event line.
#[must_use]
pub fn format_line(level: &Level, target: &str, message: &str, fields: &str) -> String {
    format!("{level} {target}: {message}{fields}")
}

/// Layer forwarding events at or above `max_level` to a sink.
pub struct ConsoleLayer<K> {
    sink: K,
    max_level: Level,
}

impl<K: LineSink> ConsoleLayer<K> {
    #[must_use]
    pub fn new(sink: K, max_level: Level) -> Self {
        Self { sink, max_level }
    }
}

impl<S, K> tracing_subscriber::Layer<S> for ConsoleLayer<K>
where
    S: tracing::Subscriber,
    K: LineSink,
{
    fn enabled(&self, metadata: &tracing::Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        *metadata.level() <= self.max_level
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        let line = format_line(meta.level(), meta.target(), &visitor.message, &visitor.fields);
        self.sink.write_line(*meta.level(), &line);
    }
}

// ---------------------------------------------------------------------------
// Browser console (wasm32 only)
// ---------------------------------------------------------------------------

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::LineSink;
    use tracing::Level;
    use tracing_subscriber::layer::SubscriberExt;
    use wasm_bindgen::JsValue;

    /// `console.error` / `console.warn` / `console.log`, by level.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct BrowserConsole;

    impl LineSink for BrowserConsole {
        fn write_line(&self, level: Level, line: &str) {
            let value = JsValue::from_str(line);
            match level {
                Level::ERROR => web_sys::console::error_1(&value),
                Level::WARN => web_sys::console::warn_1(&value),
                _ => web_sys::console::log_1(&value),
            }
        }
    }

    /// Install the panic hook and the console subscriber. Safe to call more
    /// than once; later calls leave the first subscriber in place.
    pub fn init_logging(max_level: Level) {
        console_error_panic_hook::set_once();
        let subscriber = tracing_subscriber::registry()
            .with(super::ConsoleLayer::new(BrowserConsole, max_level));
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            tracing::debug!("console logging already installed");
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::{BrowserConsole, init_logging};
