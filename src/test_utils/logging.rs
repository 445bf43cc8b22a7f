//! Capture `tracing` events emitted during a closure.
//!
//! The capture subscriber is installed for the current thread only, so
//! parallel tests never see each other's events.

use std::sync::{Arc, Mutex};

use tracing::Level;
use tracing_subscriber::prelude::*;

/// A captured log entry.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Events captured by [`capture_logs`].
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs {
    entries: Vec<LogEntry>,
}

impl CapturedLogs {
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn contains(&self, level: Level, message: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.level == level && e.message.contains(message))
    }

    #[must_use]
    pub fn with_target(&self, target: &str) -> Vec<&LogEntry> {
        self.entries.iter().filter(|e| e.target == target).collect()
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.entries.iter().any(|e| e.level == Level::WARN)
    }

    /// One line per event, for assertion failure messages.
    #[must_use]
    pub fn render(&self) -> String {
        if self.entries.is_empty() {
            return "No logs captured".to_string();
        }
        self.entries
            .iter()
            .map(|e| {
                let fields: Vec<String> =
                    e.fields.iter().map(|(k, v)| format!("{k}={v}")).collect();
                format!("[{}] {}: {} {}", e.level, e.target, e.message, fields.join(" "))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

struct CaptureLayer {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

struct EventVisitor<'a> {
    message: &'a mut String,
    fields: &'a mut Vec<(String, String)>,
}

impl tracing::field::Visit for EventVisitor<'_> {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            *self.message = value.to_string();
        } else {
            self.fields.push((field.name().to_string(), value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        let value = format!("{value:?}");
        if field.name() == "message" {
            *self.message = value;
        } else {
            self.fields.push((field.name().to_string(), value));
        }
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for CaptureLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let metadata = event.metadata();
        let mut message = String::new();
        let mut fields = Vec::new();
        event.record(&mut EventVisitor {
            message: &mut message,
            fields: &mut fields,
        });

        if let Ok(mut entries) = self.entries.lock() {
            entries.push(LogEntry {
                level: *metadata.level(),
                target: metadata.target().to_string(),
                message,
                fields,
            });
        }
    }
}

/// Run `f` with every event on this thread captured.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, CapturedLogs) {
    let entries = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(CaptureLayer {
        entries: Arc::clone(&entries),
    });
    let value = tracing::subscriber::with_default(subscriber, f);
    let entries = entries.lock().map(|e| e.clone()).unwrap_or_default();
    (value, CapturedLogs { entries })
}

/// Assert that captured logs contain a message at the given level.
#[macro_export]
macro_rules! assert_log_contains {
    ($logs:expr, $level:expr, $message:expr) => {{
        let logs = &$logs;
        assert!(
            logs.contains($level, $message),
            "Expected log with level {} containing '{}'\nCaptured logs:\n{}",
            $level,
            $message,
            logs.render()
        );
    }};
}
