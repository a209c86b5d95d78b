//! Observability subsystem for ledgerdb
//!
//! - Structured logging (JSON lines on stderr)
//! - Typed lifecycle events
//! - Atomic counters
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on execution
//! 3. No async or background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use ledgerdb::observability::{log_event_with_fields, Event, Severity};
//!
//! log_event_with_fields(Event::TableCreated, Severity::Info, &[("table", "orders")]);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{min_severity, set_min_severity, Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log a lifecycle event. Fatal events always log at FATAL.
pub fn log_event(event: Event, severity: Severity) {
    log_event_with_fields(event, severity, &[]);
}

/// Log a lifecycle event with fields. Fatal events always log at FATAL.
pub fn log_event_with_fields(event: Event, severity: Severity, fields: &[(&str, &str)]) {
    let severity = if event.is_fatal() {
        Severity::Fatal
    } else {
        severity
    };
    Logger::log(severity, event.as_str(), fields);
}
