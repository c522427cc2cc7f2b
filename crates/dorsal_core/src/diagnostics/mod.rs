//! Diagnostic event sink used by the wiring engine.
//!
//! # Responsibility
//! - Define the structured event the engine emits while wiring.
//! - Keep buffering/grouping out of the engine: that lives in the
//!   [`DiagnosticLog`] adapter.
//!
//! # Invariants
//! - Sinks never fail; a missing or disabled sink behaves as a no-op.

use std::fmt::{Display, Formatter};

pub mod console;
pub mod session_log;

pub use console::{Console, ConsoleLine, LogConsole, MemoryConsole};
pub use session_log::{DiagnosticLog, LogEntry, SessionStore};

/// Severity of one diagnostic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Log,
    Info,
    Warn,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One diagnostic record. `session` groups records for batched rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticEvent {
    pub severity: Severity,
    pub message: String,
    pub session: Option<String>,
    pub plugin_name: Option<String>,
}

impl DiagnosticEvent {
    /// Ungrouped event, printed immediately by buffering sinks.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            session: None,
            plugin_name: None,
        }
    }

    pub fn log(message: impl Into<String>) -> Self {
        Self::new(Severity::Log, message)
    }

    pub fn in_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    pub fn for_plugin(mut self, plugin_name: impl Into<String>) -> Self {
        self.plugin_name = Some(plugin_name.into());
        self
    }
}

/// Destination for engine diagnostics.
pub trait DiagnosticSink: Send + Sync {
    /// Whether events are observed at all; callers may skip formatting.
    fn is_enabled(&self) -> bool {
        true
    }

    fn record(&self, event: DiagnosticEvent);

    /// Signals that no more events are expected for `session` for now.
    fn end_session(&self, session: &str);
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn is_enabled(&self) -> bool {
        false
    }

    fn record(&self, _event: DiagnosticEvent) {}

    fn end_session(&self, _session: &str) {}
}
