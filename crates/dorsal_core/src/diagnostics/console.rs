//! Console-like outputs for rendered diagnostics.

use crate::diagnostics::Severity;
use log::{info, log, Level};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::thread::{self, ThreadId};
use std::time::Duration;

/// Leveled messages, named groups and timer reports.
pub trait Console: Send + Sync {
    fn message(&self, severity: Severity, text: &str);
    fn group(&self, label: &str);
    fn group_end(&self);
    fn time_end(&self, label: &str, elapsed: Duration);
}

/// Forwards console output to the `log` facade under `dorsal::diagnostics`.
///
/// Group nesting is rendered as indentation, tracked per calling thread.
#[derive(Debug, Default)]
pub struct LogConsole {
    depths: Mutex<HashMap<ThreadId, usize>>,
}

const LOG_TARGET: &str = "dorsal::diagnostics";

impl LogConsole {
    pub fn new() -> Self {
        Self::default()
    }

    fn depth(&self) -> usize {
        self.depths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&thread::current().id())
            .copied()
            .unwrap_or(0)
    }

    fn indent(&self) -> String {
        "  ".repeat(self.depth())
    }
}

impl Console for LogConsole {
    fn message(&self, severity: Severity, text: &str) {
        let level = match severity {
            Severity::Log => Level::Debug,
            Severity::Info => Level::Info,
            Severity::Warn => Level::Warn,
            Severity::Error => Level::Error,
        };
        log!(target: LOG_TARGET, level, "{}{text}", self.indent());
    }

    fn group(&self, label: &str) {
        info!(target: LOG_TARGET, "{}group={label}", self.indent());
        *self
            .depths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(thread::current().id())
            .or_insert(0) += 1;
    }

    fn group_end(&self) {
        let mut depths = self.depths.lock().unwrap_or_else(PoisonError::into_inner);
        let id = thread::current().id();
        match depths.get(&id).copied() {
            Some(depth) if depth > 1 => {
                depths.insert(id, depth - 1);
            }
            _ => {
                depths.remove(&id);
            }
        }
    }

    fn time_end(&self, label: &str, elapsed: Duration) {
        info!(
            target: LOG_TARGET,
            "{}{label}: {:.3}ms",
            self.indent(),
            elapsed.as_secs_f64() * 1000.0
        );
    }
}

/// One line captured by [`MemoryConsole`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleLine {
    Message { severity: Severity, text: String },
    GroupStart(String),
    GroupEnd,
    TimerEnd { label: String, elapsed: Duration },
}

/// Console that records everything it receives, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryConsole {
    lines: Mutex<Vec<ConsoleLine>>,
}

impl MemoryConsole {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, line: ConsoleLine) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line);
    }

    pub fn lines(&self) -> Vec<ConsoleLine> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drains and returns everything recorded so far.
    pub fn take(&self) -> Vec<ConsoleLine> {
        std::mem::take(&mut *self.lines.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Text of every message line, in order.
    pub fn messages(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter_map(|line| match line {
                ConsoleLine::Message { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }
}

impl Console for MemoryConsole {
    fn message(&self, severity: Severity, text: &str) {
        self.push(ConsoleLine::Message {
            severity,
            text: text.to_string(),
        });
    }

    fn group(&self, label: &str) {
        self.push(ConsoleLine::GroupStart(label.to_string()));
    }

    fn group_end(&self) {
        self.push(ConsoleLine::GroupEnd);
    }

    fn time_end(&self, label: &str, elapsed: Duration) {
        self.push(ConsoleLine::TimerEnd {
            label: label.to_string(),
            elapsed,
        });
    }
}
