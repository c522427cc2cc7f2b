//! Buffered, session-grouped diagnostic log.
//!
//! # Responsibility
//! - Print ungrouped entries immediately.
//! - Buffer grouped entries per session key and render them as one console
//!   group on the scheduler tick after the session is ended.
//!
//! # Invariants
//! - A disabled log does nothing at all, timers included.
//! - A session buffer is rendered at most once, then discarded.
//! - Ending a session with nothing buffered renders nothing.
//! - Sessions live in process-wide storage unless a private store is given.

use crate::diagnostics::{Console, DiagnosticEvent, DiagnosticSink, Severity};
use crate::scheduler::Scheduler;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

static SHARED_SESSIONS: Lazy<SessionStore> = Lazy::new(SessionStore::new);

/// One buffered diagnostic entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub message: String,
    /// Unix epoch milliseconds when the entry was buffered.
    pub timestamp_ms: u128,
    pub plugin_name: Option<String>,
    pub severity: Severity,
}

#[derive(Debug, Default)]
struct SessionBuffer {
    timer: Option<Instant>,
    entries: Vec<LogEntry>,
}

/// Session key -> buffered entries. Cloning shares the same storage.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, SessionBuffer>>>,
}

impl SessionStore {
    /// Creates a private store, isolated from the process-wide one.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the process-wide store.
    pub fn shared() -> Self {
        SHARED_SESSIONS.clone()
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<String, SessionBuffer>> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of entries waiting under `session`.
    pub fn buffered(&self, session: &str) -> usize {
        self.sessions()
            .get(session)
            .map_or(0, |buffer| buffer.entries.len())
    }

    pub fn contains(&self, session: &str) -> bool {
        self.sessions().contains_key(session)
    }

    fn push(&self, session: &str, entry: LogEntry) {
        let mut sessions = self.sessions();
        let buffer = sessions.entry(session.to_string()).or_default();
        if buffer.timer.is_none() {
            buffer.timer = Some(Instant::now());
        }
        buffer.entries.push(entry);
    }

    fn stop_timer(&self, session: &str) -> Option<Instant> {
        self.sessions()
            .get_mut(session)
            .and_then(|buffer| buffer.timer.take())
    }

    fn take(&self, session: &str) -> Vec<LogEntry> {
        self.sessions()
            .remove(session)
            .map(|buffer| buffer.entries)
            .unwrap_or_default()
    }
}

/// Toggleable diagnostic log with deferred per-session rendering.
#[derive(Clone)]
pub struct DiagnosticLog {
    enabled: bool,
    console: Option<Arc<dyn Console>>,
    scheduler: Arc<Scheduler>,
    store: SessionStore,
}

impl DiagnosticLog {
    /// Creates a log on the process-wide session store.
    pub fn new(enabled: bool, console: Option<Arc<dyn Console>>, scheduler: Arc<Scheduler>) -> Self {
        Self {
            enabled,
            console,
            scheduler,
            store: SessionStore::shared(),
        }
    }

    /// Replaces the session store, e.g. with a private [`SessionStore::new`].
    pub fn with_store(mut self, store: SessionStore) -> Self {
        self.store = store;
        self
    }

    pub fn is_active(&self) -> bool {
        self.enabled
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn log(&self, message: &str) {
        self.record(DiagnosticEvent::new(Severity::Log, message));
    }

    pub fn info(&self, message: &str) {
        self.record(DiagnosticEvent::new(Severity::Info, message));
    }

    pub fn warn(&self, message: &str) {
        self.record(DiagnosticEvent::new(Severity::Warn, message));
    }

    /// Buffers `message` under `session`.
    pub fn log_in(&self, session: &str, plugin_name: Option<&str>, message: &str) {
        let mut event = DiagnosticEvent::new(Severity::Log, message).in_session(session);
        event.plugin_name = plugin_name.map(str::to_string);
        self.record(event);
    }

    /// Stops the session timer now and renders the session on the next tick.
    pub fn end(&self, session: &str) {
        if !self.enabled {
            return;
        }

        if let (Some(started), Some(console)) = (self.store.stop_timer(session), &self.console) {
            console.time_end(session, started.elapsed());
        }

        let store = self.store.clone();
        let console = self.console.clone();
        let session = session.to_string();
        self.scheduler.defer(move || render(&store, console.as_deref(), &session));
    }
}

fn render(store: &SessionStore, console: Option<&dyn Console>, session: &str) {
    let entries = store.take(session);
    if entries.is_empty() {
        return;
    }
    let Some(console) = console else {
        return;
    };

    console.group(session);
    for entry in &entries {
        console.message(
            entry.severity,
            &format!(
                "{} message: {} pluginName: {}",
                entry.timestamp_ms,
                entry.message,
                entry.plugin_name.as_deref().unwrap_or("-")
            ),
        );
    }
    console.group_end();
}

fn now_epoch_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}

impl DiagnosticSink for DiagnosticLog {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn record(&self, event: DiagnosticEvent) {
        if !self.enabled {
            return;
        }

        match event.session {
            Some(session) => self.store.push(
                &session,
                LogEntry {
                    message: event.message,
                    timestamp_ms: now_epoch_ms(),
                    plugin_name: event.plugin_name,
                    severity: event.severity,
                },
            ),
            None => {
                if let Some(console) = &self.console {
                    console.message(event.severity, &event.message);
                }
            }
        }
    }

    fn end_session(&self, session: &str) {
        self.end(session);
    }
}

impl std::fmt::Debug for DiagnosticLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticLog")
            .field("enabled", &self.enabled)
            .field("has_console", &self.console.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{DiagnosticLog, SessionStore};
    use crate::diagnostics::{Console, ConsoleLine, MemoryConsole};
    use crate::scheduler::Scheduler;
    use std::sync::Arc;

    fn private_log(enabled: bool) -> (DiagnosticLog, Arc<MemoryConsole>, Arc<Scheduler>) {
        let console = Arc::new(MemoryConsole::new());
        let scheduler = Arc::new(Scheduler::new());
        let log = DiagnosticLog::new(
            enabled,
            Some(console.clone() as Arc<dyn Console>),
            Arc::clone(&scheduler),
        )
        .with_store(SessionStore::new());
        (log, console, scheduler)
    }

    #[test]
    fn grouped_entries_wait_for_end_and_next_tick() {
        let (log, console, scheduler) = private_log(true);
        log.log_in("g-1", Some("tabs"), "start");
        log.log_in("g-1", Some("tabs"), "end");
        assert!(console.lines().is_empty());

        log.end("g-1");
        assert!(matches!(
            console.lines().as_slice(),
            [ConsoleLine::TimerEnd { .. }]
        ));
        assert_eq!(log.store().buffered("g-1"), 2);

        scheduler.run_until_idle();
        let lines = console.lines();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], ConsoleLine::GroupStart("g-1".to_string()));
        assert_eq!(lines[4], ConsoleLine::GroupEnd);
        assert!(!log.store().contains("g-1"));
    }

    #[test]
    fn disabled_log_schedules_nothing() {
        let (log, console, scheduler) = private_log(false);
        log.log("ungrouped");
        log.log_in("g-2", None, "grouped");
        log.end("g-2");

        assert_eq!(scheduler.pending(), 0);
        assert!(console.lines().is_empty());
        assert_eq!(log.store().buffered("g-2"), 0);
    }

    #[test]
    fn missing_console_degrades_to_noop() {
        let scheduler = Arc::new(Scheduler::new());
        let log = DiagnosticLog::new(true, None, Arc::clone(&scheduler))
            .with_store(SessionStore::new());
        log.warn("nobody listens");
        log.log_in("g-3", None, "buffered");
        log.end("g-3");
        scheduler.run_until_idle();
        assert!(!log.store().contains("g-3"));
    }
}
