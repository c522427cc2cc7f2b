//! Declarative widget wiring for element trees.
//!
//! Elements opt into behavior through marker classes (`js-d-<name>`); the
//! [`WiringEngine`] discovers them, activates registered [`Plugin`]s on a
//! cooperative [`Scheduler`] tick and keeps the produced instances per
//! element identity.

pub mod config;
pub mod deferred;
pub mod diagnostics;
pub mod dom;
pub mod engine;
pub mod identity;
pub mod logging;
pub mod plugin;
pub mod scheduler;

pub use config::{ConfigError, EngineConfig};
pub use deferred::{when, Aggregate, Deferred, Outcome, Promise, TaskState};
pub use diagnostics::{
    Console, DiagnosticEvent, DiagnosticLog, DiagnosticSink, LogConsole, MemoryConsole, NullSink,
    SessionStore, Severity,
};
pub use dom::{marker_class, DataAttributes, Document, Node, WiredMarker};
pub use engine::{
    default_document, default_engine, ElementTask, EngineBuilder, InstanceMap, WireFailure,
    WireProgress, WireReport, WireTarget, WireTask, WiringEngine,
};
pub use identity::{ElementGuid, IdentityGenerator, SequentialGenerator, UuidGenerator};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use plugin::{Activation, Instance, Plugin, PluginError, PluginRegistry, Teardown};
pub use scheduler::{default_scheduler, Scheduler};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
