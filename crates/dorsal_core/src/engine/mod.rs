//! Wiring engine: attaches registered plugins to marked elements.
//!
//! # Responsibility
//! - Resolve which (element, plugin) pairs a `wire` call applies to.
//! - Defer each element's activation to the scheduler and aggregate the
//!   per-element tasks into one promise.
//! - Tear plugins down again on `unwire` and expose recorded instances.
//!
//! # Invariants
//! - A pair is activated at most once: the marker attribute plus the
//!   in-flight set, checked atomically on the node, guard every dispatch.
//! - The instance table is owned by one engine; wiring state lives on the
//!   element and survives engine recreation.
//! - No engine lock is held while plugin hooks run.

use crate::config::EngineConfig;
use crate::deferred::{Aggregate, Promise};
use crate::diagnostics::{Console, DiagnosticEvent, DiagnosticLog, DiagnosticSink, LogConsole};
use crate::dom::{Document, Node};
use crate::identity::{ElementGuid, IdentityGenerator, SequentialGenerator, UuidGenerator};
use crate::plugin::{Plugin, PluginError, PluginRegistry};
use crate::scheduler::{default_scheduler, Scheduler};
use once_cell::sync::Lazy;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

mod activation;
mod dispatch;
pub mod instances;
mod unwire;

pub use instances::{InstanceMap, InstanceTable};

static DEFAULT_DOCUMENT: Lazy<Document> = Lazy::new(Document::new);
static DEFAULT_ENGINE: Lazy<WiringEngine> =
    Lazy::new(|| WiringEngine::create(DEFAULT_DOCUMENT.clone(), EngineConfig::default()));

/// Document the default engine scans on [`WiringEngine::wire_all`].
pub fn default_document() -> &'static Document {
    &DEFAULT_DOCUMENT
}

/// Process-lifetime engine bound to [`default_document`].
pub fn default_engine() -> &'static WiringEngine {
    &DEFAULT_ENGINE
}

/// What a `wire` call should look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireTarget {
    /// Explicit "wire nothing": resolves immediately.
    Nothing,
    /// Query descendants of this node (document or element) by marker class.
    Subtree(Node),
    /// Exactly this element; plugins are picked by class membership.
    Element(Node),
    /// Exactly these elements; plugins are picked by class membership.
    Elements(Vec<Node>),
}

impl From<&Document> for WireTarget {
    fn from(document: &Document) -> Self {
        Self::Subtree(document.root().clone())
    }
}

impl From<Vec<Node>> for WireTarget {
    fn from(nodes: Vec<Node>) -> Self {
        Self::Elements(nodes)
    }
}

impl From<Option<Node>> for WireTarget {
    fn from(node: Option<Node>) -> Self {
        node.map_or(Self::Nothing, Self::Element)
    }
}

/// Progress emitted after each successful activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireProgress {
    pub plugin_name: String,
    pub guid: ElementGuid,
}

/// Resolution payload of one element's task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireReport {
    pub element: Node,
    /// Identity after the unit ran; `None` if nothing was ever activated.
    pub guid: Option<ElementGuid>,
    /// Plugins activated by this unit, in run order.
    pub activated: Vec<String>,
    /// Claimed plugins that turned out to be wired or unregistered at run time.
    pub skipped: Vec<String>,
}

/// Rejection payload of one element's task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireFailure {
    pub element: Node,
    pub guid: Option<ElementGuid>,
    /// Plugins that still activated on the same element.
    pub activated: Vec<String>,
    pub errors: Vec<PluginError>,
}

impl Display for WireFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let guid = self.guid.as_ref().map_or("<none>", ElementGuid::as_str);
        write!(f, "{} plugin(s) failed on element {guid}", self.errors.len())?;
        for err in &self.errors {
            write!(f, "; {err}")?;
        }
        Ok(())
    }
}

impl Error for WireFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.errors.first().map(|err| err as &(dyn Error + 'static))
    }
}

/// Task of one element's activation unit.
pub type ElementTask = Promise<WireReport, WireFailure, WireProgress>;
/// Aggregate returned by every `wire` flavor.
pub type WireTask = Aggregate<WireReport, WireFailure, WireProgress>;

struct EngineShared {
    document: Document,
    config: EngineConfig,
    registry: RwLock<PluginRegistry>,
    instances: Mutex<InstanceTable>,
    scheduler: Arc<Scheduler>,
    identities: Arc<dyn IdentityGenerator>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

/// Builder for engines that need non-default collaborators.
pub struct EngineBuilder {
    document: Document,
    config: EngineConfig,
    scheduler: Option<Arc<Scheduler>>,
    identities: Option<Arc<dyn IdentityGenerator>>,
    diagnostics: Option<Arc<dyn DiagnosticSink>>,
}

impl EngineBuilder {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn scheduler(mut self, scheduler: Arc<Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn identity_generator(mut self, identities: Arc<dyn IdentityGenerator>) -> Self {
        self.identities = Some(identities);
        self
    }

    pub fn diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    pub fn build(self) -> WiringEngine {
        let scheduler = self.scheduler.unwrap_or_else(default_scheduler);
        let identities = self.identities.unwrap_or_else(|| {
            match self.config.identity_prefix.as_deref() {
                Some(prefix) => SequentialGenerator::shared(prefix) as Arc<dyn IdentityGenerator>,
                None => Arc::new(UuidGenerator),
            }
        });
        let diagnostics = self.diagnostics.unwrap_or_else(|| {
            let console: Arc<dyn Console> = Arc::new(LogConsole::new());
            Arc::new(DiagnosticLog::new(
                self.config.debug,
                Some(console),
                Arc::clone(&scheduler),
            )) as Arc<dyn DiagnosticSink>
        });

        WiringEngine {
            shared: Arc::new(EngineShared {
                document: self.document,
                config: self.config,
                registry: RwLock::new(PluginRegistry::new()),
                instances: Mutex::new(InstanceTable::new()),
                scheduler,
                identities,
                diagnostics,
            }),
        }
    }
}

/// Cheap-to-clone handle to one engine context.
#[derive(Clone)]
pub struct WiringEngine {
    shared: Arc<EngineShared>,
}

impl WiringEngine {
    pub fn builder(document: Document) -> EngineBuilder {
        EngineBuilder {
            document,
            config: EngineConfig::default(),
            scheduler: None,
            identities: None,
            diagnostics: None,
        }
    }

    /// Creates an isolated engine: its own registry and instance table.
    pub fn create(document: Document, config: EngineConfig) -> Self {
        Self::builder(document).config(config).build()
    }

    pub fn document(&self) -> &Document {
        &self.shared.document
    }

    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.shared.scheduler
    }

    /// Drains this engine's scheduler. Returns the number of jobs run.
    pub fn run_until_idle(&self) -> usize {
        self.shared.scheduler.run_until_idle()
    }

    // -- registry -------------------------------------------------------------

    pub fn register_plugin(&self, name: impl Into<String>, plugin: Plugin) {
        self.registry_mut().register(name, plugin);
    }

    pub fn unregister_plugin(&self, name: &str) -> bool {
        self.registry_mut().unregister(name)
    }

    pub fn registered_plugins(&self) -> Vec<String> {
        self.registry().list()
    }

    // -- instances ------------------------------------------------------------

    /// Instance maps of `elements`, in input order.
    ///
    /// Elements without an identity or without recorded instances are
    /// omitted, not represented by placeholders.
    pub fn get(&self, elements: &[Node]) -> Vec<InstanceMap> {
        let table = self.instances();
        elements
            .iter()
            .filter_map(Node::guid)
            .filter_map(|guid| table.instances_for(&guid))
            .filter(|instances| !instances.is_empty())
            .cloned()
            .collect()
    }

    pub fn get_by_guid(&self, guid: &ElementGuid) -> Option<InstanceMap> {
        self.instances()
            .instances_for(guid)
            .filter(|instances| !instances.is_empty())
            .cloned()
    }

    // -- shared state access ----------------------------------------------------

    fn registry(&self) -> RwLockReadGuard<'_, PluginRegistry> {
        self.shared
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn registry_mut(&self) -> RwLockWriteGuard<'_, PluginRegistry> {
        self.shared
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn instances(&self) -> MutexGuard<'_, InstanceTable> {
        self.shared
            .instances
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn plugin(&self, name: &str) -> Option<Plugin> {
        self.registry().get(name).cloned()
    }

    /// Emits a diagnostic, building it only when the sink listens.
    fn diagnose(&self, build: impl FnOnce() -> DiagnosticEvent) {
        let sink = &self.shared.diagnostics;
        if sink.is_enabled() {
            sink.record(build());
        }
    }
}

impl Debug for WiringEngine {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WiringEngine")
            .field("config", &self.shared.config)
            .field("plugins", &self.registry().len())
            .field("elements", &self.instances().len())
            .finish_non_exhaustive()
    }
}
