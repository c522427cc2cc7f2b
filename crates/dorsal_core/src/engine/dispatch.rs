//! Target resolution and scheduling for `wire`.

use crate::deferred::{when, Deferred};
use crate::diagnostics::DiagnosticEvent;
use crate::dom::{marker_class, Node, WiringClaim};
use crate::engine::{ElementTask, WireTarget, WireTask, WiringEngine};
use log::debug;

impl WiringEngine {
    /// Wires every registered plugin across the engine's whole document.
    pub fn wire_all(&self) -> WireTask {
        self.wire(WireTarget::Subtree(self.document().root().clone()))
    }

    /// Wires every registered plugin against `target`.
    pub fn wire(&self, target: impl Into<WireTarget>) -> WireTask {
        self.dispatch(target.into(), None)
    }

    /// Wires only `plugin_name` against `target`.
    pub fn wire_plugin(&self, target: impl Into<WireTarget>, plugin_name: &str) -> WireTask {
        self.dispatch(target.into(), Some(plugin_name))
    }

    fn dispatch(&self, target: WireTarget, plugin_name: Option<&str>) -> WireTask {
        let tasks = match target {
            WireTarget::Nothing => Vec::new(),
            WireTarget::Subtree(root) => self.wire_elements_from(&root, plugin_name),
            WireTarget::Element(node) => self.wire_elements(&[node], plugin_name),
            WireTarget::Elements(nodes) => self.wire_elements(&nodes, plugin_name),
        };
        debug!(
            "event=wire_dispatch module=engine status=ok plugin={} units={}",
            plugin_name.unwrap_or("*"),
            tasks.len()
        );
        when(&tasks)
    }

    /// Plugin names a dispatch considers: the requested one if registered,
    /// otherwise every registered name.
    fn candidate_plugins(&self, plugin_name: Option<&str>) -> Vec<String> {
        match plugin_name {
            Some(name) if self.registry().contains(name) => vec![name.to_string()],
            Some(name) => {
                self.diagnose(|| DiagnosticEvent::log(format!("plugin not registered: {name}")));
                Vec::new()
            }
            None => self.registered_plugins(),
        }
    }

    /// Per-plugin discovery under `root`: each plugin queries its own marker
    /// class and is dispatched against exactly those nodes.
    fn wire_elements_from(&self, root: &Node, plugin_name: Option<&str>) -> Vec<ElementTask> {
        let mut tasks = Vec::new();
        for name in self.candidate_plugins(plugin_name) {
            let nodes = root.descendants_with_class(&marker_class(&name));
            if nodes.is_empty() {
                continue;
            }
            tasks.extend(
                nodes
                    .into_iter()
                    .map(|node| self.schedule_element(node, vec![name.clone()])),
            );
        }
        tasks
    }

    /// Fixed candidate set: only plugins whose marker class the element
    /// carries are dispatched.
    fn wire_elements(&self, nodes: &[Node], plugin_name: Option<&str>) -> Vec<ElementTask> {
        if nodes.is_empty() {
            self.diagnose(|| DiagnosticEvent::log("no nodes to wire"));
            return Vec::new();
        }

        let candidates = self.candidate_plugins(plugin_name);
        let mut tasks = Vec::with_capacity(nodes.len());
        for node in nodes {
            if !node.is_element() {
                self.diagnose(|| DiagnosticEvent::log(format!("invalid node to wire: {node:?}")));
                continue;
            }
            let matching = candidates
                .iter()
                .filter(|name| node.has_class(&marker_class(name)))
                .cloned()
                .collect();
            tasks.push(self.schedule_element(node.clone(), matching));
        }
        tasks
    }

    /// Claims each plugin on `node` now and defers activation to the next tick.
    fn schedule_element(&self, node: Node, plugin_names: Vec<String>) -> ElementTask {
        let mut claimed = Vec::with_capacity(plugin_names.len());
        for name in plugin_names {
            match node.claim_wiring(&name) {
                WiringClaim::Claimed => claimed.push(name),
                WiringClaim::AlreadyWired => self.diagnose(|| {
                    DiagnosticEvent::log(format!("node already wired: {node:?}")).for_plugin(&name)
                }),
                WiringClaim::InFlight => self.diagnose(|| {
                    DiagnosticEvent::log(format!("node wiring already in flight: {node:?}"))
                        .for_plugin(&name)
                }),
            }
        }

        let deferred = Deferred::new();
        let task = deferred.promise();
        let engine = self.clone();
        self.scheduler()
            .defer(move || engine.run_element(node, claimed, deferred));
        task
    }
}
