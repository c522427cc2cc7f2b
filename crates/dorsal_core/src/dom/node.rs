//! In-memory document tree consumed by the wiring engine.
//!
//! # Responsibility
//! - Model nodes with ordered attributes, a class list and children.
//! - Keep wiring bookkeeping (marker attribute + in-flight set) consistent
//!   under one per-node lock.
//!
//! # Invariants
//! - `Node` is a shared handle; equality is identity, not structure.
//! - The marker attribute is the source of truth for "already wired".
//! - A plugin name is never both wired and in flight on the same node.

use crate::dom::attributes::{
    dataset_key, extract_data_attributes, DataAttributes, GUID_ATTRIBUTE, WIRED_ATTRIBUTE,
};
use crate::dom::marker::WiredMarker;
use crate::identity::{ElementGuid, IdentityGenerator};
use std::collections::{BTreeSet, HashSet};
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const CLASS_ATTRIBUTE: &str = "class";

/// Node category; only elements can be wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Whole-document root.
    Document,
    /// Regular element carrying attributes and classes.
    Element,
}

/// Result of trying to reserve one plugin slot on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WiringClaim {
    /// Reserved; the caller must later complete or abandon it.
    Claimed,
    /// The marker already lists the plugin.
    AlreadyWired,
    /// Another dispatch reserved the plugin and has not run yet.
    InFlight,
}

#[derive(Default)]
struct NodeState {
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
    in_flight: BTreeSet<String>,
}

impl NodeState {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn set_attribute(&mut self, name: &str, value: String) {
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    fn marker(&self) -> Option<WiredMarker> {
        self.attribute(WIRED_ATTRIBUTE).map(WiredMarker::parse)
    }
}

struct NodeInner {
    kind: NodeKind,
    tag: String,
    state: Mutex<NodeState>,
}

/// Shared handle to one tree node.
#[derive(Clone)]
pub struct Node {
    inner: Arc<NodeInner>,
}

impl Node {
    fn with_kind(kind: NodeKind, tag: &str) -> Self {
        Self {
            inner: Arc::new(NodeInner {
                kind,
                tag: tag.to_string(),
                state: Mutex::new(NodeState::default()),
            }),
        }
    }

    /// Creates a detached element node.
    pub fn element(tag: &str) -> Self {
        Self::with_kind(NodeKind::Element, tag)
    }

    pub(crate) fn document_root() -> Self {
        Self::with_kind(NodeKind::Document, "#document")
    }

    fn state(&self) -> MutexGuard<'_, NodeState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn kind(&self) -> NodeKind {
        self.inner.kind
    }

    pub fn is_document(&self) -> bool {
        self.inner.kind == NodeKind::Document
    }

    pub fn is_element(&self) -> bool {
        self.inner.kind == NodeKind::Element
    }

    pub fn tag(&self) -> &str {
        &self.inner.tag
    }

    /// Identity comparison of two handles.
    pub fn same_node(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // -- attributes ---------------------------------------------------------

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.state().attribute(name).map(str::to_string)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.state().attribute(name).is_some()
    }

    pub fn set_attribute(&self, name: &str, value: impl Into<String>) {
        self.state().set_attribute(name, value.into());
    }

    pub fn remove_attribute(&self, name: &str) -> Option<String> {
        let mut state = self.state();
        let index = state.attributes.iter().position(|(key, _)| key == name)?;
        Some(state.attributes.remove(index).1)
    }

    /// Snapshot of all attributes in insertion order.
    pub fn attributes(&self) -> Vec<(String, String)> {
        self.state().attributes.clone()
    }

    /// Dataset view: `data-*` attributes keyed the way browsers expose them.
    pub fn dataset(&self) -> Vec<(String, String)> {
        self.state()
            .attributes
            .iter()
            .filter_map(|(name, value)| Some((dataset_key(name)?, value.clone())))
            .collect()
    }

    /// Plugin data extracted from `data-d-*` attributes.
    pub fn data_attributes(&self) -> DataAttributes {
        let state = self.state();
        extract_data_attributes(
            state
                .attributes
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str())),
        )
    }

    // -- classes ------------------------------------------------------------

    pub fn class_list(&self) -> Vec<String> {
        self.state()
            .attribute(CLASS_ATTRIBUTE)
            .map(|value| value.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Exact class membership test.
    pub fn has_class(&self, class_name: &str) -> bool {
        self.state()
            .attribute(CLASS_ATTRIBUTE)
            .is_some_and(|value| value.split_whitespace().any(|class| class == class_name))
    }

    pub fn add_class(&self, class_name: &str) {
        let mut state = self.state();
        let current = state
            .attribute(CLASS_ATTRIBUTE)
            .unwrap_or_default()
            .to_string();
        if current.split_whitespace().any(|class| class == class_name) {
            return;
        }
        let updated = if current.trim().is_empty() {
            class_name.to_string()
        } else {
            format!("{} {class_name}", current.trim_end())
        };
        state.set_attribute(CLASS_ATTRIBUTE, updated);
    }

    // -- tree ---------------------------------------------------------------

    /// Appends `child`. Appending a node to itself is ignored.
    pub fn append_child(&self, child: Node) {
        if self.same_node(&child) {
            return;
        }
        self.state().children.push(child);
    }

    pub fn children(&self) -> Vec<Node> {
        self.state().children.clone()
    }

    /// Descendants (excluding `self`) carrying `class_name`, in document order.
    pub fn descendants_with_class(&self, class_name: &str) -> Vec<Node> {
        let mut matches = Vec::new();
        let mut visited: HashSet<*const NodeInner> = HashSet::new();
        visited.insert(Arc::as_ptr(&self.inner));

        let mut stack: Vec<Node> = self.children().into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            if !visited.insert(Arc::as_ptr(&node.inner)) {
                continue;
            }
            if node.has_class(class_name) {
                matches.push(node.clone());
            }
            stack.extend(node.children().into_iter().rev());
        }
        matches
    }

    // -- builder helpers ------------------------------------------------------

    pub fn with_attribute(self, name: &str, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_class(self, class_name: &str) -> Self {
        self.add_class(class_name);
        self
    }

    pub fn with_child(self, child: Node) -> Self {
        self.append_child(child);
        self
    }

    // -- identity and wiring bookkeeping ------------------------------------

    pub fn guid(&self) -> Option<ElementGuid> {
        self.state()
            .attribute(GUID_ATTRIBUTE)
            .and_then(ElementGuid::parse)
    }

    /// Returns the node identity, generating and storing one when absent.
    ///
    /// The boolean is `true` when a fresh identity was assigned.
    pub fn ensure_guid(&self, generator: &dyn IdentityGenerator) -> (ElementGuid, bool) {
        let mut state = self.state();
        if let Some(existing) = state.attribute(GUID_ATTRIBUTE).and_then(ElementGuid::parse) {
            return (existing, false);
        }
        let guid = generator.next_guid();
        state.set_attribute(GUID_ATTRIBUTE, guid.to_string());
        (guid, true)
    }

    /// Parsed wiring marker, or `None` when the attribute was never written.
    pub fn wired_marker(&self) -> Option<WiredMarker> {
        self.state().marker()
    }

    pub fn is_wired(&self, plugin_name: &str) -> bool {
        self.state()
            .marker()
            .is_some_and(|marker| marker.contains(plugin_name))
    }

    pub fn is_in_flight(&self, plugin_name: &str) -> bool {
        self.state().in_flight.contains(plugin_name)
    }

    /// Reserves `plugin_name` for activation, checking marker and in-flight
    /// set atomically.
    pub fn claim_wiring(&self, plugin_name: &str) -> WiringClaim {
        let mut state = self.state();
        if state
            .marker()
            .is_some_and(|marker| marker.contains(plugin_name))
        {
            return WiringClaim::AlreadyWired;
        }
        if !state.in_flight.insert(plugin_name.to_string()) {
            return WiringClaim::InFlight;
        }
        WiringClaim::Claimed
    }

    /// Moves a claimed plugin from in flight to the marker attribute.
    pub fn complete_wiring(&self, plugin_name: &str) {
        let mut state = self.state();
        state.in_flight.remove(plugin_name);
        let mut marker = state.marker().unwrap_or_default();
        marker.insert(plugin_name);
        state.set_attribute(WIRED_ATTRIBUTE, marker.to_attribute());
    }

    /// Drops a claim without marking the plugin wired.
    pub fn abandon_wiring(&self, plugin_name: &str) {
        self.state().in_flight.remove(plugin_name);
    }

    /// Removes `plugin_name` from the marker attribute.
    ///
    /// The attribute itself stays (possibly empty) once it has been written.
    pub fn remove_wired(&self, plugin_name: &str) -> bool {
        let mut state = self.state();
        let Some(mut marker) = state.marker() else {
            return false;
        };
        let removed = marker.remove(plugin_name);
        state.set_attribute(WIRED_ATTRIBUTE, marker.to_attribute());
        removed
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.same_node(other)
    }
}

impl Eq for Node {}

impl Debug for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("Node")
            .field("kind", &self.inner.kind)
            .field("tag", &self.inner.tag)
            .field("guid", &state.attribute(GUID_ATTRIBUTE))
            .field("class", &state.attribute(CLASS_ATTRIBUTE))
            .finish()
    }
}

/// A whole document: a root node of kind [`NodeKind::Document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Node,
}

impl Document {
    pub fn new() -> Self {
        Self {
            root: Node::document_root(),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn append_child(&self, child: Node) {
        self.root.append_child(child);
    }

    pub fn query_by_class(&self, class_name: &str) -> Vec<Node> {
        self.root.descendants_with_class(class_name)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
