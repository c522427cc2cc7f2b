//! Document tree and markup conventions.
//!
//! The engine never touches markup directly; it reads classes and data
//! attributes and writes the identity and wiring marker attributes through
//! the [`Node`] handle defined here.

pub mod attributes;
pub mod marker;
pub mod node;

pub use attributes::{
    marker_class, DataAttributes, DATA_IGNORE_PREFIX, DATA_PREFIX, GUID_ATTRIBUTE,
    MARKER_CLASS_PREFIX, WIRED_ATTRIBUTE,
};
pub use marker::WiredMarker;
pub use node::{Document, Node, NodeKind, WiringClaim};
