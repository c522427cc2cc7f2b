//! Plugin contracts and registry.
//!
//! # Responsibility
//! - Define the two plugin shapes: a bare activation hook, or a lifecycle
//!   pair with an optional teardown hook.
//! - Define the context values handed to hooks.
//!
//! # Invariants
//! - The shape is fixed at registration time and dispatched explicitly.
//! - Hooks receive the element they run against; they never see the engine.

use crate::dom::{DataAttributes, Node};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

pub mod instance;
pub mod registry;

pub use instance::Instance;
pub use registry::PluginRegistry;

/// Activation hook: builds the instance for one element.
pub type ActivateFn = Arc<dyn Fn(&Activation) -> Result<Instance, PluginError> + Send + Sync>;
/// Teardown hook: releases whatever the activation set up.
pub type DestroyFn = Arc<dyn Fn(&Teardown) + Send + Sync>;

/// Context passed to an activation hook.
#[derive(Debug, Clone)]
pub struct Activation {
    /// Element being wired; plays the receiver role.
    pub element: Node,
    /// `data-d-*` attributes of the element.
    pub data: DataAttributes,
}

/// Context passed to a teardown hook.
#[derive(Debug, Clone)]
pub struct Teardown {
    pub element: Node,
    pub data: DataAttributes,
    /// Instance recorded at activation; `None` when this engine never
    /// recorded one (for example the element was wired by another engine).
    pub instance: Option<Instance>,
}

/// Registered plugin implementation.
#[derive(Clone)]
pub enum Plugin {
    /// Single activation function, no teardown.
    Activate(ActivateFn),
    /// Create hook plus optional destroy hook.
    Lifecycle {
        create: ActivateFn,
        destroy: Option<DestroyFn>,
    },
}

impl Plugin {
    pub fn activate<F>(hook: F) -> Self
    where
        F: Fn(&Activation) -> Result<Instance, PluginError> + Send + Sync + 'static,
    {
        Self::Activate(Arc::new(hook))
    }

    pub fn lifecycle<C, D>(create: C, destroy: D) -> Self
    where
        C: Fn(&Activation) -> Result<Instance, PluginError> + Send + Sync + 'static,
        D: Fn(&Teardown) + Send + Sync + 'static,
    {
        Self::Lifecycle {
            create: Arc::new(create),
            destroy: Some(Arc::new(destroy)),
        }
    }

    /// Lifecycle shape without a destroy hook.
    pub fn create_only<C>(create: C) -> Self
    where
        C: Fn(&Activation) -> Result<Instance, PluginError> + Send + Sync + 'static,
    {
        Self::Lifecycle {
            create: Arc::new(create),
            destroy: None,
        }
    }

    pub fn create_hook(&self) -> &ActivateFn {
        match self {
            Self::Activate(hook) => hook,
            Self::Lifecycle { create, .. } => create,
        }
    }

    pub fn destroy_hook(&self) -> Option<&DestroyFn> {
        match self {
            Self::Activate(_) => None,
            Self::Lifecycle { destroy, .. } => destroy.as_ref(),
        }
    }
}

impl Debug for Plugin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Activate(_) => f.write_str("Plugin::Activate"),
            Self::Lifecycle { destroy, .. } => f
                .debug_struct("Plugin::Lifecycle")
                .field("has_destroy", &destroy.is_some())
                .finish(),
        }
    }
}

/// Failure raised by a plugin activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginError {
    /// The hook reported a failure.
    Failed { plugin_name: String, message: String },
    /// The hook panicked; the payload is sanitized.
    Panicked { plugin_name: String, message: String },
}

impl PluginError {
    /// Convenience constructor for hooks; the engine fills in the name.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            plugin_name: String::new(),
            message: message.into(),
        }
    }

    pub fn plugin_name(&self) -> &str {
        match self {
            Self::Failed { plugin_name, .. } | Self::Panicked { plugin_name, .. } => plugin_name,
        }
    }

    pub(crate) fn with_plugin_name(self, name: &str) -> Self {
        match self {
            Self::Failed { message, .. } => Self::Failed {
                plugin_name: name.to_string(),
                message,
            },
            Self::Panicked { message, .. } => Self::Panicked {
                plugin_name: name.to_string(),
                message,
            },
        }
    }
}

impl Display for PluginError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Failed {
                plugin_name,
                message,
            } => write!(f, "plugin `{plugin_name}` failed to activate: {message}"),
            Self::Panicked {
                plugin_name,
                message,
            } => write!(f, "plugin `{plugin_name}` panicked during activation: {message}"),
        }
    }
}

impl Error for PluginError {}
