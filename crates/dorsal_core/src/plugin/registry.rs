//! In-process plugin registry.

use crate::plugin::Plugin;
use log::warn;
use std::collections::BTreeMap;

/// Plugin name -> implementation map owned by one engine.
#[derive(Debug, Default, Clone)]
pub struct PluginRegistry {
    plugins: BTreeMap<String, Plugin>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `plugin` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, plugin: Plugin) {
        self.plugins.insert(name.into(), plugin);
    }

    /// Removes `name`. Absent names are not an error.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.plugins.remove(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Plugin> {
        self.plugins.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Returns sorted plugin names; warns when nothing is registered.
    pub fn list(&self) -> Vec<String> {
        if self.plugins.is_empty() {
            warn!("event=registry_list module=plugin status=empty message=\"No plugins registered\"");
        }
        self.plugins.keys().cloned().collect()
    }
}
