//! Per-engine instance table.
//!
//! # Invariants
//! - Only the owning engine reads or writes the table.
//! - A slot emptied by detaching its last plugin is removed.

use crate::identity::ElementGuid;
use crate::plugin::Instance;
use std::collections::{BTreeMap, HashMap};

/// Plugin name -> instance for one element.
pub type InstanceMap = BTreeMap<String, Instance>;

#[derive(Debug, Default)]
pub struct InstanceTable {
    slots: HashMap<ElementGuid, InstanceMap>,
}

impl InstanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty slot for a freshly identified element.
    pub fn create_slot(&mut self, guid: &ElementGuid) {
        self.slots.entry(guid.clone()).or_default();
    }

    pub fn insert(&mut self, guid: &ElementGuid, plugin_name: &str, instance: Instance) {
        self.slots
            .entry(guid.clone())
            .or_default()
            .insert(plugin_name.to_string(), instance);
    }

    pub fn get(&self, guid: &ElementGuid, plugin_name: &str) -> Option<&Instance> {
        self.slots.get(guid)?.get(plugin_name)
    }

    /// Removes one plugin instance, dropping the slot once it is empty.
    pub fn remove(&mut self, guid: &ElementGuid, plugin_name: &str) -> Option<Instance> {
        let slot = self.slots.get_mut(guid)?;
        let removed = slot.remove(plugin_name);
        if slot.is_empty() {
            self.slots.remove(guid);
        }
        removed
    }

    pub fn instances_for(&self, guid: &ElementGuid) -> Option<&InstanceMap> {
        self.slots.get(guid)
    }

    /// Number of elements with a slot.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::InstanceTable;
    use crate::identity::ElementGuid;
    use crate::plugin::Instance;

    fn guid(value: &str) -> ElementGuid {
        ElementGuid::parse(value).expect("valid guid")
    }

    #[test]
    fn removing_last_instance_drops_slot() {
        let mut table = InstanceTable::new();
        let id = guid("a");
        table.create_slot(&id);
        table.insert(&id, "tabs", Instance::new(1_u8));
        table.insert(&id, "modal", Instance::new(2_u8));

        assert!(table.remove(&id, "tabs").is_some());
        assert_eq!(table.len(), 1);
        assert!(table.remove(&id, "modal").is_some());
        assert!(table.is_empty());
        assert!(table.remove(&id, "modal").is_none());
    }

    #[test]
    fn fresh_slot_is_empty_but_present() {
        let mut table = InstanceTable::new();
        let id = guid("b");
        table.create_slot(&id);
        assert!(table
            .instances_for(&id)
            .is_some_and(|instances| instances.is_empty()));
        assert!(table.get(&id, "tabs").is_none());
    }
}
