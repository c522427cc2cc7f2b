//! Opaque plugin instance values.

use std::any::Any;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Value returned by a plugin activation for one element.
///
/// Cloning shares the same underlying object; use [`Instance::ptr_eq`] to
/// check that two handles point at the very same activation result.
#[derive(Clone)]
pub struct Instance {
    value: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    pub fn new<V>(value: V) -> Self
    where
        V: Any + Send + Sync,
    {
        Self {
            value: Arc::new(value),
        }
    }

    /// Instance for plugins that have nothing to hand back.
    pub fn empty() -> Self {
        Self::new(())
    }

    pub fn is_empty(&self) -> bool {
        self.value.is::<()>()
    }

    pub fn downcast_ref<V: Any>(&self) -> Option<&V> {
        self.value.downcast_ref::<V>()
    }

    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl Debug for Instance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("empty", &self.is_empty())
            .finish_non_exhaustive()
    }
}
