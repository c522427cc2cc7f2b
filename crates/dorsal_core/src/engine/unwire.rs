//! Teardown and rewiring.

use crate::diagnostics::{DiagnosticEvent, Severity};
use crate::dom::Node;
use crate::engine::{WireTarget, WireTask, WiringEngine};
use crate::logging::panic_payload_message;
use crate::plugin::Teardown;
use log::{debug, error};
use std::panic::{self, AssertUnwindSafe};

impl WiringEngine {
    /// Detaches `plugin_name`, or every wired plugin when `None`.
    ///
    /// Returns whether at least one teardown hook ran to completion. An
    /// element that was never wired returns `false`.
    pub fn unwire(&self, element: &Node, plugin_name: Option<&str>) -> bool {
        let Some(marker) = element.wired_marker() else {
            self.diagnose(|| DiagnosticEvent::log(format!("node has no wiring marker: {element:?}")));
            return false;
        };

        match plugin_name {
            Some(name) => self.detach(element, name),
            None => marker
                .names()
                .iter()
                .fold(false, |destroyed, name| self.detach(element, name) || destroyed),
        }
    }

    /// Unwires, then wires the element again.
    ///
    /// Without a plugin name the element is re-wired as a one-element
    /// collection, so every marker class it carries is considered.
    pub fn rewire(&self, element: &Node, plugin_name: Option<&str>) -> WireTask {
        self.unwire(element, plugin_name);
        match plugin_name {
            Some(name) => self.wire_plugin(WireTarget::Element(element.clone()), name),
            None => self.wire(WireTarget::Elements(vec![element.clone()])),
        }
    }

    /// Detaches one plugin. The marker entry and the instance are released
    /// before the teardown hook runs, so a panicking hook cannot leave the
    /// element half wired.
    fn detach(&self, element: &Node, plugin_name: &str) -> bool {
        let was_wired = element.remove_wired(plugin_name);
        let instance = element
            .guid()
            .and_then(|guid| self.instances().remove(&guid, plugin_name));
        let destroy = self
            .plugin(plugin_name)
            .and_then(|plugin| plugin.destroy_hook().cloned());

        let Some(destroy) = destroy.filter(|_| was_wired) else {
            debug!(
                "event=plugin_detach module=engine status=ok plugin={plugin_name} destroyed=false"
            );
            return false;
        };

        let teardown = Teardown {
            element: element.clone(),
            data: element.data_attributes(),
            instance,
        };
        match panic::catch_unwind(AssertUnwindSafe(|| destroy(&teardown))) {
            Ok(()) => {
                debug!(
                    "event=plugin_detach module=engine status=ok plugin={plugin_name} destroyed=true"
                );
                true
            }
            Err(payload) => {
                let message = panic_payload_message(payload.as_ref());
                self.diagnose(|| {
                    DiagnosticEvent::new(
                        Severity::Error,
                        format!("plugin teardown panicked: {message}"),
                    )
                    .for_plugin(plugin_name)
                });
                error!(
                    "event=plugin_detach module=engine status=error plugin={plugin_name} error={message}"
                );
                false
            }
        }
    }
}
