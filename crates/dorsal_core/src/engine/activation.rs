//! Deferred activation of one element's claimed plugins.

use crate::deferred::Deferred;
use crate::diagnostics::{DiagnosticEvent, Severity};
use crate::dom::Node;
use crate::engine::{WireFailure, WireProgress, WireReport, WiringEngine};
use crate::identity::ElementGuid;
use crate::logging::panic_payload_message;
use crate::plugin::{Activation, PluginError};
use log::{debug, error};
use std::panic::{self, AssertUnwindSafe};

enum Activated {
    Wired(ElementGuid),
    Skipped,
}

impl WiringEngine {
    /// Runs on a scheduler tick: activates every claimed plugin in order and
    /// settles the element's task.
    pub(super) fn run_element(
        &self,
        node: Node,
        claimed: Vec<String>,
        deferred: Deferred<WireReport, WireFailure, WireProgress>,
    ) {
        let mut activated = Vec::new();
        let mut skipped = Vec::new();
        let mut errors = Vec::new();

        for name in claimed {
            match self.activate(&node, &name) {
                Ok(Activated::Wired(guid)) => {
                    activated.push(name.clone());
                    deferred.notify(WireProgress {
                        plugin_name: name,
                        guid,
                    });
                }
                Ok(Activated::Skipped) => skipped.push(name),
                Err(err) => errors.push(err),
            }
        }

        let guid = node.guid();
        if let Some(guid) = &guid {
            self.shared.diagnostics.end_session(guid.as_str());
        }

        if errors.is_empty() {
            deferred.resolve(WireReport {
                element: node,
                guid,
                activated,
                skipped,
            });
        } else {
            deferred.reject(WireFailure {
                element: node,
                guid,
                activated,
                errors,
            });
        }
    }

    /// Activates one claimed pair. The claim is always released: either
    /// promoted to the marker or abandoned.
    fn activate(&self, node: &Node, plugin_name: &str) -> Result<Activated, PluginError> {
        if node.is_wired(plugin_name) {
            node.abandon_wiring(plugin_name);
            self.diagnose(|| {
                DiagnosticEvent::log(format!("node already wired: {node:?}")).for_plugin(plugin_name)
            });
            return Ok(Activated::Skipped);
        }

        let Some(plugin) = self.plugin(plugin_name) else {
            node.abandon_wiring(plugin_name);
            self.diagnose(|| {
                DiagnosticEvent::log("plugin unregistered before activation").for_plugin(plugin_name)
            });
            return Ok(Activated::Skipped);
        };

        let data = node.data_attributes();
        let (guid, created) = node.ensure_guid(self.shared.identities.as_ref());
        if created {
            self.instances().create_slot(&guid);
        }

        self.diagnose(|| {
            DiagnosticEvent::log("plugin execution start")
                .in_session(guid.as_str())
                .for_plugin(plugin_name)
        });

        let activation = Activation {
            element: node.clone(),
            data,
        };
        let hook = plugin.create_hook();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| hook(&activation)))
            .unwrap_or_else(|payload| {
                Err(PluginError::Panicked {
                    plugin_name: String::new(),
                    message: panic_payload_message(payload.as_ref()),
                })
            })
            .map_err(|err| err.with_plugin_name(plugin_name));

        self.diagnose(|| {
            DiagnosticEvent::log("plugin execution end")
                .in_session(guid.as_str())
                .for_plugin(plugin_name)
        });

        match outcome {
            Ok(instance) => {
                self.instances().insert(&guid, plugin_name, instance);
                node.complete_wiring(plugin_name);
                debug!(
                    "event=plugin_activate module=engine status=ok plugin={plugin_name} guid={guid}"
                );
                Ok(Activated::Wired(guid))
            }
            Err(err) => {
                node.abandon_wiring(plugin_name);
                self.diagnose(|| {
                    DiagnosticEvent::new(Severity::Error, err.to_string())
                        .in_session(guid.as_str())
                        .for_plugin(plugin_name)
                });
                error!(
                    "event=plugin_activate module=engine status=error plugin={plugin_name} guid={guid} error={err}"
                );
                Err(err)
            }
        }
    }
}
