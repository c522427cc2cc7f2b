//! CLI smoke entry point.
//!
//! # Responsibility
//! - Wire a small in-memory document end to end to verify `dorsal_core`
//!   linkage.
//! - Keep output deterministic for quick local sanity checks.

use dorsal_core::{
    default_log_level, init_logging, Document, EngineConfig, Instance, LogTarget, Node, Plugin,
    WiringEngine,
};
use log::info;

fn main() {
    let debug = std::env::args().any(|arg| arg == "--debug");
    if let Err(err) = init_logging(default_log_level(), LogTarget::Stderr) {
        eprintln!("dorsal: logging disabled: {err}");
    }

    println!("dorsal_core version={}", dorsal_core::core_version());

    let document = Document::new();
    document.append_child(
        Node::element("section")
            .with_class("js-d-greeter")
            .with_attribute("data-d-name", "world")
            .with_child(
                Node::element("span")
                    .with_class("js-d-greeter")
                    .with_attribute("data-d-name", "nested"),
            ),
    );

    let config = EngineConfig {
        debug,
        identity_prefix: Some("cli".to_string()),
    };
    let engine = WiringEngine::create(document, config);
    engine.register_plugin(
        "greeter",
        Plugin::activate(|activation| {
            let name = activation
                .data
                .get("name")
                .cloned()
                .unwrap_or_else(|| "anonymous".to_string());
            Ok(Instance::new(format!("hello, {name}")))
        }),
    );

    let task = engine.wire_all();
    let jobs = engine.run_until_idle();
    let outcomes = task.value().map_or(0, |outcomes| outcomes.len());
    info!("event=cli_wire module=cli status=ok jobs={jobs} outcomes={outcomes}");

    let elements = engine.document().query_by_class("js-d-greeter");
    for instances in engine.get(&elements) {
        for (plugin_name, instance) in &instances {
            let greeting = instance
                .downcast_ref::<String>()
                .map_or("<opaque>", String::as_str);
            println!("{plugin_name}: {greeting}");
        }
    }
    println!("wired elements={outcomes}");
}
