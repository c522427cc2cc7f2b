use dorsal_core::{
    DataAttributes, Document, EngineConfig, Instance, Node, Plugin, Scheduler, WiringEngine,
};
use std::sync::{Arc, Mutex};

type Captured = Arc<Mutex<Vec<DataAttributes>>>;

fn capture_engine(document: Document, config: EngineConfig) -> (WiringEngine, Captured) {
    let engine = WiringEngine::builder(document)
        .config(config)
        .scheduler(Arc::new(Scheduler::new()))
        .build();
    let captured = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&captured);
    engine.register_plugin(
        "form",
        Plugin::activate(move |activation| {
            sink.lock()
                .expect("capture lock")
                .push(activation.data.clone());
            Ok(Instance::empty())
        }),
    );
    (engine, captured)
}

#[test]
fn camel_and_hyphen_spellings_extract_to_the_same_key() {
    let document = Document::new();
    document.append_child(
        Node::element("form")
            .with_class("js-d-form")
            .with_attribute("data-d-fooBar", "camel"),
    );
    document.append_child(
        Node::element("form")
            .with_class("js-d-form")
            .with_attribute("data-d-foo-bar", "hyphen"),
    );

    let (engine, captured) = capture_engine(document, EngineConfig::default());
    engine.wire_all();
    engine.run_until_idle();

    let captured = captured.lock().expect("capture lock");
    assert_eq!(captured.len(), 2);
    assert_eq!(captured[0].get("fooBar").map(String::as_str), Some("camel"));
    assert_eq!(captured[1].get("fooBar").map(String::as_str), Some("hyphen"));
}

#[test]
fn bookkeeping_and_foreign_data_attributes_are_not_forwarded() {
    let document = Document::new();
    document.append_child(
        Node::element("form")
            .with_class("js-d-form")
            .with_attribute("data-xd-note", "internal")
            .with_attribute("data-tracking", "foreign")
            .with_attribute("data-d-action", "/submit"),
    );

    let (engine, captured) = capture_engine(document, EngineConfig::default());
    engine.wire_all();
    engine.run_until_idle();

    let captured = captured.lock().expect("capture lock");
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].len(), 1);
    assert_eq!(captured[0].get("action").map(String::as_str), Some("/submit"));
}

#[test]
fn prerendered_marker_suppresses_activation() {
    let document = Document::new();
    let element = Node::element("form")
        .with_class("js-d-form")
        .with_attribute("data-xd-wired", "form");
    document.append_child(element.clone());

    let (engine, captured) = capture_engine(document, EngineConfig::default());
    engine.wire_all();
    engine.run_until_idle();

    assert!(captured.lock().expect("capture lock").is_empty());
    assert!(element.guid().is_none());
}

#[test]
fn configured_identity_prefix_is_written_to_markup() {
    let document = Document::new();
    let element = Node::element("form").with_class("js-d-form");
    document.append_child(element.clone());

    let config = EngineConfig::from_json_str(r#"{ "identity_prefix": "form" }"#)
        .expect("config parses");
    let (engine, _) = capture_engine(document, config);
    engine.wire_all();
    engine.run_until_idle();

    assert_eq!(element.attribute("dorsal-guid").as_deref(), Some("form-1"));
}
