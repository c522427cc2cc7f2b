use dorsal_core::diagnostics::ConsoleLine;
use dorsal_core::{
    Console, DiagnosticLog, DiagnosticSink, Document, Instance, MemoryConsole, Node, Plugin,
    Scheduler, SequentialGenerator, SessionStore, WiringEngine,
};
use std::sync::Arc;

fn memory_log(
    scheduler: &Arc<Scheduler>,
    store: SessionStore,
) -> (DiagnosticLog, Arc<MemoryConsole>) {
    let console = Arc::new(MemoryConsole::new());
    let log = DiagnosticLog::new(
        true,
        Some(console.clone() as Arc<dyn Console>),
        Arc::clone(scheduler),
    )
    .with_store(store);
    (log, console)
}

#[test]
fn wiring_renders_one_group_per_element_identity() {
    let document = Document::new();
    document.append_child(Node::element("div").with_class("js-d-widget"));

    let scheduler = Arc::new(Scheduler::new());
    let (log, console) = memory_log(&scheduler, SessionStore::new());
    let engine = WiringEngine::builder(document)
        .scheduler(Arc::clone(&scheduler))
        .identity_generator(Arc::new(SequentialGenerator::new("diag")))
        .diagnostics(Arc::new(log))
        .build();
    engine.register_plugin("widget", Plugin::activate(|_| Ok(Instance::empty())));

    engine.wire_all();
    engine.run_until_idle();

    let lines = console.lines();
    assert!(matches!(
        lines.first(),
        Some(ConsoleLine::TimerEnd { label, .. }) if label == "diag-1"
    ));
    assert!(lines.contains(&ConsoleLine::GroupStart("diag-1".to_string())));
    assert_eq!(lines.last(), Some(&ConsoleLine::GroupEnd));

    let messages = console.messages();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].ends_with("message: plugin execution start pluginName: widget"));
    assert!(messages[1].ends_with("message: plugin execution end pluginName: widget"));
}

#[test]
fn ungrouped_diagnostics_print_immediately() {
    let scheduler = Arc::new(Scheduler::new());
    let (log, console) = memory_log(&scheduler, SessionStore::new());
    let engine = WiringEngine::builder(Document::new())
        .scheduler(Arc::clone(&scheduler))
        .diagnostics(Arc::new(log))
        .build();

    engine.wire_plugin(engine.document(), "missing");
    let unwired = Node::element("div");
    assert!(!engine.unwire(&unwired, None));

    let messages = console.messages();
    assert_eq!(messages[0], "plugin not registered: missing");
    assert!(messages[1].starts_with("node has no wiring marker"));
    assert!(scheduler.is_idle());
}

#[test]
fn sessions_are_shared_between_log_instances() {
    let scheduler = Arc::new(Scheduler::new());
    let (writer, _) = memory_log(&scheduler, SessionStore::shared());
    let (reader, console) = memory_log(&scheduler, SessionStore::shared());
    let session = "shared-store-session";

    writer.log_in(session, Some("tabs"), "buffered by writer");
    assert_eq!(reader.store().buffered(session), 1);

    reader.end_session(session);
    scheduler.run_until_idle();

    let messages = console.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("message: buffered by writer pluginName: tabs"));
    assert!(!SessionStore::shared().contains(session));
}

#[test]
fn disabled_engine_diagnostics_stay_silent() {
    let scheduler = Arc::new(Scheduler::new());
    let console = Arc::new(MemoryConsole::new());
    let log = DiagnosticLog::new(
        false,
        Some(console.clone() as Arc<dyn Console>),
        Arc::clone(&scheduler),
    )
    .with_store(SessionStore::new());
    assert!(!log.is_enabled());

    let engine = WiringEngine::builder(Document::new())
        .scheduler(Arc::clone(&scheduler))
        .diagnostics(Arc::new(log))
        .build();
    engine.wire_plugin(engine.document(), "missing");
    engine.run_until_idle();

    assert!(console.lines().is_empty());
}
