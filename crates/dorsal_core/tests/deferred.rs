use dorsal_core::{when, Deferred, Outcome, Promise, TaskState};
use std::sync::{Arc, Mutex};

type Calls = Arc<Mutex<Vec<String>>>;

fn recorder() -> Calls {
    Arc::new(Mutex::new(Vec::new()))
}

fn record(calls: &Calls, label: &str) -> impl Fn(&String) + Send + Sync + 'static {
    let calls = Arc::clone(calls);
    let label = label.to_string();
    move |payload: &String| {
        calls
            .lock()
            .expect("calls lock")
            .push(format!("{label}:{payload}"));
    }
}

fn recorded(calls: &Calls) -> Vec<String> {
    calls.lock().expect("calls lock").clone()
}

fn subscribed(
    deferred: &Deferred<String, String, String>,
    calls: &Calls,
) -> Promise<String, String, String> {
    let promise = deferred.promise();
    promise
        .done(record(calls, "done1"))
        .done(record(calls, "done2"))
        .fail(record(calls, "fail1"))
        .fail(record(calls, "fail2"));
    promise
}

#[test]
fn new_deferred_starts_pending() {
    let deferred: Deferred<String, String, String> = Deferred::new();
    assert_eq!(deferred.state(), TaskState::Pending);
    assert!(deferred.promise().is_pending());
    assert_eq!(TaskState::Pending.as_str(), "pending");
}

#[test]
fn resolve_runs_every_done_callback_with_the_value() {
    let calls = recorder();
    let deferred = Deferred::new();
    let promise = subscribed(&deferred, &calls);

    assert!(deferred.resolve("instances".to_string()));

    assert_eq!(
        recorded(&calls),
        vec!["done1:instances".to_string(), "done2:instances".to_string()]
    );
    assert_eq!(promise.state(), TaskState::Resolved);
    assert_eq!(deferred.state().to_string(), "resolved");
}

#[test]
fn done_registered_after_resolution_runs_immediately() {
    let calls = recorder();
    let deferred: Deferred<String, String, String> = Deferred::resolved("late".to_string());

    deferred.promise().done(record(&calls, "after"));
    assert_eq!(recorded(&calls), vec!["after:late".to_string()]);
}

#[test]
fn reject_runs_every_fail_callback_and_skips_done() {
    let calls = recorder();
    let deferred = Deferred::new();
    let promise = subscribed(&deferred, &calls);

    assert!(deferred.reject("broken".to_string()));

    assert_eq!(
        recorded(&calls),
        vec!["fail1:broken".to_string(), "fail2:broken".to_string()]
    );
    assert_eq!(promise.state(), TaskState::Rejected);
    assert_eq!(promise.error().as_deref().map(String::as_str), Some("broken"));

    promise.fail(record(&calls, "after"));
    assert_eq!(recorded(&calls).last().map(String::as_str), Some("after:broken"));
}

#[test]
fn settling_twice_is_ignored() {
    let calls = recorder();
    let deferred = Deferred::new();
    subscribed(&deferred, &calls);

    assert!(deferred.reject("first".to_string()));
    assert!(!deferred.resolve("second".to_string()));
    assert!(!deferred.reject("third".to_string()));

    assert_eq!(recorded(&calls).len(), 2);
    assert_eq!(deferred.state(), TaskState::Rejected);
}

#[test]
fn notify_reaches_registered_progress_callbacks_only() {
    let calls = recorder();
    let deferred: Deferred<String, String, String> = Deferred::new();
    let promise = deferred.promise();

    deferred.notify("missed".to_string());
    promise.progress(record(&calls, "progress"));
    deferred.notify("step".to_string());

    assert_eq!(recorded(&calls), vec!["progress:step".to_string()]);
    assert_eq!(promise.state(), TaskState::Pending);
}

#[test]
fn when_waits_for_every_input() {
    let inputs: Vec<Deferred<String, String, String>> = vec![Deferred::new(), Deferred::new()];
    let promises: Vec<_> = inputs.iter().map(Deferred::promise).collect();
    let aggregate = when(&promises);

    inputs[0].resolve("a".to_string());
    assert_eq!(aggregate.state(), TaskState::Pending);

    inputs[1].resolve("b".to_string());
    assert_eq!(aggregate.state(), TaskState::Resolved);
}

#[test]
fn when_resolves_even_if_every_input_rejects() {
    let inputs: Vec<Deferred<String, String, String>> = vec![Deferred::new(), Deferred::new()];
    let promises: Vec<_> = inputs.iter().map(Deferred::promise).collect();
    let aggregate = when(&promises);

    let failures = recorder();
    let sink = Arc::clone(&failures);
    aggregate.fail(move |_| sink.lock().expect("calls lock").push("fail".to_string()));

    inputs[0].reject("x".to_string());
    inputs[1].reject("y".to_string());

    assert_eq!(aggregate.state(), TaskState::Resolved);
    assert!(recorded(&failures).is_empty());
    let outcomes = aggregate.value().expect("aggregate resolved");
    assert!(outcomes.iter().all(Outcome::is_rejected));
}

#[test]
fn when_with_no_inputs_resolves_immediately() {
    let aggregate = when::<String, String, String>(&[]);
    assert_eq!(aggregate.state(), TaskState::Resolved);
    assert!(aggregate.value().expect("aggregate resolved").is_empty());
}

#[test]
fn when_forwards_progress_from_inputs() {
    let input: Deferred<String, String, String> = Deferred::new();
    let aggregate = when(&[input.promise()]);

    let calls = recorder();
    aggregate.progress(record(&calls, "aggregate"));
    input.notify("half".to_string());

    assert_eq!(recorded(&calls), vec!["aggregate:half".to_string()]);
}
