//! Aggregation of many promises into one.

use crate::deferred::{Deferred, Outcome, Promise};
use std::convert::Infallible;
use std::sync::{Arc, Mutex, PoisonError};

/// Promise produced by [`when`]: resolves with every input outcome, in input
/// order, and never rejects.
pub type Aggregate<T, E, P> = Promise<Vec<Outcome<T, E>>, Infallible, P>;

struct Collector<T, E> {
    slots: Vec<Option<Outcome<T, E>>>,
    remaining: usize,
}

/// Resolves once every input promise has settled, whichever way.
///
/// A rejected input is reported as [`Outcome::Rejected`] in the aggregate's
/// payload; it never rejects the aggregate. An empty input resolves
/// immediately. Progress from any input is forwarded.
pub fn when<T, E, P>(promises: &[Promise<T, E, P>]) -> Aggregate<T, E, P>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    P: Clone + Send + Sync + 'static,
{
    let aggregate: Arc<Deferred<Vec<Outcome<T, E>>, Infallible, P>> = Arc::new(Deferred::new());
    if promises.is_empty() {
        aggregate.resolve(Vec::new());
        return aggregate.promise();
    }

    let collector = Arc::new(Mutex::new(Collector {
        slots: (0..promises.len()).map(|_| None).collect(),
        remaining: promises.len(),
    }));

    let record = {
        let aggregate = Arc::clone(&aggregate);
        let collector = Arc::clone(&collector);
        Arc::new(move |index: usize, outcome: Outcome<T, E>| {
            let finished = {
                let mut collector = collector.lock().unwrap_or_else(PoisonError::into_inner);
                if collector.slots[index].is_some() {
                    return;
                }
                collector.slots[index] = Some(outcome);
                collector.remaining -= 1;
                if collector.remaining > 0 {
                    return;
                }
                collector.slots.drain(..).flatten().collect::<Vec<_>>()
            };
            aggregate.resolve(finished);
        })
    };

    for (index, promise) in promises.iter().enumerate() {
        let on_done = Arc::clone(&record);
        let on_fail = Arc::clone(&record);
        let forward = Arc::clone(&aggregate);
        promise
            .done(move |value: &T| on_done(index, Outcome::Resolved(value.clone())))
            .fail(move |error: &E| on_fail(index, Outcome::Rejected(error.clone())))
            .progress(move |payload: &P| forward.notify(payload.clone()));
    }

    aggregate.promise()
}

#[cfg(test)]
mod tests {
    use super::when;
    use crate::deferred::{Deferred, Outcome, TaskState};

    #[test]
    fn outcomes_follow_input_order_not_settlement_order() {
        let first: Deferred<u8, &'static str> = Deferred::new();
        let second: Deferred<u8, &'static str> = Deferred::new();
        let aggregate = when(&[first.promise(), second.promise()]);

        second.reject("boom");
        assert_eq!(aggregate.state(), TaskState::Pending);
        first.resolve(1);

        let outcomes = aggregate.value().expect("aggregate resolved");
        assert_eq!(
            *outcomes,
            vec![Outcome::Resolved(1), Outcome::Rejected("boom")]
        );
    }

    #[test]
    fn already_settled_inputs_resolve_aggregate_immediately() {
        let first: Deferred<(), ()> = Deferred::resolved(());
        let aggregate = when(&[first.promise()]);
        assert_eq!(aggregate.state(), TaskState::Resolved);
    }
}
