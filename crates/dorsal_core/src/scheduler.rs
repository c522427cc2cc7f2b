//! Cooperative "next tick" job queue.
//!
//! # Responsibility
//! - Hold deferred units of work in FIFO order.
//! - Run them one at a time when the host drives the loop.
//!
//! # Invariants
//! - Jobs run in enqueue order; jobs enqueued while running go to the back.
//! - The queue lock is never held while a job runs.
//! - There is no cancellation: an enqueued job always runs once drained.

use log::debug;
use once_cell::sync::Lazy;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Job = Box<dyn FnOnce() + Send + 'static>;

static DEFAULT_SCHEDULER: Lazy<Arc<Scheduler>> = Lazy::new(|| Arc::new(Scheduler::new()));

/// Process-wide scheduler shared by the default engine and diagnostic logs.
pub fn default_scheduler() -> Arc<Scheduler> {
    Arc::clone(&DEFAULT_SCHEDULER)
}

/// Single-threaded cooperative queue standing in for a zero-delay timer.
#[derive(Default)]
pub struct Scheduler {
    queue: Mutex<VecDeque<Job>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<Job>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueues `job` for a later tick.
    pub fn defer<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.queue().push_back(Box::new(job));
    }

    pub fn pending(&self) -> usize {
        self.queue().len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue().is_empty()
    }

    /// Runs the oldest queued job. Returns `false` when the queue was empty.
    pub fn run_next(&self) -> bool {
        let job = self.queue().pop_front();
        match job {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }

    /// Drains the queue, including jobs enqueued by running jobs.
    ///
    /// Returns the number of jobs executed.
    pub fn run_until_idle(&self) -> usize {
        let mut executed = 0;
        while self.run_next() {
            executed += 1;
        }
        if executed > 0 {
            debug!("event=scheduler_drain module=scheduler status=ok jobs={executed}");
        }
        executed
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending", &self.pending())
            .finish()
    }
}
