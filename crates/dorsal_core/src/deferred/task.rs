//! Settle-once task with a read-only promise view.
//!
//! # Invariants
//! - State moves `Pending -> Resolved` or `Pending -> Rejected` exactly once.
//! - Settling twice is a no-op that reports `false`; callbacks never re-run.
//! - `done`/`fail` registered after the matching settlement fire immediately
//!   and are still retained.
//! - No lock is held while a callback runs.

use crate::deferred::TaskState;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Callback<V> = Arc<dyn Fn(&V) + Send + Sync + 'static>;

/// Number of callbacks registered on one task, by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallbackCounts {
    pub done: usize,
    pub fail: usize,
    pub progress: usize,
}

struct Inner<T, E, P> {
    state: TaskState,
    value: Option<Arc<T>>,
    error: Option<Arc<E>>,
    done: Vec<Callback<T>>,
    fail: Vec<Callback<E>>,
    progress: Vec<Callback<P>>,
}

impl<T, E, P> Default for Inner<T, E, P> {
    fn default() -> Self {
        Self {
            state: TaskState::Pending,
            value: None,
            error: None,
            done: Vec::new(),
            fail: Vec::new(),
            progress: Vec::new(),
        }
    }
}

/// Consumer view of a [`Deferred`]: observe, never settle.
pub struct Promise<T, E, P = ()> {
    shared: Arc<Mutex<Inner<T, E, P>>>,
}

impl<T, E, P> Clone for Promise<T, E, P> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, E, P> Promise<T, E, P>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    fn lock(&self) -> MutexGuard<'_, Inner<T, E, P>> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> TaskState {
        self.lock().state
    }

    pub fn is_pending(&self) -> bool {
        self.state() == TaskState::Pending
    }

    /// Resolution payload, once resolved.
    pub fn value(&self) -> Option<Arc<T>> {
        self.lock().value.clone()
    }

    /// Rejection payload, once rejected.
    pub fn error(&self) -> Option<Arc<E>> {
        self.lock().error.clone()
    }

    /// Registers a resolution callback; fires now if already resolved.
    pub fn done<F>(&self, callback: F) -> &Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let callback: Callback<T> = Arc::new(callback);
        let settled = {
            let mut inner = self.lock();
            inner.done.push(Arc::clone(&callback));
            inner.value.clone()
        };
        if let Some(value) = settled {
            callback(&value);
        }
        self
    }

    /// Registers a rejection callback; fires now if already rejected.
    pub fn fail<F>(&self, callback: F) -> &Self
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let callback: Callback<E> = Arc::new(callback);
        let settled = {
            let mut inner = self.lock();
            inner.fail.push(Arc::clone(&callback));
            inner.error.clone()
        };
        if let Some(error) = settled {
            callback(&error);
        }
        self
    }

    /// Registers a progress callback. Past notifications are not replayed.
    pub fn progress<F>(&self, callback: F) -> &Self
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        self.lock().progress.push(Arc::new(callback));
        self
    }

    pub fn callback_counts(&self) -> CallbackCounts {
        let inner = self.lock();
        CallbackCounts {
            done: inner.done.len(),
            fail: inner.fail.len(),
            progress: inner.progress.len(),
        }
    }
}

impl<T, E, P> Debug for Promise<T, E, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let state = self
            .shared
            .lock()
            .map(|inner| inner.state)
            .unwrap_or_else(|poisoned| poisoned.into_inner().state);
        f.debug_struct("Promise").field("state", &state).finish()
    }
}

/// Producer side of a task: the only handle able to settle or notify.
pub struct Deferred<T, E, P = ()> {
    promise: Promise<T, E, P>,
}

impl<T, E, P> Deferred<T, E, P>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            promise: Promise {
                shared: Arc::new(Mutex::new(Inner::default())),
            },
        }
    }

    /// Creates a task that is already resolved with `value`.
    pub fn resolved(value: T) -> Self {
        let deferred = Self::new();
        deferred.resolve(value);
        deferred
    }

    pub fn promise(&self) -> Promise<T, E, P> {
        self.promise.clone()
    }

    pub fn state(&self) -> TaskState {
        self.promise.state()
    }

    /// Resolves the task. Returns `false` if it was already settled.
    pub fn resolve(&self, value: T) -> bool {
        let (value, callbacks) = {
            let mut inner = self.promise.lock();
            if inner.state != TaskState::Pending {
                return false;
            }
            let value = Arc::new(value);
            inner.state = TaskState::Resolved;
            inner.value = Some(Arc::clone(&value));
            (value, inner.done.clone())
        };
        for callback in callbacks {
            callback(&value);
        }
        true
    }

    /// Rejects the task. Returns `false` if it was already settled.
    pub fn reject(&self, error: E) -> bool {
        let (error, callbacks) = {
            let mut inner = self.promise.lock();
            if inner.state != TaskState::Pending {
                return false;
            }
            let error = Arc::new(error);
            inner.state = TaskState::Rejected;
            inner.error = Some(Arc::clone(&error));
            (error, inner.fail.clone())
        };
        for callback in callbacks {
            callback(&error);
        }
        true
    }

    /// Invokes every progress callback registered so far with `payload`.
    pub fn notify(&self, payload: P) {
        let callbacks = self.promise.lock().progress.clone();
        for callback in callbacks {
            callback(&payload);
        }
    }
}

impl<T, E, P> Default for Deferred<T, E, P>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E, P> Debug for Deferred<T, E, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deferred")
            .field("promise", &self.promise)
            .finish()
    }
}
