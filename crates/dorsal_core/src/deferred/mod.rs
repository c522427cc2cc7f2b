//! Minimal deferred/promise primitive.
//!
//! # Responsibility
//! - Sequence asynchronous wiring completions through done/fail/progress
//!   callbacks.
//! - Aggregate many tasks into one with [`when`].
//!
//! # Invariants
//! - Callbacks run synchronously inside `resolve`/`reject`/`notify`; there
//!   is no hidden deferral.
//! - Settled tasks stay queryable for as long as a handle exists.

use std::fmt::{Display, Formatter};

mod task;
mod when;

pub use task::{CallbackCounts, Deferred, Promise};
pub use when::{when, Aggregate};

/// Observable task state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    Pending,
    Resolved,
    Rejected,
}

impl TaskState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Resolved => "resolved",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_settled(self) -> bool {
        self != Self::Pending
    }
}

impl Display for TaskState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of one aggregated task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, E> {
    Resolved(T),
    Rejected(E),
}

impl<T, E> Outcome<T, E> {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    pub fn as_result(&self) -> Result<&T, &E> {
        match self {
            Self::Resolved(value) => Ok(value),
            Self::Rejected(error) => Err(error),
        }
    }
}
