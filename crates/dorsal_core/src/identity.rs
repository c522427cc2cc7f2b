//! Element identity model and generators.
//!
//! # Responsibility
//! - Define the stable string identity attached to wired elements.
//! - Produce fresh identities for elements that do not carry one yet.
//!
//! # Invariants
//! - A generated identity is never empty.
//! - Identities are opaque; callers must not parse them.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

static SHARED_SEQUENCES: Lazy<Mutex<HashMap<String, Arc<SequentialGenerator>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Stable identity of one element, stored under the `dorsal-guid` attribute.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementGuid(String);

impl ElementGuid {
    /// Wraps an existing identity value, rejecting blank input.
    pub fn parse(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return None;
        }
        Some(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ElementGuid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ElementGuid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Source of fresh element identities.
pub trait IdentityGenerator: Send + Sync {
    fn next_guid(&self) -> ElementGuid;
}

/// Default generator backed by random v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdentityGenerator for UuidGenerator {
    fn next_guid(&self) -> ElementGuid {
        ElementGuid(Uuid::new_v4().to_string())
    }
}

/// Deterministic generator producing `<prefix>-1`, `<prefix>-2`, ...
///
/// Useful for embedding hosts that snapshot markup and need stable output.
#[derive(Debug)]
pub struct SequentialGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }

    /// Process-wide generator for `prefix`.
    ///
    /// Every caller asking for the same prefix draws from one counter, so
    /// engines sharing a document never hand out the same identity twice.
    pub fn shared(prefix: &str) -> Arc<SequentialGenerator> {
        let mut sequences = SHARED_SEQUENCES
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            sequences
                .entry(prefix.to_string())
                .or_insert_with(|| Arc::new(SequentialGenerator::new(prefix))),
        )
    }
}

impl IdentityGenerator for SequentialGenerator {
    fn next_guid(&self) -> ElementGuid {
        let next = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        ElementGuid(format!("{}-{next}", self.prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::{ElementGuid, IdentityGenerator, SequentialGenerator, UuidGenerator};
    use std::collections::HashSet;

    #[test]
    fn uuid_generator_produces_distinct_values() {
        let generator = UuidGenerator;
        let ids: HashSet<ElementGuid> = (0..256).map(|_| generator.next_guid()).collect();
        assert_eq!(ids.len(), 256);
    }

    #[test]
    fn sequential_generator_counts_from_one() {
        let generator = SequentialGenerator::new("el");
        assert_eq!(generator.next_guid().as_str(), "el-1");
        assert_eq!(generator.next_guid().as_str(), "el-2");
    }

    #[test]
    fn shared_generators_draw_from_one_counter_per_prefix() {
        let first = SequentialGenerator::shared("identity-shared-test");
        let second = SequentialGenerator::shared("identity-shared-test");
        let other = SequentialGenerator::shared("identity-other-test");

        assert_eq!(first.next_guid().as_str(), "identity-shared-test-1");
        assert_eq!(second.next_guid().as_str(), "identity-shared-test-2");
        assert_eq!(other.next_guid().as_str(), "identity-other-test-1");
    }

    #[test]
    fn parse_rejects_blank_values() {
        assert!(ElementGuid::parse("   ").is_none());
        assert_eq!(
            ElementGuid::parse("abc").expect("non-blank guid").as_str(),
            "abc"
        );
    }
}
