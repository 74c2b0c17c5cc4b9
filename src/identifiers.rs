//! Type-safe identifiers for bridge messages.
//!
//! Correlation ids pair a [`CallRequest`](crate::protocol::CallRequest) with
//! its eventual [`CallResponse`](crate::protocol::CallResponse). They are
//! generated per client session as `msg_0`, `msg_1`, ...

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Literal prefix of every generated correlation id.
pub const CALL_ID_PREFIX: &str = "msg_";

// ============================================================================
// CallId
// ============================================================================

/// Correlation id of a single remote call.
///
/// Serialized as a plain JSON string. Ids received from the wire are kept
/// verbatim, so an unknown id never fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(String);

impl CallId {
    /// Wraps an id string received from the wire.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Builds the id for counter value `sequence`.
    #[inline]
    #[must_use]
    pub fn from_sequence(sequence: u64) -> Self {
        Self(format!("{CALL_ID_PREFIX}{sequence}"))
    }

    /// Returns the counter value if this id was produced by a generator.
    #[must_use]
    pub fn sequence(&self) -> Option<u64> {
        self.0.strip_prefix(CALL_ID_PREFIX)?.parse().ok()
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// CallIdGenerator
// ============================================================================

/// Session-scoped, monotonically increasing id source.
///
/// Each [`BridgeClient`](crate::BridgeClient) owns one generator.
#[derive(Debug, Default)]
pub struct CallIdGenerator {
    next: AtomicU64,
}

impl CallIdGenerator {
    /// Creates a generator starting at `msg_0`.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }

    /// Allocates the next id.
    #[inline]
    pub fn next_id(&self) -> CallId {
        CallId::from_sequence(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Number of ids handed out so far.
    #[inline]
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn test_first_ids() {
        let generator = CallIdGenerator::new();
        assert_eq!(generator.next_id().as_str(), "msg_0");
        assert_eq!(generator.next_id().as_str(), "msg_1");
        assert_eq!(generator.issued(), 2);
    }

    #[test]
    fn test_sequence_parsing() {
        assert_eq!(CallId::new("msg_42").sequence(), Some(42));
        assert_eq!(CallId::new("other").sequence(), None);
        assert_eq!(CallId::new("msg_x").sequence(), None);
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&CallId::from_sequence(7)).expect("serialize");
        assert_eq!(json, "\"msg_7\"");
    }

    #[test]
    fn test_generators_are_independent() {
        let a = CallIdGenerator::new();
        let b = CallIdGenerator::new();
        a.next_id();
        a.next_id();
        assert_eq!(b.next_id().as_str(), "msg_0");
    }

    proptest! {
        #[test]
        fn ids_strictly_increase(count in 1usize..500) {
            let generator = CallIdGenerator::new();
            let sequences: Vec<u64> = (0..count)
                .map(|_| generator.next_id().sequence().expect("generated id"))
                .collect();
            prop_assert!(sequences.windows(2).all(|w| w[0] < w[1]));
            prop_assert_eq!(sequences.len() as u64, generator.issued());
        }
    }
}
