//! Pending call table.
//!
//! Maps a correlation id to the completion of the call waiting for it.
//! Removal is the only way to act on an entry, and it happens under the
//! table lock, so whichever of the response path and the timeout path
//! removes an entry first owns it; the other finds nothing.

// ============================================================================
// Imports
// ============================================================================

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::Result;
use crate::identifiers::CallId;

// ============================================================================
// Types
// ============================================================================

/// Completion channel of one call.
pub(crate) type Completion = oneshot::Sender<Result<Value>>;

/// One in-flight call.
pub(crate) struct PendingCall {
    /// Function name, for diagnostics.
    pub function: String,
    /// Where the outcome goes.
    pub completion: Completion,
}

impl PendingCall {
    /// Delivers the outcome. A caller that stopped waiting is ignored.
    pub fn complete(self, outcome: Result<Value>) {
        let _ = self.completion.send(outcome);
    }
}

// ============================================================================
// PendingCalls
// ============================================================================

/// Table of calls awaiting a response.
#[derive(Default)]
pub(crate) struct PendingCalls {
    entries: Mutex<FxHashMap<CallId, PendingCall>>,
}

impl PendingCalls {
    /// Registers a call.
    pub fn insert(&self, id: CallId, function: impl Into<String>, completion: Completion) {
        self.entries.lock().insert(
            id,
            PendingCall {
                function: function.into(),
                completion,
            },
        );
    }

    /// Removes and returns the entry for `id`, if still present.
    pub fn take(&self, id: &CallId) -> Option<PendingCall> {
        self.entries.lock().remove(id)
    }

    /// Number of calls in flight.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Removes every entry.
    pub fn drain(&self) -> Vec<(CallId, PendingCall)> {
        self.entries.lock().drain().collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use serde_json::json;

    use crate::error::Error;

    #[test]
    fn test_take_is_single_shot() {
        let table = PendingCalls::default();
        let (tx, _rx) = oneshot::channel();
        let id = CallId::from_sequence(0);
        table.insert(id.clone(), "getCards", tx);

        let first = table.take(&id);
        assert_eq!(first.map(|call| call.function), Some("getCards".to_string()));
        assert!(table.take(&id).is_none());
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn test_unknown_id() {
        let table = PendingCalls::default();
        assert!(table.take(&CallId::new("msg_404")).is_none());
    }

    #[tokio::test]
    async fn test_complete_delivers_outcome() {
        let table = PendingCalls::default();
        let (tx, rx) = oneshot::channel();
        let id = CallId::from_sequence(1);
        table.insert(id.clone(), "initialize", tx);

        table.take(&id).expect("present").complete(Ok(json!(true)));
        assert_eq!(rx.await.expect("sent").expect("ok"), json!(true));
    }

    #[test]
    fn test_complete_after_receiver_dropped() {
        let table = PendingCalls::default();
        let (tx, rx) = oneshot::channel();
        drop(rx);
        let id = CallId::from_sequence(2);
        table.insert(id.clone(), "checkout", tx);
        table.take(&id).expect("present").complete(Err(Error::ConnectionClosed));
    }

    #[test]
    fn test_racing_takers_win_once() {
        let table = Arc::new(PendingCalls::default());
        let id = CallId::from_sequence(3);
        let (tx, _rx) = oneshot::channel();
        table.insert(id.clone(), "validate", tx);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let table = Arc::clone(&table);
                let id = id.clone();
                std::thread::spawn(move || table.take(&id).is_some())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().expect("thread"))
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_drain() {
        let table = PendingCalls::default();
        for n in 0..3 {
            let (tx, _rx) = oneshot::channel();
            table.insert(CallId::from_sequence(n), "f", tx);
        }
        assert_eq!(table.drain().len(), 3);
        assert_eq!(table.len(), 0);
    }
}
