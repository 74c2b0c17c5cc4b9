//! Vendor discovery state machine.
//!
//! ```text
//!             probe finds service
//! Searching ───────────────────────► Ready
//!     │
//!     │ attempts == max_attempts
//!     ▼
//!   Failed
//! ```
//!
//! One probe is made per poll interval. Both terminal states stop polling.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, trace, warn};

use super::config::ServerConfig;
use super::vendor::{VendorLocator, VendorService};

// ============================================================================
// DiscoveryState
// ============================================================================

/// Position in the discovery state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryState {
    /// Still probing.
    Searching,
    /// Service found. Terminal.
    Ready,
    /// Attempt bound exhausted. Terminal.
    Failed,
}

impl DiscoveryState {
    /// Returns `true` for `Ready` and `Failed`.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Searching)
    }
}

// ============================================================================
// DiscoveryOutcome
// ============================================================================

/// Result of a finished discovery.
#[derive(Clone)]
pub enum DiscoveryOutcome {
    /// The service appeared.
    Ready {
        /// The discovered service.
        service: Arc<dyn VendorService>,
        /// Method names captured at discovery time.
        methods: Vec<String>,
        /// Probes made, including the successful one.
        attempts: u32,
    },
    /// The service never appeared.
    Failed {
        /// Probes made.
        attempts: u32,
    },
}

impl std::fmt::Debug for DiscoveryOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready {
                methods, attempts, ..
            } => f
                .debug_struct("Ready")
                .field("methods", methods)
                .field("attempts", attempts)
                .finish_non_exhaustive(),
            Self::Failed { attempts } => {
                f.debug_struct("Failed").field("attempts", attempts).finish()
            }
        }
    }
}

// ============================================================================
// Discovery
// ============================================================================

/// Bounded-retry search for the vendor service.
pub struct Discovery<'a> {
    locator: &'a dyn VendorLocator,
    config: ServerConfig,
    attempts: u32,
    state: DiscoveryState,
}

impl<'a> Discovery<'a> {
    /// Starts a search in the `Searching` state.
    #[must_use]
    pub fn new(locator: &'a dyn VendorLocator, config: ServerConfig) -> Self {
        Self {
            locator,
            config,
            attempts: 0,
            state: DiscoveryState::Searching,
        }
    }

    /// Current state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> DiscoveryState {
        self.state
    }

    /// Probes made so far.
    #[inline]
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Makes one probe and applies the resulting transition.
    ///
    /// Returns the service on the transition to `Ready`. Does nothing once a
    /// terminal state is reached.
    pub fn probe(&mut self) -> Option<Arc<dyn VendorService>> {
        if self.state.is_terminal() {
            return None;
        }

        self.attempts += 1;
        match self.locator.locate() {
            Some(service) => {
                self.state = DiscoveryState::Ready;
                Some(service)
            }
            None => {
                trace!(attempt = self.attempts, "Vendor service not present yet");
                if self.attempts >= self.config.max_attempts {
                    self.state = DiscoveryState::Failed;
                }
                None
            }
        }
    }

    /// Probes until a terminal state, sleeping the poll interval between
    /// probes.
    pub async fn run(mut self) -> DiscoveryOutcome {
        loop {
            if let Some(service) = self.probe() {
                let methods = service.method_names();
                debug!(attempts = self.attempts, ?methods, "Vendor service discovered");
                return DiscoveryOutcome::Ready {
                    service,
                    methods,
                    attempts: self.attempts,
                };
            }

            if self.state == DiscoveryState::Failed {
                warn!(attempts = self.attempts, "Vendor service never appeared");
                return DiscoveryOutcome::Failed {
                    attempts: self.attempts,
                };
            }

            sleep(self.config.poll_interval).await;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use tokio::time::Instant;

    use crate::server::vendor::{FunctionTable, VendorSlot};

    /// Locator that counts probes and never finds anything.
    #[derive(Default)]
    struct Absent {
        probes: AtomicU32,
    }

    impl VendorLocator for Absent {
        fn locate(&self) -> Option<Arc<dyn VendorService>> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            None
        }
    }

    #[test]
    fn test_immediate_ready() {
        let slot = VendorSlot::installed(Arc::new(FunctionTable::new()));
        let mut discovery = Discovery::new(&slot, ServerConfig::new());

        assert!(discovery.probe().is_some());
        assert_eq!(discovery.state(), DiscoveryState::Ready);
        assert!(discovery.probe().is_none());
        assert_eq!(discovery.attempts(), 1);
    }

    #[test]
    fn test_fails_at_bound() {
        let locator = Absent::default();
        let mut discovery = Discovery::new(&locator, ServerConfig::new().with_max_attempts(3));

        for _ in 0..3 {
            assert_eq!(discovery.state(), DiscoveryState::Searching);
            assert!(discovery.probe().is_none());
        }
        assert_eq!(discovery.state(), DiscoveryState::Failed);

        // Terminal: no further probes reach the locator.
        discovery.probe();
        assert_eq!(locator.probes.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_fails_after_twenty_probes() {
        let locator = Absent::default();
        let started = Instant::now();

        let outcome = Discovery::new(&locator, ServerConfig::new()).run().await;

        assert!(matches!(outcome, DiscoveryOutcome::Failed { attempts: 20 }));
        assert_eq!(locator.probes.load(Ordering::SeqCst), 20);
        assert!(started.elapsed() <= Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_finds_late_service() {
        let slot = VendorSlot::new();
        let installer = slot.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(1_200)).await;
            installer.install(Arc::new(FunctionTable::new()));
        });

        let outcome = Discovery::new(&slot, ServerConfig::new()).run().await;

        match outcome {
            DiscoveryOutcome::Ready { attempts, .. } => assert_eq!(attempts, 4),
            other => panic!("unexpected {other:?}"),
        }
    }
}
