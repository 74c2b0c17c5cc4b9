//! Embedded-context side of the bridge.
//!
//! The server waits for the vendor SDK to appear, announces the outcome
//! once, and then answers call requests by invoking vendor functions by
//! name.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`BridgeServer`] | Discovery, announcement, and call listener |
//! | [`Discovery`] | Bounded-retry search state machine |
//! | [`ServerConfig`] | Poll interval, attempt bound, event source |
//! | [`VendorService`] | Named-function table exposed by the vendor |
//! | [`VendorLocator`] | Presence probe for the vendor service |

// ============================================================================
// Submodules
// ============================================================================

/// Bridge server and call dispatch.
pub mod bridge;

/// Server configuration.
pub mod config;

/// Discovery state machine.
pub mod discovery;

/// Vendor service model.
pub mod vendor;

// ============================================================================
// Re-exports
// ============================================================================

pub use bridge::{BridgeServer, ServerExit, dispatch};
pub use config::{DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL, ServerConfig};
pub use discovery::{Discovery, DiscoveryOutcome, DiscoveryState};
pub use vendor::{
    FunctionTable, VendorError, VendorFunction, VendorFuture, VendorLocator, VendorService,
    VendorSlot, vendor_fn,
};
