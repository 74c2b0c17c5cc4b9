//! Host side of the bridge.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`BridgeClient`] | Issues calls and correlates responses |
//! | [`BridgeConfig`] | Validated host-side settings |
//! | [`BridgeConfigBuilder`] | Fluent configuration builder |
//! | [`BootstrapDocument`] | Page that loads the vendor SDK |
//! | [`WebViewStyle`] | Placement of the hidden web view |

// ============================================================================
// Submodules
// ============================================================================

/// Bootstrap page for the embedded web view.
pub mod assets;

/// Bridge client and its event loop.
pub mod bridge;

/// Host-side configuration.
pub mod config;

/// Pending call table.
mod pending;

/// Web view placement.
pub mod style;

// ============================================================================
// Re-exports
// ============================================================================

pub use assets::BootstrapDocument;
pub use bridge::{BridgeClient, ReadyState, WebViewSurface};
pub use config::{
    BridgeConfig, BridgeConfigBuilder, DEFAULT_BASE_URL, DEFAULT_CALL_TIMEOUT, DEFAULT_SDK_URL,
    ErrorCallback, ReadyCallback,
};
pub use style::{Position, WebViewStyle};
