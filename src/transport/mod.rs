//! Message channel transport layer.
//!
//! The host and the embedded context share no memory. The only legal way
//! data moves between them is a string-based post/receive primitive with
//! best-effort delivery. This module models that primitive as a
//! [`Channel`]: an outbound [`MessageSink`] plus an inbound stream of
//! [`ChannelEvent`]s.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Host (Rust)    │                              │  Embedded view  │
//! │                 │      post(String)            │                 │
//! │  BridgeClient   │─────────────────────────────►│  BridgeServer   │
//! │                 │◄─────────────────────────────│                 │
//! │                 │      ChannelEvent            │  Vendor SDK     │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `channel` | Channel types and event-source selection |
//! | `memory` | In-process channel pair |
//! | `websocket` | WebSocket-backed channel |

// ============================================================================
// Submodules
// ============================================================================

/// Channel types and event-source selection.
pub mod channel;

/// In-process channel pair.
pub mod memory;

/// WebSocket-backed channel.
pub mod websocket;

// ============================================================================
// Re-exports
// ============================================================================

pub use channel::{Channel, ChannelEvent, EventSource, MessageSink, Platform};
pub use memory::{Delivery, MemoryEndpoint};
pub use websocket::PendingServer;
