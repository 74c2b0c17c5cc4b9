//! SDK Bridge - call a browser-only vendor SDK from a host application.
//!
//! Some payment vendors ship their SDK only as a browser script. This crate
//! loads such a script inside an embedded web view and relays named function
//! calls and their results across the view's message channel.
//!
//! # Architecture
//!
//! The bridge follows a client-server model:
//!
//! - **Host (Rust)**: [`BridgeClient`] sends call requests and awaits responses
//! - **Embedded context**: [`BridgeServer`] discovers the vendor SDK, announces
//!   it once, and invokes vendor functions on request
//!
//! Key design principles:
//!
//! - The only shared thing is a string channel; all messages are JSON
//! - Requests carry a per-session correlation id (`msg_0`, `msg_1`, ...)
//! - Each call resolves exactly once: by its response, or by its 30s timeout
//! - Vendor functions are looked up by name on every call, never cached
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use sdk_bridge::server::{FunctionTable, VendorSlot, vendor_fn};
//! use sdk_bridge::transport::memory::{self, Delivery};
//! use sdk_bridge::{BridgeClient, BridgeConfig, BridgeServer, Result};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let (host, embedded) = memory::pair(Delivery::default());
//!
//!     // Embedded side: wait for the vendor object, then serve calls.
//!     let slot = VendorSlot::new();
//!     tokio::spawn(BridgeServer::new(slot.clone()).run(embedded.into_channel()));
//!     slot.install(Arc::new(FunctionTable::new().with_function(
//!         "getCards",
//!         vendor_fn(|_| async { Ok(json!([])) }),
//!     )));
//!
//!     // Host side.
//!     let client = BridgeClient::new(BridgeConfig::builder().build()?);
//!     client.attach(host.into_channel())?;
//!     client.wait_ready().await?;
//!
//!     let cards = client.call_function("getCards", vec![]).await?;
//!     println!("cards: {cards}");
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Host side: [`BridgeClient`], [`BridgeConfig`] |
//! | [`server`] | Embedded side: [`BridgeServer`], discovery, vendor model |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Correlation ids |
//! | [`protocol`] | Wire message types |
//! | [`transport`] | Message channels (memory, WebSocket) |

// ============================================================================
// Modules
// ============================================================================

/// Host side of the bridge.
pub mod client;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Correlation ids.
pub mod identifiers;

/// Wire message types.
pub mod protocol;

/// Embedded-context side of the bridge.
pub mod server;

/// Message channel transports.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{BridgeClient, BridgeConfig, BridgeConfigBuilder, ReadyState, WebViewStyle};

// Server types
pub use server::{BridgeServer, ServerConfig, VendorError, VendorLocator, VendorService};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::CallId;

// Transport types
pub use transport::{Channel, ChannelEvent, EventSource, MessageSink, Platform};
