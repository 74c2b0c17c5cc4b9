//! Bridge wire protocol.
//!
//! Every message crossing the bridge is a UTF-8 JSON string. Three shapes are
//! recognized:
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | [`CallRequest`] | Host → Embedded | Invoke a named vendor function |
//! | [`CallResponse`] | Embedded → Host | Result or error for one call |
//! | [`ReadyAnnouncement`] | Embedded → Host | One-time vendor availability report |
//!
//! Payloads are [`serde_json::Value`], the closed JSON union of null, bool,
//! number, string, array and object.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `announcement` | Ready announcement |
//! | `call` | Call request and response |

// ============================================================================
// Submodules
// ============================================================================

/// Ready announcement message.
pub mod announcement;

/// Call request and response messages.
pub mod call;

// ============================================================================
// Re-exports
// ============================================================================

pub use announcement::{AnnouncementKind, ReadyAnnouncement, ReadyPayload};
pub use call::{CallRequest, CallResponse, InboundMessage};
pub use serde_json::Value;
