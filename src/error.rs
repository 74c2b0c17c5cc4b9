//! Error types for the SDK bridge.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use sdk_bridge::{BridgeClient, Result};
//! use serde_json::json;
//!
//! async fn example(client: &BridgeClient) -> Result<()> {
//!     let cards = client.call_function("getCards", vec![json!({})]).await?;
//!     println!("{cards}");
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants | Routed to |
//! |----------|----------|-----------|
//! | Configuration | [`Error::Config`] | caller |
//! | Call | [`Error::ChannelNotReady`], [`Error::CallTimeout`], [`Error::Remote`], [`Error::SendFailed`] | the call's result |
//! | Readiness | [`Error::Discovery`] | [`wait_ready`](crate::BridgeClient::wait_ready) |
//! | Channel | [`Error::Transport`], [`Error::ConnectionClosed`], [`Error::Protocol`] | `on_error` callback |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::WebSocket`] | depends on origin |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when a bridge or server configuration value is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Call Errors
    // ========================================================================
    /// No message channel is attached to the client yet.
    #[error("Channel not ready: web view is not attached")]
    ChannelNotReady,

    /// No response arrived for a call within its timeout.
    #[error("Call to {function} timeout after {timeout_ms}ms")]
    CallTimeout {
        /// Name of the remote function that was called.
        function: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// The remote side answered the call with an error.
    ///
    /// The message is the remote's own text, unmodified.
    #[error("{message}")]
    Remote {
        /// Error message reported by the embedded context.
        message: String,
    },

    /// The request for a call could not be posted to the channel.
    #[error("Failed to send call to {function}: {message}")]
    SendFailed {
        /// Name of the remote function that was called.
        function: String,
        /// Description of the transport failure.
        message: String,
    },

    // ========================================================================
    // Readiness Errors
    // ========================================================================
    /// The vendor SDK never became available in the embedded context.
    #[error("SDK discovery failed: {0}")]
    Discovery(String),

    // ========================================================================
    // Channel Errors
    // ========================================================================
    /// Low-level channel failure.
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// The channel was closed.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Inbound message had an unrecognized shape.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a call timeout error.
    #[inline]
    pub fn call_timeout(function: impl Into<String>, timeout_ms: u64) -> Self {
        Self::CallTimeout {
            function: function.into(),
            timeout_ms,
        }
    }

    /// Creates a remote error carrying the embedded context's message.
    #[inline]
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
        }
    }

    /// Creates a send failure error.
    #[inline]
    pub fn send_failed(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SendFailed {
            function: function.into(),
            message: message.into(),
        }
    }

    /// Creates a transport error.
    #[inline]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::CallTimeout { .. })
    }

    /// Returns `true` if this error belongs to a single call.
    #[inline]
    #[must_use]
    pub fn is_call_error(&self) -> bool {
        matches!(
            self,
            Self::ChannelNotReady
                | Self::CallTimeout { .. }
                | Self::Remote { .. }
                | Self::SendFailed { .. }
        )
    }

    /// Returns `true` if this error concerns the channel rather than a call.
    #[inline]
    #[must_use]
    pub fn is_channel_error(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. }
                | Self::ConnectionClosed
                | Self::Protocol { .. }
                | Self::Json(_)
                | Self::WebSocket(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    #[test]
    fn test_timeout_message_names_function() {
        let err = Error::call_timeout("getCards", 30_000);
        let message = err.to_string();
        assert!(message.contains("getCards"));
        assert!(message.contains("timeout"));
        assert!(err.is_timeout());
    }

    #[test]
    fn test_remote_message_is_verbatim() {
        let err = Error::remote("Card declined");
        assert_eq!(err.to_string(), "Card declined");
        assert!(err.is_call_error());
        assert!(!err.is_channel_error());
    }

    #[test]
    fn test_channel_not_ready_is_call_error() {
        assert!(Error::ChannelNotReady.is_call_error());
        assert!(!Error::ChannelNotReady.is_channel_error());
    }

    #[test]
    fn test_is_channel_error() {
        assert!(Error::transport("broken pipe").is_channel_error());
        assert!(Error::ConnectionClosed.is_channel_error());
        assert!(Error::protocol("bad shape").is_channel_error());
        assert!(!Error::config("x").is_channel_error());
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("invalid sdk url");
        assert_eq!(err.to_string(), "Configuration error: invalid sdk url");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
        assert!(err.is_channel_error());
    }
}
