//! Call request and response messages.
//!
//! # Format
//!
//! Request (host → embedded):
//! ```json
//! { "id": "msg_0", "functionName": "initialize", "args": [{ "dpaId": "..." }] }
//! ```
//!
//! Response (embedded → host):
//! ```json
//! { "id": "msg_0", "data": { ... } }
//! { "id": "msg_0", "error": "Function foo not found. Available: initialize" }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::CallId;

use super::ReadyAnnouncement;

// ============================================================================
// CallRequest
// ============================================================================

/// A named call with positional arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    /// Correlation id, echoed back in the response.
    pub id: CallId,

    /// Vendor function to invoke.
    pub function_name: String,

    /// Arguments in call order.
    #[serde(default)]
    pub args: Vec<Value>,
}

impl CallRequest {
    /// Creates a new request.
    #[inline]
    #[must_use]
    pub fn new(id: CallId, function_name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            id,
            function_name: function_name.into(),
            args,
        }
    }
}

// ============================================================================
// CallResponse
// ============================================================================

/// Outcome of one call, keyed by the request's id.
///
/// A non-empty `error` marks a failed call. Otherwise `data` is the result,
/// and a missing `data` means a null result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallResponse {
    /// Id of the request being answered.
    pub id: CallId,

    /// Result value on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Error message on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CallResponse {
    /// Creates a success response.
    #[inline]
    #[must_use]
    pub fn success(id: CallId, data: Value) -> Self {
        Self {
            id,
            data: Some(data),
            error: None,
        }
    }

    /// Creates an error response.
    #[inline]
    #[must_use]
    pub fn failure(id: CallId, error: impl Into<String>) -> Self {
        Self {
            id,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Converts into the call outcome.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Remote`] with the remote message if `error` is set
    /// and non-empty.
    pub fn into_result(self) -> Result<Value> {
        match self.error {
            Some(message) if !message.is_empty() => Err(Error::remote(message)),
            _ => Ok(self.data.unwrap_or(Value::Null)),
        }
    }
}

// ============================================================================
// InboundMessage
// ============================================================================

/// Any message the host side can receive.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum InboundMessage {
    /// Vendor availability report.
    Ready(ReadyAnnouncement),
    /// Answer to a pending call.
    Response(CallResponse),
}

impl InboundMessage {
    /// Parses a raw channel payload.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if the payload is not JSON
    /// - [`Error::Protocol`] if it is JSON of an unrecognized shape
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::deserialize(value)
            .map_err(|_| Error::protocol(format!("Unrecognized message: {text}")))
    }
}

// ============================================================================
// Tests
// ============================================================================
