//! Ready announcement message.
//!
//! Sent once by the embedded context when vendor discovery ends, without a
//! correlation id.
//!
//! # Format
//!
//! Success:
//! ```json
//! { "type": "SDK_READY", "data": { "methods": ["initialize", "getCards"] } }
//! ```
//!
//! Failure:
//! ```json
//! { "type": "SDK_READY", "error": "Vendor SDK not available after 20 attempts" }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

// ============================================================================
// AnnouncementKind
// ============================================================================

/// Discriminator of the announcement. Only `SDK_READY` exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnouncementKind {
    /// Vendor discovery has finished.
    #[serde(rename = "SDK_READY")]
    SdkReady,
}

// ============================================================================
// ReadyAnnouncement
// ============================================================================

/// Unsolicited availability report from the embedded context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadyAnnouncement {
    /// Always [`AnnouncementKind::SdkReady`].
    #[serde(rename = "type")]
    pub kind: AnnouncementKind,

    /// Method names, present when discovery succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ReadyPayload>,

    /// Failure description, present when discovery failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of a successful announcement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReadyPayload {
    /// Method names the vendor service exposed at discovery time.
    #[serde(default)]
    pub methods: Vec<String>,
}

impl ReadyAnnouncement {
    /// Announcement for a discovered vendor service.
    #[must_use]
    pub fn ready(methods: Vec<String>) -> Self {
        Self {
            kind: AnnouncementKind::SdkReady,
            data: Some(ReadyPayload { methods }),
            error: None,
        }
    }

    /// Announcement for failed discovery. Carries no methods.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            kind: AnnouncementKind::SdkReady,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Announced method names, empty when none were sent.
    #[must_use]
    pub fn methods(&self) -> Vec<String> {
        self.data
            .as_ref()
            .map(|data| data.methods.clone())
            .unwrap_or_default()
    }

    /// Returns `true` if the announcement reports a failure.
    #[inline]
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================
