//! Channel types and event-source selection.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;

// ============================================================================
// MessageSink
// ============================================================================

/// Outbound half of a channel.
///
/// Posting is fire-and-forget. `Ok(())` means the message was handed to the
/// transport, not that anyone received it.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Posts one serialized message to the other side.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the message could not be handed over.
    async fn post(&self, message: String) -> Result<()>;
}

// ============================================================================
// EventSource / Platform
// ============================================================================

/// Inbound event source inside the embedded context.
///
/// Web views deliver host messages on different targets depending on the
/// platform. Exactly one source is bound per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSource {
    /// `message` events on the window object.
    Window,
    /// `message` events on the document object.
    Document,
}

impl EventSource {
    /// Authoritative event source for `platform`.
    #[inline]
    #[must_use]
    pub const fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Android => Self::Document,
            Platform::Ios | Platform::Other => Self::Window,
        }
    }

    /// Returns the source name.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Window => "window",
            Self::Document => "document",
        }
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host platform of the embedded web view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Android system web view.
    Android,
    /// iOS web view.
    Ios,
    /// Anything else (desktop, tests).
    Other,
}

impl Platform {
    /// Platform this binary was compiled for.
    #[inline]
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(target_os = "android") {
            Self::Android
        } else if cfg!(target_os = "ios") {
            Self::Ios
        } else {
            Self::Other
        }
    }
}

// ============================================================================
// ChannelEvent
// ============================================================================

/// Something that happened on the inbound side of a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// A message arrived.
    Message {
        /// Event source the message was delivered on.
        source: EventSource,
        /// Raw message text.
        payload: String,
    },
    /// The transport reported a failure. The channel may still be usable.
    Error(String),
    /// The transport is gone. No further events follow.
    Closed,
}

impl ChannelEvent {
    /// Creates a message event delivered on the window source.
    #[inline]
    #[must_use]
    pub fn message(payload: impl Into<String>) -> Self {
        Self::Message {
            source: EventSource::Window,
            payload: payload.into(),
        }
    }
}

// ============================================================================
// Channel
// ============================================================================

/// One endpoint of a bidirectional message channel.
///
/// A channel is single-source unless marked with
/// [`with_dual_delivery`](Self::with_dual_delivery). Every inbound message
/// of a single-source channel arrives exactly once, whatever source it is
/// tagged with.
pub struct Channel {
    sink: Arc<dyn MessageSink>,
    events: mpsc::UnboundedReceiver<ChannelEvent>,
    dual_delivery: bool,
}

impl Channel {
    /// Assembles a single-source channel from its halves.
    #[inline]
    #[must_use]
    pub fn new(sink: Arc<dyn MessageSink>, events: mpsc::UnboundedReceiver<ChannelEvent>) -> Self {
        Self {
            sink,
            events,
            dual_delivery: false,
        }
    }

    /// Marks whether each inbound message may arrive once per event source.
    #[inline]
    #[must_use]
    pub fn with_dual_delivery(mut self, dual_delivery: bool) -> Self {
        self.dual_delivery = dual_delivery;
        self
    }

    /// Returns `true` if inbound messages may arrive on both event sources.
    #[inline]
    #[must_use]
    pub const fn has_dual_delivery(&self) -> bool {
        self.dual_delivery
    }

    /// Returns the outbound half.
    #[inline]
    #[must_use]
    pub fn sink(&self) -> Arc<dyn MessageSink> {
        Arc::clone(&self.sink)
    }

    /// Splits into outbound and inbound halves.
    #[inline]
    #[must_use]
    pub fn into_parts(self) -> (Arc<dyn MessageSink>, mpsc::UnboundedReceiver<ChannelEvent>) {
        (self.sink, self.events)
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("dual_delivery", &self.dual_delivery)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
