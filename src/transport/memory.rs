//! In-process channel pair.
//!
//! Connects a host endpoint and an embedded endpoint with tokio channels.
//! Used by tests, benches, and hosts that run the embedded side in-process.
//!
//! # Example
//!
//! ```ignore
//! use sdk_bridge::transport::memory::{self, Delivery};
//!
//! let (host, embedded) = memory::pair(Delivery::default());
//! client.attach(host.into_channel());
//! tokio::spawn(server.run(embedded.into_channel()));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::error::{Error, Result};

use super::channel::{Channel, ChannelEvent, EventSource, MessageSink, Platform};

// ============================================================================
// Delivery
// ============================================================================

/// How host messages reach the embedded endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Each message is delivered once, on one source.
    Single(EventSource),
    /// Each message is delivered on both sources, window first.
    Both,
}

impl Delivery {
    fn sources(self) -> &'static [EventSource] {
        match self {
            Self::Single(EventSource::Window) => &[EventSource::Window],
            Self::Single(EventSource::Document) => &[EventSource::Document],
            Self::Both => &[EventSource::Window, EventSource::Document],
        }
    }
}

impl Default for Delivery {
    fn default() -> Self {
        Self::Single(EventSource::for_platform(Platform::current()))
    }
}

// ============================================================================
// MemorySink
// ============================================================================

/// Outbound half that writes into the peer's inbound queue.
struct MemorySink {
    peer: mpsc::UnboundedSender<ChannelEvent>,
    delivery: Delivery,
    severed: Arc<AtomicBool>,
}

#[async_trait]
impl MessageSink for MemorySink {
    async fn post(&self, message: String) -> Result<()> {
        if self.severed.load(Ordering::Acquire) {
            return Err(Error::transport("memory channel severed"));
        }

        for &source in self.delivery.sources() {
            let event = ChannelEvent::Message {
                source,
                payload: message.clone(),
            };

            // Best effort: a peer that stopped listening just loses the message.
            if self.peer.send(event).is_err() {
                trace!("Peer inbound queue dropped, message discarded");
                break;
            }
        }

        Ok(())
    }
}

// ============================================================================
// MemoryEndpoint
// ============================================================================

/// One side of an in-process pair.
#[derive(Debug)]
pub struct MemoryEndpoint {
    channel: Channel,
    injector: mpsc::UnboundedSender<ChannelEvent>,
    peer_injector: mpsc::UnboundedSender<ChannelEvent>,
    severed: Arc<AtomicBool>,
}

/// Creates a connected host/embedded pair.
///
/// Host → embedded messages follow `delivery`. Embedded → host messages are
/// always delivered once, on the window source.
#[must_use]
pub fn pair(delivery: Delivery) -> (MemoryEndpoint, MemoryEndpoint) {
    let (host_tx, host_rx) = mpsc::unbounded_channel();
    let (embedded_tx, embedded_rx) = mpsc::unbounded_channel();
    let severed = Arc::new(AtomicBool::new(false));

    let host_sink = Arc::new(MemorySink {
        peer: embedded_tx.clone(),
        delivery,
        severed: Arc::clone(&severed),
    });
    let embedded_sink = Arc::new(MemorySink {
        peer: host_tx.clone(),
        delivery: Delivery::Single(EventSource::Window),
        severed: Arc::clone(&severed),
    });

    debug!(?delivery, "Memory channel pair created");

    let host = MemoryEndpoint {
        channel: Channel::new(host_sink, host_rx),
        injector: host_tx.clone(),
        peer_injector: embedded_tx.clone(),
        severed: Arc::clone(&severed),
    };
    let embedded = MemoryEndpoint {
        channel: Channel::new(embedded_sink, embedded_rx)
            .with_dual_delivery(delivery == Delivery::Both),
        injector: embedded_tx,
        peer_injector: host_tx,
        severed,
    };

    (host, embedded)
}

impl MemoryEndpoint {
    /// Sender that pushes raw events into this endpoint's inbound queue.
    ///
    /// Lets tests emulate a misbehaving peer or a transport failure.
    #[inline]
    #[must_use]
    pub fn injector(&self) -> mpsc::UnboundedSender<ChannelEvent> {
        self.injector.clone()
    }

    /// Breaks the link. Both sides see [`ChannelEvent::Closed`] and further
    /// posts fail.
    pub fn sever(&self) {
        if self.severed.swap(true, Ordering::AcqRel) {
            return;
        }
        let _ = self.injector.send(ChannelEvent::Closed);
        let _ = self.peer_injector.send(ChannelEvent::Closed);
        debug!("Memory channel severed");
    }

    /// Consumes the endpoint, returning its channel.
    #[inline]
    #[must_use]
    pub fn into_channel(self) -> Channel {
        self.channel
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_host_to_embedded_single() {
        let (host, embedded) = pair(Delivery::Single(EventSource::Document));
        let (sink, _host_events) = host.into_channel().into_parts();
        let (_, mut events) = embedded.into_channel().into_parts();

        sink.post("hello".into()).await.expect("post");

        assert_eq!(
            events.recv().await,
            Some(ChannelEvent::Message {
                source: EventSource::Document,
                payload: "hello".into()
            })
        );
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_both_delivers_twice() {
        let (host, embedded) = pair(Delivery::Both);
        let (sink, _host_events) = host.into_channel().into_parts();
        let (_, mut events) = embedded.into_channel().into_parts();

        sink.post("x".into()).await.expect("post");

        let first = events.recv().await.expect("first");
        let second = events.recv().await.expect("second");
        assert!(matches!(first, ChannelEvent::Message { source: EventSource::Window, .. }));
        assert!(matches!(second, ChannelEvent::Message { source: EventSource::Document, .. }));
    }

    #[test]
    fn test_dual_delivery_flag() {
        let (host, embedded) = pair(Delivery::Both);
        assert!(embedded.into_channel().has_dual_delivery());
        assert!(!host.into_channel().has_dual_delivery());

        let (_, embedded) = pair(Delivery::Single(EventSource::Document));
        assert!(!embedded.into_channel().has_dual_delivery());
    }

    #[tokio::test]
    async fn test_embedded_to_host_uses_window() {
        let (host, embedded) = pair(Delivery::Both);
        let (_, mut events) = host.into_channel().into_parts();
        let sink = embedded.into_channel().sink();

        sink.post("reply".into()).await.expect("post");

        assert_eq!(events.recv().await, Some(ChannelEvent::message("reply")));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_post_to_dropped_peer_is_ok() {
        let (host, embedded) = pair(Delivery::default());
        drop(embedded);
        let sink = host.into_channel().sink();
        assert!(sink.post("lost".into()).await.is_ok());
    }

    #[tokio::test]
    async fn test_sever() {
        let (host, embedded) = pair(Delivery::default());
        host.sever();
        let (sink, mut host_events) = host.into_channel().into_parts();
        let (_, mut embedded_events) = embedded.into_channel().into_parts();

        assert_eq!(host_events.recv().await, Some(ChannelEvent::Closed));
        assert_eq!(embedded_events.recv().await, Some(ChannelEvent::Closed));
        assert!(sink.post("x".into()).await.is_err());
    }
}
