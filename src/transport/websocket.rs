//! WebSocket-backed channel.
//!
//! Used when the embedded context reaches the host over a local socket
//! instead of the web view's native post-message hook.
//!
//! # Connection Flow
//!
//! 1. Host binds [`PendingServer`] to `localhost:0` (random port)
//! 2. The embedded side receives [`PendingServer::ws_url`] and calls [`connect`]
//! 3. Host calls [`PendingServer::accept`] and gets a [`Channel`]
//! 4. Text frames become [`ChannelEvent::Message`]s in both directions
//!
//! Each frame is delivered once, so both ends are single-source channels.

// ============================================================================
// Imports
// ============================================================================

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, trace, warn};

use crate::error::{Error, Result};

use super::channel::{Channel, ChannelEvent, MessageSink};

// ============================================================================
// Constants
// ============================================================================

/// Timeout for waiting for the embedded side to connect.
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// PendingServer
// ============================================================================

/// A WebSocket server that is bound but not yet connected.
///
/// # Example
///
/// ```ignore
/// use std::net::{IpAddr, Ipv4Addr};
/// use sdk_bridge::transport::PendingServer;
///
/// let server = PendingServer::bind(IpAddr::V4(Ipv4Addr::LOCALHOST), 0).await?;
/// let ws_url = server.ws_url();
///
/// // Hand ws_url to the embedded side...
///
/// let channel = server.accept().await?;
/// client.attach(channel);
/// ```
pub struct PendingServer {
    /// TCP listener for incoming connections.
    listener: TcpListener,
    /// Port the server is bound to.
    port: u16,
}

impl PendingServer {
    /// Binds a WebSocket server to the specified address and port.
    ///
    /// Use port 0 to let the OS assign a random available port.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if binding fails.
    pub async fn bind(ip: IpAddr, port: u16) -> Result<Self> {
        let addr = SocketAddr::new(ip, port);
        let listener = TcpListener::bind(addr).await?;
        let actual_port = listener.local_addr()?.port();

        debug!(port = actual_port, "WebSocket server bound");

        Ok(Self {
            listener,
            port: actual_port,
        })
    }

    /// Returns the port the server is bound to.
    #[inline]
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the WebSocket URL for this server.
    ///
    /// Format: `ws://127.0.0.1:{port}`
    #[inline]
    #[must_use]
    pub fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}", self.port)
    }

    /// Returns the local socket address.
    #[inline]
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), self.port)
    }

    /// Accepts one connection and upgrades it to a channel.
    ///
    /// # Errors
    ///
    /// - [`Error::Transport`] if nobody connects within 30s
    /// - [`Error::Transport`] if the WebSocket upgrade fails
    pub async fn accept(self) -> Result<Channel> {
        let (stream, addr) = timeout(CONNECTION_TIMEOUT, self.listener.accept())
            .await
            .map_err(|_| {
                Error::transport(format!(
                    "No connection after {}ms",
                    CONNECTION_TIMEOUT.as_millis()
                ))
            })??;

        debug!(?addr, "TCP connection accepted");

        let ws_stream = tokio_tungstenite::accept_async(stream)
            .await
            .map_err(|e| Error::transport(format!("WebSocket upgrade failed: {e}")))?;

        info!(port = self.port, "WebSocket channel established");

        Ok(spawn_channel(ws_stream))
    }
}

// ============================================================================
// Client Side
// ============================================================================

/// Connects to a host's [`PendingServer`].
///
/// # Errors
///
/// Returns [`Error::WebSocket`] if the handshake fails.
pub async fn connect(ws_url: &str) -> Result<Channel> {
    let (ws_stream, _) = tokio_tungstenite::connect_async(ws_url).await?;
    debug!(url = ws_url, "WebSocket channel connected");
    Ok(spawn_channel(ws_stream))
}

// ============================================================================
// Channel Plumbing
// ============================================================================

/// Outbound half that queues frames for the writer task.
struct WebSocketSink {
    outbound: mpsc::UnboundedSender<String>,
}

#[async_trait]
impl MessageSink for WebSocketSink {
    async fn post(&self, message: String) -> Result<()> {
        self.outbound
            .send(message)
            .map_err(|_| Error::ConnectionClosed)
    }
}

/// Splits the stream and spawns reader and writer tasks.
fn spawn_channel<S>(ws_stream: WebSocketStream<S>) -> Channel
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut ws_write, mut ws_read) = ws_stream.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    let writer_events = events_tx.clone();
    tokio::spawn(async move {
        while let Some(text) = outbound_rx.recv().await {
            if let Err(e) = ws_write.send(Message::Text(text.into())).await {
                warn!(error = %e, "Failed to send WebSocket frame");
                let _ = writer_events.send(ChannelEvent::Error(e.to_string()));
                break;
            }
        }
        let _ = ws_write.close().await;
        trace!("WebSocket writer terminated");
    });

    tokio::spawn(async move {
        loop {
            match ws_read.next().await {
                Some(Ok(Message::Text(text))) => {
                    if events_tx
                        .send(ChannelEvent::message(text.as_str()))
                        .is_err()
                    {
                        break;
                    }
                }

                Some(Ok(Message::Close(_))) => {
                    debug!("WebSocket closed by remote");
                    break;
                }

                Some(Err(e)) => {
                    warn!(error = %e, "WebSocket error");
                    let _ = events_tx.send(ChannelEvent::Error(e.to_string()));
                    break;
                }

                None => {
                    debug!("WebSocket stream ended");
                    break;
                }

                // Ignore Binary, Ping, Pong
                _ => {}
            }
        }
        let _ = events_tx.send(ChannelEvent::Closed);
    });

    Channel::new(
        Arc::new(WebSocketSink {
            outbound: outbound_tx,
        }),
        events_rx,
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_server_bind_random_port() {
        let server = PendingServer::bind(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)
            .await
            .expect("bind should succeed");

        assert!(server.port() > 0);
        assert_eq!(server.ws_url(), format!("ws://127.0.0.1:{}", server.port()));
        assert_eq!(server.local_addr().port(), server.port());
    }

    #[tokio::test]
    async fn test_text_frames_both_directions() {
        let server = PendingServer::bind(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)
            .await
            .expect("bind should succeed");
        let url = server.ws_url();

        let accept = tokio::spawn(server.accept());
        let embedded = connect(&url).await.expect("connect");
        let host = accept.await.expect("join").expect("accept");

        let (host_sink, mut host_events) = host.into_parts();
        let (embedded_sink, mut embedded_events) = embedded.into_parts();

        host_sink.post("ping".into()).await.expect("post");
        assert_eq!(embedded_events.recv().await, Some(ChannelEvent::message("ping")));

        embedded_sink.post("pong".into()).await.expect("post");
        assert_eq!(host_events.recv().await, Some(ChannelEvent::message("pong")));
    }

    #[tokio::test]
    async fn test_peer_drop_yields_closed() {
        let server = PendingServer::bind(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)
            .await
            .expect("bind should succeed");
        let url = server.ws_url();

        let accept = tokio::spawn(server.accept());
        let embedded = connect(&url).await.expect("connect");
        let host = accept.await.expect("join").expect("accept");

        drop(embedded);

        let (_, mut host_events) = host.into_parts();
        loop {
            match host_events.recv().await {
                Some(ChannelEvent::Closed) | None => break,
                Some(_) => {}
            }
        }
    }
}
