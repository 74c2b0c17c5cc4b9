//! Host-side bridge client.
//!
//! Issues named calls to the embedded context and correlates the
//! asynchronous responses back to the waiting callers.
//!
//! # Event Loop
//!
//! [`BridgeClient::attach`] spawns a tokio task that handles:
//!
//! - Responses, matched to pending calls by correlation id
//! - The one-time ready announcement
//! - Malformed messages and transport failures, reported to `on_error`

// ============================================================================
// Imports
// ============================================================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::{CallId, CallIdGenerator};
use crate::protocol::{CallRequest, CallResponse, InboundMessage, ReadyAnnouncement};
use crate::transport::{Channel, ChannelEvent, MessageSink};

use super::assets::BootstrapDocument;
use super::config::BridgeConfig;
use super::pending::PendingCalls;
use super::style::WebViewStyle;

// ============================================================================
// ReadyState
// ============================================================================

/// What the embedded context has announced so far.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReadyState {
    /// No announcement yet.
    #[default]
    Pending,
    /// The vendor SDK is available with these methods.
    Ready(Vec<String>),
    /// The vendor SDK never appeared.
    Failed(String),
}

// ============================================================================
// WebViewSurface
// ============================================================================

/// Everything the host UI needs to mount the embedded web view.
#[derive(Debug, Clone, PartialEq)]
pub struct WebViewSurface {
    /// Bootstrap page content.
    pub html: String,
    /// Origin the page must be loaded under.
    pub base_url: String,
    /// Placement of the view.
    pub style: WebViewStyle,
}

// ============================================================================
// BridgeClient
// ============================================================================

/// Host end of the bridge.
///
/// Each instance is one session: it owns its own id counter, pending call
/// table, and readiness latch. Clones share the session.
///
/// # Example
///
/// ```ignore
/// let client = BridgeClient::new(BridgeConfig::builder().build()?);
/// client.attach(channel)?;
///
/// let methods = client.wait_ready().await?;
/// let cards = client.call_function("getCards", vec![json!({})]).await?;
/// ```
#[derive(Clone)]
pub struct BridgeClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: BridgeConfig,
    ids: CallIdGenerator,
    pending: PendingCalls,
    sink: RwLock<Option<Arc<dyn MessageSink>>>,
    event_loop: Mutex<Option<JoinHandle<()>>>,
    attached_once: AtomicBool,
    announced: AtomicBool,
    ready_tx: watch::Sender<ReadyState>,
}

impl BridgeClient {
    /// Creates a detached client.
    #[must_use]
    pub fn new(config: BridgeConfig) -> Self {
        let (ready_tx, _) = watch::channel(ReadyState::Pending);
        Self {
            inner: Arc::new(ClientInner {
                config,
                ids: CallIdGenerator::new(),
                pending: PendingCalls::default(),
                sink: RwLock::new(None),
                event_loop: Mutex::new(None),
                attached_once: AtomicBool::new(false),
                announced: AtomicBool::new(false),
                ready_tx,
            }),
        }
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.inner.config
    }

    /// Describes the web view the host must mount for this session.
    #[must_use]
    pub fn surface(&self) -> WebViewSurface {
        let config = &self.inner.config;
        let document = BootstrapDocument::new(config.sdk_url().clone(), config.base_url().clone());
        WebViewSurface {
            html: document.to_html(),
            base_url: document.base_url().to_string(),
            style: *config.style(),
        }
    }

    /// Attaches the message channel and starts the event loop.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if this client was ever attached, including
    /// after [`shutdown`](Self::shutdown) or a remote close. A session is
    /// bound to one channel; reconnecting needs a new client.
    pub fn attach(&self, channel: Channel) -> Result<()> {
        if self.inner.attached_once.swap(true, Ordering::AcqRel) {
            return Err(Error::config(
                "this session already had a channel; create a new client to reconnect",
            ));
        }

        let (sink, events) = channel.into_parts();
        *self.inner.sink.write() = Some(sink);

        let handle = tokio::spawn(run_event_loop(Arc::downgrade(&self.inner), events));
        *self.inner.event_loop.lock() = Some(handle);

        debug!("Bridge channel attached");
        Ok(())
    }

    /// Returns `true` while a channel is attached.
    #[inline]
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.inner.sink.read().is_some()
    }

    /// Calls a vendor function with the default timeout.
    ///
    /// # Errors
    ///
    /// - [`Error::ChannelNotReady`] if no channel is attached
    /// - [`Error::CallTimeout`] if no response arrives in time
    /// - [`Error::Remote`] if the embedded context reports an error
    /// - [`Error::SendFailed`] if the request could not be posted
    pub async fn call_function(&self, function: &str, args: Vec<Value>) -> Result<Value> {
        self.call_function_with_timeout(function, args, self.inner.config.call_timeout())
            .await
    }

    /// Calls a vendor function with a custom timeout.
    ///
    /// # Errors
    ///
    /// Same as [`call_function`](Self::call_function).
    pub async fn call_function_with_timeout(
        &self,
        function: &str,
        args: Vec<Value>,
        call_timeout: Duration,
    ) -> Result<Value> {
        let sink = self
            .inner
            .sink
            .read()
            .clone()
            .ok_or(Error::ChannelNotReady)?;

        let id = self.inner.ids.next_id();
        let json = serde_json::to_string(&CallRequest::new(id.clone(), function, args))?;

        let (completion, mut outcome) = oneshot::channel();
        self.inner.pending.insert(id.clone(), function, completion);

        if let Err(e) = sink.post(json).await {
            self.inner.pending.take(&id);
            let message = e.to_string();
            self.inner.report(e);
            return Err(Error::send_failed(function, message));
        }

        trace!(%id, function, "Call sent");

        let waited = timeout(call_timeout, &mut outcome).await;
        match waited {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(Error::ConnectionClosed),
            Err(_) => self.inner.expire(&id, function, call_timeout, outcome).await,
        }
    }

    /// Calls a vendor function and deserializes the result.
    ///
    /// # Errors
    ///
    /// Same as [`call_function`](Self::call_function), plus [`Error::Json`]
    /// if the result does not match `T`.
    pub async fn call_typed<T: DeserializeOwned>(
        &self,
        function: &str,
        args: Vec<Value>,
    ) -> Result<T> {
        let value = self.call_function(function, args).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Waits for the ready announcement.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Discovery`] if the embedded context reported that
    /// the vendor SDK never appeared.
    pub async fn wait_ready(&self) -> Result<Vec<String>> {
        let mut ready_rx = self.inner.ready_tx.subscribe();
        let state = ready_rx
            .wait_for(|state| *state != ReadyState::Pending)
            .await
            .map_err(|_| Error::ConnectionClosed)?
            .clone();

        match state {
            ReadyState::Ready(methods) => Ok(methods),
            ReadyState::Failed(message) => Err(Error::Discovery(message)),
            ReadyState::Pending => Err(Error::ConnectionClosed),
        }
    }

    /// Current readiness.
    #[must_use]
    pub fn ready_state(&self) -> ReadyState {
        self.inner.ready_tx.borrow().clone()
    }

    /// Method names announced by the embedded context, empty before
    /// readiness or after a failed discovery.
    #[must_use]
    pub fn available_methods(&self) -> Vec<String> {
        match &*self.inner.ready_tx.borrow() {
            ReadyState::Ready(methods) => methods.clone(),
            _ => Vec::new(),
        }
    }

    /// Returns the number of calls awaiting a response.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.pending.len()
    }

    /// Detaches the channel and fails every pending call with
    /// [`Error::ConnectionClosed`]. The client cannot be attached again.
    pub fn shutdown(&self) {
        self.inner.sink.write().take();
        if let Some(handle) = self.inner.event_loop.lock().take() {
            handle.abort();
        }

        let pending = self.inner.pending.drain();
        let count = pending.len();
        for (_, call) in pending {
            call.complete(Err(Error::ConnectionClosed));
        }

        if count > 0 {
            debug!(count, "Failed pending calls on shutdown");
        }
    }
}

// ============================================================================
// Inbound Handling
// ============================================================================

impl ClientInner {
    /// Settles a call whose deadline passed.
    ///
    /// If the response path already removed the entry, it owns the call and
    /// its outcome is returned instead of a timeout.
    async fn expire(
        &self,
        id: &CallId,
        function: &str,
        call_timeout: Duration,
        outcome: oneshot::Receiver<Result<Value>>,
    ) -> Result<Value> {
        if self.pending.take(id).is_some() {
            debug!(%id, function, "Call timed out");
            return Err(Error::call_timeout(
                function,
                call_timeout.as_millis() as u64,
            ));
        }
        outcome.await.unwrap_or(Err(Error::ConnectionClosed))
    }

    /// Routes one raw inbound payload.
    fn handle_inbound(&self, payload: &str) {
        match InboundMessage::parse(payload) {
            Ok(InboundMessage::Response(response)) => self.resolve(response),
            Ok(InboundMessage::Ready(announcement)) => self.announce(announcement),
            Err(e) => {
                warn!(error = %e, "Failed to parse inbound message");
                self.report(e);
            }
        }
    }

    /// Completes the pending call a response belongs to.
    fn resolve(&self, response: CallResponse) {
        let id: CallId = response.id.clone();
        match self.pending.take(&id) {
            Some(call) => {
                trace!(%id, function = %call.function, "Response matched");
                call.complete(response.into_result());
            }
            None => debug!(%id, "Dropping response for unknown call"),
        }
    }

    /// Latches the first ready announcement.
    fn announce(&self, announcement: ReadyAnnouncement) {
        if self.announced.swap(true, Ordering::AcqRel) {
            debug!("Ignoring repeated ready announcement");
            return;
        }

        let methods = announcement.methods();
        let state = match announcement.error {
            Some(message) => {
                warn!(error = %message, "Vendor SDK discovery failed");
                ReadyState::Failed(message)
            }
            None => {
                info!(count = methods.len(), "Vendor SDK ready");
                ReadyState::Ready(methods.clone())
            }
        };
        self.ready_tx.send_replace(state);

        if let Some(callback) = self.config.on_sdk_ready() {
            callback(methods);
        }
    }

    /// Hands a channel-level error to the embedder.
    fn report(&self, error: Error) {
        if let Some(callback) = self.config.on_error() {
            callback(error);
        }
    }
}

/// Event loop draining the channel's inbound events.
///
/// Holds only a weak reference so a dropped client stops the loop.
async fn run_event_loop(
    inner: Weak<ClientInner>,
    mut events: mpsc::UnboundedReceiver<ChannelEvent>,
) {
    while let Some(event) = events.recv().await {
        let Some(inner) = inner.upgrade() else {
            break;
        };

        match event {
            ChannelEvent::Message { payload, .. } => inner.handle_inbound(&payload),

            ChannelEvent::Error(message) => {
                warn!(error = %message, "Channel error");
                inner.report(Error::transport(message));
            }

            ChannelEvent::Closed => {
                debug!("Channel closed by remote");
                inner.sink.write().take();
                inner.report(Error::ConnectionClosed);
                break;
            }
        }
    }

    trace!("Bridge event loop terminated");
}

// ============================================================================
// Tests
// ============================================================================
