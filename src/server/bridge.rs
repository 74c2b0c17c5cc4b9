//! Embedded-side bridge: discovery, announcement, and call dispatch.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::error::Result;
use crate::protocol::{CallRequest, CallResponse, ReadyAnnouncement};
use crate::transport::{Channel, ChannelEvent, EventSource, MessageSink};

use super::config::ServerConfig;
use super::discovery::{Discovery, DiscoveryOutcome};
use super::vendor::VendorLocator;

// ============================================================================
// ServerExit
// ============================================================================

/// Why [`BridgeServer::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerExit {
    /// Discovery failed. No request was ever listened to.
    DiscoveryFailed {
        /// Probes made.
        attempts: u32,
    },
    /// The channel closed while serving calls.
    ChannelClosed,
}

// ============================================================================
// BridgeServer
// ============================================================================

/// Bridge endpoint living next to the vendor SDK.
///
/// # Example
///
/// ```ignore
/// let slot = VendorSlot::new();
/// let server = BridgeServer::new(slot.clone());
/// tokio::spawn(server.run(embedded_channel));
///
/// // Later, once the vendor script has loaded:
/// slot.install(vendor_service);
/// ```
pub struct BridgeServer {
    config: ServerConfig,
    locator: Arc<dyn VendorLocator>,
}

impl BridgeServer {
    /// Creates a server with default settings.
    #[must_use]
    pub fn new(locator: impl VendorLocator + 'static) -> Self {
        Self::with_config(ServerConfig::default(), locator)
    }

    /// Creates a server with explicit settings.
    #[must_use]
    pub fn with_config(config: ServerConfig, locator: impl VendorLocator + 'static) -> Self {
        Self {
            config,
            locator: Arc::new(locator),
        }
    }

    /// Returns the server settings.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Runs discovery, announces the outcome, then serves calls until the
    /// channel closes.
    ///
    /// The call listener is attached only once discovery reaches Ready.
    /// Unlike a page whose early messages are lost before any listener
    /// exists, requests that arrive while discovery is still searching are
    /// not dropped: they stay buffered in the channel and are served once
    /// the listener attaches. After a failed discovery the listener is
    /// never attached and buffered requests go unanswered.
    ///
    /// On a channel with dual delivery only messages tagged with the
    /// configured [`event_source`](ServerConfig::event_source) are handled.
    /// A single-source channel has every message handled.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the announcement cannot be posted.
    pub async fn run(self, channel: Channel) -> Result<ServerExit> {
        let dual_delivery = channel.has_dual_delivery();
        let (sink, events) = channel.into_parts();

        let outcome = Discovery::new(self.locator.as_ref(), self.config)
            .run()
            .await;

        match outcome {
            DiscoveryOutcome::Ready {
                methods, attempts, ..
            } => {
                info!(attempts, count = methods.len(), "Vendor SDK ready");
                post_json(sink.as_ref(), &ReadyAnnouncement::ready(methods)).await?;
                let bound = dual_delivery.then_some(self.config.event_source);
                self.listen(sink, events, bound).await;
                Ok(ServerExit::ChannelClosed)
            }
            DiscoveryOutcome::Failed { attempts } => {
                let announcement = ReadyAnnouncement::failed(format!(
                    "Vendor SDK not available after {attempts} attempts"
                ));
                post_json(sink.as_ref(), &announcement).await?;
                Ok(ServerExit::DiscoveryFailed { attempts })
            }
        }
    }

    /// Call listener. With `bound` set, messages from any other event
    /// source are ignored.
    async fn listen(
        &self,
        sink: Arc<dyn MessageSink>,
        mut events: mpsc::UnboundedReceiver<ChannelEvent>,
        bound: Option<EventSource>,
    ) {
        match bound {
            Some(source) => debug!(%source, "Call listener attached"),
            None => debug!("Call listener attached to single-source channel"),
        }

        while let Some(event) = events.recv().await {
            match event {
                ChannelEvent::Message { source, payload }
                    if bound.is_none_or(|bound| bound == source) =>
                {
                    let locator = Arc::clone(&self.locator);
                    let sink = Arc::clone(&sink);
                    tokio::spawn(async move {
                        handle_message(locator.as_ref(), sink.as_ref(), &payload).await;
                    });
                }

                ChannelEvent::Message { source, .. } => {
                    trace!(%source, "Ignoring message from unbound event source");
                }

                ChannelEvent::Error(message) => {
                    warn!(error = %message, "Channel error");
                }

                ChannelEvent::Closed => break,
            }
        }

        debug!("Call listener detached");
    }
}

// ============================================================================
// Call Handling
// ============================================================================

/// Parses one inbound payload, dispatches it, and posts the response.
async fn handle_message(locator: &dyn VendorLocator, sink: &dyn MessageSink, payload: &str) {
    let request: CallRequest = match serde_json::from_str(payload) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Dropping message without id or functionName");
            return;
        }
    };

    let response = dispatch(locator, request).await;
    if let Err(e) = post_json(sink, &response).await {
        warn!(id = %response.id, error = %e, "Failed to post call response");
    }
}

/// Resolves and invokes the requested vendor function.
///
/// The service and the function are looked up fresh for every request.
pub async fn dispatch(locator: &dyn VendorLocator, request: CallRequest) -> CallResponse {
    let CallRequest {
        id,
        function_name,
        args,
    } = request;

    let Some(service) = locator.locate() else {
        return CallResponse::failure(id, "SDK not ready");
    };

    let Some(function) = service.function(&function_name) else {
        let available = service.method_names().join(", ");
        debug!(%id, function = %function_name, "Function not found");
        return CallResponse::failure(
            id,
            format!("Function {function_name} not found. Available: {available}"),
        );
    };

    trace!(%id, function = %function_name, args = args.len(), "Invoking vendor function");

    // A panicking vendor function only fails its own call.
    match tokio::spawn(async move { function(args).await }).await {
        Ok(Ok(data)) => CallResponse::success(id, data),
        Ok(Err(e)) => CallResponse::failure(id, e.describe()),
        Err(join) if join.is_panic() => {
            warn!(%id, function = %function_name, "Vendor function panicked");
            CallResponse::failure(id, format!("Function {function_name} panicked"))
        }
        Err(_) => CallResponse::failure(id, format!("Function {function_name} was cancelled")),
    }
}

async fn post_json<T: serde::Serialize>(sink: &dyn MessageSink, message: &T) -> Result<()> {
    let json = serde_json::to_string(message)?;
    sink.post(json).await
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::{Value, json};

    use crate::identifiers::CallId;
    use crate::protocol::InboundMessage;
    use crate::server::vendor::{FunctionTable, VendorError, VendorSlot, vendor_fn};
    use crate::transport::Platform;
    use crate::transport::memory::{self, Delivery};

    fn payment_sdk() -> VendorSlot {
        let table = FunctionTable::new()
            .with_function(
                "initialize",
                vendor_fn(|args| async move {
                    Ok(json!({"initialized": true, "echo": args.first().cloned()}))
                }),
            )
            .with_function(
                "getCards",
                vendor_fn(|_| async { Err(VendorError::message("Session expired")) }),
            )
            .with_function(
                "checkout",
                vendor_fn(|args| async move {
                    if args.is_empty() {
                        panic!("vendor bug");
                    }
                    Ok(Value::Null)
                }),
            );
        VendorSlot::installed(Arc::new(table))
    }

    fn request(function: &str, args: Vec<Value>) -> CallRequest {
        CallRequest::new(CallId::from_sequence(0), function, args)
    }

    #[tokio::test]
    async fn test_dispatch_success() {
        let slot = payment_sdk();
        let response = dispatch(&slot, request("initialize", vec![json!({"k": 1})])).await;
        assert_eq!(response.id.as_str(), "msg_0");
        assert_eq!(
            response.data,
            Some(json!({"initialized": true, "echo": {"k": 1}}))
        );
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_dispatch_not_found_lists_methods() {
        let slot = payment_sdk();
        let response = dispatch(&slot, request("doesNotExist", vec![])).await;
        assert_eq!(
            response.error.as_deref(),
            Some("Function doesNotExist not found. Available: initialize, getCards, checkout")
        );
    }

    #[tokio::test]
    async fn test_dispatch_vendor_error_verbatim() {
        let slot = payment_sdk();
        let response = dispatch(&slot, request("getCards", vec![])).await;
        assert_eq!(response.error.as_deref(), Some("Session expired"));
    }

    #[tokio::test]
    async fn test_dispatch_panic_is_contained() {
        let slot = payment_sdk();
        let response = dispatch(&slot, request("checkout", vec![])).await;
        assert_eq!(response.error.as_deref(), Some("Function checkout panicked"));
    }

    #[tokio::test]
    async fn test_dispatch_service_gone() {
        let slot = payment_sdk();
        slot.clear();
        let response = dispatch(&slot, request("initialize", vec![])).await;
        assert_eq!(response.error.as_deref(), Some("SDK not ready"));
    }

    #[tokio::test]
    async fn test_dispatch_sees_new_functions() {
        let table = Arc::new(FunctionTable::new());
        let slot = VendorSlot::installed(table.clone());

        let missing = dispatch(&slot, request("late", vec![])).await;
        assert!(missing.error.is_some());

        table.register("late", vendor_fn(|_| async { Ok(json!("here")) }));
        let found = dispatch(&slot, request("late", vec![])).await;
        assert_eq!(found.data, Some(json!("here")));
    }

    /// Next inbound message on the host side, parsed.
    async fn next_inbound(events: &mut mpsc::UnboundedReceiver<ChannelEvent>) -> InboundMessage {
        match events.recv().await {
            Some(ChannelEvent::Message { payload, .. }) => {
                InboundMessage::parse(&payload).expect("valid message")
            }
            other => panic!("expected message, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_single_source_channel_served_on_any_platform() {
        // Window-tagged frames reach an Android-configured server.
        let (host, embedded) = memory::pair(Delivery::Single(EventSource::Window));
        let config = ServerConfig::new().with_platform(Platform::Android);
        tokio::spawn(BridgeServer::with_config(config, payment_sdk()).run(embedded.into_channel()));

        let (sink, mut events) = host.into_channel().into_parts();
        assert!(matches!(next_inbound(&mut events).await, InboundMessage::Ready(_)));

        let request = serde_json::to_string(&request("initialize", vec![])).expect("json");
        sink.post(request).await.expect("post");

        match next_inbound(&mut events).await {
            InboundMessage::Response(response) => {
                assert_eq!(response.id.as_str(), "msg_0");
                assert!(response.error.is_none());
            }
            other => panic!("expected response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dual_delivery_channel_filters_by_source() {
        let (host, embedded) = memory::pair(Delivery::Both);
        let config = ServerConfig::new().with_event_source(EventSource::Document);
        tokio::spawn(BridgeServer::with_config(config, payment_sdk()).run(embedded.into_channel()));

        let (sink, mut events) = host.into_channel().into_parts();
        assert!(matches!(next_inbound(&mut events).await, InboundMessage::Ready(_)));

        let first = CallRequest::new(CallId::from_sequence(0), "initialize", vec![]);
        let second = CallRequest::new(CallId::from_sequence(1), "initialize", vec![]);
        sink.post(serde_json::to_string(&first).expect("json")).await.expect("post");
        sink.post(serde_json::to_string(&second).expect("json")).await.expect("post");

        let mut ids = Vec::new();
        for _ in 0..2 {
            match next_inbound(&mut events).await {
                InboundMessage::Response(response) => ids.push(response.id.as_str().to_string()),
                other => panic!("expected response, got {other:?}"),
            }
        }
        ids.sort();
        assert_eq!(ids, ["msg_0", "msg_1"]);

        // Each request was delivered twice but answered once.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(events.try_recv().is_err());
    }
}
