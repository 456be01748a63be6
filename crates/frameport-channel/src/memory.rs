//! In-process channel pair.
//!
//! The client half implements [`Connection`]; the host half is driven
//! explicitly. Client requests and notifications are queued to the host in
//! send order. Host pushes run the client's handlers synchronously on the
//! caller's task, so push order is delivery order.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};

use crate::config::{ConnectionConfig, RequestOptions};
use crate::error::{ChannelError, Result};
use crate::events::{event_group, is_lifecycle, lifecycle};
use crate::traits::{Connection, Handler, Responder};

/// Create a connected client/host pair.
pub fn memory_pair() -> (Arc<MemoryConnection>, HostEndpoint) {
    let registry = Arc::new(HandlerRegistry::default());
    let (outbound, inbound) = mpsc::unbounded_channel();
    let (accept_tx, accept_rx) = oneshot::channel();

    let client = Arc::new(MemoryConnection {
        registry: Arc::clone(&registry),
        outbound,
        config: Mutex::new(ConnectionConfig::default()),
        accepted: Mutex::new(Some(accept_rx)),
    });
    let host = HostEndpoint {
        pusher: HostPusher { registry },
        inbound,
        accept: Some(accept_tx),
    };
    (client, host)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct HandlerRegistry {
    handlers: Mutex<HashMap<String, Vec<Handler>>>,
}

impl HandlerRegistry {
    fn add(&self, event: &str, handler: Handler) {
        lock(&self.handlers)
            .entry(event.to_string())
            .or_default()
            .push(handler);
    }

    /// Run every handler for `event` in registration order.
    ///
    /// The first handler receives the responder; the rest get an inert one.
    /// Handlers run outside the registry lock so they may register more.
    fn dispatch(&self, event: &str, payload: Value, responder: Responder) -> usize {
        let handlers = lock(&self.handlers).get(event).cloned().unwrap_or_default();
        if handlers.is_empty() {
            if responder.expects_reply() {
                warn!(event, "no handler registered for host request");
            } else if is_lifecycle(event) {
                warn!(event, "lifecycle event fired with no listener");
            } else {
                trace!(event, "no handler registered for push");
            }
            return 0;
        }

        let mut responder = Some(responder);
        for handler in &handlers {
            let slot = responder.take().unwrap_or_else(Responder::none);
            handler(payload.clone(), slot);
        }
        handlers.len()
    }
}

/// Client half of [`memory_pair`].
pub struct MemoryConnection {
    registry: Arc<HandlerRegistry>,
    outbound: mpsc::UnboundedSender<HostMessage>,
    config: Mutex<ConnectionConfig>,
    accepted: Mutex<Option<oneshot::Receiver<()>>>,
}

impl MemoryConnection {
    /// Configuration applied by the last `init`.
    pub fn config(&self) -> ConnectionConfig {
        *lock(&self.config)
    }

    /// True once the host half has been dropped.
    pub fn is_closed(&self) -> bool {
        self.outbound.is_closed()
    }
}

impl fmt::Debug for MemoryConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryConnection")
            .field("config", &self.config())
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[async_trait]
impl Connection for MemoryConnection {
    fn init(&self, config: &ConnectionConfig) {
        *lock(&self.config) = *config;

        let Some(accepted) = lock(&self.accepted).take() else {
            warn!("channel already initialized; ignoring repeated init");
            return;
        };

        let registry = Arc::clone(&self.registry);
        let connection_timeout = config.connection_timeout;
        let log_traffic = config.debug;

        tokio::spawn(async move {
            // A dropped host never accepts; only the timeout can end the wait.
            let accepted = async {
                if accepted.await.is_err() {
                    std::future::pending::<()>().await;
                }
            };

            let event = match connection_timeout.as_duration() {
                Some(limit) => match tokio::time::timeout(limit, accepted).await {
                    Ok(()) => lifecycle::CONNECTED,
                    Err(_) => lifecycle::CONNECTION_TIMEOUT,
                },
                None => {
                    accepted.await;
                    lifecycle::CONNECTED
                }
            };

            if log_traffic {
                debug!(event, group = event_group(event), "lifecycle");
            }
            registry.dispatch(event, Value::Null, Responder::none());
        });
    }

    fn on(&self, event: &str, handler: Handler) {
        self.registry.add(event, handler);
    }

    fn emit(&self, event: &str, payload: Option<Value>) {
        let payload = payload.unwrap_or(Value::Null);
        if self.config().debug {
            debug!(event, group = event_group(event), %payload, "emit");
        }

        let message = HostMessage::Notification {
            event: event.to_string(),
            payload,
        };
        if self.outbound.send(message).is_err() {
            debug!(event, "host endpoint closed; notification dropped");
        }
    }

    async fn request(
        &self,
        event: &str,
        payload: Option<Value>,
        options: RequestOptions,
    ) -> Result<Value> {
        let config = self.config();
        let payload = payload.unwrap_or(Value::Null);
        if config.debug {
            debug!(event, group = event_group(event), %payload, "request");
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        let message = HostMessage::Request(IncomingRequest {
            event: event.to_string(),
            payload,
            responder: Responder::new(reply_tx),
        });
        self.outbound
            .send(message)
            .map_err(|_| ChannelError::Disconnected)?;

        let reply = match options.effective_timeout(config.timeout).as_duration() {
            Some(limit) => tokio::time::timeout(limit, reply_rx)
                .await
                .map_err(|_| ChannelError::Timeout(limit))?,
            None => reply_rx.await,
        };

        let result = match reply {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(reason)) => Err(ChannelError::Rejected(reason)),
            Err(_) if self.outbound.is_closed() => Err(ChannelError::Disconnected),
            Err(_) => Err(ChannelError::Unanswered(event.to_string())),
        };
        if config.debug {
            debug!(event, ok = result.is_ok(), "response");
        }
        result
    }
}

/// Traffic arriving at the host half.
#[derive(Debug)]
pub enum HostMessage {
    /// The client is waiting for a reply.
    Request(IncomingRequest),
    /// Fire-and-forget notification.
    Notification { event: String, payload: Value },
}

impl HostMessage {
    pub fn event(&self) -> &str {
        match self {
            Self::Request(request) => &request.event,
            Self::Notification { event, .. } => event,
        }
    }

    pub fn payload(&self) -> &Value {
        match self {
            Self::Request(request) => &request.payload,
            Self::Notification { payload, .. } => payload,
        }
    }
}

/// A client request awaiting the host's answer.
///
/// Dropping it without answering fails the client call with
/// [`ChannelError::Unanswered`].
#[derive(Debug)]
pub struct IncomingRequest {
    pub event: String,
    pub payload: Value,
    responder: Responder,
}

impl IncomingRequest {
    pub fn resolve(self, value: Value) {
        self.responder.resolve(value);
    }

    pub fn reject(self, reason: Value) {
        self.responder.reject(reason);
    }
}

/// Host half of [`memory_pair`].
pub struct HostEndpoint {
    pusher: HostPusher,
    inbound: mpsc::UnboundedReceiver<HostMessage>,
    accept: Option<oneshot::Sender<()>>,
}

impl HostEndpoint {
    /// Complete the handshake. Returns false if already accepted.
    pub fn accept(&mut self) -> bool {
        match self.accept.take() {
            Some(accept) => {
                let _ = accept.send(());
                true
            }
            None => false,
        }
    }

    /// Next request or notification from the client.
    ///
    /// Returns `None` once the client half has been dropped and the queue is
    /// drained.
    pub async fn recv(&mut self) -> Option<HostMessage> {
        self.inbound.recv().await
    }

    /// Cloneable handle for host-initiated traffic.
    pub fn pusher(&self) -> HostPusher {
        self.pusher.clone()
    }

    /// See [`HostPusher::push`].
    pub fn push(&self, event: &str, payload: Value) -> usize {
        self.pusher.push(event, payload)
    }

    /// See [`HostPusher::request`].
    pub async fn request(&self, event: &str, payload: Value) -> Result<Value> {
        self.pusher.request(event, payload).await
    }
}

impl fmt::Debug for HostEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostEndpoint")
            .field("accepted", &self.accept.is_none())
            .finish()
    }
}

/// Sends host-initiated pushes and requests into the client.
#[derive(Clone)]
pub struct HostPusher {
    registry: Arc<HandlerRegistry>,
}

impl HostPusher {
    /// Deliver a push synchronously. Returns how many handlers ran.
    pub fn push(&self, event: &str, payload: Value) -> usize {
        trace!(event, group = event_group(event), "push");
        self.registry.dispatch(event, payload, Responder::none())
    }

    /// Ask the client for a value.
    pub async fn request(&self, event: &str, payload: Value) -> Result<Value> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.registry
            .dispatch(event, payload, Responder::new(reply_tx));

        match reply_rx.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(reason)) => Err(ChannelError::Rejected(reason)),
            Err(_) => Err(ChannelError::Unanswered(event.to_string())),
        }
    }
}

impl fmt::Debug for HostPusher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostPusher").finish_non_exhaustive()
    }
}
