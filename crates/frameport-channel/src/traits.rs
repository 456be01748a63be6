use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::config::{ConnectionConfig, RequestOptions};
use crate::error::Result;

/// Reply slot for a host-initiated request.
pub(crate) type ReplySender = oneshot::Sender<std::result::Result<Value, Value>>;

/// Callback registered for a named event.
///
/// Receives the event payload and a [`Responder`]. For plain pushes the
/// responder is inert; for host-initiated requests it carries the reply slot.
pub type Handler = Arc<dyn Fn(Value, Responder) + Send + Sync>;

/// Answers a host-initiated request at most once.
pub struct Responder {
    reply: Option<ReplySender>,
}

impl Responder {
    /// A responder that discards whatever it is given.
    pub fn none() -> Self {
        Self { reply: None }
    }

    pub(crate) fn new(reply: ReplySender) -> Self {
        Self { reply: Some(reply) }
    }

    /// A live responder and the receiver its answer arrives on.
    ///
    /// For transports other than the in-process pair.
    pub fn channel() -> (Self, oneshot::Receiver<std::result::Result<Value, Value>>) {
        let (reply, answer) = oneshot::channel();
        (Self::new(reply), answer)
    }

    /// True when the other side is waiting for an answer.
    pub fn expects_reply(&self) -> bool {
        self.reply.is_some()
    }

    /// Answer successfully.
    pub fn resolve(mut self, value: Value) {
        if let Some(reply) = self.reply.take() {
            let _ = reply.send(Ok(value));
        }
    }

    /// Answer with a rejection reason.
    pub fn reject(mut self, reason: Value) {
        if let Some(reply) = self.reply.take() {
            let _ = reply.send(Err(reason));
        }
    }
}

impl fmt::Debug for Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Responder")
            .field("expects_reply", &self.expects_reply())
            .finish()
    }
}

/// The messaging channel between an embedded frame and its host.
///
/// Delivery is reliable and ordered per event name. Implementations own all
/// correlation and timeout bookkeeping; callers only see named events.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Open the channel and start the lifecycle.
    ///
    /// Exactly one of `mc-connected` or `mc-connection-timeout` is delivered
    /// to registered handlers afterwards (or neither, if the wait is unbounded
    /// and the host never answers).
    fn init(&self, config: &ConnectionConfig);

    /// Register a handler for a named event. Handlers are never removed.
    fn on(&self, event: &str, handler: Handler);

    /// Send a one-way notification.
    fn emit(&self, event: &str, payload: Option<Value>);

    /// Send a request and wait for the single reply.
    async fn request(
        &self,
        event: &str,
        payload: Option<Value>,
        options: RequestOptions,
    ) -> Result<Value>;
}
