//! Recording `Connection` double for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use frameport_channel::{
    ChannelError, Connection, ConnectionConfig, Handler, RequestOptions, Responder,
};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedRequest {
    pub event: String,
    pub payload: Option<Value>,
    pub options: RequestOptions,
}

#[derive(Default)]
pub(crate) struct RecordingConnection {
    handlers: Mutex<Vec<(String, Handler)>>,
    emitted: Mutex<Vec<(String, Option<Value>)>>,
    requests: Mutex<Vec<RecordedRequest>>,
    replies: Mutex<HashMap<String, VecDeque<Result<Value, ChannelError>>>>,
    inits: Mutex<Vec<ConnectionConfig>>,
    lifecycle_on_init: Mutex<Option<&'static str>>,
}

impl RecordingConnection {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue the reply for the next request named `event`.
    pub fn reply(&self, event: &str, reply: Result<Value, ChannelError>) {
        self.replies
            .lock()
            .unwrap()
            .entry(event.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Fire a lifecycle event synchronously from inside `init`.
    pub fn fire_on_init(&self, event: &'static str) {
        *self.lifecycle_on_init.lock().unwrap() = Some(event);
    }

    /// Event names passed to `on`, in registration order.
    pub fn registered(&self) -> Vec<String> {
        self.handlers
            .lock()
            .unwrap()
            .iter()
            .map(|(event, _)| event.clone())
            .collect()
    }

    pub fn emitted(&self) -> Vec<(String, Option<Value>)> {
        self.emitted.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn inits(&self) -> Vec<ConnectionConfig> {
        self.inits.lock().unwrap().clone()
    }

    /// Deliver a push to every handler for `event`.
    pub fn push(&self, event: &str, payload: Value) -> usize {
        let handlers = self.handlers_for(event);
        for handler in &handlers {
            handler(payload.clone(), Responder::none());
        }
        handlers.len()
    }

    /// Issue a host-initiated request to the first handler for `event`.
    pub fn host_request(&self, event: &str) -> Option<Result<Value, Value>> {
        let handler = self.handlers_for(event).into_iter().next()?;
        let (responder, mut answer) = Responder::channel();
        handler(Value::Null, responder);
        answer.try_recv().ok()
    }

    fn handlers_for(&self, event: &str) -> Vec<Handler> {
        self.handlers
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, handler)| Arc::clone(handler))
            .collect()
    }
}

#[async_trait]
impl Connection for RecordingConnection {
    fn init(&self, config: &ConnectionConfig) {
        self.inits.lock().unwrap().push(*config);
        let lifecycle = *self.lifecycle_on_init.lock().unwrap();
        if let Some(event) = lifecycle {
            self.push(event, Value::Null);
        }
    }

    fn on(&self, event: &str, handler: Handler) {
        self.handlers
            .lock()
            .unwrap()
            .push((event.to_string(), handler));
    }

    fn emit(&self, event: &str, payload: Option<Value>) {
        self.emitted
            .lock()
            .unwrap()
            .push((event.to_string(), payload));
    }

    async fn request(
        &self,
        event: &str,
        payload: Option<Value>,
        options: RequestOptions,
    ) -> Result<Value, ChannelError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            event: event.to_string(),
            payload,
            options,
        });
        self.replies
            .lock()
            .unwrap()
            .get_mut(event)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(ChannelError::Unanswered(event.to_string())))
    }
}
