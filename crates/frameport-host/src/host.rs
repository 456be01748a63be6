use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use frameport_channel::events::{content_editor_form, context, form, frame};
use frameport_channel::{HostEndpoint, HostMessage, HostPusher, IncomingRequest};
use frameport_sdk::{ErrorReport, ModelChange};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::error::{HostError, Result};
use crate::validator::ModelValidator;

/// A notification the extension sent to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub event: String,
    pub payload: Value,
}

/// What the host observed over one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HostReport {
    /// Whether the handshake was accepted.
    pub connected: bool,
    /// Requests answered (resolved or rejected).
    pub requests: usize,
    pub notifications: Vec<Notification>,
    /// Model held when the session ended.
    pub model: Option<Value>,
    pub read_only: bool,
}

#[derive(Default)]
struct HostState {
    model: Option<Value>,
    read_only: bool,
    requests: usize,
    notifications: Vec<Notification>,
    validator: Option<Arc<ModelValidator>>,
}

fn lock(state: &Mutex<HostState>) -> MutexGuard<'_, HostState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Serves the host side of a session over a [`HostEndpoint`].
pub struct SimulatedHost {
    endpoint: HostEndpoint,
    context: Value,
    handle: HostHandle,
    refuse_connection: bool,
}

impl SimulatedHost {
    /// Create a host that hands `context` to the extension.
    ///
    /// The initial read-only flag is taken from the context's `readOnly`.
    pub fn new(endpoint: HostEndpoint, context: Value) -> Self {
        let read_only = context
            .get("readOnly")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let handle = HostHandle {
            pusher: endpoint.pusher(),
            state: Arc::new(Mutex::new(HostState {
                read_only,
                ..HostState::default()
            })),
        };
        Self {
            endpoint,
            context,
            handle,
            refuse_connection: false,
        }
    }

    /// Seed the authoritative model.
    pub fn with_model(self, model: Value) -> Self {
        lock(&self.handle.state).model = Some(model);
        self
    }

    /// Set the read-only flag, keeping the served context in agreement.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        lock(&self.handle.state).read_only = read_only;
        if let Some(context) = self.context.as_object_mut() {
            context.insert("readOnly".to_string(), Value::Bool(read_only));
        }
        self
    }

    /// Validate candidate models against a schema. Without one every model
    /// is valid.
    pub fn with_validator(self, validator: ModelValidator) -> Self {
        lock(&self.handle.state).validator = Some(Arc::new(validator));
        self
    }

    /// Never accept the handshake.
    pub fn refuse_connection(mut self) -> Self {
        self.refuse_connection = true;
        self
    }

    /// Handle for host-initiated traffic, usable while [`run`](Self::run)
    /// is serving. All handles share the host's state.
    pub fn handle(&self) -> HostHandle {
        self.handle.clone()
    }

    /// Accept the connection and serve until the extension goes away.
    pub async fn run(mut self) -> HostReport {
        let connected = !self.refuse_connection && self.endpoint.accept();
        if connected {
            info!("accepted extension connection");
        } else {
            info!("refusing extension connection");
        }

        while let Some(message) = self.endpoint.recv().await {
            match message {
                HostMessage::Request(request) => {
                    self.serve(request);
                    lock(&self.handle.state).requests += 1;
                }
                HostMessage::Notification { event, payload } => {
                    info!(%event, %payload, "notification");
                    lock(&self.handle.state)
                        .notifications
                        .push(Notification { event, payload });
                }
            }
        }

        debug!("extension disconnected");
        let state = lock(&self.handle.state);
        HostReport {
            connected,
            requests: state.requests,
            notifications: state.notifications.clone(),
            model: state.model.clone(),
            read_only: state.read_only,
        }
    }

    fn serve(&self, request: IncomingRequest) {
        debug!(event = %request.event, payload = %request.payload, "request");
        match request.event.as_str() {
            context::GET => request.resolve(self.context.clone()),
            content_editor_form::GET => match self.handle.model() {
                Some(model) => request.resolve(model),
                None => request.reject(json!({ "message": "form is not loaded" })),
            },
            content_editor_form::VALIDATE => {
                let errors = self.handle.validate(&request.payload);
                request.resolve(json!(errors));
            }
            content_editor_form::IS_VALID => {
                let valid = self.handle.validate(&request.payload).is_empty();
                request.resolve(Value::Bool(valid));
            }
            content_editor_form::SET => {
                if self.handle.read_only() {
                    warn!("rejecting model write while read-only");
                    request.reject(json!({ "message": "form is read-only" }));
                    return;
                }
                let errors = self.handle.replace_model(request.payload.clone());
                request.resolve(json!(errors));
            }
            other => {
                warn!(event = other, "unsupported event");
                let reason = json!({ "message": format!("unsupported event {other}") });
                request.reject(reason);
            }
        }
    }
}

impl fmt::Debug for SimulatedHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatedHost")
            .field("context", &self.context)
            .field("refuse_connection", &self.refuse_connection)
            .finish_non_exhaustive()
    }
}

/// Drives host-initiated traffic and inspects host state.
#[derive(Clone)]
pub struct HostHandle {
    pusher: HostPusher,
    state: Arc<Mutex<HostState>>,
}

impl HostHandle {
    pub fn model(&self) -> Option<Value> {
        lock(&self.state).model.clone()
    }

    pub fn read_only(&self) -> bool {
        lock(&self.state).read_only
    }

    /// Notifications received so far.
    pub fn notifications(&self) -> Vec<Notification> {
        lock(&self.state).notifications.clone()
    }

    /// Change the read-only flag and push it to the extension.
    pub fn set_read_only(&self, read_only: bool) {
        lock(&self.state).read_only = read_only;
        self.pusher.push(form::READ_ONLY, Value::Bool(read_only));
    }

    /// Replace the model and push the change to the extension.
    ///
    /// Returns the validation errors sent along with the push.
    pub fn replace_model(&self, model: Value) -> Vec<ErrorReport> {
        let errors = self.validate(&model);
        lock(&self.state).model = Some(model.clone());

        let change = ModelChange {
            content: model,
            errors: errors.clone(),
        };
        match serde_json::to_value(&change) {
            Ok(payload) => {
                self.pusher.push(content_editor_form::MODEL_CHANGE, payload);
            }
            Err(err) => warn!(error = %err, "failed to encode model change"),
        }
        errors
    }

    /// Ask the extension for its body height.
    pub async fn request_height(&self) -> Result<u32> {
        let value = self.pusher.request(frame::HEIGHT_GET, Value::Null).await?;
        value
            .as_u64()
            .and_then(|height| u32::try_from(height).ok())
            .ok_or(HostError::InvalidHeight(value))
    }

    fn validate(&self, model: &Value) -> Vec<ErrorReport> {
        let validator = lock(&self.state).validator.clone();
        match validator {
            Some(validator) => validator.validate(model),
            None => Vec::new(),
        }
    }
}

impl fmt::Debug for HostHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostHandle")
            .field("read_only", &self.read_only())
            .field("has_validator", &lock(&self.state).validator.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use frameport_channel::events::lifecycle;
    use frameport_channel::{
        memory_pair, ChannelError, Connection, ConnectionConfig, MemoryConnection, RequestOptions,
        Responder,
    };

    use super::*;

    fn editor_context() -> Value {
        json!({ "category": "CONTENT_EDITOR", "readOnly": false })
    }

    fn title_validator() -> ModelValidator {
        ModelValidator::from_schema(&json!({
            "type": "object",
            "required": ["title"],
            "properties": { "title": { "type": "string" } }
        }))
        .unwrap()
    }

    async fn request(
        client: &Arc<MemoryConnection>,
        event: &str,
        payload: Value,
    ) -> frameport_channel::Result<Value> {
        client
            .request(event, Some(payload), RequestOptions::no_timeout())
            .await
    }

    #[tokio::test]
    async fn serves_context_and_records_notifications() {
        let (client, endpoint) = memory_pair();
        let server = tokio::spawn(SimulatedHost::new(endpoint, editor_context()).run());

        let context = request(&client, context::GET, Value::Null).await.unwrap();
        assert_eq!(context, editor_context());
        client.emit(frame::HEIGHT_SET, Some(json!(120)));
        client.emit(frame::AUTO_RESIZER_START, None);

        drop(client);
        let report = server.await.unwrap();
        assert!(report.connected);
        assert_eq!(report.requests, 1);
        assert_eq!(
            report.notifications,
            vec![
                Notification {
                    event: frame::HEIGHT_SET.to_string(),
                    payload: json!(120),
                },
                Notification {
                    event: frame::AUTO_RESIZER_START.to_string(),
                    payload: Value::Null,
                },
            ]
        );
    }

    #[tokio::test]
    async fn get_rejects_until_model_exists() {
        let (client, endpoint) = memory_pair();
        let host = SimulatedHost::new(endpoint, editor_context());
        let handle = host.handle();
        let server = tokio::spawn(host.run());

        let err = request(&client, content_editor_form::GET, Value::Null)
            .await
            .unwrap_err();
        assert!(matches!(err, ChannelError::Rejected(_)));

        handle.replace_model(json!({ "title": "draft" }));
        let model = request(&client, content_editor_form::GET, Value::Null)
            .await
            .unwrap();
        assert_eq!(model, json!({ "title": "draft" }));

        drop(client);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn validate_and_is_valid_use_schema() {
        let (client, endpoint) = memory_pair();
        let host =
            SimulatedHost::new(endpoint, editor_context()).with_validator(title_validator());
        let server = tokio::spawn(host.run());

        let errors = request(&client, content_editor_form::VALIDATE, json!({}))
            .await
            .unwrap();
        assert_eq!(errors.as_array().map(Vec::len), Some(1));
        assert_eq!(errors[0]["path"], json!(""));

        let ok = request(&client, content_editor_form::VALIDATE, json!({ "title": "t" }))
            .await
            .unwrap();
        assert_eq!(ok, json!([]));

        let valid = request(&client, content_editor_form::IS_VALID, json!({ "title": 3 }))
            .await
            .unwrap();
        assert_eq!(valid, json!(false));

        drop(client);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn set_stores_model_and_pushes_change() {
        let (client, endpoint) = memory_pair();
        let pushes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&pushes);
        client.on(
            content_editor_form::MODEL_CHANGE,
            Arc::new(move |payload: Value, _: Responder| sink.lock().unwrap().push(payload)),
        );

        let host =
            SimulatedHost::new(endpoint, editor_context()).with_validator(title_validator());
        let handle = host.handle();
        let server = tokio::spawn(host.run());

        let errors = request(&client, content_editor_form::SET, json!({ "body": "x" }))
            .await
            .unwrap();
        assert_eq!(errors.as_array().map(Vec::len), Some(1));
        assert_eq!(handle.model(), Some(json!({ "body": "x" })));

        let pushed = pushes.lock().unwrap().clone();
        assert_eq!(pushed.len(), 1);
        assert_eq!(pushed[0]["content"], json!({ "body": "x" }));
        assert_eq!(pushed[0]["errors"], errors);

        drop(client);
        let report = server.await.unwrap();
        assert_eq!(report.model, Some(json!({ "body": "x" })));
    }

    #[tokio::test]
    async fn set_rejected_while_read_only() {
        let (client, endpoint) = memory_pair();
        let host = SimulatedHost::new(endpoint, editor_context())
            .with_model(json!({ "title": "kept" }))
            .with_read_only(true);
        let handle = host.handle();
        let server = tokio::spawn(host.run());

        let context = request(&client, context::GET, Value::Null).await.unwrap();
        assert_eq!(context["readOnly"], json!(true));

        let err = request(&client, content_editor_form::SET, json!({ "title": "new" }))
            .await
            .unwrap_err();
        assert!(
            matches!(err, ChannelError::Rejected(ref reason) if reason["message"] == "form is read-only")
        );
        assert_eq!(handle.model(), Some(json!({ "title": "kept" })));

        drop(client);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn unknown_event_rejected_with_name() {
        let (client, endpoint) = memory_pair();
        let server = tokio::spawn(SimulatedHost::new(endpoint, editor_context()).run());

        let err = request(&client, "mystery", Value::Null).await.unwrap_err();
        match err {
            ChannelError::Rejected(reason) => {
                assert_eq!(reason, json!({ "message": "unsupported event mystery" }));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        drop(client);
        server.await.unwrap();
    }

    #[test]
    fn early_handle_validates_with_later_schema() {
        let (_client, endpoint) = memory_pair();
        let host = SimulatedHost::new(endpoint, editor_context());
        let early = host.handle();
        let host = host.with_validator(title_validator());
        let late = host.handle();

        assert_eq!(early.replace_model(json!({})).len(), 1);
        assert_eq!(late.replace_model(json!({})).len(), 1);
        assert!(early.replace_model(json!({ "title": "t" })).is_empty());
    }

    #[test]
    fn set_read_only_pushes_flag() {
        let (client, endpoint) = memory_pair();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        client.on(
            form::READ_ONLY,
            Arc::new(move |payload: Value, _: Responder| sink.lock().unwrap().push(payload)),
        );

        let host = SimulatedHost::new(endpoint, editor_context());
        let handle = host.handle();
        handle.set_read_only(true);
        handle.set_read_only(false);

        assert_eq!(*seen.lock().unwrap(), vec![json!(true), json!(false)]);
        assert!(!handle.read_only());
    }

    #[tokio::test]
    async fn request_height_reads_client_answer() {
        let (client, endpoint) = memory_pair();
        client.on(
            frame::HEIGHT_GET,
            Arc::new(|_, responder: Responder| responder.resolve(json!(512))),
        );
        let handle = SimulatedHost::new(endpoint, editor_context()).handle();
        assert_eq!(handle.request_height().await.unwrap(), 512);
    }

    #[tokio::test]
    async fn request_height_rejects_non_integer() {
        let (client, endpoint) = memory_pair();
        client.on(
            frame::HEIGHT_GET,
            Arc::new(|_, responder: Responder| responder.resolve(json!("tall"))),
        );
        let handle = SimulatedHost::new(endpoint, editor_context()).handle();
        assert!(matches!(
            handle.request_height().await,
            Err(HostError::InvalidHeight(_))
        ));
    }

    #[tokio::test]
    async fn refused_connection_never_accepts() {
        let (client, endpoint) = memory_pair();
        let connected = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&connected);
        client.on(
            lifecycle::CONNECTED,
            Arc::new(move |_: Value, _: Responder| *flag.lock().unwrap() = true),
        );
        client.init(&ConnectionConfig::default());

        let host = SimulatedHost::new(endpoint, editor_context()).refuse_connection();
        let server = tokio::spawn(host.run());
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!*connected.lock().unwrap());

        drop(client);
        let report = server.await.unwrap();
        assert!(!report.connected);
    }
}
