//! Content editor form facade.
//!
//! Mirrors the host's read-only flag and content model, fans host pushes out
//! to registered listeners, and wraps the form's request/response calls.
//!
//! The cached state is written only by the push handlers installed at
//! construction. Writes through [`ContentEditorForm::set_value`] leave the
//! cache alone until the host pushes the accepted model back.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use frameport_channel::events::{content_editor_form, form};
use frameport_channel::{Connection, RequestOptions, Responder};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, SdkError};

/// A single validation failure reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Location of the offending value within the model.
    pub path: String,
    pub message: String,
}

impl ErrorReport {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Payload of a model-change push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelChange {
    pub content: Value,
    /// Missing or `null` decodes as no errors.
    #[serde(default, deserialize_with = "errors_or_empty")]
    pub errors: Vec<ErrorReport>,
}

fn errors_or_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<ErrorReport>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<ErrorReport>>::deserialize(deserializer)?.unwrap_or_default())
}

type ReadOnlyListener = Arc<dyn Fn(bool) + Send + Sync>;
type ModelListener = Arc<dyn Fn(&[ErrorReport], &Value) + Send + Sync>;

struct FormState {
    read_only: bool,
    model: Option<Value>,
    read_only_listeners: Vec<ReadOnlyListener>,
    model_listeners: Vec<ModelListener>,
}

fn lock(state: &Mutex<FormState>) -> MutexGuard<'_, FormState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Client-side mirror of the host's content editor form.
///
/// Cloning yields another handle onto the same mirror.
#[derive(Clone)]
pub struct ContentEditorForm {
    connection: Arc<dyn Connection>,
    state: Arc<Mutex<FormState>>,
}

impl ContentEditorForm {
    /// Create the facade and subscribe to the host's form pushes.
    pub fn new(connection: Arc<dyn Connection>, read_only: bool) -> Self {
        let state = Arc::new(Mutex::new(FormState {
            read_only,
            model: None,
            read_only_listeners: Vec::new(),
            model_listeners: Vec::new(),
        }));

        let read_only_state = Arc::clone(&state);
        connection.on(
            form::READ_ONLY,
            Arc::new(move |payload: Value, _: Responder| {
                handle_read_only(&read_only_state, payload);
            }),
        );

        let model_state = Arc::clone(&state);
        connection.on(
            content_editor_form::MODEL_CHANGE,
            Arc::new(move |payload: Value, _: Responder| {
                handle_model_change(&model_state, payload);
            }),
        );

        Self { connection, state }
    }

    /// Current read-only flag as last pushed by the host.
    pub fn read_only(&self) -> bool {
        lock(&self.state).read_only
    }

    /// Content model as last pushed by the host, if any push arrived yet.
    pub fn model(&self) -> Option<Value> {
        lock(&self.state).model.clone()
    }

    /// Call `listener` with the new flag on every read-only push.
    ///
    /// Listeners run in registration order and are never removed. Registering
    /// the same closure twice runs it twice.
    pub fn on_read_only_change<F>(&self, listener: F) -> &Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        lock(&self.state)
            .read_only_listeners
            .push(Arc::new(listener));
        self
    }

    /// Call `listener` with `(errors, content)` on every model push.
    pub fn on_model_change<F>(&self, listener: F) -> &Self
    where
        F: Fn(&[ErrorReport], &Value) + Send + Sync + 'static,
    {
        lock(&self.state).model_listeners.push(Arc::new(listener));
        self
    }

    /// Ask the host whether `value` would be a valid model.
    pub async fn is_valid(&self, value: Value) -> Result<bool> {
        let reply = self
            .connection
            .request(
                content_editor_form::IS_VALID,
                Some(value),
                RequestOptions::default(),
            )
            .await?;
        Ok(serde_json::from_value(reply)?)
    }

    /// Validate `value` against the host's form.
    ///
    /// Returns `None` when the host reports no errors, so callers can branch
    /// on the presence of a report.
    pub async fn validate(&self, value: Value) -> Result<Option<Vec<ErrorReport>>> {
        let reply = self
            .connection
            .request(
                content_editor_form::VALIDATE,
                Some(value),
                RequestOptions::default(),
            )
            .await?;
        let errors: Vec<ErrorReport> = serde_json::from_value(reply)?;
        Ok(if errors.is_empty() { None } else { Some(errors) })
    }

    /// Replace the host's model with `value`.
    ///
    /// Returns the host's error list as-is; an empty list is returned as an
    /// empty list, unlike [`validate`](Self::validate).
    pub async fn set_value(&self, value: Value) -> Result<Vec<ErrorReport>> {
        let reply = self
            .connection
            .request(
                content_editor_form::SET,
                Some(value),
                RequestOptions::default(),
            )
            .await?;
        Ok(serde_json::from_value(reply)?)
    }

    /// Fetch the host's current model.
    ///
    /// Any failure is reported as [`SdkError::NoModel`].
    pub async fn get_value(&self) -> Result<Value> {
        self.connection
            .request(content_editor_form::GET, None, RequestOptions::default())
            .await
            .map_err(|err| {
                debug!(error = %err, "form model request failed");
                SdkError::NoModel
            })
    }
}

impl fmt::Debug for ContentEditorForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("ContentEditorForm")
            .field("read_only", &state.read_only)
            .field("model", &state.model)
            .field("read_only_listeners", &state.read_only_listeners.len())
            .field("model_listeners", &state.model_listeners.len())
            .finish()
    }
}

// Listeners run on a snapshot taken after the cache is updated, outside the
// lock. A panicking listener unwinds out of the delivery and the remaining
// listeners for that push are skipped.

fn handle_read_only(state: &Mutex<FormState>, payload: Value) {
    let Some(read_only) = payload.as_bool() else {
        warn!(%payload, "ignoring malformed read-only push");
        return;
    };

    let listeners = {
        let mut state = lock(state);
        state.read_only = read_only;
        state.read_only_listeners.clone()
    };
    for listener in &listeners {
        listener(read_only);
    }
}

fn handle_model_change(state: &Mutex<FormState>, payload: Value) {
    let change: ModelChange = match serde_json::from_value(payload) {
        Ok(change) => change,
        Err(err) => {
            warn!(error = %err, "ignoring malformed model-change push");
            return;
        }
    };

    let listeners = {
        let mut state = lock(state);
        state.model = Some(change.content.clone());
        state.model_listeners.clone()
    };
    for listener in &listeners {
        listener(&change.errors, &change.content);
    }
}
