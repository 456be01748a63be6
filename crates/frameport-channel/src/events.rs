//! Event names exchanged with the host.
//!
//! These strings are the wire protocol. Renaming any of them breaks
//! compatibility with existing hosts.

/// Lifecycle signals raised by the transport itself.
pub mod lifecycle {
    /// The host answered the handshake.
    pub const CONNECTED: &str = "mc-connected";
    /// The handshake did not complete within the connection timeout.
    pub const CONNECTION_TIMEOUT: &str = "mc-connection-timeout";
}

/// One-shot context retrieval.
pub mod context {
    /// Request the extension context.
    pub const GET: &str = "context-get";
}

/// Generic form state.
pub mod form {
    /// Host push: the form's read-only flag changed.
    pub const READ_ONLY: &str = "form-read-only-change";
}

/// Content editor form model access.
pub mod content_editor_form {
    /// Request the current content model.
    pub const GET: &str = "content-editor-form-get";
    /// Replace the content model.
    pub const SET: &str = "content-editor-form-set";
    /// Validate a candidate model and return error reports.
    pub const VALIDATE: &str = "content-editor-form-validate";
    /// Validate a candidate model and return a boolean.
    pub const IS_VALID: &str = "content-editor-form-is-valid";
    /// Host push: the content model changed.
    pub const MODEL_CHANGE: &str = "content-editor-form-model-change";
}

/// Frame sizing.
pub mod frame {
    /// Host request: report the current height.
    pub const HEIGHT_GET: &str = "height-get";
    /// Notification: set the frame height.
    pub const HEIGHT_SET: &str = "height-set";
    /// Notification: start the host-side auto resizer.
    pub const AUTO_RESIZER_START: &str = "start-auto-resizer";
    /// Notification: stop the host-side auto resizer.
    pub const AUTO_RESIZER_STOP: &str = "stop-auto-resizer";
}

/// Every event name the protocol defines.
pub const PROTOCOL_EVENTS: &[&str] = &[
    lifecycle::CONNECTED,
    lifecycle::CONNECTION_TIMEOUT,
    context::GET,
    form::READ_ONLY,
    content_editor_form::GET,
    content_editor_form::SET,
    content_editor_form::VALIDATE,
    content_editor_form::IS_VALID,
    content_editor_form::MODEL_CHANGE,
    frame::HEIGHT_GET,
    frame::HEIGHT_SET,
    frame::AUTO_RESIZER_START,
    frame::AUTO_RESIZER_STOP,
];

/// Returns true for transport lifecycle events.
pub fn is_lifecycle(event: &str) -> bool {
    matches!(event, lifecycle::CONNECTED | lifecycle::CONNECTION_TIMEOUT)
}

/// Returns a short human-readable group name for an event.
pub fn event_group(event: &str) -> &'static str {
    match event {
        lifecycle::CONNECTED | lifecycle::CONNECTION_TIMEOUT => "LIFECYCLE",
        context::GET => "CONTEXT",
        form::READ_ONLY => "FORM",
        content_editor_form::GET
        | content_editor_form::SET
        | content_editor_form::VALIDATE
        | content_editor_form::IS_VALID
        | content_editor_form::MODEL_CHANGE => "CONTENT_EDITOR_FORM",
        frame::HEIGHT_GET
        | frame::HEIGHT_SET
        | frame::AUTO_RESIZER_START
        | frame::AUTO_RESIZER_STOP => "FRAME",
        _ => "USER",
    }
}
