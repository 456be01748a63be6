//! Extension-side SDK for frameport.
//!
//! Call [`init`] with a connection to the host. It performs the handshake,
//! fetches the extension context once and hands back the matching
//! [`Extension`] facade:
//!
//! ```ignore
//! let (connection, host) = frameport_channel::memory_pair();
//! let extension = frameport_sdk::init(connection, InitOptions::default()).await?;
//! let editor = extension.into_content_editor().ok_or("not a content editor")?;
//! editor.form.on_model_change(|errors, content| { /* ... */ });
//! let model = editor.form.get_value().await?;
//! ```

pub mod context;
pub mod error;
pub mod extension;
pub mod form;
pub mod frame;
pub mod init;
pub mod options;
pub mod window;

#[cfg(test)]
mod testing;

pub use context::{Context, ExtensionCategory, Params};
pub use error::{Result, SdkError};
pub use extension::{extension_factory, ContentEditorExtension, DashboardExtension, Extension};
pub use form::{ContentEditorForm, ErrorReport, ModelChange};
pub use frame::Frame;
pub use init::init;
pub use options::InitOptions;
pub use window::{DetachedWindow, FixedWindow, Window};
