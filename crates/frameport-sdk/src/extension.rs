//! Facade dispatch.
//!
//! The context's `category` selects which facade family is built on top of
//! the shared connection.

use std::fmt;
use std::sync::Arc;

use frameport_channel::Connection;

use crate::context::{Context, ExtensionCategory, Params};
use crate::error::Result;
use crate::form::ContentEditorForm;
use crate::frame::Frame;
use crate::options::InitOptions;

/// An extension editing a content item in the host's editor.
#[derive(Clone)]
pub struct ContentEditorExtension {
    pub form: ContentEditorForm,
    pub frame: Frame,
    pub params: Params,
    connection: Arc<dyn Connection>,
}

impl ContentEditorExtension {
    pub fn new(connection: Arc<dyn Connection>, context: &Context, options: &InitOptions) -> Self {
        Self {
            form: ContentEditorForm::new(Arc::clone(&connection), context.read_only),
            frame: Frame::new(Arc::clone(&connection), options.window()),
            params: context.params.clone(),
            connection,
        }
    }

    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }
}

/// An extension rendered as a standalone dashboard.
#[derive(Clone)]
pub struct DashboardExtension {
    pub frame: Frame,
    pub params: Params,
    connection: Arc<dyn Connection>,
}

impl DashboardExtension {
    pub fn new(connection: Arc<dyn Connection>, context: &Context, options: &InitOptions) -> Self {
        Self {
            frame: Frame::new(Arc::clone(&connection), options.window()),
            params: context.params.clone(),
            connection,
        }
    }

    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }
}

impl fmt::Debug for ContentEditorExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentEditorExtension")
            .field("form", &self.form)
            .field("frame", &self.frame)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for DashboardExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DashboardExtension")
            .field("frame", &self.frame)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// The facade built for the host's context.
#[derive(Debug, Clone)]
pub enum Extension {
    ContentEditor(ContentEditorExtension),
    Dashboard(DashboardExtension),
}

impl Extension {
    pub fn category(&self) -> ExtensionCategory {
        match self {
            Self::ContentEditor(_) => ExtensionCategory::ContentEditor,
            Self::Dashboard(_) => ExtensionCategory::Dashboard,
        }
    }

    pub fn frame(&self) -> &Frame {
        match self {
            Self::ContentEditor(extension) => &extension.frame,
            Self::Dashboard(extension) => &extension.frame,
        }
    }

    pub fn params(&self) -> &Params {
        match self {
            Self::ContentEditor(extension) => &extension.params,
            Self::Dashboard(extension) => &extension.params,
        }
    }

    pub fn into_content_editor(self) -> Option<ContentEditorExtension> {
        match self {
            Self::ContentEditor(extension) => Some(extension),
            _ => None,
        }
    }

    pub fn into_dashboard(self) -> Option<DashboardExtension> {
        match self {
            Self::Dashboard(extension) => Some(extension),
            _ => None,
        }
    }
}

/// Build the facade named by `context`.
pub fn extension_factory(
    context: &Context,
    connection: Arc<dyn Connection>,
    options: &InitOptions,
) -> Result<Extension> {
    let extension = match context.category()? {
        ExtensionCategory::ContentEditor => Extension::ContentEditor(
            ContentEditorExtension::new(connection, context, options),
        ),
        ExtensionCategory::Dashboard => {
            Extension::Dashboard(DashboardExtension::new(connection, context, options))
        }
    };
    Ok(extension)
}
