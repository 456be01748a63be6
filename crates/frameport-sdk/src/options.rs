use std::fmt;
use std::sync::Arc;

use frameport_channel::{ConnectionConfig, Timeout};

use crate::window::{DetachedWindow, Window};

/// Options accepted by [`init`](crate::init).
///
/// Every field is optional; the defaults enforce no timeouts, keep logging
/// quiet and measure against a detached window.
#[derive(Clone, Default)]
pub struct InitOptions {
    /// Document to measure against instead of the default.
    pub window: Option<Arc<dyn Window>>,
    /// Bound on the handshake wait.
    pub connection_timeout: Timeout,
    /// Default bound for requests issued after the handshake.
    pub timeout: Timeout,
    /// Log channel traffic.
    pub debug: bool,
}

impl InitOptions {
    pub fn with_window(mut self, window: Arc<dyn Window>) -> Self {
        self.window = Some(window);
        self
    }

    pub fn with_connection_timeout(mut self, timeout: impl Into<Timeout>) -> Self {
        self.connection_timeout = timeout.into();
        self
    }

    pub fn with_timeout(mut self, timeout: impl Into<Timeout>) -> Self {
        self.timeout = timeout.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// The configuration handed to the transport when it is opened.
    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            connection_timeout: self.connection_timeout,
            timeout: self.timeout,
            debug: self.debug,
        }
    }

    /// The window to measure, falling back to a detached one.
    pub fn window(&self) -> Arc<dyn Window> {
        self.window
            .clone()
            .unwrap_or_else(|| Arc::new(DetachedWindow))
    }
}

impl fmt::Debug for InitOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitOptions")
            .field("window", &self.window.as_ref().map(|_| "<custom>"))
            .field("connection_timeout", &self.connection_timeout)
            .field("timeout", &self.timeout)
            .field("debug", &self.debug)
            .finish()
    }
}
