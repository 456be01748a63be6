use std::fmt;
use std::sync::Arc;

use frameport_channel::events::frame;
use frameport_channel::{Connection, Responder};
use serde_json::{json, Value};

use crate::error::{Result, SdkError};
use crate::window::Window;

/// Controls the height of the frame the extension is rendered in.
#[derive(Clone)]
pub struct Frame {
    connection: Arc<dyn Connection>,
    window: Arc<dyn Window>,
}

impl Frame {
    /// Create the controller and answer the host's height requests.
    pub fn new(connection: Arc<dyn Connection>, window: Arc<dyn Window>) -> Self {
        let measured = Arc::clone(&window);
        connection.on(
            frame::HEIGHT_GET,
            Arc::new(move |_: Value, responder: Responder| {
                responder.resolve(json!(measure(measured.as_ref())));
            }),
        );
        Self { connection, window }
    }

    /// Height of the extension's body, or 0 without a body.
    pub fn get_height(&self) -> u32 {
        measure(self.window.as_ref())
    }

    /// Ask the host to resize the frame.
    ///
    /// `None` uses the measured height. Negative heights are clamped to 0.
    pub fn set_height(&self, height: Option<f64>) -> Result<()> {
        let height = match height {
            None => f64::from(self.get_height()),
            Some(height) if !height.is_finite() => {
                return Err(SdkError::InvalidArgument(format!(
                    "set_height() only accepts a finite number, got {height}"
                )));
            }
            Some(height) => height.max(0.0),
        };

        self.connection
            .emit(frame::HEIGHT_SET, Some(height_payload(height)));
        Ok(())
    }

    /// [`set_height`](Self::set_height) for dynamically typed input.
    ///
    /// `null` uses the measured height; anything other than a number is
    /// rejected without emitting.
    pub fn set_height_value(&self, height: &Value) -> Result<()> {
        match height {
            Value::Null => self.set_height(None),
            Value::Number(number) => self.set_height(number.as_f64()),
            other => Err(SdkError::InvalidArgument(format!(
                "set_height() only accepts an optional number argument, got {other}"
            ))),
        }
    }

    pub fn start_auto_resizer(&self) {
        self.connection.emit(frame::AUTO_RESIZER_START, None);
    }

    pub fn stop_auto_resizer(&self) {
        self.connection.emit(frame::AUTO_RESIZER_STOP, None);
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("height", &self.get_height())
            .finish()
    }
}

fn measure(window: &dyn Window) -> u32 {
    window.body_height().unwrap_or(0)
}

// Whole pixel counts go out as integers.
fn height_payload(height: f64) -> Value {
    if height.fract() == 0.0 && height <= u64::MAX as f64 {
        json!(height as u64)
    } else {
        json!(height)
    }
}
