//! Simulated host application.
//!
//! Serves the frameport protocol over the host half of an in-process channel
//! the way a real hosting application would: hands out the extension context,
//! owns the authoritative content model, validates candidate models against a
//! JSON Schema and pushes state changes back into the frame.

pub mod error;
pub mod host;
pub mod validator;

pub use error::{HostError, Result};
pub use host::{HostHandle, HostReport, Notification, SimulatedHost};
pub use validator::{ModelValidator, ValidatorConfig};
