//! Client SDK for extensions embedded in a host application frame.
//!
//! An extension calls [`sdk::init`] with a channel to its host, waits for the
//! handshake, and receives a facade matching the context the host reports:
//! a content editor (form plus frame) or a dashboard (frame only).
//!
//! # Crate Structure
//!
//! - [`channel`]: message channel contract, event names and the in-process transport
//! - [`sdk`]: bootstrapper and extension facades
//! - [`host`]: simulated host application (behind the `host` feature)

/// Re-export channel types.
pub mod channel {
    pub use frameport_channel::*;
}

/// Re-export SDK types.
pub mod sdk {
    pub use frameport_sdk::*;
}

/// Re-export simulated host types (requires `host` feature).
#[cfg(feature = "host")]
pub mod host {
    pub use frameport_host::*;
}

pub use frameport_sdk::{init, Extension, InitOptions, Result, SdkError};
