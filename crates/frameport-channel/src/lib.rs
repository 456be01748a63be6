//! Cross-document messaging contract for frameport.
//!
//! The SDK never talks to a concrete transport. Everything it needs from the
//! channel between an embedded frame and its host is captured by the
//! [`Connection`] trait defined here:
//! - named push/command handlers (`on`)
//! - fire-and-forget notifications (`emit`)
//! - request/response calls paired by event name (`request`)
//! - the `mc-connected` / `mc-connection-timeout` lifecycle signals
//!
//! [`memory_pair`] provides an in-process implementation with a host-side
//! [`HostEndpoint`], used by tests, demos and the CLI simulator.

pub mod config;
pub mod error;
pub mod events;
pub mod memory;
pub mod traits;

pub use config::{ConnectionConfig, ParseTimeoutError, RequestOptions, Timeout};
pub use error::{ChannelError, Result};
pub use memory::{
    memory_pair, HostEndpoint, HostMessage, HostPusher, IncomingRequest, MemoryConnection,
};
pub use traits::{Connection, Handler, Responder};
