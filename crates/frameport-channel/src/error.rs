use std::time::Duration;

use serde_json::Value;

/// Errors that can occur on the messaging channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// No reply arrived within the request timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The other side answered with a rejection.
    #[error("request rejected: {0}")]
    Rejected(Value),

    /// The other side of the channel is gone.
    #[error("channel disconnected")]
    Disconnected,

    /// The request was delivered but nobody replied to it.
    #[error("no responder answered '{0}'")]
    Unanswered(String),
}

pub type Result<T> = std::result::Result<T, ChannelError>;
