use frameport_channel::ChannelError;

/// Errors surfaced to extension code.
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// The host never confirmed the connection within the connection timeout.
    #[error("failed to establish a connection to the host application")]
    HandshakeTimeout,

    /// The connection succeeded but the extension context could not be fetched.
    #[error("failed to fetch context for the extension")]
    ContextUnavailable,

    /// No content model is currently available from the host.
    #[error("unable to retrieve form model as form is not loaded")]
    NoModel,

    /// A caller passed an argument of the wrong shape.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The context payload could not be decoded.
    #[error("invalid extension context: {0}")]
    InvalidContext(#[source] serde_json::Error),

    /// The context names a facade kind this SDK does not provide.
    #[error("unsupported extension category '{0}'")]
    UnsupportedExtension(String),

    /// Channel failure, passed through unchanged.
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// A host reply did not have the expected shape.
    #[error("unexpected host reply: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SdkError>;
