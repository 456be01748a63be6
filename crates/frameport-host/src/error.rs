use frameport_channel::ChannelError;

/// Errors that can occur in the simulated host.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The schema file could not be loaded.
    #[error("failed to load schema: {0}")]
    LoadFailed(String),

    /// The schema could not be compiled.
    #[error("failed to compile schema: {0}")]
    CompileFailed(String),

    /// The schema or a model is not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Host-initiated request failed.
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// The extension answered a height request with something other than a
    /// non-negative integer.
    #[error("extension reported an invalid height: {0}")]
    InvalidHeight(serde_json::Value),
}

pub type Result<T> = std::result::Result<T, HostError>;
