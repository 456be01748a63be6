use std::fmt;
use std::io;

use frameport_channel::{ChannelError, ParseTimeoutError};
use frameport_host::HostError;
use frameport_sdk::SdkError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => USAGE,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn timeout_arg_error(flag: &str, err: ParseTimeoutError) -> CliError {
    CliError::new(USAGE, format!("{flag}: {err}"))
}

pub fn json_error(context: &str, err: serde_json::Error) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

pub fn channel_error(context: &str, err: ChannelError) -> CliError {
    let code = match err {
        ChannelError::Timeout(_) => TIMEOUT,
        ChannelError::Rejected(_) | ChannelError::Disconnected | ChannelError::Unanswered(_) => {
            FAILURE
        }
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn sdk_error(context: &str, err: SdkError) -> CliError {
    match err {
        SdkError::Channel(err) => channel_error(context, err),
        SdkError::HandshakeTimeout => CliError::new(TIMEOUT, format!("{context}: {err}")),
        SdkError::InvalidArgument(_) => CliError::new(USAGE, format!("{context}: {err}")),
        SdkError::InvalidContext(_) | SdkError::UnsupportedExtension(_) | SdkError::Json(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        SdkError::ContextUnavailable | SdkError::NoModel => {
            CliError::new(FAILURE, format!("{context}: {err}"))
        }
    }
}

pub fn host_error(context: &str, err: HostError) -> CliError {
    match err {
        HostError::Channel(err) => channel_error(context, err),
        HostError::LoadFailed(_) => CliError::new(USAGE, format!("{context}: {err}")),
        HostError::CompileFailed(_) | HostError::InvalidJson(_) | HostError::InvalidHeight(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}
