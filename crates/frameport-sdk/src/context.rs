use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SdkError};

/// Facade kinds the host can ask for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtensionCategory {
    ContentEditor,
    Dashboard,
}

impl ExtensionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContentEditor => "CONTENT_EDITOR",
            Self::Dashboard => "DASHBOARD",
        }
    }

    /// Map a wire discriminator to a known category.
    pub fn parse(category: &str) -> Result<Self> {
        match category {
            "CONTENT_EDITOR" => Ok(Self::ContentEditor),
            "DASHBOARD" => Ok(Self::Dashboard),
            other => Err(SdkError::UnsupportedExtension(other.to_string())),
        }
    }
}

impl fmt::Display for ExtensionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Installation and instance parameters configured in the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Params {
    #[serde(default)]
    pub installation: Map<String, Value>,
    #[serde(default)]
    pub instance: Map<String, Value>,
}

/// The one-shot payload fetched right after the handshake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    /// Facade discriminator, kept raw so unknown kinds surface as
    /// [`SdkError::UnsupportedExtension`] rather than a decode error.
    pub category: String,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub params: Params,
}

impl Context {
    /// Decode the host's context payload.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(SdkError::InvalidContext)
    }

    pub fn category(&self) -> Result<ExtensionCategory> {
        ExtensionCategory::parse(&self.category)
    }
}
