use std::io::Read;
use std::path::Path;

use frameport_sdk::ErrorReport;
use jsonschema::Validator;
use serde_json::Value;

use crate::error::{HostError, Result};

/// Controls model validation behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Maximum number of error reports returned for one model.
    pub max_errors: usize,
    /// Maximum bytes accepted when loading a schema file.
    pub max_schema_file_size: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_errors: 32,
            max_schema_file_size: 256 * 1024,
        }
    }
}

/// Compiled JSON Schema for the host's content model.
pub struct ModelValidator {
    validator: Validator,
    config: ValidatorConfig,
}

impl ModelValidator {
    /// Compile a schema value with default config.
    pub fn from_schema(schema: &Value) -> Result<Self> {
        Self::with_config(schema, ValidatorConfig::default())
    }

    /// Compile a schema value with explicit config.
    pub fn with_config(schema: &Value, config: ValidatorConfig) -> Result<Self> {
        let validator = jsonschema::validator_for(schema)
            .map_err(|err| HostError::CompileFailed(err.to_string()))?;
        Ok(Self { validator, config })
    }

    /// Compile a schema from a JSON string.
    pub fn from_json(schema_json: &str) -> Result<Self> {
        let schema: Value = serde_json::from_str(schema_json)?;
        Self::from_schema(&schema)
    }

    /// Load and compile a schema file.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_file_with_config(path, ValidatorConfig::default())
    }

    /// Load and compile a schema file with explicit config.
    pub fn from_file_with_config(path: &Path, config: ValidatorConfig) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|err| HostError::LoadFailed(format!("{}: {err}", path.display())))?;

        let mut raw = Vec::new();
        let limit = u64::try_from(config.max_schema_file_size)
            .unwrap_or(u64::MAX)
            .saturating_add(1);
        file.take(limit)
            .read_to_end(&mut raw)
            .map_err(|err| HostError::LoadFailed(format!("{}: {err}", path.display())))?;
        if raw.len() > config.max_schema_file_size {
            return Err(HostError::LoadFailed(format!(
                "schema file exceeds configured max size ({} bytes): {}",
                config.max_schema_file_size,
                path.display()
            )));
        }

        let schema: Value = serde_json::from_slice(&raw)?;
        Self::with_config(&schema, config)
    }

    /// Validate `model`, one report per violation.
    ///
    /// Paths are JSON pointers into the model; the root is the empty string.
    pub fn validate(&self, model: &Value) -> Vec<ErrorReport> {
        self.validator
            .iter_errors(model)
            .take(self.config.max_errors)
            .map(|err| ErrorReport::new(err.instance_path().to_string(), err.to_string()))
            .collect()
    }

    pub fn is_valid(&self, model: &Value) -> bool {
        self.validator.is_valid(model)
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }
}

impl std::fmt::Debug for ModelValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelValidator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
