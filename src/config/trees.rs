//! Tree definition configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Where advisor trees are loaded from
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TreesConfig {
    /// YAML definitions file; the built-in trees are used when unset
    pub definitions_path: Option<PathBuf>,
}

impl TreesConfig {
    /// Validate tree configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.definitions_path {
            Some(path) if path.as_os_str().is_empty() => {
                Err(ValidationError::EmptyDefinitionsPath)
            }
            _ => Ok(()),
        }
    }
}
