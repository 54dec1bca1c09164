//! Error types for configuration loading and validation.

use thiserror::Error;

/// Errors raised while loading or validating a [`GenerationConfig`](crate::GenerationConfig).
///
/// All of these are startup errors; nothing in this crate is checked mid-run.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error reading config file
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A value is present but inconsistent with the rest of the configuration
    #[error("Invalid configuration for '{field}': {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
