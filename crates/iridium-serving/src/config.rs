//! Configuration for the serving facade.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration for the serving facade.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServingConfig {
    /// Directory the filesystem blob store roots itself in.
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,

    /// Version served when a request names none (default: "default").
    #[serde(default = "default_version")]
    pub default_version: String,

    /// Whether to persist a placeholder model for the default version at
    /// startup when none exists.
    #[serde(default = "default_bootstrap_default")]
    pub bootstrap_default: bool,

    /// Input width of the bootstrapped placeholder model (default: 10).
    #[serde(default = "default_feature_dim")]
    pub feature_dim: usize,

    /// Output width of the bootstrapped placeholder model (default: 1).
    #[serde(default = "default_output_dim")]
    pub output_dim: usize,
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("./models")
}

fn default_version() -> String {
    "default".to_string()
}

fn default_bootstrap_default() -> bool {
    true
}

fn default_feature_dim() -> usize {
    10
}

fn default_output_dim() -> usize {
    1
}

/// Errors that can occur while loading or validating serving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid default version: {0}")]
    InvalidDefaultVersion(String),

    #[error("model_dir must not be empty")]
    InvalidModelDir,

    #[error("feature_dim must be greater than 0")]
    InvalidFeatureDim,

    #[error("output_dim must be greater than 0")]
    InvalidOutputDim,
}

impl Default for ServingConfig {
    fn default() -> Self {
        Self {
            model_dir: default_model_dir(),
            default_version: default_version(),
            bootstrap_default: default_bootstrap_default(),
            feature_dim: default_feature_dim(),
            output_dim: default_output_dim(),
        }
    }
}

impl ServingConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns `ConfigError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidModelDir);
        }
        iridium_models::validate_version(&self.default_version)
            .map_err(|e| ConfigError::InvalidDefaultVersion(e.to_string()))?;
        if self.feature_dim == 0 {
            return Err(ConfigError::InvalidFeatureDim);
        }
        if self.output_dim == 0 {
            return Err(ConfigError::InvalidOutputDim);
        }
        Ok(())
    }

    /// Parses a configuration from TOML text, applying field defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        config.validate()?;
        Ok(config)
    }
}
