//! Configuration for errdoc (errdoc.toml)

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Prefix that marks a constant as an error code
pub const DEFAULT_PREFIX: &str = "ErrCode";

/// Extraction settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Constant name prefix of error codes
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Documentation lines starting with one of these are dropped
    #[serde(default = "default_directive_markers")]
    pub directive_markers: Vec<String>,
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_directive_markers() -> Vec<String> {
    vec!["go:generate".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            directive_markers: default_directive_markers(),
        }
    }
}

impl Config {
    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        Self::parse(&content)
    }

    /// Parse a configuration from TOML
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.prefix.is_empty() {
            return Err(ConfigError::Validation("prefix must not be empty".to_string()));
        }
        Ok(())
    }

    /// Whether a constant name denotes an error code
    pub fn qualifies(&self, name: &str) -> bool {
        name.starts_with(&self.prefix)
    }
}

/// Configuration errors
#[derive(Debug, Clone, Error, miette::Diagnostic)]
pub enum ConfigError {
    #[error("could not read config {path}: {message}")]
    #[diagnostic(code(errdoc::config::io))]
    Io { path: String, message: String },

    #[error("invalid config: {0}")]
    #[diagnostic(code(errdoc::config::parse))]
    Parse(String),

    #[error("could not serialize config: {0}")]
    #[diagnostic(code(errdoc::config::serialize))]
    Serialize(String),

    #[error("invalid config: {0}")]
    #[diagnostic(code(errdoc::config::validation))]
    Validation(String),
}
