//! Ledger configuration loaded from TOML.

use crate::registry::{DEFAULT_PAGE_SIZE, DeployPolicy};
use crate::types::Identity;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Configuration for a [`crate::Ledger`].
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Handles returned per registry page.
    #[serde(default = "default_page_size")]
    page_size: usize,

    /// Identities that may deploy games they are not playing in.
    #[serde(default)]
    allowed_deployers: Vec<Identity>,
}

#[instrument]
fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            allowed_deployers: Vec::new(),
        }
    }
}

impl LedgerConfig {
    /// Creates a configuration.
    pub fn new(page_size: usize, allowed_deployers: Vec<Identity>) -> Self {
        Self {
            page_size,
            allowed_deployers,
        }
    }

    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        if config.page_size == 0 {
            return Err(ConfigError::new("page_size must be at least 1".to_string()));
        }

        info!(
            page_size = config.page_size,
            allowed_deployers = config.allowed_deployers.len(),
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Deployment policy described by this configuration.
    pub fn deploy_policy(&self) -> DeployPolicy {
        DeployPolicy::with_allowed(self.allowed_deployers.iter().cloned())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
