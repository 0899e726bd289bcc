//! Connector configuration.
//!
//! Configuration is loaded from environment variables. Unset or unparsable
//! values fall back to the defaults.

use serde::{Deserialize, Serialize};
use tabular_graph::DEFAULT_PAGE_SIZE;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Connector configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectorConfig {
    /// Connector display name reported in metadata.
    pub display_name: String,

    /// Connector description reported in metadata.
    pub description: String,

    /// Items per listing page.
    pub page_size: usize,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            display_name: "File Connector".to_string(),
            description: "Connector that processes data from a local file".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ConnectorConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `TABULAR_DISPLAY_NAME`: Metadata display name (default: File Connector)
    /// - `TABULAR_DESCRIPTION`: Metadata description
    /// - `TABULAR_PAGE_SIZE`: Items per page (default: 50)
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            display_name: std::env::var("TABULAR_DISPLAY_NAME").unwrap_or(default.display_name),
            description: std::env::var("TABULAR_DESCRIPTION").unwrap_or(default.description),
            page_size: std::env::var("TABULAR_PAGE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.page_size),
        }
    }

    /// Set the page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Check the configuration before use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "TABULAR_PAGE_SIZE".to_string(),
                message: "page size must be greater than zero".to_string(),
            });
        }
        if self.display_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "TABULAR_DISPLAY_NAME".to_string(),
                message: "display name cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}
