//! Error types for connector operations
//!
//! Every error here aborts the current listing call. Row-level problems never
//! reach this layer; they stay in the graph's diagnostics.

use tabular_graph::GraphError;
use thiserror::Error;

use crate::config::ConfigError;

/// Connector error types.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The record set could not be loaded at all.
    #[error("failed to load records from {source_name}: {message}")]
    Load {
        /// Label of the record source.
        source_name: String,
        /// Loader error message.
        message: String,
    },

    /// Building the graph or paginating failed.
    #[error("{operation}: {source}")]
    Graph {
        /// Connector operation that failed.
        operation: &'static str,
        /// Underlying graph error.
        source: GraphError,
    },

    /// Configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No resource type with this id exists in the current record set.
    #[error("unknown resource type: {0}")]
    UnknownResourceType(String),
}

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;

impl ConnectorError {
    /// Create a load error.
    pub fn load(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        ConnectorError::Load {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Wrap a graph error with the operation that hit it.
    pub fn graph(operation: &'static str, source: GraphError) -> Self {
        ConnectorError::Graph { operation, source }
    }

    /// The underlying graph error, if any.
    pub fn graph_error(&self) -> Option<&GraphError> {
        match self {
            ConnectorError::Graph { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Whether the caller sent a bad request rather than the source being
    /// unusable.
    pub fn is_request_error(&self) -> bool {
        match self {
            ConnectorError::Graph { source, .. } => source.is_request_error(),
            ConnectorError::UnknownResourceType(_) => true,
            ConnectorError::Load { .. } | ConnectorError::Config(_) => false,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConnectorError::Load { .. } => "LOAD_FAILED",
            ConnectorError::Graph { source, .. } => source.error_code(),
            ConnectorError::Config(_) => "CONFIG_ERROR",
            ConnectorError::UnknownResourceType(_) => "UNKNOWN_RESOURCE_TYPE",
        }
    }
}
