//! Error types for graph construction
//!
//! Only structural failures live here. Row-level data-quality problems never
//! abort a build; they are recorded as [`Diagnostic`](crate::diagnostics::Diagnostic)s instead.

use thiserror::Error;

/// Structural graph errors.
///
/// Any of these aborts the current call. They are never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Neither resource rows nor user rows produced a resource type.
    #[error("no resource types could be found in resource data, and no users found")]
    NoResourceTypes,

    /// User rows exist but the builtin `user` type was never registered.
    #[error("'user' resource type is not defined but user data exists")]
    MissingUserType,

    /// A page token could not be decoded.
    #[error("invalid page token: {0}")]
    InvalidPageToken(String),

    /// A continuation token could not be encoded.
    #[error("failed to encode page token: {0}")]
    PageTokenEncoding(String),
}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

impl GraphError {
    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            GraphError::NoResourceTypes => "NO_RESOURCE_TYPES",
            GraphError::MissingUserType => "MISSING_USER_TYPE",
            GraphError::InvalidPageToken(_) => "INVALID_PAGE_TOKEN",
            GraphError::PageTokenEncoding(_) => "PAGE_TOKEN_ENCODING",
        }
    }

    /// Whether the caller supplied bad input, as opposed to the record set
    /// being structurally unusable.
    pub fn is_request_error(&self) -> bool {
        matches!(self, GraphError::InvalidPageToken(_))
    }
}
