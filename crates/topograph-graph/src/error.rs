//! Error types for topology queries.

use thiserror::Error;

/// Main error type for engine operations.
#[derive(Error, Debug)]
pub enum TopologyError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Graph backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),
}

/// Result type for engine operations.
pub type TopologyResult<T> = Result<T, TopologyError>;

impl TopologyError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a malformed record error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedRecord(msg.into())
    }
}

impl From<neo4rs::Error> for TopologyError {
    fn from(err: neo4rs::Error) -> Self {
        Self::BackendUnavailable(err.to_string())
    }
}
