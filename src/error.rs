// file: src/error.rs
// description: adapter error taxonomy and result type alias
// reference: https://docs.rs/thiserror

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdapterError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdapterError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Query execution failed: {0}")]
    QueryExecution(String),

    #[error("Query exceeded the {0} ms time budget")]
    QueryTimeout(u64),

    #[error("Document not found in index: {0}")]
    DocumentNotFound(String),

    #[error("Content unavailable for {path}: {reason}")]
    ContentUnavailable { path: String, reason: String },

    /// The session no longer matches the on-disk index. Consumed by the
    /// gateway's reopen policy; callers only see it as `IndexUnavailable`.
    #[error("Index session is stale: {0}")]
    StaleSession(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failure kinds reported to the calling agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidRequest,
    InvalidQuery,
    IndexUnavailable,
    QueryExecutionError,
    QueryTimeout,
    DocumentNotFound,
    ContentUnavailable,
}

impl AdapterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::InvalidQuery(_) => ErrorKind::InvalidQuery,
            Self::IndexUnavailable(_) | Self::StaleSession(_) | Self::Config(_) => {
                ErrorKind::IndexUnavailable
            }
            Self::QueryExecution(_) => ErrorKind::QueryExecutionError,
            Self::QueryTimeout(_) => ErrorKind::QueryTimeout,
            Self::DocumentNotFound(_) => ErrorKind::DocumentNotFound,
            Self::ContentUnavailable { .. } => ErrorKind::ContentUnavailable,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleSession(_))
    }

    /// Converts a stale-session failure that survived the reopen into the
    /// outward-facing `IndexUnavailable`.
    pub fn settle_stale(self) -> Self {
        match self {
            Self::StaleSession(reason) => {
                Self::IndexUnavailable(format!("index changed underneath the session twice: {reason}"))
            }
            other => other,
        }
    }
}
