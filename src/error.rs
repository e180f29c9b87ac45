//! Application error types.

use thiserror::Error;

/// Errors surfaced by docrepo.
///
/// Store failures are propagated unchanged; the repository layer never
/// retries or suppresses them.
#[derive(Error, Debug)]
pub enum AppError {
    // Store errors
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {message}")]
    Query { message: String, query: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Duplicate document id in '{collection}': {detail}")]
    DuplicateId { collection: String, detail: String },

    // Repository errors
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Expected at most one document in '{collection}', found several matching {filter}")]
    MultipleResults { collection: String, filter: String },

    #[error("Invalid document id '{value}': {reason}")]
    InvalidId { value: String, reason: String },

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl AppError {
    /// True for failures of the link to the store.
    pub fn is_connection(&self) -> bool {
        matches!(self, AppError::Connection(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}
