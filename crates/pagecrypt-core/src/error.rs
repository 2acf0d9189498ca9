//! Error types for the document layer.

use thiserror::Error;

/// Errors that can occur while turning markup into a [`Document`](crate::Document).
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("document too large: {size} bytes exceeds limit of {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("parser produced no document node")]
    MissingDocumentNode,
}

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, DocumentError>;
