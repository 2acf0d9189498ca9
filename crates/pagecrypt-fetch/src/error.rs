//! Error types for keyset retrieval.

use thiserror::Error;

/// Errors that can occur while fetching a recipient keyset.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be sent or the response could not be read.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request did not complete within the configured timeout.
    #[error("timed out fetching {url}")]
    Timeout { url: String },

    /// The key source answered with a non-success status.
    #[error("key source returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// The body exceeded the configured size cap.
    #[error("keyset response exceeds {limit} bytes")]
    TooLarge { limit: usize },

    /// The body is not a usable public keyset.
    #[error("invalid keyset: {0}")]
    InvalidKeyset(#[from] pagecrypt_keys::KeysError),

    /// The fetcher could not be constructed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;
