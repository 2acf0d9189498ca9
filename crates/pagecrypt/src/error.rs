//! Error types for the sealing pipeline.

use pagecrypt_core::DocumentError;
use pagecrypt_fetch::FetchError;
use pagecrypt_keys::KeysError;
use thiserror::Error;

/// Errors that can occur while sealing a document. Each variant names the
/// stage that failed; no partial document is ever returned.
#[derive(Debug, Error)]
pub enum SealError {
    /// The input could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] DocumentError),

    /// The document key could not be generated.
    #[error("key generation error: {0}")]
    KeyGeneration(#[source] KeysError),

    /// A section could not be encrypted.
    #[error("encryption error: {0}")]
    Encryption(#[source] KeysError),

    /// The recipient keyset could not be retrieved.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// The document key could not be wrapped for the recipient.
    #[error("key wrap error: {0}")]
    Wrap(#[source] KeysError),

    /// The document lacks structure the output needs.
    #[error("structural error: {0}")]
    Structural(String),
}

impl SealError {
    /// Short name of the failed stage, for logs and metrics labels.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse",
            Self::KeyGeneration(_) => "key_generation",
            Self::Encryption(_) => "encryption",
            Self::Fetch(_) => "fetch",
            Self::Wrap(_) => "wrap",
            Self::Structural(_) => "structural",
        }
    }
}

/// Result type for sealing operations.
pub type Result<T> = std::result::Result<T, SealError>;
