//! Error types for key handling.

use thiserror::Error;

/// Errors that can occur while generating, encoding, or using keys.
#[derive(Debug, Error)]
pub enum KeysError {
    /// The random source failed.
    #[error("key generation error: {0}")]
    KeyGeneration(String),

    /// Encryption error.
    #[error("encryption error: {0}")]
    Encryption(String),

    /// Decryption error.
    #[error("decryption error: {0}")]
    Decryption(String),

    /// A keyset could not be decoded or is structurally invalid.
    #[error("invalid keyset: {0}")]
    InvalidKeyset(String),

    /// A keyset that must be public-only carries secret material.
    #[error("keyset entry {key_id} carries non-public key material ({material})")]
    SecretKeyMaterial { key_id: u32, material: &'static str },

    /// Key type or parameters this crate cannot use.
    #[error("unsupported key: {0}")]
    UnsupportedKey(String),
}

/// Result type for key operations.
pub type Result<T> = std::result::Result<T, KeysError>;
