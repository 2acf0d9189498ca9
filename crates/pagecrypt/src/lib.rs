//! # pagecrypt
//!
//! Seal the subscriber-only sections of an HTML document so that only the
//! holder of a recipient's private key can read them.
//!
//! ## Overview
//!
//! Sealing a document:
//!
//! - finds every `<section subscriptions-section="content" encrypted>` in the body
//! - encrypts each section's inner markup under one fresh AES-GCM key
//! - wraps that key, with the access requirement, for the recipient's public keyset
//! - appends the wrapped key to the head as a `cryptokeys` script
//!
//! Everything outside the protected sections is left readable.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pagecrypt::{SealConfig, Sealer};
//!
//! async fn example(html: &str) -> pagecrypt::Result<String> {
//!     let sealer = Sealer::with_http(SealConfig::default())?;
//!     let sealed = sealer
//!         .seal(html, "https://news.google.com/swg/encryption/keys/prod/tink/public_key", "norcal.com:premium")
//!         .await?;
//!     Ok(sealed.html)
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `pagecrypt::core` - Document tree, serializer, section locator
//! - `pagecrypt::keys` - Keysets, AEAD, hybrid encryption
//! - `pagecrypt::fetch` - Recipient keyset retrieval

pub mod assembler;
pub mod config;
pub mod encryptor;
pub mod error;
pub mod pipeline;
pub mod wrapper;

pub use pagecrypt_core as core;
pub use pagecrypt_fetch as fetch;
pub use pagecrypt_keys as keys;

pub use assembler::embed_key;
pub use config::{SealConfig, DEFAULT_RECIPIENT_ID};
pub use encryptor::encrypt_sections;
pub use error::{Result, SealError};
pub use pipeline::{generate_encrypted_document, SealedDocument, Sealer};
pub use wrapper::wrap_key;
