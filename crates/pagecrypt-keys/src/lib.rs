//! # pagecrypt Keys
//!
//! Key material for pagecrypt, in formats a Tink runtime can read back.
//!
//! ## Key Types
//!
//! - [`SymmetricKeyBundle`] - The per-document AES-GCM key and its keyset encoding
//! - [`TinkAesGcm`] - AES-GCM with Tink's output prefix, behind [`ContentCipher`]
//! - [`RecipientPublicKeyBundle`] - A validated, public-only recipient keyset
//! - [`HybridEncrypt`] - Public-key encryption used to wrap document keys
//!
//! ## Wire formats
//!
//! All ciphertexts start with the producing key's output prefix. For
//! `TINK` keys that is `0x01 || key_id (u32 big-endian)`.
//!
//! ```rust
//! use pagecrypt_keys::{ContentCipher, SymmetricKeyBundle};
//!
//! let bundle = SymmetricKeyBundle::generate().unwrap();
//! let cipher = bundle.cipher().unwrap();
//!
//! let ciphertext = cipher.seal(b"<p>paid</p>").unwrap();
//! assert_eq!(&ciphertext[..5], &[0x01, 0, 0, 0, 1]);
//! assert_eq!(cipher.open(&ciphertext).unwrap(), b"<p>paid</p>");
//! ```

pub mod aead;
pub mod error;
pub mod hybrid;
pub mod keyset;
pub mod proto;
pub mod public_keyset;

pub use aead::{AeadAlgorithm, ContentCipher, TinkAesGcm, NONCE_LEN, TAG_LEN};
pub use error::{KeysError, Result};
pub use hybrid::{
    EciesP256Encrypt, HpkeX25519Encrypt, HybridEncrypt, ECIES_PUBLIC_KEY_TYPE_URL,
    HPKE_PUBLIC_KEY_TYPE_URL,
};
pub use keyset::{SymmetricKeyBundle, AES_GCM_KEY_SIZE, AES_GCM_TYPE_URL, DOCUMENT_KEY_ID};
pub use public_keyset::RecipientPublicKeyBundle;
