//! Authenticated encryption.
//!
//! [`ContentCipher`] is the narrow seam the section encryptor depends on.
//! [`TinkAesGcm`] implements it with Tink's AES-GCM wire format:
//! `output_prefix || iv (12) || ciphertext || tag (16)`.

use aes_gcm::{Aes128Gcm, Aes256Gcm};
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::ChaCha20Poly1305;
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroizing;

use crate::error::{KeysError, Result};

/// Size of every nonce used here.
pub const NONCE_LEN: usize = 12;

/// Size of the authentication tag appended by every cipher used here.
pub const TAG_LEN: usize = 16;

/// Seals content bytes under a symmetric key, without associated data.
pub trait ContentCipher {
    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>>;
}

/// The raw AEAD algorithms this crate drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AeadAlgorithm {
    Aes128Gcm,
    Aes256Gcm,
    ChaCha20Poly1305,
}

impl AeadAlgorithm {
    /// Pick the AES-GCM variant for a key length in bytes.
    pub fn aes_gcm_for_key_len(len: usize) -> Result<Self> {
        match len {
            16 => Ok(Self::Aes128Gcm),
            32 => Ok(Self::Aes256Gcm),
            n => Err(KeysError::UnsupportedKey(format!(
                "AES-GCM key must be 16 or 32 bytes, got {n}"
            ))),
        }
    }

    pub const fn key_len(self) -> usize {
        match self {
            Self::Aes128Gcm => 16,
            Self::Aes256Gcm | Self::ChaCha20Poly1305 => 32,
        }
    }

    /// Encrypt with an explicit nonce and empty associated data.
    pub fn seal(self, key: &[u8], nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
        let sealed = match self {
            Self::Aes128Gcm => Aes128Gcm::new_from_slice(key)
                .map_err(|e| KeysError::Encryption(e.to_string()))?
                .encrypt(nonce.into(), plaintext),
            Self::Aes256Gcm => Aes256Gcm::new_from_slice(key)
                .map_err(|e| KeysError::Encryption(e.to_string()))?
                .encrypt(nonce.into(), plaintext),
            Self::ChaCha20Poly1305 => ChaCha20Poly1305::new_from_slice(key)
                .map_err(|e| KeysError::Encryption(e.to_string()))?
                .encrypt(nonce.into(), plaintext),
        };
        sealed.map_err(|e| KeysError::Encryption(format!("{self:?}: {e}")))
    }

    /// Decrypt with an explicit nonce and empty associated data.
    pub fn open(self, key: &[u8], nonce: &[u8; NONCE_LEN], ciphertext: &[u8]) -> Result<Vec<u8>> {
        let opened = match self {
            Self::Aes128Gcm => Aes128Gcm::new_from_slice(key)
                .map_err(|e| KeysError::Decryption(e.to_string()))?
                .decrypt(nonce.into(), ciphertext),
            Self::Aes256Gcm => Aes256Gcm::new_from_slice(key)
                .map_err(|e| KeysError::Decryption(e.to_string()))?
                .decrypt(nonce.into(), ciphertext),
            Self::ChaCha20Poly1305 => ChaCha20Poly1305::new_from_slice(key)
                .map_err(|e| KeysError::Decryption(e.to_string()))?
                .decrypt(nonce.into(), ciphertext),
        };
        opened.map_err(|e| KeysError::Decryption(format!("{self:?}: {e}")))
    }
}

/// Fresh random nonce from the OS.
pub fn random_nonce() -> Result<[u8; NONCE_LEN]> {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|e| KeysError::Encryption(format!("nonce generation failed: {e}")))?;
    Ok(nonce)
}

/// Split `iv || sealed` as produced by the random-IV ciphers here.
pub fn split_nonce(data: &[u8]) -> Result<([u8; NONCE_LEN], &[u8])> {
    if data.len() < NONCE_LEN + TAG_LEN {
        return Err(KeysError::Decryption(format!(
            "ciphertext too short: {} bytes",
            data.len()
        )));
    }
    let (nonce, rest) = data.split_at(NONCE_LEN);
    let mut out = [0u8; NONCE_LEN];
    out.copy_from_slice(nonce);
    Ok((out, rest))
}

/// AES-GCM with a Tink output prefix and a random 96-bit IV per message.
pub struct TinkAesGcm {
    algorithm: AeadAlgorithm,
    key: Zeroizing<Vec<u8>>,
    prefix: Vec<u8>,
}

impl TinkAesGcm {
    /// Build from raw key bytes (16 or 32) and the key's output prefix.
    pub fn new(key: &[u8], prefix: Vec<u8>) -> Result<Self> {
        Ok(Self {
            algorithm: AeadAlgorithm::aes_gcm_for_key_len(key.len())?,
            key: Zeroizing::new(key.to_vec()),
            prefix,
        })
    }

    /// The bytes every ciphertext from this cipher starts with.
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// Decrypt a ciphertext produced by [`ContentCipher::seal`].
    pub fn open(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let body = ciphertext
            .strip_prefix(self.prefix.as_slice())
            .ok_or_else(|| KeysError::Decryption("ciphertext prefix mismatch".to_string()))?;
        let (nonce, sealed) = split_nonce(body)?;
        self.algorithm.open(&self.key, &nonce, sealed)
    }
}

impl ContentCipher for TinkAesGcm {
    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let nonce = random_nonce()?;
        let sealed = self.algorithm.seal(&self.key, &nonce, plaintext)?;

        let mut out = Vec::with_capacity(self.prefix.len() + NONCE_LEN + sealed.len());
        out.extend_from_slice(&self.prefix);
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);
        Ok(out)
    }
}
