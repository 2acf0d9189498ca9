//! The per-document symmetric key.
//!
//! Every sealed document gets exactly one AES-GCM key. It is serialized as a
//! single-entry Tink keyset so that any Tink runtime holding the unwrapped
//! key can read the section ciphertexts.

use std::fmt;

use prost::Message;
use rand::{rngs::OsRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::aead::TinkAesGcm;
use crate::error::{KeysError, Result};
use crate::proto::{
    AesGcmKey, Key, KeyData, KeyMaterialType, KeyStatusType, Keyset, OutputPrefixType,
};

/// Tink type URL of an AES-GCM key.
pub const AES_GCM_TYPE_URL: &str = "type.googleapis.com/google.crypto.tink.AesGcmKey";

/// Size of a freshly generated document key, in bytes (AES-128).
pub const AES_GCM_KEY_SIZE: usize = 16;

/// Key id of the single entry in a document keyset.
pub const DOCUMENT_KEY_ID: u32 = 1;

/// A symmetric AES-GCM key plus the keyset metadata needed to export it.
///
/// Key bytes are wiped when the bundle is dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKeyBundle {
    key_id: u32,
    key: Vec<u8>,
}

impl SymmetricKeyBundle {
    /// Generate a fresh key from the OS random source.
    pub fn generate() -> Result<Self> {
        let mut key = vec![0u8; AES_GCM_KEY_SIZE];
        OsRng
            .try_fill_bytes(&mut key)
            .map_err(|e| KeysError::KeyGeneration(e.to_string()))?;

        Ok(Self {
            key_id: DOCUMENT_KEY_ID,
            key,
        })
    }

    /// Wrap existing key bytes (16 or 32).
    pub fn from_key_bytes(key: &[u8]) -> Result<Self> {
        if key.len() != 16 && key.len() != 32 {
            return Err(KeysError::UnsupportedKey(format!(
                "AES-GCM key must be 16 or 32 bytes, got {}",
                key.len()
            )));
        }
        Ok(Self {
            key_id: DOCUMENT_KEY_ID,
            key: key.to_vec(),
        })
    }

    pub fn key_id(&self) -> u32 {
        self.key_id
    }

    /// Raw key bytes.
    pub fn key_bytes(&self) -> &[u8] {
        &self.key
    }

    /// The AEAD primitive for this key, using the Tink output prefix.
    pub fn cipher(&self) -> Result<TinkAesGcm> {
        TinkAesGcm::new(&self.key, OutputPrefixType::Tink.prefix(self.key_id)?)
    }

    /// The keyset message: one enabled AES-GCM key, which is also primary.
    pub fn to_keyset(&self) -> Keyset {
        let key = AesGcmKey {
            version: 0,
            key_value: self.key.clone(),
        };
        Keyset {
            primary_key_id: self.key_id,
            key: vec![Key {
                key_data: Some(KeyData {
                    type_url: AES_GCM_TYPE_URL.to_string(),
                    value: key.encode_to_vec(),
                    key_material_type: KeyMaterialType::Symmetric as i32,
                }),
                status: KeyStatusType::Enabled as i32,
                key_id: self.key_id,
                output_prefix_type: OutputPrefixType::Tink as i32,
            }],
        }
    }

    /// Binary (protobuf) keyset encoding.
    pub fn to_keyset_bytes(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.to_keyset().encode_to_vec())
    }

    /// Decode a keyset written by [`Self::to_keyset_bytes`].
    pub fn from_keyset_bytes(bytes: &[u8]) -> Result<Self> {
        let keyset =
            Keyset::decode(bytes).map_err(|e| KeysError::InvalidKeyset(e.to_string()))?;
        let primary = keyset.primary()?;

        if primary.status() != KeyStatusType::Enabled {
            return Err(KeysError::InvalidKeyset(format!(
                "primary key {} is not enabled",
                primary.key_id
            )));
        }
        if primary.output_prefix_type() != OutputPrefixType::Tink {
            return Err(KeysError::UnsupportedKey(format!(
                "output prefix {} is not supported for document keys",
                primary.output_prefix_type().json_name()
            )));
        }

        let data = primary
            .key_data
            .as_ref()
            .ok_or_else(|| KeysError::InvalidKeyset("primary key has no key data".to_string()))?;
        if data.type_url != AES_GCM_TYPE_URL {
            return Err(KeysError::UnsupportedKey(data.type_url.clone()));
        }

        let key = Zeroizing::new(
            AesGcmKey::decode(data.value.as_slice())
                .map_err(|e| KeysError::InvalidKeyset(e.to_string()))?
                .key_value,
        );
        let mut bundle = Self::from_key_bytes(&key)?;
        bundle.key_id = primary.key_id;
        Ok(bundle)
    }
}

impl PartialEq for SymmetricKeyBundle {
    fn eq(&self, other: &Self) -> bool {
        self.key_id == other.key_id && self.key == other.key
    }
}

impl Eq for SymmetricKeyBundle {}

impl fmt::Debug for SymmetricKeyBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymmetricKeyBundle")
            .field("key_id", &self.key_id)
            .field("key", &"<redacted>")
            .finish()
    }
}
