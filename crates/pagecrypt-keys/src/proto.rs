//! Tink protobuf messages.
//!
//! Hand-declared `prost` mirrors of the subset of Tink's `tink.proto`,
//! `aes_gcm.proto`, `ecies_aead_hkdf.proto`, `hpke.proto` and `common.proto`
//! needed to write a symmetric keyset and read public hybrid keysets. Field
//! tags and enum values must match Tink exactly.

use prost::{Enumeration, Message};

use crate::error::{KeysError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// tink.proto
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum KeyStatusType {
    UnknownStatus = 0,
    Enabled = 1,
    Disabled = 2,
    Destroyed = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum OutputPrefixType {
    UnknownPrefix = 0,
    Tink = 1,
    Legacy = 2,
    Raw = 3,
    Crunchy = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum KeyMaterialType {
    UnknownKeymaterial = 0,
    Symmetric = 1,
    AsymmetricPrivate = 2,
    AsymmetricPublic = 3,
    Remote = 4,
}

#[derive(Clone, PartialEq, Message)]
pub struct KeyData {
    #[prost(string, tag = "1")]
    pub type_url: String,
    #[prost(bytes = "vec", tag = "2")]
    pub value: Vec<u8>,
    #[prost(enumeration = "KeyMaterialType", tag = "3")]
    pub key_material_type: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct Key {
    #[prost(message, optional, tag = "1")]
    pub key_data: Option<KeyData>,
    #[prost(enumeration = "KeyStatusType", tag = "2")]
    pub status: i32,
    #[prost(uint32, tag = "3")]
    pub key_id: u32,
    #[prost(enumeration = "OutputPrefixType", tag = "4")]
    pub output_prefix_type: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct Keyset {
    #[prost(uint32, tag = "1")]
    pub primary_key_id: u32,
    #[prost(message, repeated, tag = "2")]
    pub key: Vec<Key>,
}

impl Keyset {
    /// The entry whose id is `primary_key_id`.
    pub fn primary(&self) -> Result<&Key> {
        self.key
            .iter()
            .find(|k| k.key_id == self.primary_key_id)
            .ok_or_else(|| {
                KeysError::InvalidKeyset(format!(
                    "primary key {} not present in keyset",
                    self.primary_key_id
                ))
            })
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct KeyTemplate {
    #[prost(string, tag = "1")]
    pub type_url: String,
    #[prost(bytes = "vec", tag = "2")]
    pub value: Vec<u8>,
    #[prost(enumeration = "OutputPrefixType", tag = "3")]
    pub output_prefix_type: i32,
}

// ─────────────────────────────────────────────────────────────────────────────
// aes_gcm.proto
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct AesGcmKeyFormat {
    #[prost(uint32, tag = "2")]
    pub key_size: u32,
    #[prost(uint32, tag = "3")]
    pub version: u32,
}

#[derive(Clone, PartialEq, Message)]
pub struct AesGcmKey {
    #[prost(uint32, tag = "1")]
    pub version: u32,
    #[prost(bytes = "vec", tag = "3")]
    pub key_value: Vec<u8>,
}

// ─────────────────────────────────────────────────────────────────────────────
// common.proto + ecies_aead_hkdf.proto
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum EllipticCurveType {
    UnknownCurve = 0,
    NistP256 = 2,
    NistP384 = 3,
    NistP521 = 4,
    Curve25519 = 5,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum HashType {
    UnknownHash = 0,
    Sha1 = 1,
    Sha384 = 2,
    Sha256 = 3,
    Sha512 = 4,
    Sha224 = 5,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum EcPointFormat {
    UnknownFormat = 0,
    Uncompressed = 1,
    Compressed = 2,
    DoNotUseCrunchyUncompressed = 3,
}

#[derive(Clone, PartialEq, Message)]
pub struct EciesHkdfKemParams {
    #[prost(enumeration = "EllipticCurveType", tag = "1")]
    pub curve_type: i32,
    #[prost(enumeration = "HashType", tag = "2")]
    pub hkdf_hash_type: i32,
    #[prost(bytes = "vec", tag = "11")]
    pub hkdf_salt: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct EciesAeadDemParams {
    #[prost(message, optional, tag = "2")]
    pub aead_dem: Option<KeyTemplate>,
}

#[derive(Clone, PartialEq, Message)]
pub struct EciesAeadHkdfParams {
    #[prost(message, optional, tag = "1")]
    pub kem_params: Option<EciesHkdfKemParams>,
    #[prost(message, optional, tag = "2")]
    pub dem_params: Option<EciesAeadDemParams>,
    #[prost(enumeration = "EcPointFormat", tag = "3")]
    pub ec_point_format: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct EciesAeadHkdfPublicKey {
    #[prost(uint32, tag = "1")]
    pub version: u32,
    #[prost(message, optional, tag = "2")]
    pub params: Option<EciesAeadHkdfParams>,
    #[prost(bytes = "vec", tag = "3")]
    pub x: Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub y: Vec<u8>,
}

// ─────────────────────────────────────────────────────────────────────────────
// hpke.proto
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum HpkeKem {
    KemUnknown = 0,
    DhkemX25519HkdfSha256 = 1,
    DhkemP256HkdfSha256 = 2,
    DhkemP384HkdfSha384 = 3,
    DhkemP521HkdfSha512 = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum HpkeKdf {
    KdfUnknown = 0,
    HkdfSha256 = 1,
    HkdfSha384 = 2,
    HkdfSha512 = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum HpkeAead {
    AeadUnknown = 0,
    Aes128Gcm = 1,
    Aes256Gcm = 2,
    Chacha20Poly1305 = 3,
}

#[derive(Clone, PartialEq, Message)]
pub struct HpkeParams {
    #[prost(enumeration = "HpkeKem", tag = "1")]
    pub kem: i32,
    #[prost(enumeration = "HpkeKdf", tag = "2")]
    pub kdf: i32,
    #[prost(enumeration = "HpkeAead", tag = "3")]
    pub aead: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct HpkePublicKey {
    #[prost(uint32, tag = "1")]
    pub version: u32,
    #[prost(message, optional, tag = "2")]
    pub params: Option<HpkeParams>,
    #[prost(bytes = "vec", tag = "3")]
    pub public_key: Vec<u8>,
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON enum names and output prefixes
// ─────────────────────────────────────────────────────────────────────────────

impl KeyStatusType {
    pub fn json_name(self) -> &'static str {
        match self {
            Self::UnknownStatus => "UNKNOWN_STATUS",
            Self::Enabled => "ENABLED",
            Self::Disabled => "DISABLED",
            Self::Destroyed => "DESTROYED",
        }
    }

    pub fn from_json_name(name: &str) -> Option<Self> {
        [
            Self::UnknownStatus,
            Self::Enabled,
            Self::Disabled,
            Self::Destroyed,
        ]
        .into_iter()
        .find(|v| v.json_name() == name)
    }
}

impl OutputPrefixType {
    pub fn json_name(self) -> &'static str {
        match self {
            Self::UnknownPrefix => "UNKNOWN_PREFIX",
            Self::Tink => "TINK",
            Self::Legacy => "LEGACY",
            Self::Raw => "RAW",
            Self::Crunchy => "CRUNCHY",
        }
    }

    pub fn from_json_name(name: &str) -> Option<Self> {
        [
            Self::UnknownPrefix,
            Self::Tink,
            Self::Legacy,
            Self::Raw,
            Self::Crunchy,
        ]
        .into_iter()
        .find(|v| v.json_name() == name)
    }

    /// Bytes prepended to every ciphertext made with key `key_id`.
    pub fn prefix(self, key_id: u32) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(5);
        match self {
            Self::Tink => out.push(0x01),
            Self::Legacy | Self::Crunchy => out.push(0x00),
            Self::Raw => return Ok(out),
            Self::UnknownPrefix => {
                return Err(KeysError::InvalidKeyset(format!(
                    "key {key_id} has unknown output prefix type"
                )))
            }
        }
        out.extend_from_slice(&key_id.to_be_bytes());
        Ok(out)
    }
}

impl KeyMaterialType {
    pub fn json_name(self) -> &'static str {
        match self {
            Self::UnknownKeymaterial => "UNKNOWN_KEYMATERIAL",
            Self::Symmetric => "SYMMETRIC",
            Self::AsymmetricPrivate => "ASYMMETRIC_PRIVATE",
            Self::AsymmetricPublic => "ASYMMETRIC_PUBLIC",
            Self::Remote => "REMOTE",
        }
    }

    pub fn from_json_name(name: &str) -> Option<Self> {
        [
            Self::UnknownKeymaterial,
            Self::Symmetric,
            Self::AsymmetricPrivate,
            Self::AsymmetricPublic,
            Self::Remote,
        ]
        .into_iter()
        .find(|v| v.json_name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tink_prefix() {
        assert_eq!(
            OutputPrefixType::Tink.prefix(0x0102_0304).unwrap(),
            vec![0x01, 0x01, 0x02, 0x03, 0x04]
        );
        assert_eq!(
            OutputPrefixType::Legacy.prefix(7).unwrap(),
            vec![0x00, 0, 0, 0, 7]
        );
        assert!(OutputPrefixType::Raw.prefix(7).unwrap().is_empty());
        assert!(OutputPrefixType::UnknownPrefix.prefix(7).is_err());
    }

    #[test]
    fn test_json_names_roundtrip() {
        for status in [KeyStatusType::Enabled, KeyStatusType::Destroyed] {
            assert_eq!(KeyStatusType::from_json_name(status.json_name()), Some(status));
        }
        assert_eq!(
            KeyMaterialType::from_json_name("ASYMMETRIC_PUBLIC"),
            Some(KeyMaterialType::AsymmetricPublic)
        );
        assert_eq!(OutputPrefixType::from_json_name("tink"), None);
    }

    #[test]
    fn test_enum_getters_fall_back_on_unknown_values() {
        let key = Key {
            key_data: None,
            status: 99,
            key_id: 1,
            output_prefix_type: OutputPrefixType::Raw as i32,
        };

        assert_eq!(key.status(), KeyStatusType::UnknownStatus);
        assert_eq!(key.output_prefix_type(), OutputPrefixType::Raw);
    }

    #[test]
    fn test_primary_lookup() {
        let keyset = Keyset {
            primary_key_id: 5,
            key: vec![],
        };
        assert!(matches!(keyset.primary(), Err(KeysError::InvalidKeyset(_))));
    }
}
