//! Recipient public keysets.
//!
//! Reads Tink's JSON keyset format and refuses any keyset that carries
//! anything other than public key material, so only public-key operations
//! can ever be performed with it.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use prost::Message;
use serde::{Deserialize, Serialize};

use crate::error::{KeysError, Result};
use crate::hybrid::{
    EciesP256Encrypt, HpkeX25519Encrypt, HybridEncrypt, ECIES_PUBLIC_KEY_TYPE_URL,
    HPKE_PUBLIC_KEY_TYPE_URL,
};
use crate::proto::{
    EciesAeadHkdfPublicKey, HpkePublicKey, Key, KeyData, KeyMaterialType, KeyStatusType, Keyset,
    OutputPrefixType,
};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonKeyset {
    #[serde(default)]
    primary_key_id: u32,
    #[serde(default)]
    key: Vec<JsonKey>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonKey {
    key_data: Option<JsonKeyData>,
    status: String,
    key_id: u32,
    output_prefix_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonKeyData {
    type_url: String,
    value: String,
    key_material_type: String,
}

/// A recipient's public keyset.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipientPublicKeyBundle {
    keyset: Keyset,
}

impl RecipientPublicKeyBundle {
    /// Parse a Tink JSON keyset.
    pub fn from_json(json: &[u8]) -> Result<Self> {
        let parsed: JsonKeyset = serde_json::from_slice(json)
            .map_err(|e| KeysError::InvalidKeyset(format!("keyset JSON: {e}")))?;

        let key = parsed
            .key
            .into_iter()
            .map(json_key_to_proto)
            .collect::<Result<Vec<_>>>()?;

        Self::from_keyset(Keyset {
            primary_key_id: parsed.primary_key_id,
            key,
        })
    }

    /// Validate a decoded keyset as public-only with an enabled primary.
    pub fn from_keyset(keyset: Keyset) -> Result<Self> {
        if keyset.key.is_empty() {
            return Err(KeysError::InvalidKeyset("keyset has no keys".to_string()));
        }

        for key in &keyset.key {
            // Destroyed entries keep their id and status but no key data.
            let data = match (key.key_data.as_ref(), key.status()) {
                (Some(data), _) => data,
                (None, KeyStatusType::Destroyed) => continue,
                (None, _) => {
                    return Err(KeysError::InvalidKeyset(format!(
                        "key {} has no key data",
                        key.key_id
                    )))
                }
            };
            let material = data.key_material_type();
            if material != KeyMaterialType::AsymmetricPublic {
                return Err(KeysError::SecretKeyMaterial {
                    key_id: key.key_id,
                    material: material.json_name(),
                });
            }
        }

        let primary = keyset.primary()?;
        if primary.status() != KeyStatusType::Enabled {
            return Err(KeysError::InvalidKeyset(format!(
                "primary key {} is {}",
                primary.key_id,
                primary.status().json_name()
            )));
        }

        Ok(Self { keyset })
    }

    pub fn primary_key_id(&self) -> u32 {
        self.keyset.primary_key_id
    }

    pub fn keyset(&self) -> &Keyset {
        &self.keyset
    }

    /// Type URL of the primary key.
    pub fn primary_type_url(&self) -> Result<&str> {
        Ok(primary_data(&self.keyset)?.type_url.as_str())
    }

    /// Serialize back to Tink's JSON keyset format.
    pub fn to_json(&self) -> Result<String> {
        let json = JsonKeyset {
            primary_key_id: self.keyset.primary_key_id,
            key: self.keyset.key.iter().map(proto_key_to_json).collect(),
        };
        serde_json::to_string(&json)
            .map_err(|e| KeysError::InvalidKeyset(format!("keyset JSON encode: {e}")))
    }

    /// The hybrid encryption primitive of the primary key.
    pub fn hybrid_encrypt(&self) -> Result<Box<dyn HybridEncrypt>> {
        let primary = self.keyset.primary()?;
        let data = primary_data(&self.keyset)?;
        let prefix = primary.output_prefix_type().prefix(primary.key_id)?;

        tracing::debug!(
            key_id = primary.key_id,
            type_url = %data.type_url,
            "instantiating hybrid encryption"
        );

        match data.type_url.as_str() {
            ECIES_PUBLIC_KEY_TYPE_URL => {
                let key = EciesAeadHkdfPublicKey::decode(data.value.as_slice())
                    .map_err(|e| KeysError::InvalidKeyset(e.to_string()))?;
                Ok(Box::new(EciesP256Encrypt::new(&key, prefix)?))
            }
            HPKE_PUBLIC_KEY_TYPE_URL => {
                let key = HpkePublicKey::decode(data.value.as_slice())
                    .map_err(|e| KeysError::InvalidKeyset(e.to_string()))?;
                Ok(Box::new(HpkeX25519Encrypt::new(&key, prefix)?))
            }
            other => Err(KeysError::UnsupportedKey(format!(
                "{other} is not a hybrid encryption key"
            ))),
        }
    }
}

fn primary_data(keyset: &Keyset) -> Result<&KeyData> {
    keyset
        .primary()?
        .key_data
        .as_ref()
        .ok_or_else(|| KeysError::InvalidKeyset("primary key has no key data".to_string()))
}

fn json_key_to_proto(key: JsonKey) -> Result<Key> {
    let status = KeyStatusType::from_json_name(&key.status)
        .ok_or_else(|| KeysError::InvalidKeyset(format!("unknown key status {}", key.status)))?;
    let prefix = OutputPrefixType::from_json_name(&key.output_prefix_type).ok_or_else(|| {
        KeysError::InvalidKeyset(format!("unknown output prefix {}", key.output_prefix_type))
    })?;

    let key_data = key
        .key_data
        .map(|data| -> Result<KeyData> {
            let material = KeyMaterialType::from_json_name(&data.key_material_type)
                .ok_or_else(|| {
                    KeysError::InvalidKeyset(format!(
                        "unknown key material type {}",
                        data.key_material_type
                    ))
                })?;
            let value = STANDARD
                .decode(data.value.as_bytes())
                .map_err(|e| KeysError::InvalidKeyset(format!("key value base64: {e}")))?;
            Ok(KeyData {
                type_url: data.type_url,
                value,
                key_material_type: material as i32,
            })
        })
        .transpose()?;

    Ok(Key {
        key_data,
        status: status as i32,
        key_id: key.key_id,
        output_prefix_type: prefix as i32,
    })
}

fn proto_key_to_json(key: &Key) -> JsonKey {
    JsonKey {
        key_data: key.key_data.as_ref().map(|data| JsonKeyData {
            type_url: data.type_url.clone(),
            value: STANDARD.encode(&data.value),
            key_material_type: data.key_material_type().json_name().to_string(),
        }),
        status: key.status().json_name().to_string(),
        key_id: key.key_id,
        output_prefix_type: key.output_prefix_type().json_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{HpkeAead, HpkeKdf, HpkeKem, HpkeParams};

    fn hpke_public_json(material: &str, status: &str) -> String {
        let key = HpkePublicKey {
            version: 0,
            params: Some(HpkeParams {
                kem: HpkeKem::DhkemX25519HkdfSha256 as i32,
                kdf: HpkeKdf::HkdfSha256 as i32,
                aead: HpkeAead::Aes128Gcm as i32,
            }),
            public_key: vec![9u8; 32],
        };
        format!(
            r#"{{"primaryKeyId":1234,"key":[{{"keyData":{{"typeUrl":"{}","value":"{}","keyMaterialType":"{}"}},"status":"{}","keyId":1234,"outputPrefixType":"TINK"}}]}}"#,
            HPKE_PUBLIC_KEY_TYPE_URL,
            STANDARD.encode(key.encode_to_vec()),
            material,
            status
        )
    }

    #[test]
    fn test_parse_public_keyset() {
        let bundle =
            RecipientPublicKeyBundle::from_json(hpke_public_json("ASYMMETRIC_PUBLIC", "ENABLED").as_bytes())
                .unwrap();

        assert_eq!(bundle.primary_key_id(), 1234);
        assert_eq!(bundle.primary_type_url().unwrap(), HPKE_PUBLIC_KEY_TYPE_URL);
        assert!(bundle.hybrid_encrypt().is_ok());
    }

    #[test]
    fn test_rejects_private_material() {
        for material in ["ASYMMETRIC_PRIVATE", "SYMMETRIC", "UNKNOWN_KEYMATERIAL", "REMOTE"] {
            let err = RecipientPublicKeyBundle::from_json(hpke_public_json(material, "ENABLED").as_bytes())
                .unwrap_err();
            assert!(
                matches!(err, KeysError::SecretKeyMaterial { key_id: 1234, .. }),
                "{material}: {err}"
            );
        }
    }

    #[test]
    fn test_rejects_disabled_primary() {
        let err = RecipientPublicKeyBundle::from_json(hpke_public_json("ASYMMETRIC_PUBLIC", "DISABLED").as_bytes())
            .unwrap_err();
        assert!(matches!(err, KeysError::InvalidKeyset(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(RecipientPublicKeyBundle::from_json(b"<html>").is_err());
        assert!(RecipientPublicKeyBundle::from_json(br#"{"primaryKeyId":1,"key":[]}"#).is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let bundle =
            RecipientPublicKeyBundle::from_json(hpke_public_json("ASYMMETRIC_PUBLIC", "ENABLED").as_bytes())
                .unwrap();
        let again = RecipientPublicKeyBundle::from_json(bundle.to_json().unwrap().as_bytes()).unwrap();

        assert_eq!(bundle, again);
    }

    fn hpke_key(key_id: u32, status: KeyStatusType, key_data: Option<KeyData>) -> Key {
        Key {
            key_data,
            status: status as i32,
            key_id,
            output_prefix_type: OutputPrefixType::Tink as i32,
        }
    }

    fn hpke_public_data() -> KeyData {
        let key = HpkePublicKey {
            version: 0,
            params: Some(HpkeParams {
                kem: HpkeKem::DhkemX25519HkdfSha256 as i32,
                kdf: HpkeKdf::HkdfSha256 as i32,
                aead: HpkeAead::Aes128Gcm as i32,
            }),
            public_key: vec![9u8; 32],
        };
        KeyData {
            type_url: HPKE_PUBLIC_KEY_TYPE_URL.to_string(),
            value: key.encode_to_vec(),
            key_material_type: KeyMaterialType::AsymmetricPublic as i32,
        }
    }

    #[test]
    fn test_accepts_destroyed_entry_without_key_data() {
        let keyset = Keyset {
            primary_key_id: 2,
            key: vec![
                hpke_key(1, KeyStatusType::Destroyed, None),
                hpke_key(2, KeyStatusType::Enabled, Some(hpke_public_data())),
            ],
        };
        let bundle = RecipientPublicKeyBundle::from_keyset(keyset).unwrap();

        assert_eq!(bundle.primary_key_id(), 2);
        assert!(bundle.hybrid_encrypt().is_ok());

        let again = RecipientPublicKeyBundle::from_json(bundle.to_json().unwrap().as_bytes()).unwrap();
        assert_eq!(bundle, again);
    }

    #[test]
    fn test_rejects_missing_key_data_on_live_entry() {
        for status in [KeyStatusType::Enabled, KeyStatusType::Disabled] {
            let keyset = Keyset {
                primary_key_id: 2,
                key: vec![
                    hpke_key(1, status, None),
                    hpke_key(2, KeyStatusType::Enabled, Some(hpke_public_data())),
                ],
            };
            assert!(matches!(
                RecipientPublicKeyBundle::from_keyset(keyset),
                Err(KeysError::InvalidKeyset(_))
            ));
        }
    }

    #[test]
    fn test_destroyed_entry_with_private_data_is_refused() {
        let mut leaked = hpke_public_data();
        leaked.key_material_type = KeyMaterialType::AsymmetricPrivate as i32;
        let keyset = Keyset {
            primary_key_id: 2,
            key: vec![
                hpke_key(1, KeyStatusType::Destroyed, Some(leaked)),
                hpke_key(2, KeyStatusType::Enabled, Some(hpke_public_data())),
            ],
        };

        assert!(matches!(
            RecipientPublicKeyBundle::from_keyset(keyset),
            Err(KeysError::SecretKeyMaterial { key_id: 1, .. })
        ));
    }

    #[test]
    fn test_destroyed_primary_is_rejected() {
        let keyset = Keyset {
            primary_key_id: 1,
            key: vec![hpke_key(1, KeyStatusType::Destroyed, None)],
        };

        assert!(matches!(
            RecipientPublicKeyBundle::from_keyset(keyset),
            Err(KeysError::InvalidKeyset(_))
        ));
    }

    #[test]
    fn test_non_hybrid_primary_is_unsupported() {
        let keyset = Keyset {
            primary_key_id: 1,
            key: vec![Key {
                key_data: Some(KeyData {
                    type_url: "type.googleapis.com/google.crypto.tink.Ed25519PublicKey".to_string(),
                    value: vec![],
                    key_material_type: KeyMaterialType::AsymmetricPublic as i32,
                }),
                status: KeyStatusType::Enabled as i32,
                key_id: 1,
                output_prefix_type: OutputPrefixType::Tink as i32,
            }],
        };
        let bundle = RecipientPublicKeyBundle::from_keyset(keyset).unwrap();

        assert!(matches!(
            bundle.hybrid_encrypt(),
            Err(KeysError::UnsupportedKey(_))
        ));
    }
}
