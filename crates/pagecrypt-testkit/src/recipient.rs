//! Recipient key pairs.
//!
//! The sealing side only ever sees a public keyset. These key pairs hold the
//! matching private half so tests can unwrap what was sealed.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hkdf::Hkdf;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use prost::Message;
use rand::rngs::OsRng;
use serde::Deserialize;
use sha2::Sha256;

use pagecrypt_keys::aead::{split_nonce, AeadAlgorithm};
use pagecrypt_keys::hybrid::{encoded_point_len, hpke};
use pagecrypt_keys::proto::{
    AesGcmKeyFormat, EcPointFormat, EciesAeadDemParams, EciesAeadHkdfParams,
    EciesAeadHkdfPublicKey, EciesHkdfKemParams, EllipticCurveType, HashType, HpkeAead, HpkeKdf,
    HpkeKem, HpkeParams, HpkePublicKey, Key, KeyData, KeyMaterialType, KeyStatusType,
    KeyTemplate, Keyset, OutputPrefixType,
};
use pagecrypt_keys::{
    KeysError, RecipientPublicKeyBundle, Result, SymmetricKeyBundle, AES_GCM_TYPE_URL,
    ECIES_PUBLIC_KEY_TYPE_URL, HPKE_PUBLIC_KEY_TYPE_URL,
};

/// Key id used by recipients built with the default constructors.
pub const RECIPIENT_KEY_ID: u32 = 0x2a5f_11c3;

enum Secret {
    Ecies {
        secret: p256::SecretKey,
        point_format: EcPointFormat,
        hkdf_salt: Vec<u8>,
        dem_key_size: u32,
    },
    Hpke {
        secret: x25519_dalek::StaticSecret,
        aead: HpkeAead,
    },
}

/// A hybrid key pair whose public half can be published as a Tink keyset.
pub struct TestRecipient {
    key_id: u32,
    prefix_type: OutputPrefixType,
    secret: Secret,
}

/// The decrypted contents of a wrapped-key artifact.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnwrappedKey {
    pub access_requirements: Vec<String>,
    pub key: String,
}

impl UnwrappedKey {
    /// Decode the embedded document keyset.
    pub fn bundle(&self) -> Result<SymmetricKeyBundle> {
        let bytes = STANDARD
            .decode(&self.key)
            .map_err(|e| KeysError::InvalidKeyset(format!("key base64: {e}")))?;
        SymmetricKeyBundle::from_keyset_bytes(&bytes)
    }
}

impl TestRecipient {
    /// ECIES-P256 with an AES-128-GCM DEM, as published by the production
    /// key server.
    pub fn ecies() -> Self {
        Self::ecies_with(EcPointFormat::Uncompressed, Vec::new(), 16)
    }

    pub fn ecies_with(point_format: EcPointFormat, hkdf_salt: Vec<u8>, dem_key_size: u32) -> Self {
        Self {
            key_id: RECIPIENT_KEY_ID,
            prefix_type: OutputPrefixType::Tink,
            secret: Secret::Ecies {
                secret: p256::SecretKey::random(&mut OsRng),
                point_format,
                hkdf_salt,
                dem_key_size,
            },
        }
    }

    /// HPKE X25519 with the given AEAD.
    pub fn hpke(aead: HpkeAead) -> Self {
        Self {
            key_id: RECIPIENT_KEY_ID,
            prefix_type: OutputPrefixType::Tink,
            secret: Secret::Hpke {
                secret: x25519_dalek::StaticSecret::random_from_rng(OsRng),
                aead,
            },
        }
    }

    pub fn with_key_id(mut self, key_id: u32) -> Self {
        self.key_id = key_id;
        self
    }

    pub fn with_prefix_type(mut self, prefix_type: OutputPrefixType) -> Self {
        self.prefix_type = prefix_type;
        self
    }

    pub fn key_id(&self) -> u32 {
        self.key_id
    }

    fn key_data(&self, material: KeyMaterialType) -> KeyData {
        let (type_url, value) = match &self.secret {
            Secret::Ecies {
                secret,
                point_format,
                hkdf_salt,
                dem_key_size,
            } => {
                let point = secret.public_key().to_encoded_point(false);
                let key = EciesAeadHkdfPublicKey {
                    version: 0,
                    params: Some(EciesAeadHkdfParams {
                        kem_params: Some(EciesHkdfKemParams {
                            curve_type: EllipticCurveType::NistP256 as i32,
                            hkdf_hash_type: HashType::Sha256 as i32,
                            hkdf_salt: hkdf_salt.clone(),
                        }),
                        dem_params: Some(EciesAeadDemParams {
                            aead_dem: Some(KeyTemplate {
                                type_url: AES_GCM_TYPE_URL.to_string(),
                                value: AesGcmKeyFormat {
                                    key_size: *dem_key_size,
                                    version: 0,
                                }
                                .encode_to_vec(),
                                output_prefix_type: OutputPrefixType::Tink as i32,
                            }),
                        }),
                        ec_point_format: *point_format as i32,
                    }),
                    x: point.x().map(|x| x.to_vec()).unwrap_or_default(),
                    y: point.y().map(|y| y.to_vec()).unwrap_or_default(),
                };
                (ECIES_PUBLIC_KEY_TYPE_URL, key.encode_to_vec())
            }
            Secret::Hpke { secret, aead } => {
                let key = HpkePublicKey {
                    version: 0,
                    params: Some(HpkeParams {
                        kem: HpkeKem::DhkemX25519HkdfSha256 as i32,
                        kdf: HpkeKdf::HkdfSha256 as i32,
                        aead: *aead as i32,
                    }),
                    public_key: x25519_dalek::PublicKey::from(secret).as_bytes().to_vec(),
                };
                (HPKE_PUBLIC_KEY_TYPE_URL, key.encode_to_vec())
            }
        };

        KeyData {
            type_url: type_url.to_string(),
            value,
            key_material_type: material as i32,
        }
    }

    /// The public keyset, with this key enabled and primary.
    pub fn public_keyset(&self) -> Keyset {
        self.keyset_with_material(KeyMaterialType::AsymmetricPublic)
    }

    /// A keyset whose single entry claims `material`. Used to check that
    /// keysets carrying anything but public material are refused.
    pub fn keyset_with_material(&self, material: KeyMaterialType) -> Keyset {
        Keyset {
            primary_key_id: self.key_id,
            key: vec![Key {
                key_data: Some(self.key_data(material)),
                status: KeyStatusType::Enabled as i32,
                key_id: self.key_id,
                output_prefix_type: self.prefix_type as i32,
            }],
        }
    }

    /// The validated public bundle.
    pub fn bundle(&self) -> RecipientPublicKeyBundle {
        // Built from a public-only keyset with an enabled primary.
        RecipientPublicKeyBundle::from_keyset(self.public_keyset())
            .unwrap_or_else(|e| panic!("test recipient keyset rejected: {e}"))
    }

    /// The public keyset in Tink JSON, as served by a key server.
    pub fn public_keyset_json(&self) -> String {
        self.bundle()
            .to_json()
            .unwrap_or_else(|e| panic!("test recipient keyset not encodable: {e}"))
    }

    /// Reverse [`HybridEncrypt::encrypt`](pagecrypt_keys::HybridEncrypt::encrypt).
    pub fn decrypt(&self, ciphertext: &[u8], context_info: &[u8]) -> Result<Vec<u8>> {
        let prefix = self.prefix_type.prefix(self.key_id)?;
        let body = ciphertext
            .strip_prefix(prefix.as_slice())
            .ok_or_else(|| KeysError::Decryption("ciphertext prefix mismatch".to_string()))?;

        match &self.secret {
            Secret::Ecies {
                secret,
                point_format,
                hkdf_salt,
                dem_key_size,
            } => {
                let kem_len = encoded_point_len(*point_format);
                if body.len() < kem_len {
                    return Err(KeysError::Decryption("ciphertext too short".to_string()));
                }
                let (kem_bytes, rest) = body.split_at(kem_len);
                let sec1 = match point_format {
                    EcPointFormat::DoNotUseCrunchyUncompressed => [&[0x04][..], kem_bytes].concat(),
                    _ => kem_bytes.to_vec(),
                };
                let ephemeral = p256::PublicKey::from_sec1_bytes(&sec1)
                    .map_err(|e| KeysError::Decryption(format!("KEM point: {e}")))?;
                let shared =
                    p256::ecdh::diffie_hellman(secret.to_nonzero_scalar(), ephemeral.as_affine());

                let ikm = [kem_bytes, shared.raw_secret_bytes().as_slice()].concat();
                let mut dem_key = vec![0u8; *dem_key_size as usize];
                Hkdf::<Sha256>::new(Some(hkdf_salt.as_slice()), &ikm)
                    .expand(context_info, &mut dem_key)
                    .map_err(|e| KeysError::Decryption(e.to_string()))?;

                let (nonce, sealed) = split_nonce(rest)?;
                AeadAlgorithm::aes_gcm_for_key_len(dem_key.len())?.open(&dem_key, &nonce, sealed)
            }
            Secret::Hpke { secret, aead } => {
                if body.len() < 32 {
                    return Err(KeysError::Decryption("ciphertext too short".to_string()));
                }
                let (enc, sealed) = body.split_at(32);
                let mut enc_bytes = [0u8; 32];
                enc_bytes.copy_from_slice(enc);

                let public = x25519_dalek::PublicKey::from(secret);
                let dh = secret.diffie_hellman(&x25519_dalek::PublicKey::from(enc_bytes));
                let shared = hpke::extract_and_expand(dh.as_bytes(), enc, public.as_bytes())?;
                let (algorithm, key, nonce) = hpke::key_schedule(*aead, &shared, context_info)?;
                algorithm.open(&key, &nonce, sealed)
            }
        }
    }

    /// Unwrap a base64 wrapped-key artifact.
    pub fn unwrap_key(&self, wrapped_b64: &str) -> Result<UnwrappedKey> {
        let ciphertext = STANDARD
            .decode(wrapped_b64)
            .map_err(|e| KeysError::Decryption(format!("artifact base64: {e}")))?;
        let payload = self.decrypt(&ciphertext, b"")?;
        serde_json::from_slice(&payload)
            .map_err(|e| KeysError::Decryption(format!("payload JSON: {e}")))
    }
}

impl Default for TestRecipient {
    fn default() -> Self {
        Self::ecies()
    }
}
