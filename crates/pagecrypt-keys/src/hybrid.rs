//! Hybrid (public-key) encryption for key wrapping.
//!
//! Two Tink hybrid key families are supported:
//!
//! - **ECIES-AEAD-HKDF** over NIST P-256 with HKDF-SHA256 and an AES-GCM DEM.
//!   Ciphertext: `prefix || kem_bytes || iv || dem_ciphertext || tag`.
//! - **HPKE** (RFC 9180 base mode) with DHKEM(X25519, HKDF-SHA256).
//!   Ciphertext: `prefix || enc (32) || aead_ciphertext || tag`.

use hkdf::Hkdf;
use p256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use p256::{EncodedPoint, FieldBytes};
use prost::Message;
use rand::rngs::OsRng;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::aead::{random_nonce, AeadAlgorithm, NONCE_LEN};
use crate::error::{KeysError, Result};
use crate::keyset::AES_GCM_TYPE_URL;
use crate::proto::{
    AesGcmKeyFormat, EcPointFormat, EciesAeadHkdfPublicKey, EllipticCurveType, HashType,
    HpkeAead, HpkeKdf, HpkeKem, HpkePublicKey,
};

/// Tink type URL of an ECIES-AEAD-HKDF public key.
pub const ECIES_PUBLIC_KEY_TYPE_URL: &str =
    "type.googleapis.com/google.crypto.tink.EciesAeadHkdfPublicKey";

/// Tink type URL of an HPKE public key.
pub const HPKE_PUBLIC_KEY_TYPE_URL: &str = "type.googleapis.com/google.crypto.tink.HpkePublicKey";

/// Encrypts arbitrary-length plaintext under a recipient's public key.
pub trait HybridEncrypt: Send + Sync {
    fn encrypt(&self, plaintext: &[u8], context_info: &[u8]) -> Result<Vec<u8>>;
}

// ─────────────────────────────────────────────────────────────────────────────
// ECIES-AEAD-HKDF (P-256)
// ─────────────────────────────────────────────────────────────────────────────

/// ECIES over P-256 with HKDF-SHA256 and AES-GCM.
pub struct EciesP256Encrypt {
    prefix: Vec<u8>,
    recipient: p256::PublicKey,
    hkdf_salt: Vec<u8>,
    point_format: EcPointFormat,
    dem: AeadAlgorithm,
}

impl EciesP256Encrypt {
    /// Build from a Tink public key message and the key's output prefix.
    pub fn new(key: &EciesAeadHkdfPublicKey, prefix: Vec<u8>) -> Result<Self> {
        let params = key
            .params
            .as_ref()
            .ok_or_else(|| unsupported("ECIES key has no params"))?;
        let kem = params
            .kem_params
            .as_ref()
            .ok_or_else(|| unsupported("ECIES key has no KEM params"))?;

        if kem.curve_type() != EllipticCurveType::NistP256 {
            return Err(unsupported(format!("ECIES curve {:?}", kem.curve_type())));
        }
        if kem.hkdf_hash_type() != HashType::Sha256 {
            return Err(unsupported(format!("ECIES HKDF hash {:?}", kem.hkdf_hash_type())));
        }

        let point_format = params.ec_point_format();
        if point_format == EcPointFormat::UnknownFormat {
            return Err(unsupported("ECIES point format unknown"));
        }

        let dem_template = params
            .dem_params
            .as_ref()
            .and_then(|d| d.aead_dem.as_ref())
            .ok_or_else(|| unsupported("ECIES key has no DEM template"))?;
        if dem_template.type_url != AES_GCM_TYPE_URL {
            return Err(unsupported(format!("ECIES DEM {}", dem_template.type_url)));
        }
        let dem_format = AesGcmKeyFormat::decode(dem_template.value.as_slice())
            .map_err(|e| KeysError::InvalidKeyset(e.to_string()))?;
        let dem = AeadAlgorithm::aes_gcm_for_key_len(dem_format.key_size as usize)?;

        let x = FieldBytes::from(fixed_coordinate(&key.x)?);
        let y = FieldBytes::from(fixed_coordinate(&key.y)?);
        let point = EncodedPoint::from_affine_coordinates(&x, &y, false);
        let recipient = Option::<p256::PublicKey>::from(p256::PublicKey::from_encoded_point(&point))
            .ok_or_else(|| KeysError::InvalidKeyset("ECIES point is not on P-256".to_string()))?;

        Ok(Self {
            prefix,
            recipient,
            hkdf_salt: kem.hkdf_salt.clone(),
            point_format,
            dem,
        })
    }
}

impl HybridEncrypt for EciesP256Encrypt {
    fn encrypt(&self, plaintext: &[u8], context_info: &[u8]) -> Result<Vec<u8>> {
        let ephemeral = p256::ecdh::EphemeralSecret::random(&mut OsRng);
        let kem_bytes = encode_point(&ephemeral.public_key(), self.point_format)?;
        let shared = ephemeral.diffie_hellman(&self.recipient);

        let mut ikm = Zeroizing::new(kem_bytes.clone());
        ikm.extend_from_slice(shared.raw_secret_bytes());

        let mut dem_key = Zeroizing::new(vec![0u8; self.dem.key_len()]);
        Hkdf::<Sha256>::new(Some(self.hkdf_salt.as_slice()), &ikm)
            .expand(context_info, dem_key.as_mut_slice())
            .map_err(|e| KeysError::Encryption(format!("HKDF expand failed: {e}")))?;

        let nonce = random_nonce()?;
        let sealed = self.dem.seal(&dem_key, &nonce, plaintext)?;

        let mut out =
            Vec::with_capacity(self.prefix.len() + kem_bytes.len() + NONCE_LEN + sealed.len());
        out.extend_from_slice(&self.prefix);
        out.extend_from_slice(&kem_bytes);
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);
        Ok(out)
    }
}

/// Encode a P-256 point the way Tink's ECIES KEM does for `format`.
pub fn encode_point(point: &p256::PublicKey, format: EcPointFormat) -> Result<Vec<u8>> {
    match format {
        EcPointFormat::Uncompressed => Ok(point.to_encoded_point(false).as_bytes().to_vec()),
        EcPointFormat::Compressed => Ok(point.to_encoded_point(true).as_bytes().to_vec()),
        // x || y without the 0x04 tag.
        EcPointFormat::DoNotUseCrunchyUncompressed => {
            Ok(point.to_encoded_point(false).as_bytes()[1..].to_vec())
        }
        EcPointFormat::UnknownFormat => Err(unsupported("ECIES point format unknown")),
    }
}

/// Length of the KEM bytes for `format` on P-256.
pub const fn encoded_point_len(format: EcPointFormat) -> usize {
    match format {
        EcPointFormat::Uncompressed => 65,
        EcPointFormat::Compressed => 33,
        EcPointFormat::DoNotUseCrunchyUncompressed => 64,
        EcPointFormat::UnknownFormat => 0,
    }
}

/// Normalize a big-endian coordinate (Tink may add a leading zero byte) to
/// exactly 32 bytes.
fn fixed_coordinate(bytes: &[u8]) -> Result<[u8; 32]> {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    let value = &bytes[start..];
    if value.len() > 32 {
        return Err(KeysError::InvalidKeyset(format!(
            "P-256 coordinate is {} bytes",
            value.len()
        )));
    }
    let mut out = [0u8; 32];
    out[32 - value.len()..].copy_from_slice(value);
    Ok(out)
}

// ─────────────────────────────────────────────────────────────────────────────
// HPKE (X25519)
// ─────────────────────────────────────────────────────────────────────────────

/// HPKE base mode, DHKEM(X25519, HKDF-SHA256), HKDF-SHA256.
pub struct HpkeX25519Encrypt {
    prefix: Vec<u8>,
    recipient: x25519_dalek::PublicKey,
    aead: HpkeAead,
}

impl HpkeX25519Encrypt {
    /// Build from a Tink public key message and the key's output prefix.
    pub fn new(key: &HpkePublicKey, prefix: Vec<u8>) -> Result<Self> {
        let params = key
            .params
            .as_ref()
            .ok_or_else(|| unsupported("HPKE key has no params"))?;

        if params.kem() != HpkeKem::DhkemX25519HkdfSha256 {
            return Err(unsupported(format!("HPKE KEM {:?}", params.kem())));
        }
        if params.kdf() != HpkeKdf::HkdfSha256 {
            return Err(unsupported(format!("HPKE KDF {:?}", params.kdf())));
        }
        hpke::aead_algorithm(params.aead())?;

        let bytes: [u8; 32] = key.public_key.as_slice().try_into().map_err(|_| {
            KeysError::InvalidKeyset(format!(
                "X25519 public key is {} bytes",
                key.public_key.len()
            ))
        })?;

        Ok(Self {
            prefix,
            recipient: x25519_dalek::PublicKey::from(bytes),
            aead: params.aead(),
        })
    }
}

impl HybridEncrypt for HpkeX25519Encrypt {
    fn encrypt(&self, plaintext: &[u8], context_info: &[u8]) -> Result<Vec<u8>> {
        let ephemeral = x25519_dalek::EphemeralSecret::random_from_rng(OsRng);
        let enc = x25519_dalek::PublicKey::from(&ephemeral);
        let dh = ephemeral.diffie_hellman(&self.recipient);
        if !dh.was_contributory() {
            return Err(KeysError::Encryption(
                "X25519 produced a non-contributory shared secret".to_string(),
            ));
        }

        let shared = hpke::extract_and_expand(dh.as_bytes(), enc.as_bytes(), self.recipient.as_bytes())?;
        let (algorithm, key, nonce) = hpke::key_schedule(self.aead, &shared, context_info)?;
        let sealed = algorithm.seal(&key, &nonce, plaintext)?;

        let mut out = Vec::with_capacity(self.prefix.len() + 32 + sealed.len());
        out.extend_from_slice(&self.prefix);
        out.extend_from_slice(enc.as_bytes());
        out.extend_from_slice(&sealed);
        Ok(out)
    }
}

/// RFC 9180 building blocks, shared by the sender here and by receivers in
/// tests.
pub mod hpke {
    use super::*;

    const VERSION_LABEL: &[u8] = b"HPKE-v1";
    const KEM_ID_X25519: u16 = 0x0020;
    const KDF_ID_HKDF_SHA256: u16 = 0x0001;
    const MODE_BASE: u8 = 0x00;

    /// Shared secret length of DHKEM(X25519, HKDF-SHA256).
    pub const SHARED_SECRET_LEN: usize = 32;

    /// Map a Tink HPKE AEAD id to the cipher and its RFC 9180 identifier.
    pub fn aead_algorithm(aead: HpkeAead) -> Result<(AeadAlgorithm, u16)> {
        match aead {
            HpkeAead::Aes128Gcm => Ok((AeadAlgorithm::Aes128Gcm, 0x0001)),
            HpkeAead::Aes256Gcm => Ok((AeadAlgorithm::Aes256Gcm, 0x0002)),
            HpkeAead::Chacha20Poly1305 => Ok((AeadAlgorithm::ChaCha20Poly1305, 0x0003)),
            HpkeAead::AeadUnknown => Err(unsupported("HPKE AEAD unknown")),
        }
    }

    fn labeled_extract(suite_id: &[u8], salt: &[u8], label: &[u8], ikm: &[u8]) -> Zeroizing<Vec<u8>> {
        let mut labeled_ikm = Zeroizing::new(Vec::with_capacity(
            VERSION_LABEL.len() + suite_id.len() + label.len() + ikm.len(),
        ));
        labeled_ikm.extend_from_slice(VERSION_LABEL);
        labeled_ikm.extend_from_slice(suite_id);
        labeled_ikm.extend_from_slice(label);
        labeled_ikm.extend_from_slice(ikm);

        let (prk, _) = Hkdf::<Sha256>::extract(Some(salt), &labeled_ikm);
        Zeroizing::new(prk.to_vec())
    }

    fn labeled_expand(
        suite_id: &[u8],
        prk: &[u8],
        label: &[u8],
        info: &[u8],
        len: usize,
    ) -> Result<Zeroizing<Vec<u8>>> {
        let mut labeled_info = Vec::with_capacity(2 + VERSION_LABEL.len() + suite_id.len() + label.len() + info.len());
        labeled_info.extend_from_slice(&(len as u16).to_be_bytes());
        labeled_info.extend_from_slice(VERSION_LABEL);
        labeled_info.extend_from_slice(suite_id);
        labeled_info.extend_from_slice(label);
        labeled_info.extend_from_slice(info);

        let hk = Hkdf::<Sha256>::from_prk(prk)
            .map_err(|e| KeysError::Encryption(format!("HKDF PRK rejected: {e}")))?;
        let mut okm = Zeroizing::new(vec![0u8; len]);
        hk.expand(&labeled_info, okm.as_mut_slice())
            .map_err(|e| KeysError::Encryption(format!("HKDF expand failed: {e}")))?;
        Ok(okm)
    }

    /// DHKEM `ExtractAndExpand(dh, enc || pkR)`.
    pub fn extract_and_expand(dh: &[u8], enc: &[u8], recipient_public: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let mut suite_id = b"KEM".to_vec();
        suite_id.extend_from_slice(&KEM_ID_X25519.to_be_bytes());

        let mut kem_context = Vec::with_capacity(enc.len() + recipient_public.len());
        kem_context.extend_from_slice(enc);
        kem_context.extend_from_slice(recipient_public);

        let eae_prk = labeled_extract(&suite_id, b"", b"eae_prk", dh);
        labeled_expand(&suite_id, &eae_prk, b"shared_secret", &kem_context, SHARED_SECRET_LEN)
    }

    /// Base-mode key schedule: the AEAD key and base nonce for one context.
    pub fn key_schedule(
        aead: HpkeAead,
        shared_secret: &[u8],
        info: &[u8],
    ) -> Result<(AeadAlgorithm, Zeroizing<Vec<u8>>, [u8; NONCE_LEN])> {
        let (algorithm, aead_id) = aead_algorithm(aead)?;

        let mut suite_id = b"HPKE".to_vec();
        suite_id.extend_from_slice(&KEM_ID_X25519.to_be_bytes());
        suite_id.extend_from_slice(&KDF_ID_HKDF_SHA256.to_be_bytes());
        suite_id.extend_from_slice(&aead_id.to_be_bytes());

        let psk_id_hash = labeled_extract(&suite_id, b"", b"psk_id_hash", b"");
        let info_hash = labeled_extract(&suite_id, b"", b"info_hash", info);

        let mut context = Vec::with_capacity(1 + psk_id_hash.len() + info_hash.len());
        context.push(MODE_BASE);
        context.extend_from_slice(&psk_id_hash);
        context.extend_from_slice(&info_hash);

        let secret = labeled_extract(&suite_id, shared_secret, b"secret", b"");
        let key = labeled_expand(&suite_id, &secret, b"key", &context, algorithm.key_len())?;
        let base_nonce = labeled_expand(&suite_id, &secret, b"base_nonce", &context, NONCE_LEN)?;

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&base_nonce);
        Ok((algorithm, key, nonce))
    }
}

fn unsupported(msg: impl Into<String>) -> KeysError {
    KeysError::UnsupportedKey(msg.into())
}
