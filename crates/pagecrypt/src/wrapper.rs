//! Key wrapping.
//!
//! The document keyset travels inside a small JSON payload together with the
//! access requirement, hybrid-encrypted for the recipient:
//! `{"accessRequirements":["<requirement>"],"key":"<base64 keyset>"}`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pagecrypt_keys::{HybridEncrypt, KeysError, RecipientPublicKeyBundle, SymmetricKeyBundle};
use serde::Serialize;
use zeroize::Zeroizing;

use crate::error::{Result, SealError};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KeyPayload<'a> {
    access_requirements: [&'a str; 1],
    key: &'a str,
}

/// Wrap `bundle` and `access_requirement` for the recipient's primary key.
///
/// Returns the base64 hybrid ciphertext.
pub fn wrap_key(
    bundle: &SymmetricKeyBundle,
    access_requirement: &str,
    recipient: &RecipientPublicKeyBundle,
) -> Result<String> {
    let encrypter = recipient.hybrid_encrypt().map_err(SealError::Wrap)?;
    wrap_key_with(bundle, access_requirement, encrypter.as_ref())
}

/// [`wrap_key`] with an explicit hybrid primitive.
pub fn wrap_key_with(
    bundle: &SymmetricKeyBundle,
    access_requirement: &str,
    encrypter: &dyn HybridEncrypt,
) -> Result<String> {
    let key = Zeroizing::new(STANDARD.encode(bundle.to_keyset_bytes().as_slice()));
    let payload = Zeroizing::new(
        serde_json::to_vec(&KeyPayload {
            access_requirements: [access_requirement],
            key: &key,
        })
        .map_err(|e| SealError::Wrap(KeysError::Encryption(format!("key payload: {e}"))))?,
    );

    let wrapped = encrypter
        .encrypt(&payload, b"")
        .map_err(SealError::Wrap)?;

    tracing::debug!(
        payload_bytes = payload.len(),
        wrapped_bytes = wrapped.len(),
        "wrapped document key"
    );
    Ok(STANDARD.encode(wrapped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecrypt_keys::proto::HpkeAead;
    use pagecrypt_testkit::TestRecipient;
    use std::sync::Mutex;

    /// Hands back the plaintext unchanged and records the context info.
    #[derive(Default)]
    struct Passthrough {
        contexts: Mutex<Vec<Vec<u8>>>,
    }

    impl HybridEncrypt for Passthrough {
        fn encrypt(&self, plaintext: &[u8], context_info: &[u8]) -> pagecrypt_keys::Result<Vec<u8>> {
            self.contexts.lock().unwrap().push(context_info.to_vec());
            Ok(plaintext.to_vec())
        }
    }

    struct Refusing;

    impl HybridEncrypt for Refusing {
        fn encrypt(&self, _: &[u8], _: &[u8]) -> pagecrypt_keys::Result<Vec<u8>> {
            Err(KeysError::Encryption("refused".to_string()))
        }
    }

    #[test]
    fn test_payload_shape() {
        let bundle = SymmetricKeyBundle::from_key_bytes(&[7u8; 16]).unwrap();
        let fake = Passthrough::default();

        let wrapped = wrap_key_with(&bundle, "norcal.com:premium", &fake).unwrap();
        let payload = STANDARD.decode(wrapped).unwrap();

        let expected = format!(
            r#"{{"accessRequirements":["norcal.com:premium"],"key":"{}"}}"#,
            STANDARD.encode(bundle.to_keyset_bytes().as_slice())
        );
        assert_eq!(String::from_utf8(payload).unwrap(), expected);
        assert_eq!(*fake.contexts.lock().unwrap(), vec![Vec::<u8>::new()]);
    }

    #[test]
    fn test_access_requirement_is_json_escaped() {
        let bundle = SymmetricKeyBundle::generate().unwrap();
        let requirement = "a\"b\\c\n</script>";

        let wrapped = wrap_key_with(&bundle, requirement, &Passthrough::default()).unwrap();
        let payload: serde_json::Value =
            serde_json::from_slice(&STANDARD.decode(wrapped).unwrap()).unwrap();

        assert_eq!(payload["accessRequirements"][0], requirement);
    }

    #[test]
    fn test_encrypt_failure_is_wrap_error() {
        let bundle = SymmetricKeyBundle::generate().unwrap();
        let err = wrap_key_with(&bundle, "x", &Refusing).unwrap_err();
        assert!(matches!(err, SealError::Wrap(_)));
    }

    #[test]
    fn test_recipient_unwraps_same_key() {
        for recipient in [TestRecipient::ecies(), TestRecipient::hpke(HpkeAead::Aes256Gcm)] {
            let bundle = SymmetricKeyBundle::generate().unwrap();

            let wrapped = wrap_key(&bundle, "norcal.com:premium", &recipient.bundle()).unwrap();
            let unwrapped = recipient.unwrap_key(&wrapped).unwrap();

            assert_eq!(unwrapped.access_requirements, vec!["norcal.com:premium".to_string()]);
            assert_eq!(unwrapped.bundle().unwrap(), bundle);
        }
    }
}
