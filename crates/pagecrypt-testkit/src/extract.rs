//! Reading sealed documents back.
//!
//! Pulls the key artifact and ciphertext carriers out of sealed output and,
//! given the recipient's private key, recovers the protected markup.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pagecrypt_core::{content_region, metadata_region, Document, NodeId, SectionRules};
use pagecrypt_keys::{KeysError, Result};

use crate::recipient::{TestRecipient, UnwrappedKey};

/// The artifacts found in one sealed document.
#[derive(Debug, Clone, Default)]
pub struct SealedArtifacts {
    /// Recipient id to base64 wrapped key, per `cryptokeys` carrier in `head`.
    pub wrapped_keys: Vec<BTreeMap<String, String>>,
    /// Base64 bodies of `ciphertext` carriers in `body`, in document order.
    pub ciphertexts: Vec<String>,
}

impl SealedArtifacts {
    /// The wrapped key for `recipient_id` from the only `cryptokeys` carrier.
    pub fn wrapped_key(&self, recipient_id: &str) -> Option<&str> {
        match self.wrapped_keys.as_slice() {
            [keys] => keys.get(recipient_id).map(String::as_str),
            _ => None,
        }
    }
}

fn scripts_with_attr(doc: &Document, region: Option<NodeId>, attr: &str) -> Vec<NodeId> {
    let Some(region) = region else {
        return Vec::new();
    };
    doc.descendants(region)
        .filter(|&id| {
            doc.element(id)
                .is_some_and(|el| el.name == "script" && el.has_attr(attr))
        })
        .collect()
}

/// Collect key and ciphertext carriers from sealed markup.
pub fn extract_artifacts(html: &str) -> SealedArtifacts {
    let doc = Document::parse(html).expect("sealed output must parse");
    let rules = SectionRules::default();

    let wrapped_keys = scripts_with_attr(&doc, metadata_region(&doc, &rules), "cryptokeys")
        .into_iter()
        .map(|id| {
            serde_json::from_str(&doc.text_content(id)).expect("cryptokeys carrier holds a JSON map")
        })
        .collect();

    let ciphertexts = scripts_with_attr(&doc, content_region(&doc, &rules), "ciphertext")
        .into_iter()
        .map(|id| doc.text_content(id))
        .collect();

    SealedArtifacts {
        wrapped_keys,
        ciphertexts,
    }
}

/// Everything a recipient recovers from a sealed document.
#[derive(Debug, Clone)]
pub struct OpenedDocument {
    pub payload: UnwrappedKey,
    /// Plaintext of each protected section, in document order.
    pub sections: Vec<String>,
}

/// Unwrap the document key as `recipient` and decrypt every section.
pub fn open_document(
    html: &str,
    recipient: &TestRecipient,
    recipient_id: &str,
) -> Result<OpenedDocument> {
    let artifacts = extract_artifacts(html);
    let wrapped = artifacts.wrapped_key(recipient_id).ok_or_else(|| {
        KeysError::Decryption(format!("no single cryptokeys entry for {recipient_id}"))
    })?;

    let payload = recipient.unwrap_key(wrapped)?;
    let cipher = payload.bundle()?.cipher()?;

    let sections = artifacts
        .ciphertexts
        .iter()
        .map(|b64| {
            let ciphertext = STANDARD
                .decode(b64)
                .map_err(|e| KeysError::Decryption(format!("section base64: {e}")))?;
            let plaintext = cipher.open(&ciphertext)?;
            String::from_utf8(plaintext).map_err(|e| KeysError::Decryption(e.to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(OpenedDocument { payload, sections })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::amp_document;

    #[test]
    fn test_extract_from_handwritten_output() {
        let html = amp_document(
            r#"<section subscriptions-section="content" encrypted=""><script type="application/octet-stream" ciphertext="">AAAA</script></section>"#,
        )
        .replace(
            "</head>",
            r#"<script type="application/json" cryptokeys="">{"google.com":"d3JhcHBlZA=="}</script></head>"#,
        );

        let artifacts = extract_artifacts(&html);
        assert_eq!(artifacts.ciphertexts, vec!["AAAA".to_string()]);
        assert_eq!(artifacts.wrapped_key("google.com"), Some("d3JhcHBlZA=="));
        assert_eq!(artifacts.wrapped_key("example.com"), None);
    }

    #[test]
    fn test_extract_ignores_unsealed_documents() {
        let artifacts = extract_artifacts(&crate::fixtures::single_section());
        assert!(artifacts.ciphertexts.is_empty());
        assert!(artifacts.wrapped_keys.is_empty());
    }
}
