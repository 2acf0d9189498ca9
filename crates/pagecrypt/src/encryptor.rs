//! Section encryption.
//!
//! Each protected section's inner markup is sealed under the document key and
//! replaced by a single ciphertext carrier:
//! `<script type="application/octet-stream" ciphertext="">BASE64</script>`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pagecrypt_core::{Document, Element, NodeId, RenderMode};
use pagecrypt_keys::ContentCipher;
use tracing::debug;

use crate::error::{Result, SealError};

/// `type` of the carrier script holding a section ciphertext.
pub const CIPHERTEXT_SCRIPT_TYPE: &str = "application/octet-stream";

/// Marker attribute of the carrier script holding a section ciphertext.
pub const CIPHERTEXT_ATTR: &str = "ciphertext";

/// Seal every section in `sections`, in order. Returns how many were sealed.
///
/// Stops at the first failure; the document is then only partly rewritten
/// and must be discarded.
pub fn encrypt_sections(
    doc: &mut Document,
    sections: &[NodeId],
    cipher: &dyn ContentCipher,
) -> Result<usize> {
    for (index, &section) in sections.iter().enumerate() {
        let plaintext = doc.render(section, RenderMode::Inner);
        let ciphertext = cipher
            .seal(plaintext.as_bytes())
            .map_err(SealError::Encryption)?;

        doc.remove_children(section);
        let carrier = doc.create_element(Element::new(
            "script",
            [("type", CIPHERTEXT_SCRIPT_TYPE), (CIPHERTEXT_ATTR, "")],
        ));
        let body = doc.create_text(STANDARD.encode(&ciphertext));
        doc.append_child(carrier, body);
        doc.append_child(section, carrier);

        debug!(
            index,
            plaintext_bytes = plaintext.len(),
            ciphertext_bytes = ciphertext.len(),
            "sealed section"
        );
    }

    Ok(sections.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecrypt_core::{locate_sections, SectionRules};
    use pagecrypt_keys::{KeysError, SymmetricKeyBundle};
    use std::sync::Mutex;

    /// Reverses bytes and records what it was asked to seal.
    #[derive(Default)]
    struct RecordingCipher {
        seen: Mutex<Vec<String>>,
    }

    impl ContentCipher for RecordingCipher {
        fn seal(&self, plaintext: &[u8]) -> pagecrypt_keys::Result<Vec<u8>> {
            self.seen
                .lock()
                .unwrap()
                .push(String::from_utf8(plaintext.to_vec()).unwrap());
            Ok(plaintext.iter().rev().copied().collect())
        }
    }

    struct FailingCipher;

    impl ContentCipher for FailingCipher {
        fn seal(&self, _: &[u8]) -> pagecrypt_keys::Result<Vec<u8>> {
            Err(KeysError::Encryption("boom".to_string()))
        }
    }

    fn parse(body: &str) -> Document {
        Document::parse(&format!("<html amp=\"\"><head></head><body>{body}</body></html>")).unwrap()
    }

    #[test]
    fn test_replaces_content_with_carrier() {
        let mut doc = parse(
            r#"<p>free</p><section subscriptions-section="content" encrypted=""><p>a</p><p>b</p></section>"#,
        );
        let sections = locate_sections(&doc, &SectionRules::default());
        let cipher = RecordingCipher::default();

        assert_eq!(encrypt_sections(&mut doc, &sections, &cipher).unwrap(), 1);
        assert_eq!(*cipher.seen.lock().unwrap(), vec!["<p>a</p><p>b</p>".to_string()]);

        let expected_b64 = STANDARD.encode(b">p/<b>p<>p/<a>p<");
        assert_eq!(
            doc.to_html(),
            format!(
                "<html amp=\"\"><head></head><body><p>free</p>\
                 <section subscriptions-section=\"content\" encrypted=\"\">\
                 <script type=\"application/octet-stream\" ciphertext=\"\">{expected_b64}</script>\
                 </section></body></html>"
            )
        );
    }

    #[test]
    fn test_sections_sealed_in_order() {
        let mut doc = parse(concat!(
            r#"<section subscriptions-section="content" encrypted="">one</section>"#,
            r#"<div><section subscriptions-section="content" encrypted="">two</section></div>"#,
        ));
        let sections = locate_sections(&doc, &SectionRules::default());
        let cipher = RecordingCipher::default();

        encrypt_sections(&mut doc, &sections, &cipher).unwrap();
        assert_eq!(*cipher.seen.lock().unwrap(), vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn test_empty_section_still_gets_carrier() {
        let mut doc = parse(r#"<section subscriptions-section="content" encrypted=""></section>"#);
        let sections = locate_sections(&doc, &SectionRules::default());

        encrypt_sections(&mut doc, &sections, &RecordingCipher::default()).unwrap();

        let carrier = doc.children(sections[0])[0];
        assert_eq!(doc.element(carrier).unwrap().attr(CIPHERTEXT_ATTR), Some(""));
        assert_eq!(doc.text_content(carrier), "");
    }

    #[test]
    fn test_nothing_to_seal() {
        let mut doc = parse("<p>free</p>");
        let before = doc.to_html();

        assert_eq!(encrypt_sections(&mut doc, &[], &FailingCipher).unwrap(), 0);
        assert_eq!(doc.to_html(), before);
    }

    #[test]
    fn test_cipher_failure_is_encryption_error() {
        let mut doc = parse(r#"<section subscriptions-section="content" encrypted="">x</section>"#);
        let sections = locate_sections(&doc, &SectionRules::default());

        let err = encrypt_sections(&mut doc, &sections, &FailingCipher).unwrap_err();
        assert!(matches!(err, SealError::Encryption(_)));
    }

    #[test]
    fn test_real_cipher_roundtrip() {
        let mut doc = parse(
            r#"<section subscriptions-section="content" encrypted=""><p>x &amp; y</p></section>"#,
        );
        let sections = locate_sections(&doc, &SectionRules::default());
        let bundle = SymmetricKeyBundle::generate().unwrap();
        let cipher = bundle.cipher().unwrap();

        encrypt_sections(&mut doc, &sections, &cipher).unwrap();

        let carrier = doc.children(sections[0])[0];
        let ciphertext = STANDARD.decode(doc.text_content(carrier)).unwrap();
        assert_eq!(cipher.open(&ciphertext).unwrap(), b"<p>x &amp; y</p>");
    }
}
