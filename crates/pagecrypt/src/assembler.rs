//! Key artifact placement.
//!
//! The wrapped key is appended to the document head as
//! `<script type="application/json" cryptokeys="">{"<recipient>":"<wrapped>"}</script>`.

use std::collections::BTreeMap;

use pagecrypt_core::{metadata_region, Document, Element, SectionRules};
use tracing::warn;

use crate::error::{Result, SealError};

/// `type` of the carrier script holding the wrapped key map.
pub const CRYPTOKEYS_SCRIPT_TYPE: &str = "application/json";

/// Marker attribute of the carrier script holding the wrapped key map.
pub const CRYPTOKEYS_ATTR: &str = "cryptokeys";

/// Append the key artifact carrier to the document head.
pub fn embed_key(
    doc: &mut Document,
    wrapped: &str,
    recipient_id: &str,
    rules: &SectionRules,
) -> Result<()> {
    let Some(head) = metadata_region(doc, rules) else {
        warn!("document has no usable root/head for the key artifact");
        return Err(SealError::Structural(
            "cannot place key artifact: no metadata region".to_string(),
        ));
    };

    let keys = BTreeMap::from([(recipient_id, wrapped)]);
    let json = serde_json::to_string(&keys)
        .map_err(|e| SealError::Structural(format!("cannot encode key artifact: {e}")))?;

    let carrier = doc.create_element(Element::new(
        "script",
        [("type", CRYPTOKEYS_SCRIPT_TYPE), (CRYPTOKEYS_ATTR, "")],
    ));
    let body = doc.create_text(json);
    doc.append_child(carrier, body);
    doc.append_child(head, carrier);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_to_head() {
        let mut doc =
            Document::parse(r#"<html amp=""><head><title>t</title></head><body></body></html>"#)
                .unwrap();

        embed_key(&mut doc, "d3JhcA==", "google.com", &SectionRules::default()).unwrap();

        assert_eq!(
            doc.to_html(),
            "<html amp=\"\"><head><title>t</title>\
             <script type=\"application/json\" cryptokeys=\"\">{\"google.com\":\"d3JhcA==\"}</script>\
             </head><body></body></html>"
        );
    }

    #[test]
    fn test_custom_recipient_id() {
        let mut doc = Document::parse(r#"<html amp=""><head></head><body></body></html>"#).unwrap();

        embed_key(&mut doc, "AA==", "example.com", &SectionRules::default()).unwrap();
        assert!(doc.to_html().contains(r#"{"example.com":"AA=="}"#));
    }

    #[test]
    fn test_missing_head_is_structural_error() {
        let mut doc = Document::parse(r#"<html amp=""><head></head><body></body></html>"#).unwrap();
        let html = doc.root_element().unwrap();
        let head = doc.child_element(html, "head").unwrap();
        doc.detach(head);

        let err = embed_key(&mut doc, "AA==", "google.com", &SectionRules::default()).unwrap_err();
        assert!(matches!(err, SealError::Structural(_)));
    }

    #[test]
    fn test_root_without_attributes_is_structural_error() {
        let mut doc = Document::parse("<html><head></head><body></body></html>").unwrap();

        let err = embed_key(&mut doc, "AA==", "google.com", &SectionRules::default()).unwrap_err();
        assert!(matches!(err, SealError::Structural(_)));

        let relaxed = SectionRules {
            require_root_attributes: false,
            ..SectionRules::default()
        };
        assert!(embed_key(&mut doc, "AA==", "google.com", &relaxed).is_ok());
    }
}
