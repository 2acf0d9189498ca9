//! Protected-section discovery.
//!
//! A protected section is an element carrying both a content marker with a
//! sentinel value and a presence-only encrypted marker, e.g.
//! `<section subscriptions-section="content" encrypted>`.

use serde::{Deserialize, Serialize};

use crate::document::{Document, NodeId};

/// Literals that identify protected sections and the document regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionRules {
    /// Tag name of a protected section.
    pub section_tag: String,
    /// Attribute that marks a section as subscriber content.
    pub content_attr: String,
    /// Required value of `content_attr`.
    pub content_value: String,
    /// Presence-only attribute that requests encryption.
    pub encrypted_attr: String,
    /// Only treat the root element as a document root when it carries at
    /// least one attribute (`<html ⚡>`, `<html amp>`).
    pub require_root_attributes: bool,
}

impl Default for SectionRules {
    fn default() -> Self {
        Self {
            section_tag: "section".to_string(),
            content_attr: "subscriptions-section".to_string(),
            content_value: "content".to_string(),
            encrypted_attr: "encrypted".to_string(),
            require_root_attributes: true,
        }
    }
}

impl SectionRules {
    /// Whether `id` is a protected section under these rules.
    pub fn is_protected(&self, doc: &Document, id: NodeId) -> bool {
        let Some(el) = doc.element(id) else {
            return false;
        };
        el.name == self.section_tag
            && el.attr(&self.content_attr) == Some(self.content_value.as_str())
            && el.has_attr(&self.encrypted_attr)
    }
}

/// The root `html` element, if it satisfies the root rules.
fn document_root(doc: &Document, rules: &SectionRules) -> Option<NodeId> {
    let root = doc.root_element()?;
    let el = doc.element(root)?;
    if el.name != "html" || (rules.require_root_attributes && el.attrs.is_empty()) {
        return None;
    }
    Some(root)
}

/// The `body` element under the document root.
pub fn content_region(doc: &Document, rules: &SectionRules) -> Option<NodeId> {
    document_root(doc, rules).and_then(|root| doc.child_element(root, "body"))
}

/// The `head` element under the document root.
pub fn metadata_region(doc: &Document, rules: &SectionRules) -> Option<NodeId> {
    document_root(doc, rules).and_then(|root| doc.child_element(root, "head"))
}

/// Find every protected section under the content region, in document order.
///
/// A protected section's subtree is not searched: any section nested inside
/// it is sealed along with its parent. Returns an empty list when the
/// document has no usable root or body.
pub fn locate_sections(doc: &Document, rules: &SectionRules) -> Vec<NodeId> {
    let Some(body) = content_region(doc, rules) else {
        tracing::warn!("document has no usable root/body, no sections located");
        return Vec::new();
    };

    let mut found = Vec::new();
    let mut stack = vec![body];
    while let Some(id) = stack.pop() {
        if rules.is_protected(doc, id) {
            found.push(id);
            continue;
        }
        stack.extend(doc.children(id).iter().rev().copied());
    }

    tracing::debug!(count = found.len(), "located protected sections");
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderMode;

    fn wrap(body: &str) -> String {
        format!("<html amp><head></head><body>{body}</body></html>")
    }

    #[test]
    fn test_locates_qualifying_section() {
        let doc = Document::parse(&wrap(
            r#"<section subscriptions-section="content" encrypted><p>paid</p></section>"#,
        ))
        .unwrap();

        let found = locate_sections(&doc, &SectionRules::default());
        assert_eq!(found.len(), 1);
        assert_eq!(doc.render(found[0], RenderMode::Inner), "<p>paid</p>");
    }

    #[test]
    fn test_predicate_requires_both_attributes() {
        let doc = Document::parse(&wrap(concat!(
            r#"<section subscriptions-section="content"><p>a</p></section>"#,
            r#"<section encrypted><p>b</p></section>"#,
            r#"<section subscriptions-section="content-not-granted" encrypted><p>c</p></section>"#,
            r#"<div subscriptions-section="content" encrypted><p>d</p></div>"#,
        )))
        .unwrap();

        assert!(locate_sections(&doc, &SectionRules::default()).is_empty());
    }

    #[test]
    fn test_encrypted_value_is_irrelevant() {
        let doc = Document::parse(&wrap(
            r#"<section encrypted="false" subscriptions-section="content">x</section>"#,
        ))
        .unwrap();

        assert_eq!(locate_sections(&doc, &SectionRules::default()).len(), 1);
    }

    #[test]
    fn test_deeply_nested_sections_in_document_order() {
        let doc = Document::parse(&wrap(concat!(
            r#"<div><section subscriptions-section="content" encrypted id="1">a</section></div>"#,
            r#"<article><div><section subscriptions-section="content" encrypted id="2">b</section></div></article>"#,
        )))
        .unwrap();

        let found = locate_sections(&doc, &SectionRules::default());
        let ids: Vec<_> = found
            .iter()
            .map(|&n| doc.element(n).unwrap().attr("id").unwrap())
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_nested_protected_section_sealed_with_parent() {
        let doc = Document::parse(&wrap(concat!(
            r#"<section subscriptions-section="content" encrypted id="outer">"#,
            r#"<section subscriptions-section="content" encrypted id="inner">x</section>"#,
            r#"</section>"#,
        )))
        .unwrap();

        let found = locate_sections(&doc, &SectionRules::default());
        assert_eq!(found.len(), 1);
        assert_eq!(doc.element(found[0]).unwrap().attr("id"), Some("outer"));
    }

    #[test]
    fn test_sections_in_head_are_ignored() {
        let doc = Document::parse(
            r#"<html amp><head><template><section subscriptions-section="content" encrypted>x</section></template></head><body></body></html>"#,
        )
        .unwrap();

        assert!(locate_sections(&doc, &SectionRules::default()).is_empty());
    }

    #[test]
    fn test_root_without_attributes() {
        let html = r#"<html><head></head><body><section subscriptions-section="content" encrypted>x</section></body></html>"#;
        let doc = Document::parse(html).unwrap();

        assert!(locate_sections(&doc, &SectionRules::default()).is_empty());
        assert!(metadata_region(&doc, &SectionRules::default()).is_none());

        let relaxed = SectionRules {
            require_root_attributes: false,
            ..SectionRules::default()
        };
        assert_eq!(locate_sections(&doc, &relaxed).len(), 1);
        assert!(metadata_region(&doc, &relaxed).is_some());
    }

    #[test]
    fn test_custom_rules() {
        let rules = SectionRules {
            section_tag: "div".to_string(),
            content_attr: "data-paywall".to_string(),
            content_value: "yes".to_string(),
            encrypted_attr: "data-seal".to_string(),
            require_root_attributes: false,
        };
        let doc = Document::parse(
            r#"<div data-paywall="yes" data-seal>a</div><section subscriptions-section="content" encrypted>b</section>"#,
        )
        .unwrap();

        let found = locate_sections(&doc, &rules);
        assert_eq!(found.len(), 1);
        assert_eq!(doc.text_content(found[0]), "a");
    }

    #[test]
    fn test_rules_deserialize_with_defaults() {
        let rules: SectionRules =
            serde_json::from_str(r#"{"section_tag": "article"}"#).unwrap();

        assert_eq!(rules.section_tag, "article");
        assert_eq!(rules.content_attr, "subscriptions-section");
        assert!(rules.require_root_attributes);
    }
}
