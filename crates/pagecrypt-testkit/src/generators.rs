//! Proptest generators for property-based testing.

use proptest::prelude::*;

use crate::fixtures::amp_document;

/// Generate a tag name a section-like element might use.
pub fn candidate_tag() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        3 => Just("section"),
        1 => Just("div"),
        1 => Just("article"),
        1 => Just("aside"),
    ]
}

/// Generate a value for the content marker, mostly near misses.
pub fn sentinel_value() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        3 => Just("content"),
        1 => Just("content-not-granted"),
        1 => Just("limited-content"),
        1 => Just("Content "),
        1 => Just(""),
    ]
}

/// Plain text that serializes back unchanged.
pub fn safe_text() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 ,.]{1,40}".prop_map(String::from)
}

/// Generate inner markup that the serializer reproduces byte for byte.
pub fn section_inner() -> impl Strategy<Value = String> {
    prop::collection::vec(
        (prop_oneof![Just("p"), Just("h2"), Just("em"), Just("span")], safe_text()),
        1..4,
    )
    .prop_map(|parts| {
        parts
            .into_iter()
            .map(|(tag, text)| format!("<{tag}>{text}</{tag}>"))
            .collect()
    })
}

/// One section-like element and whether it should be sealed.
#[derive(Debug, Clone)]
pub struct CandidateSection {
    pub tag: &'static str,
    /// `None` omits the content marker entirely.
    pub sentinel: Option<&'static str>,
    pub encrypted_marker: bool,
    pub inner: String,
}

impl CandidateSection {
    /// Whether the default rules treat this as a protected section.
    pub fn qualifies(&self) -> bool {
        self.tag == "section" && self.sentinel == Some("content") && self.encrypted_marker
    }

    pub fn to_html(&self) -> String {
        let mut attrs = String::new();
        if let Some(value) = self.sentinel {
            attrs.push_str(&format!(" subscriptions-section=\"{value}\""));
        }
        if self.encrypted_marker {
            attrs.push_str(" encrypted=\"\"");
        }
        format!("<{tag}{attrs}>{inner}</{tag}>", tag = self.tag, inner = self.inner)
    }
}

impl Arbitrary for CandidateSection {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            candidate_tag(),
            prop::option::weighted(0.8, sentinel_value()),
            prop::bool::weighted(0.7),
            section_inner(),
        )
            .prop_map(|(tag, sentinel, encrypted_marker, inner)| CandidateSection {
                tag,
                sentinel,
                encrypted_marker,
                inner,
            })
            .boxed()
    }
}

/// Generate a document made of candidate sections separated by paragraphs.
pub fn candidate_document() -> impl Strategy<Value = (String, Vec<CandidateSection>)> {
    prop::collection::vec(any::<CandidateSection>(), 0..6).prop_map(|sections| {
        let body: String = sections
            .iter()
            .map(|s| format!("<p>between</p>{}", s.to_html()))
            .collect();
        (amp_document(&body), sections)
    })
}

/// Generate access-requirement strings, including characters that need
/// JSON escaping.
pub fn access_requirement() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,12}\\.com:[a-z]{1,12}".prop_map(String::from),
        "[ -~]{0,24}".prop_map(String::from),
        any::<String>(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecrypt_core::{locate_sections, Document, RenderMode, SectionRules};

    proptest! {
        #[test]
        fn test_locator_matches_predicate((html, sections) in candidate_document()) {
            let doc = Document::parse(&html).unwrap();
            let found = locate_sections(&doc, &SectionRules::default());

            let expected: Vec<&CandidateSection> = sections.iter().filter(|s| s.qualifies()).collect();
            prop_assert_eq!(found.len(), expected.len());
            for (id, section) in found.iter().zip(expected) {
                prop_assert_eq!(doc.render(*id, RenderMode::Inner), section.inner.clone());
            }
        }

        #[test]
        fn test_generated_documents_are_serializer_stable((html, _) in candidate_document()) {
            let doc = Document::parse(&html).unwrap();
            prop_assert_eq!(doc.to_html(), html);
        }
    }
}
