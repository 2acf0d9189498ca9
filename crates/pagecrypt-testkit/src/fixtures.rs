//! HTML fixtures.
//!
//! Every document here is already in the form the serializer writes back
//! out (lowercase tags, explicit `head`/`body`, no optional-tag omission), so
//! tests can compare rendered output against fixture text byte for byte.

/// Access requirement used across tests.
pub const ACCESS_REQUIREMENT: &str = "norcal.com:premium";

/// URL path a mock key server publishes the recipient keyset on.
pub const KEYSET_PATH: &str = "/publickey";

/// A protected section with the given inner markup.
pub fn protected_section(inner: &str) -> String {
    format!(r#"<section subscriptions-section="content" encrypted="">{inner}</section>"#)
}

/// A complete AMP document with `body` as the body's inner markup.
pub fn amp_document(body: &str) -> String {
    format!(
        "<!DOCTYPE html><html amp=\"\" lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>Fixture</title></head><body>{body}</body></html>"
    )
}

/// One protected section between two public paragraphs.
pub fn single_section() -> String {
    amp_document(&format!(
        "<p>Lead paragraph.</p>{}<p>Footer.</p>",
        protected_section("<p>Subscriber-only paragraph.</p>")
    ))
}

/// Inner markup of the protected sections in [`three_of_five`].
pub const THREE_OF_FIVE_SECRETS: [&str; 3] = [
    "<p>first secret</p>",
    "<h2>second</h2><p>secret &amp; <em>escaped</em></p>",
    "<ul><li>third</li><li>secret</li></ul>",
];

/// Three protected sections and two look-alikes that must stay readable:
/// one without the `encrypted` marker, one with the wrong sentinel value.
pub fn three_of_five() -> String {
    amp_document(&format!(
        "{}<section subscriptions-section=\"content\"><p>free preview</p></section>{}\
         <section subscriptions-section=\"content-not-granted\" encrypted=\"\"><p>upsell</p></section>{}",
        protected_section(THREE_OF_FIVE_SECRETS[0]),
        protected_section(THREE_OF_FIVE_SECRETS[1]),
        protected_section(THREE_OF_FIVE_SECRETS[2]),
    ))
}

/// An AMP document with nothing to protect.
pub fn no_sections() -> String {
    amp_document("<article><h1>Free story</h1><p>Everyone can read this.</p></article>")
}

/// A protected section nested inside another.
pub fn nested_sections() -> String {
    amp_document(&protected_section(&format!(
        "<p>outer</p>{}",
        protected_section("<p>inner</p>")
    )))
}

/// A document whose root element has no attributes, so it is not treated
/// as an AMP document.
pub fn plain_document() -> String {
    format!(
        "<!DOCTYPE html><html><head><title>Plain</title></head><body>{}</body></html>",
        protected_section("<p>not sealed</p>")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecrypt_core::{Document, RenderMode};

    #[test]
    fn test_fixtures_are_serializer_stable() {
        for html in [
            single_section(),
            three_of_five(),
            no_sections(),
            nested_sections(),
            plain_document(),
        ] {
            let doc = Document::parse(&html).unwrap();
            assert_eq!(doc.render(doc.root(), RenderMode::Outer), html);
        }
    }
}
