//! # pagecrypt Core
//!
//! Pure document primitives for pagecrypt: an index-arena HTML tree, a
//! structural serializer, and the protected-section locator.
//!
//! This crate contains no cryptography and no networking. It turns markup
//! into a tree that can be mutated by node id and back into markup.
//!
//! ## Key Types
//!
//! - [`Document`] - Arena-backed tree produced by the HTML parser
//! - [`NodeId`] - Index of a node inside its document's arena
//! - [`RenderMode`] - Whole-node or children-only serialization
//! - [`SectionRules`] - Tag and attribute literals identifying protected sections
//!
//! ## Usage
//!
//! ```rust
//! use pagecrypt_core::{locate_sections, Document, RenderMode, SectionRules};
//!
//! let html = r#"<html amp><head></head><body>
//!     <section subscriptions-section="content" encrypted><p>paid</p></section>
//! </body></html>"#;
//!
//! let doc = Document::parse(html).unwrap();
//! let sections = locate_sections(&doc, &SectionRules::default());
//! assert_eq!(sections.len(), 1);
//! assert_eq!(doc.render(sections[0], RenderMode::Inner), "<p>paid</p>");
//! ```

pub mod document;
pub mod error;
pub mod render;
pub mod sections;

pub use document::{Attribute, Document, Element, NodeId, NodeKind};
pub use error::{DocumentError, Result};
pub use render::RenderMode;
pub use sections::{content_region, locate_sections, metadata_region, SectionRules};
