//! HTML serialization.
//!
//! Implements the HTML fragment serialization algorithm over the arena. A
//! fragment is serialized structurally (children only), so no wrapper markup
//! has to be stripped off afterwards.

use crate::document::{Document, NodeId, NodeKind};

/// How much of a node to serialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// The node itself and everything below it.
    Outer,
    /// Only the node's children, concatenated.
    Inner,
}

/// Elements that never have content or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose parser drops one newline right after the start tag.
const LEADING_NEWLINE_ELEMENTS: &[&str] = &["listing", "pre", "textarea"];

/// Elements whose text children are emitted without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe", "noembed", "noframes", "noscript", "plaintext", "script", "style", "xmp",
];

impl Document {
    /// Serialize `id` according to `mode`.
    pub fn render(&self, id: NodeId, mode: RenderMode) -> String {
        let mut out = String::new();
        match mode {
            RenderMode::Outer => self.write_node(id, &mut out),
            RenderMode::Inner => self.write_children(id, &mut out),
        }
        out
    }

    /// Serialize the whole document.
    pub fn to_html(&self) -> String {
        self.render(self.root(), RenderMode::Outer)
    }

    fn write_children(&self, id: NodeId, out: &mut String) {
        for &child in self.children(id) {
            self.write_node(child, out);
        }
    }

    fn starts_with_newline(&self, id: NodeId) -> bool {
        self.children(id)
            .first()
            .is_some_and(|&first| matches!(self.kind(first), NodeKind::Text(text) if text.starts_with('\n')))
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            NodeKind::Document => self.write_children(id, out),
            NodeKind::Doctype {
                name,
                public_id,
                system_id,
            } => {
                out.push_str("<!DOCTYPE ");
                out.push_str(name);
                if !public_id.is_empty() {
                    out.push_str(" PUBLIC \"");
                    out.push_str(public_id);
                    out.push('"');
                    if !system_id.is_empty() {
                        out.push_str(" \"");
                        out.push_str(system_id);
                        out.push('"');
                    }
                } else if !system_id.is_empty() {
                    out.push_str(" SYSTEM \"");
                    out.push_str(system_id);
                    out.push('"');
                }
                out.push('>');
            }
            NodeKind::Element(el) => {
                out.push('<');
                out.push_str(&el.name);
                for attr in &el.attrs {
                    out.push(' ');
                    out.push_str(&attr.name);
                    out.push_str("=\"");
                    escape_into(&attr.value, true, out);
                    out.push('"');
                }
                out.push('>');

                if VOID_ELEMENTS.contains(&el.name.as_str()) {
                    return;
                }

                if LEADING_NEWLINE_ELEMENTS.contains(&el.name.as_str())
                    && self.starts_with_newline(id)
                {
                    out.push('\n');
                }

                self.write_children(id, out);
                out.push_str("</");
                out.push_str(&el.name);
                out.push('>');
            }
            NodeKind::Text(text) => {
                let raw = self
                    .parent(id)
                    .and_then(|p| self.element(p))
                    .is_some_and(|p| RAW_TEXT_ELEMENTS.contains(&p.name.as_str()));
                if raw {
                    out.push_str(text);
                } else {
                    escape_into(text, false, out);
                }
            }
            NodeKind::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeKind::ProcessingInstruction { target, data } => {
                out.push_str("<?");
                out.push_str(target);
                out.push(' ');
                out.push_str(data);
                out.push('>');
            }
        }
    }
}

fn escape_into(text: &str, attr_mode: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            '"' if attr_mode => out.push_str("&quot;"),
            '<' if !attr_mode => out.push_str("&lt;"),
            '>' if !attr_mode => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}
