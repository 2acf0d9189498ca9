//! Arena-backed document tree.
//!
//! The parser's reference-counted DOM is copied into a flat table of nodes
//! addressed by [`NodeId`]. Children are stored as id lists, so mutation
//! never has to juggle aliased references into the tree.

use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::error::{DocumentError, Result};

/// Index of a node inside a [`Document`] arena.
///
/// Ids are only meaningful for the document that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    pub const fn index(&self) -> usize {
        self.0
    }
}

/// A single name/value attribute pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An element: tag name plus attributes in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<Attribute>,
}

impl Element {
    /// Create an element from a tag name and `(name, value)` pairs.
    pub fn new<K, V>(name: impl Into<String>, attrs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            attrs: attrs
                .into_iter()
                .map(|(k, v)| Attribute::new(k, v))
                .collect(),
        }
    }

    /// Value of the first attribute called `name`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Whether an attribute called `name` is present, whatever its value.
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name == name)
    }
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The arena root. Exactly one per document, always `NodeId` 0.
    Document,
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
    Element(Element),
    Text(String),
    Comment(String),
    ProcessingInstruction {
        target: String,
        data: String,
    },
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A parsed HTML document.
///
/// Nodes are never freed: detaching a node only unlinks it from its parent,
/// after which it is unreachable from [`Document::root`] and is not rendered.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Parse a full HTML document.
    pub fn parse(html: &str) -> Result<Self> {
        Self::parse_with_limit(html, usize::MAX)
    }

    /// Parse a full HTML document, refusing inputs longer than `limit` bytes.
    pub fn parse_with_limit(html: &str, limit: usize) -> Result<Self> {
        if html.len() > limit {
            return Err(DocumentError::TooLarge {
                size: html.len(),
                limit,
            });
        }

        let dom = parse_document(RcDom::default(), ParseOpts::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())
            .map_err(|e| DocumentError::Parse(e.to_string()))?;

        Self::from_dom(&dom)
    }

    /// Create an empty document holding only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    fn from_dom(dom: &RcDom) -> Result<Self> {
        if !matches!(dom.document.data, NodeData::Document) {
            return Err(DocumentError::MissingDocumentNode);
        }

        let mut doc = Self::new();
        let root = doc.root();

        let mut stack: Vec<(Handle, NodeId)> = dom_children(&dom.document)
            .into_iter()
            .rev()
            .map(|h| (h, root))
            .collect();

        while let Some((handle, parent)) = stack.pop() {
            let Some(kind) = convert(&handle) else {
                continue;
            };
            let id = doc.push(kind);
            doc.append_child(parent, id);

            for child in dom_children(&handle).into_iter().rev() {
                stack.push((child, id));
            }
        }

        Ok(doc)
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────

    /// The document node.
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes ever allocated, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the document node itself is never removed.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// The element data of `id`, if it is an element.
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    /// The top-level element (normally `html`).
    pub fn root_element(&self) -> Option<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .find(|&c| self.element(c).is_some())
    }

    /// First child element of `parent` with tag `name`.
    pub fn child_element(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&c| self.element(c).is_some_and(|el| el.name == name))
    }

    /// Pre-order traversal of `id` and everything below it, in document order.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: vec![id],
        }
    }

    /// Concatenated text of all text nodes below `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter_map(|n| match self.kind(n) {
                NodeKind::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutation
    // ─────────────────────────────────────────────────────────────────────────

    /// Allocate a detached element.
    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.push(NodeKind::Element(element))
    }

    /// Allocate a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Unlink `id` from its parent.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }

    /// Unlink every child of `id`, returning them in their former order.
    pub fn remove_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for &child in &children {
            self.nodes[child.0].parent = None;
        }
        children
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator returned by [`Document::descendants`].
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}

/// Children of an rcdom node, with template contents standing in for the
/// (always empty) child list of a `<template>` element.
fn dom_children(handle: &Handle) -> Vec<Handle> {
    if let NodeData::Element {
        template_contents, ..
    } = &handle.data
    {
        if let Some(contents) = template_contents.borrow().as_ref() {
            return contents.children.borrow().clone();
        }
    }
    handle.children.borrow().clone()
}

fn convert(handle: &Handle) -> Option<NodeKind> {
    let kind = match &handle.data {
        NodeData::Document => return None,
        NodeData::Doctype {
            name,
            public_id,
            system_id,
        } => NodeKind::Doctype {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        },
        NodeData::Text { contents } => NodeKind::Text(contents.borrow().to_string()),
        NodeData::Comment { contents } => NodeKind::Comment(contents.to_string()),
        NodeData::Element { name, attrs, .. } => NodeKind::Element(Element {
            name: name.local.to_string(),
            attrs: attrs
                .borrow()
                .iter()
                .map(|a| Attribute::new(qualified_name(&a.name), a.value.to_string()))
                .collect(),
        }),
        NodeData::ProcessingInstruction { target, contents } => {
            NodeKind::ProcessingInstruction {
                target: target.to_string(),
                data: contents.to_string(),
            }
        }
    };
    Some(kind)
}

fn qualified_name(name: &QualName) -> String {
    match &name.prefix {
        Some(prefix) => format!("{}:{}", prefix, name.local),
        None => name.local.to_string(),
    }
}
