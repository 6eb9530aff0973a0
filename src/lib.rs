//! A compact, mutable XML 1.0 document tree with a hand-rolled parser and
//! serializer.
//!
//! `minixml` is aimed at configuration files, small data exchange, and
//! embedded use — not standards-perfect XML. DTD validation, XML Schema,
//! XPath, XInclude and namespace-aware processing are all out of scope.
//!
//! ```
//! use minixml::Document;
//!
//! let doc = Document::parse("<a x=\"1\"><b>hi</b></a>").unwrap();
//! let root = doc.root_element().unwrap();
//! assert_eq!(root.tag_name(), Some("a"));
//! assert_eq!(root.attribute("x"), Some("1"));
//! ```

mod cursor;
mod entity;
mod error;
pub mod io;
mod node;
mod parse;
mod scan;
mod serialize;

use std::fmt;

pub use cursor::{Encoding, TextPos};
pub use error::{Error, ErrorId};
pub use node::{Attribute, NodeId};
pub use parse::ParsingOptions;

use node::{NodeData, NodeKind};

const EMPTY_ATTRIBUTES: &[Attribute] = &[];

/// A parsed XML document: an arena of nodes plus the error state left by
/// the parse that produced it (spec §3 Document row).
#[derive(Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    last_error: Option<Error>,
    tab_size: u32,
    had_bom: bool,
}

/// The root's always-present [`NodeId`].
const ROOT: NodeId = NodeId(0);

impl Document {
    pub(crate) fn empty(tab_size: u32) -> Self {
        let root = NodeData::new(NodeKind::Document, String::new(), TextPos::default());
        Document { nodes: vec![root], last_error: None, tab_size, had_bom: false }
    }

    /// Parses `text` with default [`ParsingOptions`].
    pub fn parse(text: &str) -> Result<Document, Error> {
        Document::parse_with_options(text, ParsingOptions::default())
    }

    /// Parses `text` with the given options.
    pub fn parse_with_options(text: &str, options: ParsingOptions) -> Result<Document, Error> {
        parse::parse(text.as_bytes(), options)
    }

    /// Parses raw bytes, with encoding auto-detected from a BOM or
    /// `<?xml … encoding="…"?>` declaration (spec §9 Open Question 3).
    pub fn parse_bytes(bytes: &[u8], options: ParsingOptions) -> Result<Document, Error> {
        parse::parse(bytes, options)
    }

    /// A read cursor onto the synthetic document root.
    pub fn root(&self) -> Node<'_> {
        Node { doc: self, id: ROOT }
    }

    /// The document's single top-level Element, if parsing reached one.
    pub fn root_element(&self) -> Option<Node<'_>> {
        self.root().children().find(|n| n.node_type() == NodeType::Element)
    }

    /// The error recorded by the parse that produced this document, if any
    /// (spec §4.10, §7).
    pub fn error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// The tab size used for cursor tracking and for indentation on
    /// serialize (spec.md §9 Supplemented Features, `SetTabSize`).
    pub fn tab_size(&self) -> u32 {
        self.tab_size
    }

    /// `true` if the source began with a UTF-8 byte-order mark (spec §3
    /// Document row "BOM flag"; mirrors TinyXML's `useMicrosoftBOM`).
    pub fn has_bom(&self) -> bool {
        self.had_bom
    }

    /// A read cursor onto an arbitrary [`NodeId`] previously obtained from
    /// this document.
    pub fn get(&self, id: NodeId) -> Node<'_> {
        Node { doc: self, id }
    }

    /// Overwrites a node's `value` (tag name for Element, text for
    /// Text/Comment/Unknown).
    pub fn set_value(&mut self, id: NodeId, value: impl Into<String>) {
        self.nodes[id.get()].value = value.into();
    }

    /// Sets (inserting or replacing) an attribute on an Element node.
    /// No-op if `id` does not refer to an Element.
    pub fn set_attribute(&mut self, id: NodeId, name: impl Into<String>, value: impl Into<String>) {
        if let NodeKind::Element { attributes } = &mut self.nodes[id.get()].kind {
            attributes.set(name.into(), value.into());
        }
    }

    /// Removes an attribute by name, returning whether it was present.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> bool {
        if let NodeKind::Element { attributes } = &mut self.nodes[id.get()].kind {
            attributes.remove(name)
        } else {
            false
        }
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.get()]
    }

    pub(crate) fn push_node(&mut self, kind: NodeKind, value: String, pos: TextPos) -> NodeId {
        self.nodes.push(NodeData::new(kind, value, pos));
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.get()].parent = Some(parent);

        let prev_last = self.nodes[parent.get()].last_child;
        self.nodes[child.get()].prev_sibling = prev_last;
        self.nodes[child.get()].next_sibling = None;

        if let Some(prev_last) = prev_last {
            self.nodes[prev_last.get()].next_sibling = Some(child);
        } else {
            self.nodes[parent.get()].first_child = Some(child);
        }
        self.nodes[parent.get()].last_child = Some(child);
    }

    pub(crate) fn set_error(&mut self, error: Error) {
        self.last_error = Some(error);
    }

    pub(crate) fn set_bom(&mut self, had_bom: bool) {
        self.had_bom = had_bom;
    }

    /// Serializes this document to a new XML string (spec §4.9).
    pub fn to_xml_string(&self) -> String {
        serialize::to_string(self)
    }

    /// Serializes this document to a byte sink (spec §6: "writes to an
    /// abstract sink accepting either 'write bytes' or 'append to a
    /// growing string'").
    pub fn write_to<W: std::io::Write>(&self, w: &mut W) -> std::io::Result<()> {
        serialize::write_to(self, w)
    }
}

/// The kind of a node, without its payload — returned by [`Node::node_type`]
/// (spec §6 "convert a node to its concrete kind").
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NodeType {
    Document,
    Element,
    Text,
    Comment,
    Declaration,
    Unknown,
}

/// A read cursor into a [`Document`]'s arena (spec §6 navigation accessors).
///
/// Mirrors the teacher crate's `Node<'a, 'd>`: cheap to copy, borrows the
/// document rather than owning any data of its own.
#[derive(Clone, Copy)]
pub struct Node<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> Node<'a> {
    /// This node's arena id, stable for the lifetime of the document.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Which kind of node this is.
    pub fn node_type(&self) -> NodeType {
        match self.doc.data(self.id).kind {
            NodeKind::Document => NodeType::Document,
            NodeKind::Element { .. } => NodeType::Element,
            NodeKind::Text { .. } => NodeType::Text,
            NodeKind::Comment => NodeType::Comment,
            NodeKind::Declaration { .. } => NodeType::Declaration,
            NodeKind::Unknown => NodeType::Unknown,
        }
    }

    pub fn is_element(&self) -> bool {
        self.node_type() == NodeType::Element
    }

    pub fn is_text(&self) -> bool {
        self.node_type() == NodeType::Text
    }

    /// The tag name, for an Element; `None` otherwise.
    pub fn tag_name(&self) -> Option<&'a str> {
        match self.doc.data(self.id).kind {
            NodeKind::Element { .. } => Some(&self.doc.data(self.id).value),
            _ => None,
        }
    }

    /// The decoded text, for a Text node; `None` otherwise.
    pub fn text(&self) -> Option<&'a str> {
        match self.doc.data(self.id).kind {
            NodeKind::Text { .. } => Some(&self.doc.data(self.id).value),
            _ => None,
        }
    }

    /// `true` if this Text node came from a `<![CDATA[ … ]]>` section.
    pub fn is_cdata(&self) -> bool {
        matches!(self.doc.data(self.id).kind, NodeKind::Text { cdata: true })
    }

    /// The comment's interior text, for a Comment node; `None` otherwise.
    pub fn comment(&self) -> Option<&'a str> {
        match self.doc.data(self.id).kind {
            NodeKind::Comment => Some(&self.doc.data(self.id).value),
            _ => None,
        }
    }

    /// The verbatim contents between `<!` and `>`, for an Unknown node.
    pub fn unknown_contents(&self) -> Option<&'a str> {
        match self.doc.data(self.id).kind {
            NodeKind::Unknown => Some(&self.doc.data(self.id).value),
            _ => None,
        }
    }

    /// The `(version, encoding, standalone)` of a Declaration node.
    pub fn declaration(&self) -> Option<(Option<&'a str>, Option<&'a str>, Option<&'a str>)> {
        match &self.doc.data(self.id).kind {
            NodeKind::Declaration { version, encoding, standalone } => Some((
                version.as_deref(),
                encoding.as_deref(),
                standalone.as_deref(),
            )),
            _ => None,
        }
    }

    /// Looks up an attribute's value by name, for an Element; `None` if not
    /// an Element or the attribute is absent.
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        match &self.doc.data(self.id).kind {
            NodeKind::Element { attributes } => attributes.get(name),
            _ => None,
        }
    }

    /// Parses an attribute's value as `i64` (spec.md §9/§10 `QueryIntValue`).
    pub fn attribute_int(&self, name: &str) -> Option<i64> {
        self.attribute(name)?.parse().ok()
    }

    /// Parses an attribute's value as `f64` (spec.md §9/§10 `QueryDoubleValue`).
    pub fn attribute_float(&self, name: &str) -> Option<f64> {
        self.attribute(name)?.parse().ok()
    }

    /// Iterates this Element's attributes in source order; empty for
    /// non-Elements.
    pub fn attributes(&self) -> core::slice::Iter<'a, Attribute> {
        match &self.doc.data(self.id).kind {
            NodeKind::Element { attributes } => attributes.iter(),
            _ => EMPTY_ATTRIBUTES.iter(),
        }
    }

    /// The source row/column this node began at.
    pub fn pos(&self) -> TextPos {
        self.doc.data(self.id).pos
    }

    pub fn parent(&self) -> Option<Node<'a>> {
        self.doc.data(self.id).parent.map(|id| Node { doc: self.doc, id })
    }

    pub fn first_child(&self) -> Option<Node<'a>> {
        self.doc.data(self.id).first_child.map(|id| Node { doc: self.doc, id })
    }

    pub fn last_child(&self) -> Option<Node<'a>> {
        self.doc.data(self.id).last_child.map(|id| Node { doc: self.doc, id })
    }

    pub fn next_sibling(&self) -> Option<Node<'a>> {
        self.doc.data(self.id).next_sibling.map(|id| Node { doc: self.doc, id })
    }

    pub fn prev_sibling(&self) -> Option<Node<'a>> {
        self.doc.data(self.id).prev_sibling.map(|id| Node { doc: self.doc, id })
    }

    /// The next sibling with the given tag name, skipping anything else.
    pub fn next_sibling_by_tag(&self, name: &str) -> Option<Node<'a>> {
        let mut cur = self.next_sibling();
        while let Some(n) = cur {
            if n.tag_name() == Some(name) {
                return Some(n);
            }
            cur = n.next_sibling();
        }
        None
    }

    /// The previous sibling with the given tag name, skipping anything else.
    pub fn prev_sibling_by_tag(&self, name: &str) -> Option<Node<'a>> {
        let mut cur = self.prev_sibling();
        while let Some(n) = cur {
            if n.tag_name() == Some(name) {
                return Some(n);
            }
            cur = n.prev_sibling();
        }
        None
    }

    /// This node's first child that is an Element.
    pub fn first_element_child(&self) -> Option<Node<'a>> {
        self.children().find(|n| n.is_element())
    }

    /// Iterates direct children in source order.
    pub fn children(&self) -> Children<'a> {
        Children { next: self.first_child() }
    }

    /// Iterates direct children whose tag name matches `name`.
    pub fn children_by_tag(&self, name: &'a str) -> impl Iterator<Item = Node<'a>> {
        self.children().filter(move |n| n.tag_name() == Some(name))
    }

    /// Iterates this node and all of its descendants in document order.
    pub fn descendants(&self) -> Descendants<'a> {
        Descendants { root: *self, next: Some(*self) }
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

/// Forward iterator over a node's direct children.
pub struct Children<'a> {
    next: Option<Node<'a>>,
}

impl<'a> Iterator for Children<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Node<'a>> {
        let cur = self.next.take()?;
        self.next = cur.next_sibling();
        Some(cur)
    }
}

/// Pre-order iterator over a node and all its descendants.
pub struct Descendants<'a> {
    root: Node<'a>,
    next: Option<Node<'a>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Node<'a>> {
        let cur = self.next?;

        if let Some(child) = cur.first_child() {
            self.next = Some(child);
            return Some(cur);
        }

        let mut node = cur;
        loop {
            if node.id == self.root.id {
                self.next = None;
                break;
            }
            if let Some(sibling) = node.next_sibling() {
                self.next = Some(sibling);
                break;
            }
            match node.parent() {
                Some(parent) => node = parent,
                None => {
                    self.next = None;
                    break;
                }
            }
        }

        Some(cur)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fn write_node(node: Node, depth: usize, f: &mut fmt::Formatter) -> fmt::Result {
            writeln!(f, "{:indent$}{}", "", node_label(node), indent = depth * 2)?;
            for child in node.children() {
                write_node(child, depth + 1, f)?;
            }
            Ok(())
        }

        fn node_label(node: Node) -> String {
            match node.node_type() {
                NodeType::Document => "Document".to_string(),
                NodeType::Element => format!("Element {{ {:?} }}", node.tag_name().unwrap_or("")),
                NodeType::Text => format!("Text {{ {:?} }}", node.text().unwrap_or("")),
                NodeType::Comment => format!("Comment {{ {:?} }}", node.comment().unwrap_or("")),
                NodeType::Declaration => "Declaration".to_string(),
                NodeType::Unknown => format!("Unknown {{ {:?} }}", node.unknown_contents().unwrap_or("")),
            }
        }

        write_node(self.root(), 0, f)
    }
}
