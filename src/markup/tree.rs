//! Arena-backed document tree produced by the loader.
//!
//! Nodes are stored in a flat vector in the order they were opened, so a
//! node id doubles as its document position: comparing ids compares
//! document order.

use regex::Regex;

use super::Encoding;

/// Index of a node inside a [`Document`].
pub type NodeId = usize;

/// Elements that start a new line of text when flattened.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "footer",
    "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "ol", "p", "pre", "section",
    "table", "tbody", "td", "th", "thead", "tr", "ul",
];

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Element {
        name: String,
        attrs: Vec<(String, String)>,
        children: Vec<NodeId>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: NodeKind,
}

/// A parsed export document.
///
/// Built once by [`load_str`](super::load_str) or
/// [`load_bytes`](super::load_bytes) and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub(crate) nodes: Vec<Node>,
    pub(crate) roots: Vec<NodeId>,
    pub(crate) encoding: Encoding,
    pub(crate) recoveries: Vec<String>,
}

impl Document {
    /// Returns the encoding the document was decoded with.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Returns descriptions of structural irregularities the loader repaired.
    pub fn recoveries(&self) -> &[String] {
        &self.recoveries
    }

    /// Total number of nodes (elements and text).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of element nodes.
    pub fn element_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::Element { .. }))
            .count()
    }

    /// Returns a handle to the element with the given id, if it is one.
    pub fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        match self.nodes.get(id)?.kind {
            NodeKind::Element { .. } => Some(ElementRef { doc: self, id }),
            NodeKind::Text(_) => None,
        }
    }

    /// Top-level node ids in document order.
    pub fn root_ids(&self) -> &[NodeId] {
        &self.roots
    }

    /// Iterates over every element in document order.
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> + '_ {
        Descendants::new(self, self.roots.iter().rev().copied().collect())
    }

    pub(crate) fn children_of(&self, id: NodeId) -> &[NodeId] {
        match &self.nodes[id].kind {
            NodeKind::Element { children, .. } => children,
            NodeKind::Text(_) => &[],
        }
    }
}

/// A borrowed handle to an element node.
#[derive(Debug, Clone, Copy)]
pub struct ElementRef<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl PartialEq for ElementRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.doc, other.doc)
    }
}

impl Eq for ElementRef<'_> {}

impl<'a> ElementRef<'a> {
    /// The node id, which is also the element's document position.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The owning document.
    pub fn document(&self) -> &'a Document {
        self.doc
    }

    fn parts(&self) -> (&'a str, &'a [(String, String)], &'a [NodeId]) {
        match &self.doc.nodes[self.id].kind {
            NodeKind::Element {
                name,
                attrs,
                children,
            } => (name, attrs, children),
            NodeKind::Text(_) => ("", &[], &[]),
        }
    }

    /// Lowercased tag name.
    pub fn name(&self) -> &'a str {
        self.parts().0
    }

    /// Returns `true` if the tag name is one of `names`.
    pub fn is_any(&self, names: &[&str]) -> bool {
        names.contains(&self.name())
    }

    /// Returns the value of an attribute (names are lowercased).
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.parts()
            .1
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the first non-blank value among `names`.
    pub fn first_attr(&self, names: &[&str]) -> Option<&'a str> {
        names
            .iter()
            .filter_map(|n| self.attr(n))
            .find(|v| !v.trim().is_empty())
    }

    /// Iterates over the whitespace-separated class tokens.
    pub fn classes(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    /// Returns `true` if the element carries `class` (ASCII case-insensitive).
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c.eq_ignore_ascii_case(class))
    }

    /// Returns `true` if any class token matches `pattern`.
    pub fn class_matches(&self, pattern: &Regex) -> bool {
        self.classes().any(|c| pattern.is_match(c))
    }

    /// The parent element, if any.
    pub fn parent(&self) -> Option<ElementRef<'a>> {
        let parent = self.doc.nodes[self.id].parent?;
        self.doc.element(parent)
    }

    /// Returns `true` if `self` is a strict ancestor of `other`.
    pub fn contains(&self, other: &ElementRef<'_>) -> bool {
        let mut cursor = self.doc.nodes.get(other.id).and_then(|n| n.parent);
        while let Some(id) = cursor {
            if id == self.id {
                return true;
            }
            cursor = self.doc.nodes[id].parent;
        }
        false
    }

    /// Direct element children in document order.
    pub fn children(&self) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        let doc = self.doc;
        self.parts().2.iter().filter_map(move |&id| doc.element(id))
    }

    /// All descendant elements in document order, excluding `self`.
    pub fn descendants(&self) -> Descendants<'a> {
        Descendants::new(self.doc, self.parts().2.iter().rev().copied().collect())
    }

    /// First descendant matching `predicate`.
    pub fn find(&self, mut predicate: impl FnMut(&ElementRef<'a>) -> bool) -> Option<ElementRef<'a>> {
        self.descendants().find(|el| predicate(el))
    }

    /// Flattened text content.
    ///
    /// Block-level boundaries and `<br>` become whitespace so words in
    /// adjacent blocks do not run together. Whitespace is not collapsed.
    pub fn text(&self) -> String {
        self.text_excluding(&[])
    }

    /// Flattened text content, skipping the subtrees rooted at `skip`.
    pub fn text_excluding(&self, skip: &[NodeId]) -> String {
        let mut out = String::new();
        self.collect_text(self.id, skip, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, skip: &[NodeId], out: &mut String) {
        match &self.doc.nodes[id].kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { name, children, .. } => {
                let block = BLOCK_ELEMENTS.contains(&name.as_str());
                if block {
                    out.push(' ');
                }
                for &child in children {
                    if !skip.contains(&child) {
                        self.collect_text(child, skip, out);
                    }
                }
                if block {
                    out.push(' ');
                }
            }
        }
    }
}

/// Pre-order iterator over descendant elements.
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl<'a> Descendants<'a> {
    fn new(doc: &'a Document, stack: Vec<NodeId>) -> Self {
        Self { doc, stack }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = ElementRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            if let NodeKind::Element { children, .. } = &self.doc.nodes[id].kind {
                self.stack.extend(children.iter().rev());
                return Some(ElementRef { doc: self.doc, id });
            }
        }
        None
    }
}
