use crate::dom::node::NodeHandle;
use crate::dom::parser;
use crate::dom::selector::{Selector, SelectorSyntaxError};

/// Index of a node inside its [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Document,
    Doctype(String),
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercase.
    pub(crate) tag: String,
    /// Lowercase names, source order. Repeated names are kept.
    pub(crate) attrs: Vec<(String, String)>,
}

impl Element {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attrs(&self) -> &[(String, String)] {
        &self.attrs
    }

    /// First value of `name` (case-insensitive).
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class")
            .unwrap_or_default()
            .split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) data: NodeData,
}

/// An immutable parsed HTML tree.
///
/// Nodes live in one arena and refer to each other by [`NodeId`], so the
/// tree has no reference cycles and dropping it is flat regardless of
/// nesting depth. Handles borrow the document.
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) nodes: Vec<Node>,
}

impl Document {
    /// Parse markup. Never fails: malformed input yields a best-effort tree.
    pub fn parse(markup: &str) -> Document {
        parser::parse_document(markup)
    }

    pub(crate) fn empty() -> Document {
        Document {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            }],
        }
    }

    pub(crate) fn append(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            data,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Append text to `parent`, merging with a trailing text child.
    pub(crate) fn append_text(&mut self, parent: NodeId, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(&last) = self.nodes[parent.0].children.last() {
            if let NodeData::Text(existing) = &mut self.nodes[last.0].data {
                existing.push_str(text);
                return;
            }
        }
        self.append(parent, NodeData::Text(text.to_string()));
    }

    pub fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    /// Handle on the document node.
    pub fn root(&self) -> NodeHandle<'_> {
        NodeHandle::new(self, self.root_id())
    }

    pub fn node(&self, id: NodeId) -> Option<NodeHandle<'_>> {
        (id.0 < self.nodes.len()).then(|| NodeHandle::new(self, id))
    }

    /// Number of nodes, the document node included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when parsing produced nothing but the document node.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Every element matching `selector`, in document order.
    pub fn select(&self, selector: &str) -> Result<Vec<NodeHandle<'_>>, SelectorSyntaxError> {
        self.root().select(selector)
    }

    /// Like [`select`](Self::select) with an already parsed selector.
    pub fn select_parsed(&self, selector: &Selector) -> Vec<NodeHandle<'_>> {
        self.root().select_parsed(selector)
    }

    /// Concatenated text of the whole document.
    pub fn text(&self) -> String {
        self.root().text()
    }

    /// Serialized markup of the whole document.
    pub fn html(&self) -> String {
        self.root().html()
    }

    pub(crate) fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    pub(crate) fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    pub(crate) fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub(crate) fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Nearest ancestor that is an element.
    pub(crate) fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|p| self.element(*p).is_some())
    }

    /// Descendants of `scope` in document order, `scope` excluded.
    pub(crate) fn descendants(&self, scope: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(scope).to_vec();
        stack.reverse();
        Descendants { doc: self, stack }
    }
}

/// Pre-order walk with an explicit stack.
pub(crate) struct Descendants<'a> {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_text_merges() {
        let mut doc = Document::empty();
        let root = doc.root_id();
        doc.append_text(root, "a");
        doc.append_text(root, "b");
        assert_eq!(doc.children(root).len(), 1);
        assert_eq!(doc.data(doc.children(root)[0]), &NodeData::Text("ab".into()));
    }

    #[test]
    fn test_descendants_preorder() {
        let doc = Document::parse("<a><b></b><c><d></d></c></a><e></e>");
        let tags: Vec<_> = doc
            .descendants(doc.root_id())
            .filter_map(|id| doc.element(id).map(|e| e.tag().to_string()))
            .collect();
        assert_eq!(tags, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_element_classes() {
        let doc = Document::parse(r#"<p class=" x  y ">t</p>"#);
        let p = doc.descendants(doc.root_id()).next().unwrap();
        let el = doc.element(p).unwrap();
        assert!(el.has_class("x"));
        assert!(el.has_class("y"));
        assert!(!el.has_class("x y"));
    }

    #[test]
    fn test_empty_document() {
        assert!(Document::parse("").is_empty());
        assert!(!Document::parse("text").is_empty());
    }
}
