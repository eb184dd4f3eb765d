use crate::dom::document::{Document, NodeData, NodeId};
use crate::dom::parser::{is_raw_text_element, is_void_element};
use crate::dom::selector::{Selector, SelectorSyntaxError};
use std::fmt;

/// A borrowed view of one node in a [`Document`].
///
/// Handles are `Copy` and cannot outlive the document they point into.
#[derive(Clone, Copy)]
pub struct NodeHandle<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> NodeHandle<'a> {
    pub(crate) fn new(doc: &'a Document, id: NodeId) -> Self {
        Self { doc, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    pub fn data(&self) -> &'a NodeData {
        self.doc.data(self.id)
    }

    pub fn is_element(&self) -> bool {
        self.doc.element(self.id).is_some()
    }

    /// Lowercase tag name, or `None` for non-element nodes.
    pub fn tag(&self) -> Option<&'a str> {
        self.doc.element(self.id).map(|e| e.tag())
    }

    /// First value of attribute `name`. `None` when absent or when this is
    /// not an element.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.doc.element(self.id).and_then(|e| e.attr(name))
    }

    pub fn attrs(&self) -> &'a [(String, String)] {
        self.doc.element(self.id).map_or(&[], |e| e.attrs())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.doc.element(self.id).is_some_and(|e| e.has_class(class))
    }

    pub fn parent(&self) -> Option<NodeHandle<'a>> {
        self.doc
            .parent(self.id)
            .map(|id| NodeHandle::new(self.doc, id))
    }

    /// Direct children of any kind, in order.
    pub fn children(&self) -> impl Iterator<Item = NodeHandle<'a>> + 'a {
        let doc = self.doc;
        doc.children(self.id)
            .iter()
            .map(move |&id| NodeHandle::new(doc, id))
    }

    /// Direct children that are elements.
    pub fn element_children(&self) -> impl Iterator<Item = NodeHandle<'a>> + 'a {
        self.children().filter(NodeHandle::is_element)
    }

    /// Concatenated text of all descendant text nodes, in document order.
    pub fn text(&self) -> String {
        if let NodeData::Text(t) = self.data() {
            return t.clone();
        }
        let mut out = String::new();
        for id in self.doc.descendants(self.id) {
            if let NodeData::Text(t) = self.doc.data(id) {
                out.push_str(t);
            }
        }
        out
    }

    /// Markup of the children (inner HTML).
    pub fn html(&self) -> String {
        let mut out = String::new();
        serialize(self.doc, self.doc.children(self.id), &mut out);
        out
    }

    /// Markup of this node including its own tags.
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        serialize(self.doc, std::slice::from_ref(&self.id), &mut out);
        out
    }

    /// Descendants matching `selector`, in document order.
    pub fn select(&self, selector: &str) -> Result<Vec<NodeHandle<'a>>, SelectorSyntaxError> {
        let selector = Selector::parse(selector)?;
        Ok(self.select_parsed(&selector))
    }

    pub fn select_parsed(&self, selector: &Selector) -> Vec<NodeHandle<'a>> {
        selector.select(self.doc, self.id)
    }

    /// First descendant matching `selector`.
    pub fn select_first(&self, selector: &str) -> Result<Option<NodeHandle<'a>>, SelectorSyntaxError> {
        let selector = Selector::parse(selector)?;
        Ok(selector.select_first(self.doc, self.id))
    }
}

impl PartialEq for NodeHandle<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl Eq for NodeHandle<'_> {}

impl fmt::Debug for NodeHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("NodeHandle");
        s.field("id", &self.id.index());
        match self.data() {
            NodeData::Element(e) => s.field("tag", &e.tag()),
            NodeData::Text(t) => s.field("text", t),
            NodeData::Comment(c) => s.field("comment", c),
            NodeData::Doctype(d) => s.field("doctype", d),
            NodeData::Document => s.field("document", &true),
        };
        s.finish()
    }
}

enum Step {
    Open(NodeId),
    Close(NodeId),
}

fn serialize(doc: &Document, roots: &[NodeId], out: &mut String) {
    let mut stack: Vec<Step> = roots.iter().rev().map(|&id| Step::Open(id)).collect();

    while let Some(step) = stack.pop() {
        let id = match step {
            Step::Close(id) => {
                if let Some(el) = doc.element(id) {
                    out.push_str("</");
                    out.push_str(el.tag());
                    out.push('>');
                }
                continue;
            }
            Step::Open(id) => id,
        };

        match doc.data(id) {
            NodeData::Document => {
                stack.extend(doc.children(id).iter().rev().map(|&c| Step::Open(c)));
            }
            NodeData::Doctype(d) => {
                out.push_str("<!DOCTYPE ");
                out.push_str(d);
                out.push('>');
            }
            NodeData::Comment(c) => {
                out.push_str("<!--");
                out.push_str(c);
                out.push_str("-->");
            }
            NodeData::Text(t) => {
                let raw = doc
                    .parent(id)
                    .and_then(|p| doc.element(p))
                    .is_some_and(|el| is_raw_text_element(el.tag()));
                if raw {
                    out.push_str(t);
                } else {
                    escape_into(t, false, out);
                }
            }
            NodeData::Element(el) => {
                out.push('<');
                out.push_str(el.tag());
                for (name, value) in el.attrs() {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_into(value, true, out);
                    out.push('"');
                }
                out.push('>');
                if !is_void_element(el.tag()) {
                    stack.push(Step::Close(id));
                    stack.extend(doc.children(id).iter().rev().map(|&c| Step::Open(c)));
                }
            }
        }
    }
}

fn escape_into(s: &str, attribute: bool, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outer_and_inner_html() {
        let doc = Document::parse(r#"<div id="a"><b>x &amp; y</b><br></div>"#);
        let div = doc.select("#a").unwrap()[0];
        assert_eq!(div.html(), "<b>x &amp; y</b><br>");
        assert_eq!(div.outer_html(), r#"<div id="a"><b>x &amp; y</b><br></div>"#);
    }

    #[test]
    fn test_attribute_escaping() {
        let doc = Document::parse(r#"<a title='say "hi" & go'>t</a>"#);
        let a = doc.select("a").unwrap()[0];
        assert_eq!(a.attr("title"), Some("say \"hi\" & go"));
        assert_eq!(
            a.outer_html(),
            r#"<a title="say &quot;hi&quot; &amp; go">t</a>"#
        );
    }

    #[test]
    fn test_script_serialized_raw() {
        let doc = Document::parse("<script>a < b && c</script>");
        let script = doc.select("script").unwrap()[0];
        assert_eq!(script.html(), "a < b && c");
    }

    #[test]
    fn test_parent_and_children() {
        let doc = Document::parse("<ul><li>a</li><!--c--><li>b</li></ul>");
        let ul = doc.select("ul").unwrap()[0];
        assert_eq!(ul.children().count(), 3);
        assert_eq!(ul.element_children().count(), 2);
        let li = ul.element_children().next().unwrap();
        assert_eq!(li.parent(), Some(ul));
        assert_eq!(ul.parent().map(|p| p.is_element()), Some(false));
    }

    #[test]
    fn test_non_element_accessors() {
        let doc = Document::parse("just text");
        let text = doc.root().children().next().unwrap();
        assert_eq!(text.tag(), None);
        assert_eq!(text.attr("id"), None);
        assert!(text.attrs().is_empty());
        assert_eq!(text.text(), "just text");
    }
}
