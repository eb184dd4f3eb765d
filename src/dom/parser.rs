//! Tolerant HTML tree builder.
//!
//! This is not a conforming HTML5 parser. It recovers from the mistakes
//! real pages make and never rejects input:
//!
//! - an end tag closes the nearest open element with that name and every
//!   element opened after it; an end tag with no open match is ignored
//! - void elements (`br`, `img`, ...) and `<x/>` never take children
//! - `script` and `style` content is raw text up to the matching end tag
//! - `p`, `li`, `dt`/`dd`, `option`, `tr` and `td`/`th` are closed
//!   implicitly by a following sibling that cannot nest inside them
//! - elements still open at end of input are closed there
//!
//! The builder is iterative, so nesting depth is bounded only by memory.

use crate::dom::document::{Document, Element, NodeData, NodeId};
use std::borrow::Cow;
use std::collections::HashMap;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Start tags that close an open `<p>`.
const CLOSES_P: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "dialog", "div", "dl", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hgroup", "hr", "main", "menu", "nav", "ol", "p", "pre", "section", "table", "ul",
];

/// Elements an implicit close never looks past.
const SCOPE_BOUNDARIES: &[&str] = &[
    "applet", "button", "caption", "html", "marquee", "object", "table", "td", "template", "th",
];

pub(crate) fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

pub(crate) fn is_raw_text_element(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

struct TreeBuilder {
    doc: Document,
    /// Open elements; index 0 is the document node and is never popped.
    open: Vec<NodeId>,
    /// How many elements of each tag are on `open`.
    open_counts: HashMap<String, usize>,
}

impl TreeBuilder {
    fn current(&self) -> NodeId {
        self.open.last().copied().unwrap_or(self.doc.root_id())
    }

    fn open_tag(&self, idx: usize) -> &str {
        self.doc.element(self.open[idx]).map_or("", Element::tag)
    }

    fn is_open(&self, tag: &str) -> bool {
        self.open_counts.get(tag).is_some_and(|&n| n > 0)
    }

    fn push_open(&mut self, id: NodeId, tag: &str) {
        self.open.push(id);
        *self.open_counts.entry(tag.to_string()).or_default() += 1;
    }

    /// Pop every element at or above `idx`.
    fn pop_to(&mut self, idx: usize) {
        while self.open.len() > idx.max(1) {
            let Some(id) = self.open.pop() else { break };
            if let Some(el) = self.doc.element(id) {
                if let Some(n) = self.open_counts.get_mut(el.tag()) {
                    *n = n.saturating_sub(1);
                }
            }
        }
    }

    /// Position of the nearest open `targets` element, not looking past a
    /// scope boundary or any tag in `extra_boundaries`.
    fn find_in_scope(&self, targets: &[&str], extra_boundaries: &[&str]) -> Option<usize> {
        if !targets.iter().any(|t| self.is_open(t)) {
            return None;
        }
        for idx in (1..self.open.len()).rev() {
            let tag = self.open_tag(idx);
            if targets.contains(&tag) {
                return Some(idx);
            }
            if SCOPE_BOUNDARIES.contains(&tag) || extra_boundaries.contains(&tag) {
                return None;
            }
        }
        None
    }

    fn close_implied(&mut self, tag: &str) {
        let found = match tag {
            "li" => self.find_in_scope(&["li"], &["ul", "ol"]),
            "dt" | "dd" => self.find_in_scope(&["dt", "dd"], &["dl"]),
            "tr" => {
                // A new row also ends the open cell.
                if let Some(idx) = self.find_in_scope(&["td", "th"], &["tr"]) {
                    self.pop_to(idx);
                }
                self.find_in_scope(&["tr"], &["tbody", "thead", "tfoot"])
            }
            "td" | "th" => self.find_in_scope(&["td", "th"], &["tr"]),
            "option" => (self.open_tag(self.open.len() - 1) == "option").then(|| self.open.len() - 1),
            _ => None,
        };
        if let Some(idx) = found {
            self.pop_to(idx);
        }
        if CLOSES_P.contains(&tag) {
            if let Some(idx) = self.find_in_scope(&["p"], &[]) {
                self.pop_to(idx);
            }
        }
    }

    fn start_tag(&mut self, tag: StartTag) -> NodeId {
        self.close_implied(&tag.name);
        let keep_open = !tag.self_closing && !is_void_element(&tag.name);
        let parent = self.current();
        let id = self.doc.append(
            parent,
            NodeData::Element(Element {
                tag: tag.name.clone(),
                attrs: tag.attrs,
            }),
        );
        if keep_open {
            self.push_open(id, &tag.name);
        }
        id
    }

    fn end_tag(&mut self, name: &str) {
        if !self.is_open(name) {
            return;
        }
        if let Some(idx) = (1..self.open.len()).rev().find(|&i| self.open_tag(i) == name) {
            self.pop_to(idx);
        }
    }

    fn text(&mut self, raw: &str) {
        let parent = self.current();
        self.doc.append_text(parent, &decode_entities(raw));
    }

    fn comment(&mut self, body: &str) {
        let parent = self.current();
        self.doc.append(parent, NodeData::Comment(body.to_string()));
    }

    fn doctype(&mut self, body: &str) {
        let parent = self.current();
        self.doc.append(parent, NodeData::Doctype(body.to_string()));
    }
}

pub(crate) fn parse_document(markup: &str) -> Document {
    let mut builder = TreeBuilder {
        doc: Document::empty(),
        open: Vec::new(),
        open_counts: HashMap::new(),
    };
    builder.open.push(builder.doc.root_id());

    let bytes = markup.as_bytes();
    let len = bytes.len();
    let mut i = 0;

    while i < len {
        if bytes[i] != b'<' {
            let start = i;
            i = find_byte(bytes, i, b'<').unwrap_or(len);
            builder.text(&markup[start..i]);
            continue;
        }

        if starts_with_at(bytes, i, b"<!--") {
            let body_start = i + 4;
            let (body_end, next) = match find_subslice(bytes, body_start, b"-->") {
                Some(end) => (end, end + 3),
                None => (len, len),
            };
            builder.comment(&markup[body_start..body_end]);
            i = next;
            continue;
        }

        match bytes.get(i + 1) {
            Some(b'!') | Some(b'?') => {
                let end = find_byte(bytes, i + 2, b'>').unwrap_or(len);
                let inner = &markup[i + 2..end];
                if inner
                    .get(..7)
                    .is_some_and(|kw| kw.eq_ignore_ascii_case("doctype"))
                {
                    builder.doctype(inner[7..].trim());
                }
                // Other markup declarations and processing instructions are dropped.
                i = (end + 1).min(len);
            }
            Some(b'/') => match bytes.get(i + 2) {
                Some(c) if c.is_ascii_alphabetic() => {
                    let (name, after_name) = read_tag_name(markup, i + 2);
                    builder.end_tag(&name);
                    i = find_byte(bytes, after_name, b'>').map_or(len, |e| e + 1);
                }
                Some(b'>') => i += 3,
                _ => {
                    builder.text("<");
                    i += 1;
                }
            },
            Some(c) if c.is_ascii_alphabetic() => {
                let tag = parse_start_tag(markup, i);
                i = tag.next;
                let raw_text = is_raw_text_element(&tag.name) && !tag.self_closing;
                let name = tag.name.clone();
                let id = builder.start_tag(tag);

                if raw_text {
                    let (content_end, next) = match find_end_tag(bytes, i, name.as_bytes()) {
                        Some(close) => (
                            close,
                            find_byte(bytes, close, b'>').map_or(len, |e| e + 1),
                        ),
                        None => (len, len),
                    };
                    builder.doc.append_text(id, &markup[i..content_end]);
                    builder.end_tag(&name);
                    i = next;
                }
            }
            _ => {
                builder.text("<");
                i += 1;
            }
        }
    }

    builder.doc
}

struct StartTag {
    name: String,
    attrs: Vec<(String, String)>,
    self_closing: bool,
    next: usize,
}

fn is_tag_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.')
}

fn read_tag_name(markup: &str, at: usize) -> (String, usize) {
    let bytes = markup.as_bytes();
    let mut i = at;
    while i < bytes.len() && is_tag_name_char(bytes[i]) {
        i += 1;
    }
    (markup[at..i].to_ascii_lowercase(), i)
}

/// Parse `<name attr=value ...>` starting at `at` (the `<`). An
/// unterminated tag runs to end of input.
fn parse_start_tag(markup: &str, at: usize) -> StartTag {
    let bytes = markup.as_bytes();
    let len = bytes.len();
    let (name, mut i) = read_tag_name(markup, at + 1);
    let mut attrs = Vec::new();
    let mut self_closing = false;

    loop {
        skip_ws(bytes, &mut i);
        if i >= len {
            break;
        }
        match bytes[i] {
            b'>' => {
                i += 1;
                break;
            }
            b'/' => {
                if bytes.get(i + 1) == Some(&b'>') {
                    self_closing = true;
                    i += 2;
                    break;
                }
                i += 1;
            }
            b'=' => i += 1,
            _ => {
                let name_start = i;
                while i < len
                    && !bytes[i].is_ascii_whitespace()
                    && !matches!(bytes[i], b'/' | b'>' | b'=')
                {
                    i += 1;
                }
                let attr_name = markup[name_start..i].to_ascii_lowercase();

                let mut probe = i;
                skip_ws(bytes, &mut probe);
                let value = if bytes.get(probe) == Some(&b'=') {
                    i = probe + 1;
                    skip_ws(bytes, &mut i);
                    parse_attr_value(markup, &mut i)
                } else {
                    String::new()
                };
                attrs.push((attr_name, value));
            }
        }
    }

    StartTag {
        name,
        attrs,
        self_closing,
        next: i,
    }
}

fn parse_attr_value(markup: &str, i: &mut usize) -> String {
    let bytes = markup.as_bytes();
    let len = bytes.len();
    match bytes.get(*i) {
        Some(&quote) if quote == b'"' || quote == b'\'' => {
            let start = *i + 1;
            let end = find_byte(bytes, start, quote).unwrap_or(len);
            *i = (end + 1).min(len);
            decode_entities(&markup[start..end]).into_owned()
        }
        Some(_) => {
            let start = *i;
            while *i < len && !bytes[*i].is_ascii_whitespace() && bytes[*i] != b'>' {
                *i += 1;
            }
            decode_entities(&markup[start..*i]).into_owned()
        }
        None => String::new(),
    }
}

fn skip_ws(bytes: &[u8], i: &mut usize) {
    while *i < bytes.len() && bytes[*i].is_ascii_whitespace() {
        *i += 1;
    }
}

fn starts_with_at(bytes: &[u8], at: usize, needle: &[u8]) -> bool {
    bytes.get(at..at + needle.len()) == Some(needle)
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|&b| b == needle)
        .map(|p| p + from)
}

fn find_subslice(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

/// Position of `</name` (case-insensitive) followed by a delimiter.
fn find_end_tag(bytes: &[u8], from: usize, name: &[u8]) -> Option<usize> {
    let mut at = from;
    while let Some(pos) = find_subslice(bytes, at, b"</") {
        let name_start = pos + 2;
        let matches_name = bytes
            .get(name_start..name_start + name.len())
            .is_some_and(|n| n.eq_ignore_ascii_case(name));
        let delimited = matches!(
            bytes.get(name_start + name.len()),
            None | Some(b'>') | Some(b'/') | Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r')
        );
        if matches_name && delimited {
            return Some(pos);
        }
        at = pos + 2;
    }
    None
}

/// Decode character references. Unknown or malformed references are kept
/// as written.
pub(crate) fn decode_entities(src: &str) -> Cow<'_, str> {
    if !src.contains('&') {
        return Cow::Borrowed(src);
    }

    let mut out = String::with_capacity(src.len());
    let mut rest = src;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        match decode_reference(after) {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &after[consumed..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Longest name in the `decode_reference` table. The `;` search stops
/// past it, keeping decoding linear in text without semicolons.
const MAX_ENTITY_NAME: usize = 6;

/// Decode one reference body (text after `&`). Returns the character and
/// how many bytes were consumed, including a trailing `;`.
fn decode_reference(s: &str) -> Option<(char, usize)> {
    if let Some(num) = s.strip_prefix('#') {
        let (digits, radix, prefix) = match num.strip_prefix(['x', 'X']) {
            Some(hex) => (hex, 16, 2),
            None => (num, 10, 1),
        };
        let is_digit = |b: &u8| {
            if radix == 16 {
                b.is_ascii_hexdigit()
            } else {
                b.is_ascii_digit()
            }
        };
        let count = digits.bytes().take_while(is_digit).count();
        if count == 0 {
            return None;
        }
        let value = u32::from_str_radix(&digits[..count], radix).ok();
        let ch = value
            .filter(|&v| v != 0)
            .and_then(char::from_u32)
            .unwrap_or('\u{FFFD}');
        let semicolon = usize::from(digits[count..].starts_with(';'));
        return Some((ch, prefix + count + semicolon));
    }

    let end = s
        .bytes()
        .take(MAX_ENTITY_NAME + 1)
        .position(|b| b == b';')?;
    let name = &s[..end];
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{00A0}',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        "hellip" => '…',
        "mdash" => '—',
        "ndash" => '–',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "laquo" => '«',
        "raquo" => '»',
        "middot" => '·',
        "bull" => '•',
        "euro" => '€',
        "pound" => '£',
        "yen" => '¥',
        "times" => '×',
        "divide" => '÷',
        _ => return None,
    };
    Some((ch, end + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(doc: &Document) -> Vec<String> {
        doc.descendants(doc.root_id())
            .filter_map(|id| doc.element(id).map(|e| e.tag().to_string()))
            .collect()
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&lt;p&gt;"), "<p>");
        assert_eq!(decode_entities("&#65;&#x42;&#X43;"), "ABC");
        assert_eq!(decode_entities("&#65"), "A");
        assert_eq!(decode_entities("AT&T"), "AT&T");
        assert_eq!(decode_entities("&unknown;"), "&unknown;");
        assert_eq!(decode_entities("&#0;"), "\u{FFFD}");
        assert!(matches!(decode_entities("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_decode_entities_bounded_name_scan() {
        assert_eq!(decode_entities("&hellip;&middot;&divide;"), "\u{2026}\u{b7}\u{f7}");
        assert_eq!(decode_entities("&toolongname;"), "&toolongname;");
        assert_eq!(decode_entities("&x&amp;"), "&x&");

        let dense = "&x".repeat(200_000);
        let start = std::time::Instant::now();
        assert_eq!(decode_entities(&dense), dense);
        assert!(start.elapsed() < std::time::Duration::from_secs(2));
    }

    #[test]
    fn test_start_tag_attributes() {
        let tag = parse_start_tag(r#"<a HREF="/x?a=1&amp;b=2" data-x='y' checked id=main>"#, 0);
        assert_eq!(tag.name, "a");
        assert_eq!(
            tag.attrs,
            vec![
                ("href".to_string(), "/x?a=1&b=2".to_string()),
                ("data-x".to_string(), "y".to_string()),
                ("checked".to_string(), String::new()),
                ("id".to_string(), "main".to_string()),
            ]
        );
        assert!(!tag.self_closing);
    }

    #[test]
    fn test_self_closing_tag() {
        let tag = parse_start_tag("<b/>", 0);
        assert!(tag.self_closing);
        assert_eq!(tag.next, 4);
    }

    #[test]
    fn test_unterminated_tag_runs_to_end() {
        let doc = parse_document("<div class=\"a");
        assert_eq!(tags(&doc), vec!["div"]);
    }

    #[test]
    fn test_li_implicitly_closed() {
        let doc = parse_document("<ul><li>a<li>b<li>c</ul>");
        let ul = doc.children(doc.root_id())[0];
        assert_eq!(doc.children(ul).len(), 3);
    }

    #[test]
    fn test_nested_list_keeps_outer_li() {
        let doc = parse_document("<ul><li>a<ul><li>b</ul></li></ul>");
        let ul = doc.children(doc.root_id())[0];
        assert_eq!(doc.children(ul).len(), 1);
    }

    #[test]
    fn test_raw_text_script() {
        let doc = parse_document("<script>if (a < b && c) { x = '</div>'; }</script><p>t</p>");
        assert_eq!(tags(&doc), vec!["script", "p"]);
        let script = doc.children(doc.root_id())[0];
        let text = doc.children(script)[0];
        assert_eq!(
            doc.data(text),
            &NodeData::Text("if (a < b && c) { x = '</div>'; }".into())
        );
    }

    #[test]
    fn test_stray_lt_is_text() {
        let doc = parse_document("a < b <3");
        let text = doc.children(doc.root_id())[0];
        assert_eq!(doc.data(text), &NodeData::Text("a < b <3".into()));
    }

    #[test]
    fn test_doctype_and_comment() {
        let doc = parse_document("<!DOCTYPE html><!-- hi --><p>x</p>");
        let kids = doc.children(doc.root_id());
        assert_eq!(doc.data(kids[0]), &NodeData::Doctype("html".into()));
        assert_eq!(doc.data(kids[1]), &NodeData::Comment(" hi ".into()));
    }

    #[test]
    fn test_unclosed_comment() {
        let doc = parse_document("<p>a</p><!-- never closed");
        let kids = doc.children(doc.root_id());
        assert_eq!(doc.data(kids[1]), &NodeData::Comment(" never closed".into()));
    }

    #[test]
    fn test_non_ascii_text_and_attrs() {
        let doc = parse_document("<p title=\"héllo\">naïve — ok</p>");
        let p = doc.children(doc.root_id())[0];
        assert_eq!(doc.element(p).unwrap().attr("title"), Some("héllo"));
    }
}
