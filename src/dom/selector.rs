//! CSS selector subset.
//!
//! Supported:
//!
//! | Form | Meaning |
//! |------|---------|
//! | `div`, `*` | tag name (case-insensitive), any element |
//! | `#id`, `.class` | id and class, case-sensitive |
//! | `[a]`, `[a=v]`, `[a^=v]`, `[a$=v]` | attribute exists, equals, starts with, ends with |
//! | `a b`, `a > b` | descendant, child |
//! | `a, b` | selector list, results merged in document order |
//!
//! Anything else (pseudo-classes, sibling combinators, other attribute
//! operators) is a [`SelectorSyntaxError`] rather than a silent mismatch.

use crate::dom::document::{Document, Element, NodeId};
use crate::dom::node::NodeHandle;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A selector that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid selector {selector:?} at offset {offset}: {reason}")]
pub struct SelectorSyntaxError {
    pub selector: String,
    /// Byte offset into `selector`.
    pub offset: usize,
    pub reason: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrOperator {
    Exists,
    Equals(String),
    StartsWith(String),
    EndsWith(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrCondition {
    pub name: String,
    pub op: AttrOperator,
}

impl AttrCondition {
    fn matches(&self, el: &Element) -> bool {
        let Some(value) = el.attr(&self.name) else {
            return false;
        };
        match &self.op {
            AttrOperator::Exists => true,
            AttrOperator::Equals(v) => value == v,
            // An empty operand matches nothing, as in CSS.
            AttrOperator::StartsWith(v) => !v.is_empty() && value.starts_with(v.as_str()),
            AttrOperator::EndsWith(v) => !v.is_empty() && value.ends_with(v.as_str()),
        }
    }
}

/// Conditions on a single element, e.g. `a.nav[href^="/"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    pub tag: Option<String>,
    pub universal: bool,
    pub ids: Vec<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<AttrCondition>,
}

impl CompoundSelector {
    pub fn matches(&self, el: &Element) -> bool {
        self.tag.as_deref().map_or(true, |t| el.tag() == t)
            && self.ids.iter().all(|id| el.id() == Some(id.as_str()))
            && self.classes.iter().all(|c| el.has_class(c))
            && self.attrs.iter().all(|a| a.matches(el))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectorPart {
    compound: CompoundSelector,
    // Relation to the part on the left; `None` for the first part.
    combinator: Option<Combinator>,
}

/// One entry of a selector list, e.g. `ul > li a`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    parts: Vec<SelectorPart>,
}

impl ComplexSelector {
    /// Right-to-left match. The rightmost compound must match `node`; each
    /// combinator then walks the ancestor chain. Descendant steps may match
    /// any ancestor, so alternatives are explored with an explicit stack.
    ///
    /// A stack entry `(i, n)` means parts `0..i` remain to be matched above
    /// `n` using the combinator of part `i`.
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(last) = self.parts.len().checked_sub(1) else {
            return false;
        };
        if !doc
            .element(node)
            .is_some_and(|el| self.parts[last].compound.matches(el))
        {
            return false;
        }

        let mut stack = vec![(last, node)];
        let mut visited = HashSet::new();

        while let Some((idx, current)) = stack.pop() {
            if idx == 0 {
                return true;
            }
            if !visited.insert((idx, current)) {
                continue;
            }
            let left = &self.parts[idx - 1].compound;
            let matches_left =
                |id: NodeId| doc.element(id).is_some_and(|el| left.matches(el));

            match self.parts[idx].combinator {
                Some(Combinator::Child) => {
                    if let Some(parent) = doc.parent_element(current).filter(|p| matches_left(*p)) {
                        stack.push((idx - 1, parent));
                    }
                }
                Some(Combinator::Descendant) | None => {
                    // Try the nearest matching ancestor first and leave a
                    // marker to resume the walk above it if that fails.
                    let mut cursor = doc.parent_element(current);
                    while let Some(ancestor) = cursor {
                        if matches_left(ancestor) {
                            stack.push((idx, ancestor));
                            stack.push((idx - 1, ancestor));
                            break;
                        }
                        cursor = doc.parent_element(ancestor);
                    }
                }
            }
        }
        false
    }
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<ComplexSelector>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Selector, SelectorSyntaxError> {
        let mut cursor = Cursor { src: source, pos: 0 };
        let mut alternatives = Vec::new();

        loop {
            cursor.skip_ws();
            alternatives.push(parse_complex(&mut cursor)?);
            cursor.skip_ws();
            match cursor.peek() {
                None => break,
                Some(',') => cursor.bump(),
                Some(_) => return Err(cursor.error("unexpected character")),
            }
        }

        Ok(Selector {
            source: source.to_string(),
            alternatives,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True when the element `node` matches any selector in the list.
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.alternatives.iter().any(|alt| alt.matches(doc, node))
    }

    /// Matching descendants of `scope` (not `scope` itself), each once, in
    /// document order.
    pub fn select<'a>(&self, doc: &'a Document, scope: NodeId) -> Vec<NodeHandle<'a>> {
        self.walk(doc, scope, usize::MAX)
    }

    /// First matching descendant of `scope` in document order.
    pub fn select_first<'a>(&self, doc: &'a Document, scope: NodeId) -> Option<NodeHandle<'a>> {
        self.walk(doc, scope, 1).into_iter().next()
    }

    fn walk<'a>(&self, doc: &'a Document, scope: NodeId, limit: usize) -> Vec<NodeHandle<'a>> {
        let mut table = MatchTable::new(self);

        // Combinators may reach above the scope, so its element ancestors
        // get rows first, outermost down.
        let mut chain = Vec::new();
        let mut cursor = doc.element(scope).map(|_| scope);
        while let Some(id) = cursor {
            chain.push(id);
            cursor = doc.parent_element(id);
        }
        let mut scope_row = None;
        for &id in chain.iter().rev() {
            if let Some(el) = doc.element(id) {
                scope_row = Some(table.push_row(el, scope_row));
            }
        }

        let mut found = Vec::new();
        let mut stack: Vec<(NodeId, Option<usize>)> =
            doc.children(scope).iter().rev().map(|&c| (c, scope_row)).collect();
        while let Some((id, parent_row)) = stack.pop() {
            let Some(el) = doc.element(id) else {
                continue;
            };
            let row = table.push_row(el, parent_row);
            if table.is_match(row) {
                found.push(NodeHandle::new(doc, id));
                if found.len() >= limit {
                    break;
                }
            }
            stack.extend(doc.children(id).iter().rev().map(|&c| (c, Some(row))));
        }
        found
    }
}

/// Match state for a whole subtree, filled top-down.
///
/// Every element gets a row with two flags per selector part: `here`, the
/// part matches at this element with everything to its left satisfied, and
/// `within`, `here` holds at this element or some ancestor. A row depends
/// only on the parent's row, so one pre-order pass decides every candidate
/// and the cost does not grow with nesting depth.
struct MatchTable<'s> {
    selector: &'s Selector,
    // Parts across all alternatives.
    width: usize,
    rows: Vec<bool>,
}

impl<'s> MatchTable<'s> {
    fn new(selector: &'s Selector) -> Self {
        let width = selector.alternatives.iter().map(|a| a.parts.len()).sum();
        MatchTable {
            selector,
            width,
            rows: Vec::new(),
        }
    }

    /// Append the row for `el` and return its offset.
    fn push_row(&mut self, el: &Element, parent: Option<usize>) -> usize {
        let base = self.rows.len();
        let width = self.width;
        let selector = self.selector;
        self.rows.resize(base + 2 * width, false);

        let mut col = 0;
        for alt in &selector.alternatives {
            for (j, part) in alt.parts.iter().enumerate() {
                let left_ok = match (j, part.combinator) {
                    (0, _) => true,
                    (_, Some(Combinator::Child)) => parent.is_some_and(|p| self.rows[p + col - 1]),
                    _ => parent.is_some_and(|p| self.rows[p + width + col - 1]),
                };
                let here = left_ok && part.compound.matches(el);
                let within = here || parent.is_some_and(|p| self.rows[p + width + col]);
                self.rows[base + col] = here;
                self.rows[base + width + col] = within;
                col += 1;
            }
        }
        base
    }

    fn is_match(&self, row: usize) -> bool {
        let mut col = 0;
        self.selector.alternatives.iter().any(|alt| {
            col += alt.parts.len();
            self.rows[row + col - 1]
        })
    }
}

impl FromStr for Selector {
    type Err = SelectorSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    /// Returns whether any whitespace was consumed.
    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos != start
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        (self.pos > start).then(|| &self.src[start..self.pos])
    }

    fn error(&self, reason: &'static str) -> SelectorSyntaxError {
        SelectorSyntaxError {
            selector: self.src.to_string(),
            offset: self.pos,
            reason,
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

fn parse_complex(c: &mut Cursor<'_>) -> Result<ComplexSelector, SelectorSyntaxError> {
    let mut parts = vec![SelectorPart {
        compound: parse_compound(c)?,
        combinator: None,
    }];

    loop {
        let had_ws = c.skip_ws();
        let combinator = match c.peek() {
            None | Some(',') => break,
            Some('>') => {
                c.bump();
                c.skip_ws();
                Combinator::Child
            }
            Some('+') | Some('~') => return Err(c.error("sibling combinators are not supported")),
            Some(_) if had_ws => Combinator::Descendant,
            Some(_) => return Err(c.error("unexpected character")),
        };
        parts.push(SelectorPart {
            compound: parse_compound(c)?,
            combinator: Some(combinator),
        });
    }

    Ok(ComplexSelector { parts })
}

fn parse_compound(c: &mut Cursor<'_>) -> Result<CompoundSelector, SelectorSyntaxError> {
    let start = c.pos;
    let mut compound = CompoundSelector::default();

    if c.eat('*') {
        compound.universal = true;
    } else if let Some(tag) = c.ident() {
        compound.tag = Some(tag.to_ascii_lowercase());
    }

    loop {
        match c.peek() {
            Some('#') => {
                c.bump();
                let id = c.ident().ok_or_else(|| c.error("expected id after '#'"))?;
                compound.ids.push(id.to_string());
            }
            Some('.') => {
                c.bump();
                let class = c
                    .ident()
                    .ok_or_else(|| c.error("expected class name after '.'"))?;
                compound.classes.push(class.to_string());
            }
            Some('[') => compound.attrs.push(parse_attr(c)?),
            Some(':') => return Err(c.error("pseudo-classes are not supported")),
            _ => break,
        }
    }

    if c.pos == start {
        return Err(c.error("expected selector"));
    }
    Ok(compound)
}

fn parse_attr(c: &mut Cursor<'_>) -> Result<AttrCondition, SelectorSyntaxError> {
    c.bump(); // '['
    c.skip_ws();
    let name = c
        .ident()
        .ok_or_else(|| c.error("expected attribute name"))?
        .to_ascii_lowercase();
    c.skip_ws();

    let op: fn(String) -> AttrOperator = match c.peek() {
        Some(']') => {
            c.bump();
            return Ok(AttrCondition {
                name,
                op: AttrOperator::Exists,
            });
        }
        Some('=') => {
            c.bump();
            AttrOperator::Equals
        }
        Some('^') | Some('$') => {
            let prefix = c.peek() == Some('^');
            c.bump();
            if !c.eat('=') {
                return Err(c.error("expected '='"));
            }
            if prefix {
                AttrOperator::StartsWith
            } else {
                AttrOperator::EndsWith
            }
        }
        Some('*') | Some('~') | Some('|') => {
            return Err(c.error("unsupported attribute operator"))
        }
        None => return Err(c.error("unterminated attribute selector")),
        Some(_) => return Err(c.error("expected ']'")),
    };

    c.skip_ws();
    let value = match c.peek() {
        Some(quote @ ('"' | '\'')) => {
            c.bump();
            let start = c.pos;
            let len = c.src[start..]
                .find(quote)
                .ok_or_else(|| c.error("unterminated string"))?;
            c.pos = start + len + 1;
            c.src[start..start + len].to_string()
        }
        _ => c
            .ident()
            .ok_or_else(|| c.error("expected attribute value"))?
            .to_string(),
    };
    c.skip_ws();
    if !c.eat(']') {
        return Err(c.error("expected ']'"));
    }

    Ok(AttrCondition {
        name,
        op: op(value),
    })
}
