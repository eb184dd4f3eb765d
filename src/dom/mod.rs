//! HTML parsing and querying.
//!
//! ```rust
//! use nexusnet::dom::Document;
//!
//! let doc = Document::parse(r#"<ul><li class="item">One<li class="item">Two</ul>"#);
//! let items = doc.select("ul > li.item").unwrap();
//! let texts: Vec<_> = items.iter().map(|n| n.text()).collect();
//! assert_eq!(texts, ["One", "Two"]);
//! ```
//!
//! - [`document`]: arena-backed tree and node data
//! - [`parser`]: tolerant markup parser
//! - [`selector`]: selector grammar and matching
//! - [`node`]: borrowed node handles, text and markup extraction

pub mod document;
pub mod node;
pub mod parser;
pub mod selector;

pub use document::{Document, Element, NodeData, NodeId};
pub use node::NodeHandle;
pub use selector::{Selector, SelectorSyntaxError};
