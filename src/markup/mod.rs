//! Markup loading: decoding raw export bytes and building a navigable tree.
//!
//! The loader is lenient. Exports produced by compliance tools
//! are rarely well-formed, so structural damage is repaired and recorded in
//! [`Document::recoveries`] rather than rejected.
//!
//! # Example
//!
//! ```rust
//! use chataudit::markup::load_str;
//!
//! let doc = load_str("<div class='message'><span class='sender'>Ann</span>Hi</div>").unwrap();
//! let div = doc.elements().next().unwrap();
//! assert!(div.has_class("message"));
//! ```

mod encoding;
mod loader;
mod tree;

pub use encoding::{Encoding, decode, detect_encoding};
pub use loader::{load_bytes, load_file, load_str};
pub use tree::{Descendants, Document, ElementRef, NodeId};
