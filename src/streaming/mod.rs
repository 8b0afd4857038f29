//! Lazy, pull-based message extraction.
//!
//! The extractor walks the document tree in document order and yields
//! [`RawMessage`](crate::RawMessage)s one at a time. Nothing is materialized
//! until the normalizer has removed duplicates, so memory after
//! deduplication is proportional to the number of unique messages.
//!
//! # Architecture
//!
//! - [`MessageBlocks`] - the iterator implementation
//! - [`BlockIterator`] - progress tracking on top of [`Iterator`]
//!
//! # Example
//!
//! ```rust
//! use chataudit::markup::load_str;
//! use chataudit::parser::{Layout, create_layout};
//! use chataudit::parsing::LabelLimits;
//! use chataudit::streaming::MessageBlocks;
//!
//! let doc = load_str(
//!     "<div class='message'><span class='sender'>Ann</span><p class='text'>one</p></div>\
//!      <div class='message'><span class='sender'>Ben</span><p class='text'>two</p></div>",
//! ).unwrap();
//! let layout = create_layout(Layout::Purview);
//!
//! let senders: Vec<String> = MessageBlocks::new(&doc, layout.as_ref(), LabelLimits::default())
//!     .filter_map(|raw| raw.sender)
//!     .collect();
//! assert_eq!(senders, ["Ann", "Ben"]);
//! ```

mod extractor;
mod traits;

pub use extractor::MessageBlocks;
pub use traits::BlockIterator;
