//! Core traits for lazy message extraction.

use crate::message::RawMessage;

/// Iterator over message blocks with progress tracking.
///
/// Extends the standard [`Iterator`] trait with methods for monitoring how
/// far through the document tree extraction has got, useful for progress
/// events on large exports.
///
/// # Object Safety
///
/// This trait is object-safe, enabling dynamic dispatch via `Box<dyn BlockIterator>`.
///
/// # Examples
///
/// ```
/// use chataudit::markup::load_str;
/// use chataudit::parser::{Layout, create_layout};
/// use chataudit::parsing::LabelLimits;
/// use chataudit::streaming::{BlockIterator, MessageBlocks};
///
/// let doc = load_str("<div class='msg'><b>Ann</b> hi</div>").unwrap();
/// let layout = create_layout(Layout::Purview);
/// let mut blocks = MessageBlocks::new(&doc, layout.as_ref(), LabelLimits::default());
///
/// while let Some(raw) = blocks.next() {
///     assert_eq!(raw.sender(), Some("Ann"));
/// }
/// assert_eq!(blocks.progress(), Some(100.0));
/// ```
pub trait BlockIterator: Iterator<Item = RawMessage> {
    /// Returns approximate progress as a percentage (0.0 to 100.0).
    ///
    /// Returns `None` if the document is empty.
    fn progress(&self) -> Option<f64> {
        let total = self.total_nodes();
        if total == 0 {
            return None;
        }
        Some((self.nodes_passed() as f64 / total as f64 * 100.0).min(100.0))
    }

    /// Returns the number of nodes, in document order, already passed.
    fn nodes_passed(&self) -> usize;

    /// Returns the total number of nodes in the document.
    fn total_nodes(&self) -> usize;

    /// Returns the number of candidate blocks that did not match the pattern.
    fn skipped_blocks(&self) -> usize {
        0
    }
}
