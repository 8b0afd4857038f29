//! Lazy message extractor.

use crate::markup::{Document, ElementRef, NodeId};
use crate::message::RawMessage;
use crate::parser::ExportLayout;
use crate::parsing::LabelLimits;

use super::BlockIterator;

/// Pre-order walk over a document that yields one [`RawMessage`] per
/// recognized message block.
///
/// - A container with no nested container is read as a block; its subtree is
///   not walked further whether or not it matched.
/// - A container that wraps other containers is walked into instead.
/// - Everything else is walked into.
///
/// Positions are assigned sequentially to yielded messages, so they follow
/// document order. The iterator is single-pass; to restart, create a new one.
pub struct MessageBlocks<'a> {
    doc: &'a Document,
    layout: &'a dyn ExportLayout,
    limits: LabelLimits,
    stack: Vec<NodeId>,
    next_position: usize,
    passed: usize,
    skipped: usize,
}

impl<'a> MessageBlocks<'a> {
    /// Starts a walk over `doc` using the recognizers of `layout`.
    pub fn new(doc: &'a Document, layout: &'a dyn ExportLayout, limits: LabelLimits) -> Self {
        Self {
            doc,
            layout,
            limits,
            stack: doc.root_ids().iter().rev().copied().collect(),
            next_position: 0,
            passed: 0,
            skipped: 0,
        }
    }

    /// Returns the layout this walk recognizes blocks with.
    pub fn layout(&self) -> &'a dyn ExportLayout {
        self.layout
    }

    fn wraps_containers(&self, el: &ElementRef<'_>) -> bool {
        el.descendants().any(|d| self.layout.is_container(&d))
    }
}

impl Iterator for MessageBlocks<'_> {
    type Item = RawMessage;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            self.passed = self.passed.max(id + 1);
            let Some(el) = self.doc.element(id) else {
                continue;
            };

            if self.layout.is_container(&el) && !self.wraps_containers(&el) {
                if let Some(mut raw) = self.layout.read_block(&el, &self.limits) {
                    raw.position = self.next_position;
                    self.next_position += 1;
                    return Some(raw);
                }
                self.skipped += 1;
                continue;
            }

            self.stack.extend(self.doc.children_of(id).iter().rev());
        }
        self.passed = self.doc.node_count();
        None
    }
}

impl BlockIterator for MessageBlocks<'_> {
    fn nodes_passed(&self) -> usize {
        self.passed
    }

    fn total_nodes(&self) -> usize {
        self.doc.node_count()
    }

    fn skipped_blocks(&self) -> usize {
        self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::load_str;
    use crate::parser::{Layout, create_layout};

    fn extract(html: &str, layout: Layout) -> Vec<RawMessage> {
        let doc = load_str(html).unwrap();
        let recognizers = create_layout(layout);
        MessageBlocks::new(&doc, recognizers.as_ref(), LabelLimits::default()).collect()
    }

    #[test]
    fn test_positions_follow_document_order() {
        let messages = extract(
            "<div class='message'><b>A</b> one</div>\
             <div class='banner'>decoration</div>\
             <div class='message'><b>B</b> two</div>",
            Layout::Purview,
        );
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].position, 0);
        assert_eq!(messages[1].position, 1);
        assert_eq!(messages[1].sender.as_deref(), Some("B"));
    }

    #[test]
    fn test_wrapper_container_is_walked_into() {
        let messages = extract(
            "<div class='message'>\
               <div class='message'><b>A</b> inner one</div>\
               <div class='message'><b>B</b> inner two</div>\
             </div>",
            Layout::Purview,
        );
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn test_unmatched_blocks_are_skipped() {
        let doc = load_str(
            "<div class='message'>system notice without labels</div>\
             <div class='message'><span class='sender'>C</span><p class='text'>real</p></div>",
        )
        .unwrap();
        let recognizers = create_layout(Layout::Purview);
        let mut blocks = MessageBlocks::new(&doc, recognizers.as_ref(), LabelLimits::default());
        let first = blocks.next().unwrap();
        assert_eq!(first.sender.as_deref(), Some("C"));
        assert!(blocks.next().is_none());
        assert_eq!(blocks.skipped_blocks(), 1);
    }

    #[test]
    fn test_no_blocks_is_empty_not_error() {
        assert!(extract("<p>nothing to see</p>", Layout::Purview).is_empty());
    }

    #[test]
    fn test_reinvocation_restarts() {
        let doc = load_str("<div class='msg'><b>A</b> x</div>").unwrap();
        let recognizers = create_layout(Layout::Purview);
        let first: Vec<_> = MessageBlocks::new(&doc, recognizers.as_ref(), LabelLimits::default()).collect();
        let second: Vec<_> = MessageBlocks::new(&doc, recognizers.as_ref(), LabelLimits::default()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_progress_reaches_completion() {
        let doc = load_str("<div class='msg'><b>A</b> x</div><p>tail</p>").unwrap();
        let recognizers = create_layout(Layout::Purview);
        let mut blocks = MessageBlocks::new(&doc, recognizers.as_ref(), LabelLimits::default());
        assert_eq!(blocks.progress(), Some(0.0));
        while blocks.next().is_some() {}
        assert_eq!(blocks.progress(), Some(100.0));
    }
}
