//! Export layout trait and layout detection.
//!
//! Compliance tools have shipped several markup shapes for the same chat
//! export over the years. Each shape is an [`ExportLayout`]: a small set of
//! recognizers for "this element is a message block", "this is the sender
//! label", and so on. The default recognizers live in
//! [`crate::parsing::labels`]; layouts override only what differs.
//!
//! # Example
//!
//! ```rust
//! use chataudit::markup::load_str;
//! use chataudit::parser::{Layout, detect_layout};
//! use chataudit::parsing::LabelLimits;
//!
//! let doc = load_str(
//!     "<div class='message'><span class='sender'>Ann</span><div class='content'>Hi</div></div>",
//! ).unwrap();
//! assert_eq!(detect_layout(&doc, &LabelLimits::default()), Some(Layout::Purview));
//! ```
//!
//! # Layout Selection
//!
//! Use [`Layout`] to force a layout instead of detecting it:
//!
//! ```rust
//! use chataudit::parser::{Layout, create_layout};
//!
//! let layout = create_layout(Layout::Table);
//! assert_eq!(layout.name(), "Table");
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::markup::{Document, ElementRef, NodeId};
use crate::message::{RawAttachment, RawMessage};
use crate::parsing::{self, LabelLimits, collapse_whitespace, non_blank};
use crate::streaming::MessageBlocks;

/// Known export layouts, in detection priority order.
///
/// # Example
///
/// ```rust
/// use chataudit::parser::Layout;
/// use std::str::FromStr;
///
/// assert_eq!(Layout::from_str("rows").unwrap(), Layout::Table);
/// assert_eq!(Layout::Card.to_string(), "Card");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Layout {
    /// `div.message` / `div.chat-message` / `div.msg` / `div[data-type=message]`
    #[serde(alias = "div")]
    Purview,

    /// `tr.message-row` rows with time, sender and body cells
    #[serde(alias = "rows")]
    Table,

    /// `MessageCard` / `message-card` elements
    #[serde(alias = "cards")]
    Card,

    /// Any element whose class names it a message
    #[serde(alias = "fallback")]
    Generic,
}

impl Layout {
    /// Returns all layout names including aliases.
    pub fn all_names() -> &'static [&'static str] {
        &[
            "purview", "div", "table", "rows", "card", "cards", "generic", "fallback",
        ]
    }

    /// Returns all layouts in detection priority order.
    pub fn all() -> &'static [Layout] {
        &[Layout::Purview, Layout::Table, Layout::Card, Layout::Generic]
    }
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Layout::Purview => write!(f, "Purview"),
            Layout::Table => write!(f, "Table"),
            Layout::Card => write!(f, "Card"),
            Layout::Generic => write!(f, "Generic"),
        }
    }
}

impl std::str::FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "purview" | "div" => Ok(Layout::Purview),
            "table" | "rows" => Ok(Layout::Table),
            "card" | "cards" => Ok(Layout::Card),
            "generic" | "fallback" => Ok(Layout::Generic),
            _ => Err(format!(
                "Unknown layout: '{}'. Expected one of: {}",
                s,
                Layout::all_names().join(", ")
            )),
        }
    }
}

/// Recognizers for one export markup shape.
///
/// Layouts must implement:
/// - [`name`](ExportLayout::name) and [`layout`](ExportLayout::layout)
/// - [`is_container`](ExportLayout::is_container) - the message block test
///
/// Optionally override the label finders; the defaults use the class-token
/// heuristics in [`crate::parsing::labels`].
pub trait ExportLayout: Send + Sync {
    /// Returns the human-readable name of this layout.
    fn name(&self) -> &'static str;

    /// Returns the layout variant this implementation handles.
    fn layout(&self) -> Layout;

    /// Returns `true` if `el` has the shape of a message block.
    fn is_container(&self, el: &ElementRef<'_>) -> bool;

    fn sender_label<'a>(
        &self,
        block: &ElementRef<'a>,
        limits: &LabelLimits,
    ) -> Option<ElementRef<'a>> {
        parsing::find_sender(block, limits)
    }

    fn timestamp_label<'a>(&self, block: &ElementRef<'a>) -> Option<ElementRef<'a>> {
        parsing::find_timestamp(block)
    }

    fn recipient_label<'a>(&self, block: &ElementRef<'a>) -> Option<ElementRef<'a>> {
        parsing::find_recipient(block)
    }

    /// Finds the body region. `roles` holds the sender, timestamp and
    /// recipient labels already claimed.
    fn body_region<'a>(&self, block: &ElementRef<'a>, roles: &[NodeId]) -> Option<ElementRef<'a>> {
        parsing::find_body(block, roles)
    }

    fn attachment_labels(&self, block: &ElementRef<'_>, limits: &LabelLimits) -> Vec<RawAttachment> {
        parsing::find_attachments(block, limits)
    }

    /// Reads a message block into a [`RawMessage`].
    ///
    /// Returns `None` when the block lacks both a sender and a timestamp
    /// label, or when its body text is empty. The returned position is 0;
    /// the extractor assigns the real one.
    fn read_block(&self, block: &ElementRef<'_>, limits: &LabelLimits) -> Option<RawMessage> {
        let sender = self.sender_label(block, limits);
        let timestamp = self.timestamp_label(block);
        let hint = parsing::timestamp_hint(block, timestamp.as_ref());

        if sender.is_none() && timestamp.is_none() && hint.is_none() {
            return None;
        }

        let recipient = self.recipient_label(block);
        let roles: Vec<NodeId> = [sender, timestamp, recipient]
            .iter()
            .flatten()
            .map(ElementRef::id)
            .collect();

        let body = match self.body_region(block, &roles) {
            Some(region) => region.text_excluding(&roles),
            None => block.text_excluding(&roles),
        };
        if collapse_whitespace(&body).is_empty() {
            return None;
        }

        Some(RawMessage {
            sender: sender.and_then(|el| non_blank(&el.text())),
            recipient: recipient.and_then(|el| non_blank(&el.text())),
            timestamp: timestamp.and_then(|el| non_blank(&el.text())),
            timestamp_hint: hint,
            body,
            links: parsing::find_links(block),
            attachments: self.attachment_labels(block, limits),
            position: 0,
        })
    }
}

/// Creates the recognizers for the specified layout.
///
/// # Example
///
/// ```rust
/// use chataudit::parser::{Layout, create_layout};
///
/// let layout = create_layout(Layout::Purview);
/// assert_eq!(layout.layout(), Layout::Purview);
/// ```
pub fn create_layout(layout: Layout) -> Box<dyn ExportLayout> {
    match layout {
        Layout::Purview => Box::new(crate::parsers::PurviewLayout::new()),
        Layout::Table => Box::new(crate::parsers::TableLayout::new()),
        Layout::Card => Box::new(crate::parsers::CardLayout::new()),
        Layout::Generic => Box::new(crate::parsers::GenericLayout::new()),
    }
}

/// Picks the layout that recognizes the most message blocks in `doc`.
///
/// Every layout is scored by running the extractor over the whole tree.
/// Ties go to the layout listed first in [`Layout::all`]. Returns `None`
/// when no layout recognizes a single block.
pub fn detect_layout(doc: &Document, limits: &LabelLimits) -> Option<Layout> {
    let scores: Vec<(Layout, usize)> = Layout::all()
        .iter()
        .map(|&layout| {
            let recognizers = create_layout(layout);
            let count = MessageBlocks::new(doc, recognizers.as_ref(), *limits).count();
            (layout, count)
        })
        .collect();

    debug!(?scores, "layout detection scores");

    let max_score = scores.iter().map(|(_, score)| *score).max()?;
    if max_score == 0 {
        return None;
    }

    scores
        .iter()
        .find(|(_, score)| *score == max_score)
        .map(|(layout, _)| *layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::load_str;
    use std::str::FromStr;

    #[test]
    fn test_layout_from_str() {
        assert_eq!(Layout::from_str("purview").unwrap(), Layout::Purview);
        assert_eq!(Layout::from_str("DIV").unwrap(), Layout::Purview);
        assert_eq!(Layout::from_str("table").unwrap(), Layout::Table);
        assert_eq!(Layout::from_str("cards").unwrap(), Layout::Card);
        assert_eq!(Layout::from_str("fallback").unwrap(), Layout::Generic);
    }

    #[test]
    fn test_layout_from_str_error() {
        let err = Layout::from_str("xml").unwrap_err();
        assert!(err.contains("purview"));
    }

    #[test]
    fn test_layout_display() {
        assert_eq!(Layout::Purview.to_string(), "Purview");
        assert_eq!(Layout::Table.to_string(), "Table");
        assert_eq!(Layout::Generic.to_string(), "Generic");
    }

    #[test]
    fn test_layout_serde() {
        assert_eq!(serde_json::to_string(&Layout::Card).unwrap(), "\"card\"");
        let parsed: Layout = serde_json::from_str("\"rows\"").unwrap();
        assert_eq!(parsed, Layout::Table);
    }

    #[test]
    fn test_create_layout() {
        for &layout in Layout::all() {
            assert_eq!(create_layout(layout).layout(), layout);
        }
    }

    #[test]
    fn test_detect_table_layout() {
        let doc = load_str(
            "<table>\
               <tr class='message-row'><td>2024-01-01 09:00</td><td>Ann</td><td>Hi</td></tr>\
               <tr class='message-row'><td>2024-01-01 09:01</td><td>Ben</td><td>Yo</td></tr>\
             </table>",
        )
        .unwrap();
        assert_eq!(detect_layout(&doc, &LabelLimits::default()), Some(Layout::Table));
    }

    #[test]
    fn test_detect_nothing() {
        let doc = load_str("<html><body><h1>Report</h1><p>No chat here.</p></body></html>").unwrap();
        assert_eq!(detect_layout(&doc, &LabelLimits::default()), None);
    }

    #[test]
    fn test_read_block_requires_sender_or_time() {
        let doc = load_str("<div class='message'><div class='content'>orphan</div></div>").unwrap();
        let block = doc.elements().next().unwrap();
        let layout = create_layout(Layout::Purview);
        assert!(layout.read_block(&block, &LabelLimits::default()).is_none());
    }

    #[test]
    fn test_read_block_fields() {
        let doc = load_str(
            "<div class='message' data-time='2024-01-01T09:00:00Z'>\
               <span class='sender'>Ann</span><span class='recipient'>Ben</span>\
               <span class='timestamp'>Jan 1, 9:00</span>\
               <div class='message-content'>See <a href='https://x.example/a'>this</a></div>\
             </div>",
        )
        .unwrap();
        let block = doc.elements().next().unwrap();
        let raw = create_layout(Layout::Purview)
            .read_block(&block, &LabelLimits::default())
            .unwrap();
        assert_eq!(raw.sender.as_deref(), Some("Ann"));
        assert_eq!(raw.recipient.as_deref(), Some("Ben"));
        assert_eq!(raw.timestamp.as_deref(), Some("Jan 1, 9:00"));
        assert_eq!(raw.timestamp_hint.as_deref(), Some("2024-01-01T09:00:00Z"));
        assert_eq!(collapse_whitespace(&raw.body), "See this");
        assert_eq!(raw.links, vec!["https://x.example/a".to_string()]);
    }

    #[test]
    fn test_read_block_residual_body() {
        let doc = load_str("<div class='msg'><b>Ann</b> just text</div>").unwrap();
        let block = doc.elements().next().unwrap();
        let raw = create_layout(Layout::Purview)
            .read_block(&block, &LabelLimits::default())
            .unwrap();
        assert_eq!(raw.sender.as_deref(), Some("Ann"));
        assert_eq!(collapse_whitespace(&raw.body), "just text");
    }
}
