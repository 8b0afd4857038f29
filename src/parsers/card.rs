//! Card-style export layout.

use crate::markup::ElementRef;
use crate::parser::{ExportLayout, Layout};

/// Layout for exports that render each message as a `MessageCard`.
///
/// Any element carrying the class `MessageCard` or `message-card`
/// (case-insensitive) is a block.
pub struct CardLayout;

impl CardLayout {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CardLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportLayout for CardLayout {
    fn name(&self) -> &'static str {
        "Card"
    }

    fn layout(&self) -> Layout {
        Layout::Card
    }

    fn is_container(&self, el: &ElementRef<'_>) -> bool {
        el.has_class("messagecard") || el.has_class("message-card")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::load_str;
    use crate::parsing::LabelLimits;

    #[test]
    fn test_card_block() {
        let doc = load_str(
            "<section class='ms-Stack MessageCard'>\
               <div class='MessageCard-author'>Dee</div>\
               <time>2024-05-01T08:00:00Z</time>\
               <div class='MessageCard-body'>Status update</div>\
             </section>",
        )
        .unwrap();
        let card = doc.elements().next().unwrap();
        let layout = CardLayout::new();
        assert!(layout.is_container(&card));
        let raw = layout.read_block(&card, &LabelLimits::default()).unwrap();
        assert_eq!(raw.sender.as_deref(), Some("Dee"));
        assert_eq!(raw.timestamp.as_deref(), Some("2024-05-01T08:00:00Z"));
        assert_eq!(raw.body.trim(), "Status update");
    }
}
