//! Native Purview export layout.

use crate::markup::ElementRef;
use crate::parser::{ExportLayout, Layout};

const BLOCK_CLASSES: &[&str] = &["message", "chat-message", "msg"];

/// Layout for exports that wrap each message in a `div`.
///
/// A block is a `div` carrying one of the classes `message`, `chat-message`
/// or `msg`, or the attribute `data-type="message"`:
///
/// ```html
/// <div class="message">
///   <span class="sender">Alice</span>
///   <span class="timestamp">2024-01-01 09:00:00</span>
///   <div class="message-content">hello</div>
/// </div>
/// ```
pub struct PurviewLayout;

impl PurviewLayout {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PurviewLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportLayout for PurviewLayout {
    fn name(&self) -> &'static str {
        "Purview"
    }

    fn layout(&self) -> Layout {
        Layout::Purview
    }

    fn is_container(&self, el: &ElementRef<'_>) -> bool {
        el.name() == "div"
            && (BLOCK_CLASSES.iter().any(|c| el.has_class(c))
                || el
                    .attr("data-type")
                    .is_some_and(|t| t.trim().eq_ignore_ascii_case("message")))
    }
}
