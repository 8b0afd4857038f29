//! Fallback layout for unrecognized export versions.

use std::sync::LazyLock;

use regex::Regex;

use crate::markup::ElementRef;
use crate::parser::{ExportLayout, Layout};

static MESSAGE_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:chat[-_]?)?(?:message|msg)(?:[-_]?(?:item|row|block|entry|container|wrapper))?$",
    )
    .unwrap()
});

/// Layout that accepts any block element whose class names it a message
/// (`chat-message`, `message-item`, `msgEntry`, ...).
///
/// Role classes such as `message-content` or `message-time` do not match,
/// so a block's own parts are never mistaken for nested blocks.
pub struct GenericLayout;

impl GenericLayout {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GenericLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportLayout for GenericLayout {
    fn name(&self) -> &'static str {
        "Generic"
    }

    fn layout(&self) -> Layout {
        Layout::Generic
    }

    fn is_container(&self, el: &ElementRef<'_>) -> bool {
        el.is_any(&["div", "li", "article", "section", "tr"]) && el.class_matches(&MESSAGE_CLASS)
    }
}
