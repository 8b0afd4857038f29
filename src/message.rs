//! Message types flowing through the pipeline.
//!
//! This module provides the two per-message representations:
//!
//! - [`RawMessage`]: fields exactly as found in the markup, produced by the
//!   message extractor and never modified afterwards
//! - [`NormalizedMessage`]: canonical form with a parsed timestamp and a
//!   content hash, produced by the normalizer
//!
//! Missing fields are `None` throughout. The only place a placeholder is
//! substituted is the normalizer (`"Unknown User"` for an empty sender).
//!
//! # Examples
//!
//! ```
//! use chataudit::RawMessage;
//!
//! let raw = RawMessage::new("hello")
//!     .with_sender("Alice")
//!     .with_timestamp("2024-01-01T09:00")
//!     .with_position(3);
//!
//! assert_eq!(raw.sender(), Some("Alice"));
//! assert_eq!(raw.position(), 3);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An attachment marker as isolated by the extractor.
///
/// Nothing here is interpreted yet: the label is the text or attribute the
/// marker carried, the link is the nearest `href`, the size is whatever a
/// size-classed element said.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawAttachment {
    /// Label text as found (filename, possibly with decorations).
    pub label: String,

    /// Link target, if the marker carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub link: Option<String>,

    /// Human-readable size label such as `"24 KB"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub size: Option<String>,
}

impl RawAttachment {
    /// Creates an attachment marker with only a label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            link: None,
            size: None,
        }
    }

    /// Builder method to set the link target.
    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Builder method to set the size label.
    #[must_use]
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }
}

/// A candidate message exactly as extracted from the markup.
///
/// # Fields
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | `sender` | `Option<String>` | Sender label text |
/// | `recipient` | `Option<String>` | Recipient label text |
/// | `timestamp` | `Option<String>` | Visible timestamp label, unparsed |
/// | `timestamp_hint` | `Option<String>` | Machine-readable timestamp attribute |
/// | `body` | `String` | Body text, whitespace not yet normalized |
/// | `links` | `Vec<String>` | Anchor targets found in the block |
/// | `attachments` | `Vec<RawAttachment>` | Attachment markers in nested order |
/// | `position` | `usize` | Index of the block in document order |
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub sender: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub recipient: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub timestamp: Option<String>,

    /// Value of a `datetime`, `data-timestamp` or `data-time` attribute.
    ///
    /// Tried by the normalizer when the visible label does not parse.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub timestamp_hint: Option<String>,

    pub body: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub links: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub attachments: Vec<RawAttachment>,

    pub position: usize,
}

impl RawMessage {
    /// Creates a raw message with only a body.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    #[must_use]
    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    #[must_use]
    pub fn with_timestamp_hint(mut self, hint: impl Into<String>) -> Self {
        self.timestamp_hint = Some(hint.into());
        self
    }

    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.links.push(link.into());
        self
    }

    #[must_use]
    pub fn with_attachment(mut self, attachment: RawAttachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    #[must_use]
    pub fn with_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    // =========================================================================
    // Accessor methods
    // =========================================================================

    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

/// Canonical form of a message after normalization.
///
/// Two normalized messages with the same [`content_hash`](Self::content_hash)
/// are the same message; only the first by source position survives
/// deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedMessage {
    /// Trimmed, whitespace-collapsed sender; never empty.
    pub sender: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub recipient: Option<String>,

    /// Parsed instant, `None` if no accepted format matched.
    pub timestamp: Option<DateTime<Utc>>,

    /// The label the timestamp was parsed from (or failed to parse from).
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub raw_timestamp: Option<String>,

    /// Whitespace-normalized body text.
    pub body: String,

    /// Lowercase hex fingerprint of sender, timestamp and body.
    pub content_hash: String,

    /// Source position carried over from the raw message.
    pub position: usize,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub links: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub attachments: Vec<RawAttachment>,
}

impl NormalizedMessage {
    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns `true` if the timestamp was parsed.
    pub fn is_timed(&self) -> bool {
        self.timestamp.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_message_builder() {
        let raw = RawMessage::new("hi")
            .with_sender("Alice")
            .with_recipient("Bob")
            .with_timestamp("2024-01-01 09:00")
            .with_timestamp_hint("2024-01-01T09:00:00Z")
            .with_link("https://example.com")
            .with_attachment(RawAttachment::new("a.pdf").with_size("2 KB"))
            .with_position(7);

        assert_eq!(raw.sender(), Some("Alice"));
        assert_eq!(raw.recipient.as_deref(), Some("Bob"));
        assert_eq!(raw.timestamp(), Some("2024-01-01 09:00"));
        assert_eq!(raw.links.len(), 1);
        assert_eq!(raw.attachments[0].size.as_deref(), Some("2 KB"));
        assert_eq!(raw.position(), 7);
    }

    #[test]
    fn test_raw_message_serialization_skips_empty() {
        let json = serde_json::to_string(&RawMessage::new("hi")).unwrap();
        assert!(!json.contains("sender"));
        assert!(!json.contains("attachments"));
        assert!(json.contains("\"body\":\"hi\""));
    }

    #[test]
    fn test_raw_message_deserialization() {
        let json = r#"{"sender":"Bob","body":"Hi","position":2}"#;
        let raw: RawMessage = serde_json::from_str(json).unwrap();
        assert_eq!(raw.sender(), Some("Bob"));
        assert!(raw.timestamp().is_none());
        assert_eq!(raw.position(), 2);
    }
}
