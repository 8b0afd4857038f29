//! Normalization and deduplication.
//!
//! Each [`RawMessage`] is canonicalized (whitespace collapsed, sender
//! defaulted, timestamp parsed) and fingerprinted. Messages are processed in
//! source order and the first message to produce a given fingerprint wins;
//! later ones are dropped. Identical sender, timestamp and body is treated
//! as duplication from overlapping export ranges, never as two distinct
//! messages.

use std::collections::HashSet;

use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};

use crate::message::{NormalizedMessage, RawMessage};
use crate::parsing::{collapse_whitespace, non_blank, parse_timestamp};

/// Sender substituted when the label is missing or blank.
pub const UNKNOWN_SENDER: &str = "Unknown User";

/// Stands in for an absent timestamp inside the content hash.
pub const NO_TIMESTAMP_MARKER: &str = "<no-timestamp>";

const FIELD_SEPARATOR: &[u8] = b"\x1f";

/// Lowercase hex SHA-256 of the identity fields.
///
/// # Example
///
/// ```rust
/// use chataudit::core::normalizer::content_hash;
///
/// let a = content_hash("Alice", None, "hello");
/// let b = content_hash("Alice", None, "hello");
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 64);
/// assert_ne!(a, content_hash("Alice", None, "hello!"));
/// ```
pub fn content_hash(sender: &str, timestamp: Option<DateTime<Utc>>, body: &str) -> String {
    let timestamp = timestamp.map_or_else(
        || NO_TIMESTAMP_MARKER.to_string(),
        |ts| ts.to_rfc3339_opts(SecondsFormat::AutoSi, true),
    );

    let mut hasher = Sha256::new();
    hasher.update(sender.as_bytes());
    hasher.update(FIELD_SEPARATOR);
    hasher.update(timestamp.as_bytes());
    hasher.update(FIELD_SEPARATOR);
    hasher.update(body.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Canonicalizes one raw message.
///
/// The visible timestamp label is tried first, then the machine-readable
/// hint. If neither parses the timestamp is `None` and the message is kept.
pub fn normalize<S: AsRef<str>>(raw: RawMessage, formats: &[S]) -> NormalizedMessage {
    let sender = raw
        .sender
        .as_deref()
        .and_then(non_blank)
        .unwrap_or_else(|| UNKNOWN_SENDER.to_string());
    let body = collapse_whitespace(&raw.body);

    let from_label = raw
        .timestamp
        .as_deref()
        .and_then(|label| parse_timestamp(label, formats));
    let (timestamp, raw_timestamp) = match from_label {
        Some(ts) => (Some(ts), raw.timestamp.clone()),
        None => match raw.timestamp_hint.as_deref().and_then(|h| parse_timestamp(h, formats)) {
            Some(ts) => (Some(ts), raw.timestamp_hint.clone()),
            None => (None, raw.timestamp.clone().or_else(|| raw.timestamp_hint.clone())),
        },
    };

    let content_hash = content_hash(&sender, timestamp, &body);

    NormalizedMessage {
        sender,
        recipient: raw.recipient.as_deref().and_then(non_blank),
        timestamp,
        raw_timestamp: raw_timestamp.and_then(|t| non_blank(&t)),
        body,
        content_hash,
        position: raw.position,
        links: raw.links,
        attachments: raw.attachments,
    }
}

/// Unique messages plus the counts needed for reporting.
#[derive(Debug, Clone, Default)]
pub struct Deduplicated {
    /// Surviving messages in source order.
    pub messages: Vec<NormalizedMessage>,
    /// Messages consumed from the extractor.
    pub raw_count: usize,
    /// Messages dropped because their hash was already seen.
    pub duplicates_removed: usize,
    /// Surviving messages without a parsed timestamp.
    pub untimed: usize,
}

/// Normalizes a raw message sequence and removes duplicates.
///
/// The input is consumed lazily; only unique messages are retained.
pub fn normalize_and_dedup<I, S>(raws: I, formats: &[S]) -> Deduplicated
where
    I: IntoIterator<Item = RawMessage>,
    S: AsRef<str>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut result = Deduplicated::default();

    for raw in raws {
        result.raw_count += 1;
        let message = normalize(raw, formats);
        if !seen.insert(message.content_hash.clone()) {
            result.duplicates_removed += 1;
            continue;
        }
        if message.timestamp.is_none() {
            result.untimed += 1;
        }
        result.messages.push(message);
    }

    result
}
