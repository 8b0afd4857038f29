//! Output format writers.
//!
//! This module provides writers for the rendering collaborator's data feed:
//! - [`write_csv`] / [`to_csv`] - one row per record, semicolon delimiter - requires `csv-output` feature
//! - [`write_json`] / [`to_json`] - full report (layout, stats, records) - requires `json-output` feature
//! - [`write_jsonl`] / [`to_jsonl`] - one record per line - requires `json-output` feature
//!
//! Writers never reorder records; they emit the report's chronological order.
//!
//! # Example
//!
//! ```rust,no_run
//! # #[cfg(all(feature = "csv-output", feature = "json-output"))]
//! # fn main() -> chataudit::Result<()> {
//! use chataudit::core::output::{write_csv, write_json, to_jsonl};
//! use chataudit::core::OutputConfig;
//! use chataudit::pipeline::Pipeline;
//!
//! let outcome = Pipeline::default().run_file("export.html")?;
//! let config = OutputConfig::new().with_hash();
//!
//! write_csv(&outcome.report.records, "report.csv", &config)?;
//! write_json(&outcome.report, "report.json", &config)?;
//! let lines = to_jsonl(&outcome.report.records, &config)?;
//! # Ok(())
//! # }
//! # #[cfg(not(all(feature = "csv-output", feature = "json-output")))]
//! # fn main() {}
//! ```

#[cfg(feature = "csv-output")]
mod csv_writer;
#[cfg(feature = "json-output")]
mod json_writer;
#[cfg(feature = "json-output")]
mod jsonl_writer;

#[cfg(feature = "csv-output")]
pub use csv_writer::{to_csv, write_csv};
#[cfg(feature = "json-output")]
pub use json_writer::{to_json, write_json};
#[cfg(feature = "json-output")]
pub use jsonl_writer::{to_jsonl, write_jsonl};

#[cfg(feature = "json-output")]
use serde::Serialize;

use crate::core::models::{AttachmentReference, ExtractedUrl};
#[cfg(feature = "json-output")]
use crate::core::models::{ConversationRecord, OutputConfig};

/// Timestamp layout used in text cells.
pub const CELL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats a URL list for a single text cell: `[n] url (Category)` per line.
///
/// # Example
///
/// ```rust
/// use chataudit::core::output::format_urls;
/// use chataudit::core::classifier::ContentClassifier;
///
/// let urls = ContentClassifier::default().extract_urls("https://contoso.sharepoint.com/a", &[]);
/// assert_eq!(format_urls(&urls), "[1] https://contoso.sharepoint.com/a (SharePoint)");
/// ```
pub fn format_urls(urls: &[ExtractedUrl]) -> String {
    urls.iter()
        .enumerate()
        .map(|(idx, url)| format!("[{}] {} ({})", idx + 1, url.raw, url.category))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Formats an attachment list for a single text cell:
/// `[n] name (Type, Size) - link` per line, the link part only when present.
pub fn format_attachments(attachments: &[AttachmentReference]) -> String {
    attachments
        .iter()
        .enumerate()
        .map(|(idx, att)| {
            let name = att.name.as_deref().unwrap_or_else(|| {
                let raw = att.raw_label.trim();
                if raw.is_empty() { "Unknown" } else { raw }
            });
            let kind = att.kind.map_or_else(|| "Other".to_string(), |k| k.to_string());
            let size = att.size.as_deref().unwrap_or("Unknown");
            let mut line = format!("[{}] {} ({}, {})", idx + 1, name, kind, size);
            if let Some(link) = att.link.as_deref().filter(|l| !l.is_empty()) {
                line.push_str(" - ");
                line.push_str(link);
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Structured record shape shared by the JSON writers.
///
/// Only includes optional fields enabled in [`OutputConfig`].
#[cfg(feature = "json-output")]
#[derive(Debug, Serialize)]
pub(crate) struct OutputRecord<'a> {
    sequence: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_timestamp: Option<&'a str>,
    sender: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    recipient: Option<&'a str>,
    message: &'a str,
    urls: &'a [ExtractedUrl],
    attachments: &'a [AttachmentReference],
    #[serde(skip_serializing_if = "Option::is_none")]
    gap_seconds: Option<i64>,
    gap_flagged: bool,
    drift: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_hash: Option<&'a str>,
}

#[cfg(feature = "json-output")]
impl<'a> OutputRecord<'a> {
    pub(crate) fn from_record(record: &'a ConversationRecord, config: &OutputConfig) -> Self {
        let msg = &record.message;
        Self {
            sequence: record.timing.sequence_index,
            timestamp: msg.timestamp.map(|ts| ts.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
            raw_timestamp: if msg.timestamp.is_none() {
                msg.raw_timestamp.as_deref()
            } else {
                None
            },
            sender: &msg.sender,
            recipient: msg.recipient.as_deref(),
            message: &msg.body,
            urls: &record.urls,
            attachments: &record.attachments,
            gap_seconds: record.timing.gap_seconds,
            gap_flagged: record.timing.gap_flagged,
            drift: record.timing.drift,
            position: config.include_position.then_some(msg.position),
            content_hash: config.include_hash.then_some(msg.content_hash.as_str()),
        }
    }
}
