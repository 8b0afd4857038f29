//! Core processing logic for chataudit.
//!
//! This module contains:
//! - [`models`] - Record types and output configuration
//! - [`normalizer`] - Canonicalization, content hashing, deduplication
//! - [`timeline`] - Chronological ordering, gap and drift flags
//! - [`classifier`] - URL extraction/classification, attachment interpretation
//! - [`report`] - Record assembly and aggregate statistics
//! - [`output`] - Format writers (CSV, JSON, JSONL)
//!
//! # Quick Start
//!
//! ```rust
//! use chataudit::core::{
//!     AssemblyInput, ContentClassifier, ConversationRecord,
//!     analyze, assemble, normalize_and_dedup,
//! };
//! use chataudit::parsing::default_timestamp_formats;
//! use chataudit::RawMessage;
//!
//! let raws = vec![
//!     RawMessage::new("hello").with_sender("Alice").with_timestamp("2024-01-01T09:00"),
//!     RawMessage::new("hello").with_sender("Alice").with_timestamp("2024-01-01T09:00").with_position(1),
//! ];
//! let unique = normalize_and_dedup(raws, &default_timestamp_formats());
//! let timing = analyze(&unique.messages, None);
//! let classifier = ContentClassifier::default();
//!
//! let records: Vec<ConversationRecord> = unique
//!     .messages
//!     .into_iter()
//!     .zip(timing)
//!     .map(|(message, timing)| {
//!         let (urls, attachments) = classifier.classify(&message);
//!         ConversationRecord { message, timing, urls, attachments }
//!     })
//!     .collect();
//!
//! let report = assemble(None, records, AssemblyInput {
//!     raw_count: unique.raw_count,
//!     duplicates_removed: unique.duplicates_removed,
//!     skipped_blocks: 0,
//! });
//! assert_eq!(report.stats.total_messages, 1);
//! assert_eq!(report.stats.duplicates_removed, 1);
//! ```

pub mod classifier;
pub mod models;
pub mod normalizer;
pub mod output;
pub mod report;
pub mod timeline;

// Re-export main types for convenience
pub use classifier::{ContentClassifier, MatchTarget, UrlRule, default_url_rules};
pub use models::{
    AttachmentReference, ConversationRecord, ExtractedUrl, FileKind, OutputConfig, TimestampAnnotation,
    UrlCategory, UrlSource,
};
pub use normalizer::{Deduplicated, UNKNOWN_SENDER, content_hash, normalize, normalize_and_dedup};
pub use report::{AssemblyInput, ConversationReport, ReportStats, assemble};
pub use timeline::analyze;

// Conditionally re-export output writers
#[cfg(feature = "csv-output")]
pub use output::{to_csv, write_csv};
#[cfg(feature = "json-output")]
pub use output::{to_json, to_jsonl, write_json, write_jsonl};
