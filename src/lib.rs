//! # chataudit
//!
//! A Rust library for turning compliance HTML chat exports into
//! deduplicated, chronologically ordered, annotated audit records.
//!
//! ## Overview
//!
//! An export is processed in one synchronous pass:
//!
//! 1. **Load** - lenient markup parsing into a document tree ([`markup`])
//! 2. **Extract** - lazy walk yielding raw message blocks ([`streaming`], [`parser`])
//! 3. **Normalize** - canonical fields, content hash, first-wins dedup ([`core::normalizer`])
//! 4. **Timeline** - chronological order, gaps, drift ([`core::timeline`])
//! 5. **Classify** - URLs by service category, attachment references ([`core::classifier`])
//! 6. **Assemble** - ordered records plus aggregate counts ([`core::report`])
//!
//! Only a document that cannot be parsed at all is an error. Everything
//! record-level degrades to empty fields and is counted.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chataudit::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = PipelineConfig::new().with_gap_threshold(3600);
//!     let outcome = Pipeline::new(config).run_file("purview_export.html")?;
//!
//!     for warning in &outcome.warnings {
//!         eprintln!("warning: {}", warning);
//!     }
//!
//!     write_csv(&outcome.report.records, "audit.csv", &OutputConfig::new())?;
//!     println!("{} records, {} duplicates removed",
//!         outcome.report.stats.total_messages,
//!         outcome.report.stats.duplicates_removed);
//!     Ok(())
//! }
//! ```
//!
//! ## Lazy Extraction
//!
//! The extractor is an ordinary iterator and can be driven by hand:
//!
//! ```rust
//! use chataudit::markup::load_str;
//! use chataudit::parser::{create_layout, detect_layout};
//! use chataudit::parsing::LabelLimits;
//! use chataudit::streaming::MessageBlocks;
//!
//! let doc = load_str("<div class='message'><b>Ann</b> hello</div>")?;
//! let limits = LabelLimits::default();
//! let layout = detect_layout(&doc, &limits).expect("a known layout");
//! let recognizers = create_layout(layout);
//!
//! for raw in MessageBlocks::new(&doc, recognizers.as_ref(), limits) {
//!     println!("{:?}: {}", raw.sender, raw.body);
//! }
//! # Ok::<(), chataudit::ChatauditError>(())
//! ```
//!
//! ## Module Structure
//!
//! - [`pipeline`] - [`Pipeline`](pipeline::Pipeline), [`ConversionOutcome`](pipeline::ConversionOutcome)
//! - [`config`] - [`PipelineConfig`](config::PipelineConfig)
//! - [`markup`] - Markup Loader: [`Document`](markup::Document), encoding detection
//! - [`parser`] - [`ExportLayout`](parser::ExportLayout) trait, [`Layout`](parser::Layout), detection
//! - [`parsers`] - Layout implementations
//! - [`parsing`] - Shared label, text and timestamp helpers
//! - [`streaming`] - Message Extractor: [`MessageBlocks`](streaming::MessageBlocks)
//! - [`core`] - Normalizer, timeline, classifier, report, output writers
//! - [`events`] - Structured events and warnings
//! - [`format`] - [`OutputFormat`](format::OutputFormat) and format dispatch
//! - [`error`] - Unified error types ([`ChatauditError`], [`Result`])
//! - [`prelude`] - Convenient re-exports

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod events;
pub mod format;
pub mod markup;
pub mod message;
pub mod parser;
pub mod parsers;
pub mod parsing;
pub mod pipeline;
pub mod streaming;

// Re-export the main types at the crate root for convenience
pub use error::{ChatauditError, Result};
pub use message::{NormalizedMessage, RawAttachment, RawMessage};

/// Convenient re-exports for common usage.
///
/// Import everything you need with a single line:
///
/// ```rust
/// use chataudit::prelude::*;
/// ```
pub mod prelude {
    // Message types
    pub use crate::{NormalizedMessage, RawAttachment, RawMessage};

    // Error types
    pub use crate::error::{ChatauditError, Result};

    // Pipeline and configuration
    pub use crate::config::PipelineConfig;
    pub use crate::pipeline::{ConversionOutcome, Pipeline, convert_file};

    // Layouts
    pub use crate::parser::{ExportLayout, Layout, create_layout, detect_layout};

    // Records and statistics
    pub use crate::core::{
        AttachmentReference, ConversationRecord, ConversationReport, ExtractedUrl, FileKind, OutputConfig,
        ReportStats, TimestampAnnotation, UrlCategory, UrlRule,
    };

    // Events
    pub use crate::events::{EventCallback, PipelineEvent, PipelineWarning, Stage};

    // Output (file writers and string converters)
    #[cfg(feature = "csv-output")]
    pub use crate::core::output::{to_csv, write_csv};
    #[cfg(feature = "json-output")]
    pub use crate::core::output::{to_json, to_jsonl, write_json, write_jsonl};

    pub use crate::format::OutputFormat;
}
