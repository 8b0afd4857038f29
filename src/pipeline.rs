//! End-to-end conversion pipeline.
//!
//! Loader -> layout detection -> extractor -> normalizer/deduplicator ->
//! timeline -> classifier -> assembler. One [`Pipeline`] value holds only
//! configuration; every run starts from scratch and shares no state with
//! other runs.
//!
//! # Example
//!
//! ```rust
//! use chataudit::pipeline::Pipeline;
//! use chataudit::config::PipelineConfig;
//!
//! let html = r#"
//!   <div class="message"><span class="sender">Alice</span>
//!     <span class="timestamp">2024-01-01T09:05</span><div class="content">msg1</div></div>
//!   <div class="message"><span class="sender">Bob</span>
//!     <span class="timestamp">2024-01-01T09:00</span><div class="content">msg2</div></div>
//! "#;
//!
//! let outcome = Pipeline::new(PipelineConfig::new()).run_str(html)?;
//! let bodies: Vec<&str> = outcome.report.records.iter().map(|r| r.message.body()).collect();
//! assert_eq!(bodies, ["msg2", "msg1"]);
//! assert!(outcome.report.records[1].timing.drift);
//! # Ok::<(), chataudit::ChatauditError>(())
//! ```

use std::path::Path;

use crate::config::PipelineConfig;
use crate::core::classifier::ContentClassifier;
use crate::core::models::ConversationRecord;
use crate::core::normalizer::normalize_and_dedup;
use crate::core::report::{AssemblyInput, ConversationReport, assemble};
use crate::core::timeline::analyze;
use crate::error::Result;
use crate::events::{EventCallback, PipelineEvent, PipelineWarning, Stage};
use crate::markup::{Document, load_bytes, load_file, load_str};
use crate::parser::{create_layout, detect_layout};
use crate::streaming::{BlockIterator, MessageBlocks};

/// How many loader recoveries are spelled out in a warning.
const RECOVERY_DETAIL_LIMIT: usize = 3;

/// Result of one conversion run.
#[derive(Debug, Clone, Default)]
pub struct ConversionOutcome {
    pub report: ConversationReport,
    /// Non-fatal conditions, in the order they were detected.
    pub warnings: Vec<PipelineWarning>,
    /// Every event emitted during the run.
    pub events: Vec<PipelineEvent>,
}

impl ConversionOutcome {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns `true` if the document parsed but held no recognizable messages.
    pub fn is_empty_result(&self) -> bool {
        self.warnings.contains(&PipelineWarning::EmptyResult)
    }
}

/// Configured conversion pipeline.
#[derive(Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
    callback: Option<EventCallback>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            callback: None,
        }
    }

    /// Registers a callback invoked synchronously for every event.
    #[must_use]
    pub fn with_callback(mut self, callback: EventCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Converts the export at `path`.
    ///
    /// The file is read once and released before extraction starts, on
    /// success and on failure alike.
    pub fn run_file(&self, path: impl AsRef<Path>) -> Result<ConversionOutcome> {
        self.config.validate()?;
        let doc = load_file(path.as_ref(), self.config.encoding)?;
        Ok(self.process(&doc))
    }

    /// Converts raw export bytes, honoring the encoding override.
    pub fn run_bytes(&self, bytes: &[u8]) -> Result<ConversionOutcome> {
        self.config.validate()?;
        let doc = load_bytes(bytes, self.config.encoding)?;
        Ok(self.process(&doc))
    }

    /// Converts already-decoded export text.
    pub fn run_str(&self, text: &str) -> Result<ConversionOutcome> {
        self.config.validate()?;
        let doc = load_str(text)?;
        Ok(self.process(&doc))
    }

    /// Runs every stage after loading on an already-built document.
    ///
    /// Fails only on an invalid configuration: record-level problems become
    /// warnings and counts.
    pub fn run_document(&self, doc: &Document) -> Result<ConversionOutcome> {
        self.config.validate()?;
        Ok(self.process(doc))
    }

    fn process(&self, doc: &Document) -> ConversionOutcome {
        let mut outcome = ConversionOutcome::default();
        let limits = self.config.label_limits();

        self.emit(
            &mut outcome,
            PipelineEvent::info(Stage::Load, format!("loaded document ({})", doc.encoding()))
                .with_count("nodes", doc.node_count())
                .with_count("elements", doc.element_count())
                .with_count("recoveries", doc.recoveries().len()),
        );
        if !doc.recoveries().is_empty() {
            self.warn(
                &mut outcome,
                PipelineWarning::RecoveredMarkup {
                    detail: recovery_detail(doc.recoveries()),
                },
            );
        }

        let layout = self.config.layout.or_else(|| detect_layout(doc, &limits));
        let Some(layout) = layout else {
            self.emit(&mut outcome, PipelineEvent::info(Stage::Detect, "no known layout matched"));
            self.warn(&mut outcome, PipelineWarning::EmptyResult);
            outcome.report = assemble(None, Vec::new(), AssemblyInput::default());
            return outcome;
        };
        let forced = if self.config.layout.is_some() { "forced" } else { "detected" };
        self.emit(
            &mut outcome,
            PipelineEvent::info(Stage::Detect, format!("{} layout: {}", forced, layout)),
        );

        let recognizers = create_layout(layout);
        let mut blocks = MessageBlocks::new(doc, recognizers.as_ref(), limits);
        let unique = normalize_and_dedup(blocks.by_ref(), &self.config.timestamp_formats);
        let skipped_blocks = blocks.skipped_blocks();

        self.emit(
            &mut outcome,
            PipelineEvent::info(Stage::Extract, format!("extracted {} message blocks", unique.raw_count))
                .with_count("messages", unique.raw_count)
                .with_count("skipped_blocks", skipped_blocks),
        );
        self.emit(
            &mut outcome,
            PipelineEvent::info(
                Stage::Normalize,
                format!(
                    "{} unique messages, {} duplicates removed",
                    unique.messages.len(),
                    unique.duplicates_removed
                ),
            )
            .with_count("unique", unique.messages.len())
            .with_count("duplicates_removed", unique.duplicates_removed)
            .with_count("untimed", unique.untimed),
        );
        if unique.messages.is_empty() {
            self.warn(&mut outcome, PipelineWarning::EmptyResult);
        }
        if unique.untimed > 0 {
            self.warn(
                &mut outcome,
                PipelineWarning::UnparsedTimestamps { count: unique.untimed },
            );
        }

        let timing = analyze(&unique.messages, self.config.gap_threshold_secs);
        let drift = timing.iter().filter(|t| t.drift).count();
        let gaps = timing.iter().filter(|t| t.gap_flagged).count();
        self.emit(
            &mut outcome,
            PipelineEvent::info(Stage::Timeline, "ordered messages chronologically")
                .with_count("drift_flagged", drift)
                .with_count("gaps_flagged", gaps),
        );

        let classifier = ContentClassifier::new(self.config.url_rules.clone(), self.config.max_attachment_label_len);
        let records: Vec<ConversationRecord> = unique
            .messages
            .into_iter()
            .zip(timing)
            .map(|(message, timing)| {
                let (urls, attachments) = classifier.classify(&message);
                ConversationRecord {
                    message,
                    timing,
                    urls,
                    attachments,
                }
            })
            .collect();

        let report = assemble(
            Some(layout),
            records,
            AssemblyInput {
                raw_count: unique.raw_count,
                duplicates_removed: unique.duplicates_removed,
                skipped_blocks,
            },
        );

        let stats = &report.stats;
        self.emit(
            &mut outcome,
            PipelineEvent::info(Stage::Classify, format!("found {} URLs and {} attachments", stats.total_urls, stats.total_attachments))
                .with_count("urls", stats.total_urls)
                .with_count("attachments", stats.total_attachments),
        );
        let (unclassified, malformed) = (stats.unclassified_urls, stats.malformed_attachments);
        if unclassified > 0 {
            self.warn(&mut outcome, PipelineWarning::UnclassifiedUrls { count: unclassified });
        }
        if malformed > 0 {
            self.warn(&mut outcome, PipelineWarning::MalformedAttachments { count: malformed });
        }

        self.emit(
            &mut outcome,
            PipelineEvent::info(Stage::Assemble, format!("assembled {} records", report.len()))
                .with_count("records", report.len()),
        );
        outcome.report = report;
        outcome
    }

    fn emit(&self, outcome: &mut ConversionOutcome, event: PipelineEvent) {
        event.trace();
        if let Some(callback) = &self.callback {
            callback(&event);
        }
        outcome.events.push(event);
    }

    fn warn(&self, outcome: &mut ConversionOutcome, warning: PipelineWarning) {
        self.emit(outcome, warning.to_event());
        outcome.warnings.push(warning);
    }
}

fn recovery_detail(recoveries: &[String]) -> String {
    let mut detail = recoveries
        .iter()
        .take(RECOVERY_DETAIL_LIMIT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("; ");
    if recoveries.len() > RECOVERY_DETAIL_LIMIT {
        detail.push_str(&format!(" (and {} more)", recoveries.len() - RECOVERY_DETAIL_LIMIT));
    }
    detail
}

/// Converts one export file with the given configuration.
pub fn convert_file(path: impl AsRef<Path>, config: PipelineConfig) -> Result<ConversionOutcome> {
    Pipeline::new(config).run_file(path)
}
