//! Structured pipeline events and warnings.
//!
//! The pipeline reports what it did as data, not formatted log lines:
//! each stage emits one [`PipelineEvent`] carrying its counts, and
//! record-level irregularities are summarized as [`PipelineWarning`]s.
//! Events are collected into the conversion outcome, pushed to an optional
//! [`EventCallback`], and forwarded to `tracing`.
//!
//! # Example
//!
//! ```rust
//! use chataudit::events::{EventCallback, PipelineEvent};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let seen = Arc::new(AtomicUsize::new(0));
//! let counter = seen.clone();
//! let callback: EventCallback = Arc::new(move |event: &PipelineEvent| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//!     println!("{}: {}", event.stage, event.message);
//! });
//! # let _ = callback;
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Pipeline stage that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Load,
    Detect,
    Extract,
    Normalize,
    Timeline,
    Classify,
    Assemble,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Load => "load",
            Stage::Detect => "detect",
            Stage::Extract => "extract",
            Stage::Normalize => "normalize",
            Stage::Timeline => "timeline",
            Stage::Classify => "classify",
            Stage::Assemble => "assemble",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    Info,
    Warning,
}

/// One structured event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineEvent {
    pub stage: Stage,
    pub level: EventLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub counts: BTreeMap<String, u64>,
}

impl PipelineEvent {
    pub fn info(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            level: EventLevel::Info,
            message: message.into(),
            counts: BTreeMap::new(),
        }
    }

    pub fn warning(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            level: EventLevel::Warning,
            ..Self::info(stage, message)
        }
    }

    /// Attaches a named count.
    #[must_use]
    pub fn with_count(mut self, name: &str, value: usize) -> Self {
        self.counts.insert(name.to_string(), value as u64);
        self
    }

    pub fn count(&self, name: &str) -> Option<u64> {
        self.counts.get(name).copied()
    }

    pub fn is_warning(&self) -> bool {
        self.level == EventLevel::Warning
    }

    /// Forwards this event to `tracing`.
    pub(crate) fn trace(&self) {
        let counts = format!("{:?}", self.counts);
        match self.level {
            EventLevel::Info => info!(stage = %self.stage, counts = %counts, "{}", self.message),
            EventLevel::Warning => warn!(stage = %self.stage, counts = %counts, "{}", self.message),
        }
    }
}

/// Non-fatal condition detected during a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum PipelineWarning {
    /// The document parsed but no message block was recognized.
    EmptyResult,
    UnparsedTimestamps { count: usize },
    UnclassifiedUrls { count: usize },
    MalformedAttachments { count: usize },
    /// The lenient loader repaired irregular markup.
    RecoveredMarkup { detail: String },
}

impl PipelineWarning {
    /// Stage the warning is attributed to.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineWarning::EmptyResult => Stage::Extract,
            PipelineWarning::UnparsedTimestamps { .. } => Stage::Normalize,
            PipelineWarning::UnclassifiedUrls { .. } | PipelineWarning::MalformedAttachments { .. } => {
                Stage::Classify
            }
            PipelineWarning::RecoveredMarkup { .. } => Stage::Load,
        }
    }

    pub(crate) fn to_event(&self) -> PipelineEvent {
        let event = PipelineEvent::warning(self.stage(), self.to_string());
        match self {
            PipelineWarning::UnparsedTimestamps { count } => event.with_count("unparsed_timestamps", *count),
            PipelineWarning::UnclassifiedUrls { count } => event.with_count("unclassified_urls", *count),
            PipelineWarning::MalformedAttachments { count } => event.with_count("malformed_attachments", *count),
            PipelineWarning::EmptyResult | PipelineWarning::RecoveredMarkup { .. } => event,
        }
    }
}

impl std::fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineWarning::EmptyResult => f.write_str("no message blocks were recognized"),
            PipelineWarning::UnparsedTimestamps { count } => {
                write!(f, "{} messages had unparsable timestamps", count)
            }
            PipelineWarning::UnclassifiedUrls { count } => write!(f, "{} URLs could not be parsed", count),
            PipelineWarning::MalformedAttachments { count } => {
                write!(f, "{} attachment labels could not be interpreted", count)
            }
            PipelineWarning::RecoveredMarkup { detail } => write!(f, "recovered irregular markup: {}", detail),
        }
    }
}

/// Callback type for receiving events as they are emitted.
///
/// This is a thread-safe callback invoked synchronously from the pipeline.
pub type EventCallback = Arc<dyn Fn(&PipelineEvent) + Send + Sync>;
