//! Pipeline configuration.
//!
//! All knobs are passed explicitly through [`PipelineConfig`]; nothing is
//! read from global state, so independent pipelines with different rules can
//! run side by side.
//!
//! # Example
//!
//! ```rust
//! use chataudit::config::PipelineConfig;
//! use chataudit::core::{UrlCategory, UrlRule};
//!
//! let config = PipelineConfig::new()
//!     .with_gap_threshold(3600)
//!     .with_url_rule(UrlRule::host("box.com", UrlCategory::OneDrive));
//! assert!(config.validate().is_ok());
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::classifier::{UrlRule, default_url_rules};
use crate::error::{ChatauditError, Result};
use crate::markup::Encoding;
use crate::parser::Layout;
use crate::parsing::{LabelLimits, default_timestamp_formats};

/// Configuration for one conversion run.
///
/// Every field has a default, so a JSON override file only needs the keys it
/// changes:
///
/// ```json
/// { "gap_threshold_secs": 1800, "timestamp_formats": ["%d.%m.%Y %H:%M"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Input encoding override; detected from BOM/meta when `None`.
    pub encoding: Option<Encoding>,

    /// Accepted timestamp formats, tried in order.
    pub timestamp_formats: Vec<String>,

    /// Gaps strictly longer than this many seconds are flagged (default: none)
    pub gap_threshold_secs: Option<i64>,

    /// URL classification rules, first match wins.
    pub url_rules: Vec<UrlRule>,

    /// Force a layout instead of detecting one.
    pub layout: Option<Layout>,

    /// Longest plausible sender label, in characters (default: 100)
    pub max_sender_len: usize,

    /// Longest plausible attachment label, in characters (default: 200)
    pub max_attachment_label_len: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let limits = LabelLimits::default();
        Self {
            encoding: None,
            timestamp_formats: default_timestamp_formats(),
            gap_threshold_secs: None,
            url_rules: default_url_rules(),
            layout: None,
            max_sender_len: limits.max_sender_len,
            max_attachment_label_len: limits.max_attachment_label_len,
        }
    }
}

impl PipelineConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Parses a configuration from JSON and validates it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    /// Replaces the accepted timestamp formats.
    #[must_use]
    pub fn with_timestamp_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.timestamp_formats = formats.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_gap_threshold(mut self, seconds: i64) -> Self {
        self.gap_threshold_secs = Some(seconds);
        self
    }

    /// Replaces the URL rules.
    #[must_use]
    pub fn with_url_rules(mut self, rules: Vec<UrlRule>) -> Self {
        self.url_rules = rules;
        self
    }

    /// Adds a rule evaluated before the existing ones.
    #[must_use]
    pub fn with_url_rule(mut self, rule: UrlRule) -> Self {
        self.url_rules.insert(0, rule);
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = Some(layout);
        self
    }

    #[must_use]
    pub fn with_max_sender_len(mut self, max: usize) -> Self {
        self.max_sender_len = max;
        self
    }

    #[must_use]
    pub fn with_max_attachment_label_len(mut self, max: usize) -> Self {
        self.max_attachment_label_len = max;
        self
    }

    /// Checks the configuration for values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.timestamp_formats.iter().all(|f| f.trim().is_empty()) {
            return Err(ChatauditError::invalid_config(
                "timestamp_formats",
                "at least one timestamp format is required",
            ));
        }
        if let Some(secs) = self.gap_threshold_secs {
            if secs < 0 {
                return Err(ChatauditError::invalid_config(
                    "gap_threshold_secs",
                    format!("must not be negative, got {}", secs),
                ));
            }
        }
        if self.max_sender_len == 0 {
            return Err(ChatauditError::invalid_config("max_sender_len", "must be greater than 0"));
        }
        if self.max_attachment_label_len == 0 {
            return Err(ChatauditError::invalid_config(
                "max_attachment_label_len",
                "must be greater than 0",
            ));
        }
        if let Some(rule) = self.url_rules.iter().find(|r| r.pattern.trim().is_empty()) {
            return Err(ChatauditError::invalid_config(
                "url_rules",
                format!("rule for {} has an empty pattern", rule.category),
            ));
        }
        Ok(())
    }

    /// Label plausibility limits for the extractor.
    pub fn label_limits(&self) -> LabelLimits {
        LabelLimits {
            max_sender_len: self.max_sender_len,
            max_attachment_label_len: self.max_attachment_label_len,
        }
    }
}
