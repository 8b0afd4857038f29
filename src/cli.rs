//! Command-line interface definition using clap.
//!
//! This module defines:
//! - [`Args`] - CLI argument structure (for use with clap)
//! - [`OutputFormat`] - Output format options
//!
//! Flags map onto [`PipelineConfig`] through [`Args::pipeline_config`], so
//! the binary and library callers configure runs the same way.
//!
//! ```rust
//! use chataudit::cli::Args;
//! use clap::Parser;
//!
//! let args = Args::parse_from(["chataudit", "export.html", "--gap-threshold", "600"]);
//! let config = args.pipeline_config().unwrap();
//! assert_eq!(config.gap_threshold_secs, Some(600));
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::core::classifier::UrlRule;
use crate::core::models::OutputConfig;
use crate::error::Result;
use crate::markup::Encoding;
use crate::parser::Layout;

/// Convert compliance HTML chat exports into deduplicated,
/// chronologically annotated audit reports.
#[derive(Parser, Debug, Clone)]
#[command(name = "chataudit")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    chataudit export.html
    chataudit export.html -o audit.json
    chataudit export.html --gap-threshold 3600 --include-hash
    chataudit export.html --url-rule wiki.contoso.com=sharepoint
    chataudit export.html --timestamp-format '%d.%m.%Y %H:%M' --events events.jsonl")]
pub struct Args {
    /// Path to the HTML export
    pub input: PathBuf,

    /// Path to output file [default: <input>_converted.<format>]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format [default: from the output extension, else csv]
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// JSON file with pipeline configuration overrides
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Input encoding (skips BOM/meta detection)
    #[arg(long, value_name = "LABEL", value_parser = parse_encoding)]
    pub encoding: Option<Encoding>,

    /// Accepted timestamp format, tried in order; replaces the defaults
    #[arg(long = "timestamp-format", value_name = "FORMAT")]
    pub timestamp_formats: Vec<String>,

    /// Flag gaps longer than this many seconds
    #[arg(long, value_name = "SECS")]
    pub gap_threshold: Option<i64>,

    /// Extra URL rule PATTERN=CATEGORY, evaluated before the built-in rules
    #[arg(long = "url-rule", value_name = "RULE")]
    pub url_rules: Vec<UrlRule>,

    /// Force an export layout instead of detecting it
    #[arg(long)]
    pub layout: Option<Layout>,

    /// Write pipeline events as JSON Lines to this file
    #[arg(long, value_name = "FILE")]
    pub events: Option<PathBuf>,

    /// Include the content hash column
    #[arg(long)]
    pub include_hash: bool,

    /// Include the source position column
    #[arg(long)]
    pub include_position: bool,

    /// Verbose logging (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn parse_encoding(label: &str) -> std::result::Result<Encoding, String> {
    label.parse()
}

impl Args {
    /// Builds the pipeline configuration: file overrides first, then flags.
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(encoding) = self.encoding {
            config = config.with_encoding(encoding);
        }
        if !self.timestamp_formats.is_empty() {
            config = config.with_timestamp_formats(self.timestamp_formats.iter().cloned());
        }
        if let Some(secs) = self.gap_threshold {
            config = config.with_gap_threshold(secs);
        }
        for rule in self.url_rules.iter().rev() {
            config = config.with_url_rule(rule.clone());
        }
        if let Some(layout) = self.layout {
            config = config.with_layout(layout);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn output_config(&self) -> OutputConfig {
        OutputConfig {
            include_hash: self.include_hash,
            include_position: self.include_position,
        }
    }

    /// Resolves the output format: flag, then output extension, then CSV.
    pub fn resolved_format(&self) -> OutputFormat {
        if let Some(format) = self.format {
            return format;
        }
        self.output
            .as_deref()
            .and_then(|p| p.to_str())
            .and_then(|p| crate::format::OutputFormat::from_path(p).ok())
            .map(OutputFormat::from)
            .unwrap_or_default()
    }

    /// Resolves the output path, defaulting to `<input stem>_converted.<ext>`
    /// next to the input.
    pub fn resolved_output(&self) -> PathBuf {
        if let Some(output) = &self.output {
            return output.clone();
        }
        default_output_path(&self.input, self.resolved_format())
    }
}

fn default_output_path(input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("chat");
    input.with_file_name(format!("{}_converted.{}", stem, format.extension()))
}

/// Output format options.
///
/// # Example
///
/// ```rust
/// use chataudit::cli::OutputFormat;
///
/// let format = OutputFormat::Jsonl;
/// println!("Extension: {}", format.extension()); // "jsonl"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// CSV with semicolon delimiter (default)
    #[default]
    Csv,

    /// JSON report with statistics
    Json,

    /// JSON Lines - one record per line
    #[value(alias = "ndjson")]
    Jsonl,
}

impl OutputFormat {
    /// Returns the file extension for this format (without dot).
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Jsonl => "jsonl",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "CSV"),
            OutputFormat::Json => write!(f, "JSON"),
            OutputFormat::Jsonl => write!(f, "JSONL"),
        }
    }
}

// Conversion to library format type
impl From<OutputFormat> for crate::format::OutputFormat {
    fn from(format: OutputFormat) -> crate::format::OutputFormat {
        match format {
            OutputFormat::Csv => crate::format::OutputFormat::Csv,
            OutputFormat::Json => crate::format::OutputFormat::Json,
            OutputFormat::Jsonl => crate::format::OutputFormat::Jsonl,
        }
    }
}

impl From<crate::format::OutputFormat> for OutputFormat {
    fn from(format: crate::format::OutputFormat) -> OutputFormat {
        match format {
            crate::format::OutputFormat::Json => OutputFormat::Json,
            crate::format::OutputFormat::Jsonl => OutputFormat::Jsonl,
            crate::format::OutputFormat::Csv => OutputFormat::Csv,
        }
    }
}
