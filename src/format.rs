//! Output format selection.
//!
//! Library-level format types that don't depend on CLI frameworks.
//!
//! # Example
//!
//! ```rust
//! # #[cfg(all(feature = "csv-output", feature = "json-output"))]
//! # fn example() -> chataudit::Result<()> {
//! use chataudit::format::{OutputFormat, write_to_format};
//! use chataudit::core::OutputConfig;
//! use chataudit::pipeline::Pipeline;
//!
//! let outcome = Pipeline::default().run_str("<div class='msg'><b>Ann</b> hi</div>")?;
//! let dir = std::env::temp_dir().join("chataudit-format-doc.csv");
//! write_to_format(&outcome.report, dir.to_str().unwrap(), OutputFormat::Csv, &OutputConfig::new())?;
//!
//! // Or use format detection from extension
//! let format = OutputFormat::from_path("report.jsonl")?;
//! assert_eq!(format, OutputFormat::Jsonl);
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};

use crate::core::models::OutputConfig;
use crate::core::report::ConversationReport;
use crate::error::ChatauditError;

/// Output format for conversion reports.
///
/// - [`Csv`](OutputFormat::Csv) - One row per record, for spreadsheet rendering
/// - [`Json`](OutputFormat::Json) - Full report with statistics
/// - [`Jsonl`](OutputFormat::Jsonl) - One record per line, for line-oriented tooling
///
/// # Example
///
/// ```rust
/// use chataudit::format::OutputFormat;
/// use std::str::FromStr;
///
/// let format = OutputFormat::from_str("jsonl").unwrap();
/// assert_eq!(format, OutputFormat::Jsonl);
/// assert_eq!(format.extension(), "jsonl");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum OutputFormat {
    /// CSV with semicolon delimiter (default)
    #[default]
    Csv,

    /// JSON object with layout, statistics and records
    Json,

    /// JSON Lines - one record object per line
    ///
    /// Also known as NDJSON.
    Jsonl,
}

impl OutputFormat {
    /// Returns the file extension for this format (without dot).
    ///
    /// # Example
    ///
    /// ```rust
    /// use chataudit::format::OutputFormat;
    ///
    /// assert_eq!(OutputFormat::Csv.extension(), "csv");
    /// assert_eq!(OutputFormat::Json.extension(), "json");
    /// assert_eq!(OutputFormat::Jsonl.extension(), "jsonl");
    /// ```
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Jsonl => "jsonl",
        }
    }

    /// Returns all supported format names.
    pub fn all_names() -> &'static [&'static str] {
        &["csv", "json", "jsonl", "ndjson"]
    }

    /// Returns all available formats.
    pub fn all() -> &'static [OutputFormat] {
        &[OutputFormat::Csv, OutputFormat::Json, OutputFormat::Jsonl]
    }

    /// Detects format from a file path based on extension.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chataudit::format::OutputFormat;
    ///
    /// let format = OutputFormat::from_path("output.jsonl").unwrap();
    /// assert_eq!(format, OutputFormat::Jsonl);
    /// ```
    pub fn from_path(path: &str) -> Result<Self, ChatauditError> {
        let ext = std::path::Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            _ => Err(ChatauditError::invalid_format(
                "output",
                format!("Unknown file extension: '.{}'. Expected one of: csv, json, jsonl", ext),
            )),
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

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            _ => Err(format!(
                "Unknown format: '{}'. Expected one of: {}",
                s,
                OutputFormat::all_names().join(", ")
            )),
        }
    }
}

/// Writes a report to a file in the specified format.
///
/// CSV and JSONL receive the records only; JSON also carries the layout
/// and statistics.
///
/// # Example
///
/// ```rust,no_run
/// # #[cfg(all(feature = "csv-output", feature = "json-output"))]
/// # fn example() -> chataudit::Result<()> {
/// use chataudit::format::{OutputFormat, write_to_format};
/// use chataudit::core::OutputConfig;
/// use chataudit::pipeline::Pipeline;
///
/// let outcome = Pipeline::default().run_file("export.html")?;
/// let config = OutputConfig::new().with_hash();
///
/// write_to_format(&outcome.report, "report.csv", OutputFormat::Csv, &config)?;
/// write_to_format(&outcome.report, "report.json", OutputFormat::Json, &config)?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if:
/// - The required feature for the format is not enabled
/// - The file cannot be written
#[allow(unused_variables)]
pub fn write_to_format(
    report: &ConversationReport,
    path: &str,
    format: OutputFormat,
    config: &OutputConfig,
) -> Result<(), ChatauditError> {
    match format {
        #[cfg(feature = "csv-output")]
        OutputFormat::Csv => crate::core::output::write_csv(&report.records, path, config),
        #[cfg(feature = "json-output")]
        OutputFormat::Json => crate::core::output::write_json(report, path, config),
        #[cfg(feature = "json-output")]
        OutputFormat::Jsonl => crate::core::output::write_jsonl(&report.records, path, config),
        #[allow(unreachable_patterns)]
        _ => Err(missing_feature(format)),
    }
}

/// Converts a report to a string in the specified format.
///
/// # Example
///
/// ```rust
/// # #[cfg(all(feature = "csv-output", feature = "json-output"))]
/// # fn example() -> chataudit::Result<()> {
/// use chataudit::format::{OutputFormat, to_format_string};
/// use chataudit::core::OutputConfig;
/// use chataudit::pipeline::Pipeline;
///
/// let outcome = Pipeline::default().run_str("<div class='msg'><b>Ann</b> hi</div>")?;
/// let csv = to_format_string(&outcome.report, OutputFormat::Csv, &OutputConfig::new())?;
/// assert!(csv.contains("Ann"));
/// # Ok(())
/// # }
/// ```
#[allow(unused_variables)]
pub fn to_format_string(
    report: &ConversationReport,
    format: OutputFormat,
    config: &OutputConfig,
) -> Result<String, ChatauditError> {
    match format {
        #[cfg(feature = "csv-output")]
        OutputFormat::Csv => crate::core::output::to_csv(&report.records, config),
        #[cfg(feature = "json-output")]
        OutputFormat::Json => crate::core::output::to_json(report, config),
        #[cfg(feature = "json-output")]
        OutputFormat::Jsonl => crate::core::output::to_jsonl(&report.records, config),
        #[allow(unreachable_patterns)]
        _ => Err(missing_feature(format)),
    }
}

#[allow(dead_code)]
fn missing_feature(format: OutputFormat) -> ChatauditError {
    ChatauditError::invalid_format(
        "output",
        format!(
            "Output format {:?} requires the '{}' feature to be enabled",
            format,
            match format {
                OutputFormat::Csv => "csv-output",
                OutputFormat::Json | OutputFormat::Jsonl => "json-output",
            }
        ),
    )
}
