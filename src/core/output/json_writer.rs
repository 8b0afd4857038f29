//! JSON output writer.

use std::fs::File;
use std::io::Write;

use serde::Serialize;

use crate::core::models::OutputConfig;
use crate::core::report::{ConversationReport, ReportStats};
use crate::error::Result;
use crate::parser::Layout;

use super::OutputRecord;

#[derive(Serialize)]
struct JsonReport<'a> {
    layout: Option<Layout>,
    stats: &'a ReportStats,
    records: Vec<OutputRecord<'a>>,
}

/// Writes the whole report to a JSON file.
///
/// # Format
/// ```json
/// {
///   "layout": "purview",
///   "stats": { "total_messages": 2, ... },
///   "records": [
///     {"sequence": 0, "sender": "Alice", "message": "Hello", "urls": [], ...}
///   ]
/// }
/// ```
pub fn write_json(report: &ConversationReport, output_path: &str, config: &OutputConfig) -> Result<()> {
    let json = to_json(report, config)?;
    let mut file = File::create(output_path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Converts the report to a pretty-printed JSON string.
pub fn to_json(report: &ConversationReport, config: &OutputConfig) -> Result<String> {
    let out = JsonReport {
        layout: report.layout,
        stats: &report.stats,
        records: report
            .records
            .iter()
            .map(|r| OutputRecord::from_record(r, config))
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&out)?)
}
