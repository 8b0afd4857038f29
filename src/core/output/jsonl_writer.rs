//! JSON Lines (JSONL) output writer.
//!
//! One record per line, in report order. Suited to streaming consumers and
//! line-oriented audit tooling.

use std::fs::File;
use std::io::{BufWriter, Write};

use crate::core::models::{ConversationRecord, OutputConfig};
use crate::error::Result;

use super::OutputRecord;

/// Writes records to JSONL (JSON Lines) format.
///
/// # Format
/// ```text
/// {"sequence":0,"timestamp":"2024-01-01T09:00:00Z","sender":"Alice","message":"Hello",...}
/// {"sequence":1,"timestamp":"2024-01-01T09:05:00Z","sender":"Bob","message":"Hi",...}
/// ```
pub fn write_jsonl(records: &[ConversationRecord], output_path: &str, config: &OutputConfig) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);

    for record in records {
        let line = serde_json::to_string(&OutputRecord::from_record(record, config))?;
        writeln!(writer, "{}", line)?;
    }

    writer.flush()?;
    Ok(())
}

/// Converts records to a JSONL string.
pub fn to_jsonl(records: &[ConversationRecord], config: &OutputConfig) -> Result<String> {
    let mut output = String::new();

    for record in records {
        let line = serde_json::to_string(&OutputRecord::from_record(record, config))?;
        output.push_str(&line);
        output.push('\n');
    }

    Ok(output)
}
