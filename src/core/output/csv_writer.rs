//! CSV output writer.

use std::fs::File;
use std::io::Write;

use crate::core::models::{ConversationRecord, OutputConfig};
use crate::error::Result;

use super::{CELL_TIMESTAMP_FORMAT, format_attachments, format_urls};

/// Writes records to CSV with semicolon delimiter.
///
/// # Format
/// - Delimiter: `;`
/// - Columns: `Sequence`, `Timestamp`, `Sender`, `Recipient`, `Message`,
///   `URL Count`, `URLs`, `Attachment Count`, `Attachments`, `Gap Seconds`,
///   `Gap Flagged`, `Drift`, then `Position` and `Content Hash` when enabled
/// - Multi-entry cells separate entries with newlines
/// - Encoding: UTF-8
pub fn write_csv(records: &[ConversationRecord], output_path: &str, config: &OutputConfig) -> Result<()> {
    let file = File::create(output_path)?;
    write_records(records, file, config)
}

/// Converts records to a CSV string.
///
/// Same format as [`write_csv`], but returns a String instead of writing to file.
pub fn to_csv(records: &[ConversationRecord], config: &OutputConfig) -> Result<String> {
    let mut buffer = Vec::new();
    write_records(records, &mut buffer, config)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn write_records<W: Write>(records: &[ConversationRecord], out: W, config: &OutputConfig) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_writer(out);

    writer.write_record(build_header(config))?;
    for record in records {
        writer.write_record(build_record(record, config))?;
    }

    writer.flush()?;
    Ok(())
}

/// Build CSV header based on output configuration.
fn build_header(config: &OutputConfig) -> Vec<&'static str> {
    let mut header = vec![
        "Sequence",
        "Timestamp",
        "Sender",
        "Recipient",
        "Message",
        "URL Count",
        "URLs",
        "Attachment Count",
        "Attachments",
        "Gap Seconds",
        "Gap Flagged",
        "Drift",
    ];

    if config.include_position {
        header.push("Position");
    }
    if config.include_hash {
        header.push("Content Hash");
    }

    header
}

/// Build CSV record for a single conversation record.
fn build_record(record: &ConversationRecord, config: &OutputConfig) -> Vec<String> {
    let msg = &record.message;
    let timing = &record.timing;

    let timestamp = match msg.timestamp {
        Some(ts) => ts.format(CELL_TIMESTAMP_FORMAT).to_string(),
        None => msg.raw_timestamp.clone().unwrap_or_default(),
    };

    let mut row = vec![
        (timing.sequence_index + 1).to_string(),
        timestamp,
        msg.sender.clone(),
        msg.recipient.clone().unwrap_or_default(),
        msg.body.clone(),
        record.urls.len().to_string(),
        format_urls(&record.urls),
        record.attachments.len().to_string(),
        format_attachments(&record.attachments),
        timing.gap_seconds.map(|g| g.to_string()).unwrap_or_default(),
        yes_no(timing.gap_flagged).to_string(),
        yes_no(timing.drift).to_string(),
    ];

    if config.include_position {
        row.push(msg.position.to_string());
    }
    if config.include_hash {
        row.push(msg.content_hash.clone());
    }

    row
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classifier::ContentClassifier;
    use crate::core::models::TimestampAnnotation;
    use crate::core::normalizer::normalize;
    use crate::message::RawMessage;
    use crate::parsing::default_timestamp_formats;
    use tempfile::NamedTempFile;

    fn record(body: &str, ts: Option<&str>) -> ConversationRecord {
        let mut raw = RawMessage::new(body).with_sender("Alice");
        if let Some(ts) = ts {
            raw = raw.with_timestamp(ts);
        }
        let message = normalize(raw, &default_timestamp_formats());
        let (urls, attachments) = ContentClassifier::default().classify(&message);
        ConversationRecord {
            message,
            timing: TimestampAnnotation::default(),
            urls,
            attachments,
        }
    }

    #[test]
    fn test_write_csv_basic() {
        let records = vec![record("Hello", Some("2024-06-15T12:30"))];

        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();
        write_csv(&records, path, &OutputConfig::new()).unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("Sequence;Timestamp;Sender;Recipient;Message;URL Count"));
        assert!(content.contains("1;2024-06-15 12:30:00;Alice;;Hello;0;;0;;;No;No"));
    }

    #[test]
    fn test_optional_columns() {
        let records = vec![record("Hello", None)];
        let csv = to_csv(&records, &OutputConfig::all()).unwrap();
        let header = csv.lines().next().unwrap();
        assert!(header.ends_with("Drift;Position;Content Hash"));
        assert!(csv.contains(records[0].content_hash()));
    }

    #[test]
    fn test_url_cell_is_quoted_multiline() {
        let records = vec![record("a https://x.example/1 b https://contoso.sharepoint.com/2", None)];
        let csv = to_csv(&records, &OutputConfig::new()).unwrap();
        assert!(csv.contains("\"[1] https://x.example/1 (Web)\n[2] https://contoso.sharepoint.com/2 (SharePoint)\""));
    }
}
