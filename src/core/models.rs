//! Core data models for conversation records.

use chrono::{Duration, DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::NormalizedMessage;

/// Chronological annotation for one message.
///
/// Computed by the timeline stage; the message itself is never modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimestampAnnotation {
    /// Rank after chronological sorting, starting at 0.
    pub sequence_index: usize,
    /// Seconds since the previous record, when both timestamps are known.
    pub gap_seconds: Option<i64>,
    /// `true` if the gap exceeds the configured threshold.
    pub gap_flagged: bool,
    /// `true` if the export listed this message out of chronological order.
    pub drift: bool,
}

impl TimestampAnnotation {
    /// Gap since the previous record as a duration.
    pub fn gap(&self) -> Option<Duration> {
        self.gap_seconds.map(Duration::seconds)
    }
}

/// Service category of an extracted URL.
///
/// Rules are evaluated top to bottom; the declaration order below is also
/// the display order in statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[non_exhaustive]
pub enum UrlCategory {
    #[serde(alias = "sharepoint")]
    SharePoint,
    #[serde(alias = "onedrive")]
    OneDrive,
    #[serde(alias = "teams-meeting", alias = "teams")]
    TeamsMeeting,
    #[serde(alias = "organizational-email", alias = "email")]
    OrganizationalEmail,
    #[serde(alias = "web")]
    Web,
    #[serde(alias = "other")]
    Other,
}

impl UrlCategory {
    /// Returns the human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            UrlCategory::SharePoint => "SharePoint",
            UrlCategory::OneDrive => "OneDrive",
            UrlCategory::TeamsMeeting => "Teams Meeting",
            UrlCategory::OrganizationalEmail => "Organizational Email",
            UrlCategory::Web => "Web",
            UrlCategory::Other => "Other",
        }
    }

    /// Returns all categories in rule order.
    pub fn all() -> &'static [UrlCategory] {
        &[
            UrlCategory::SharePoint,
            UrlCategory::OneDrive,
            UrlCategory::TeamsMeeting,
            UrlCategory::OrganizationalEmail,
            UrlCategory::Web,
            UrlCategory::Other,
        ]
    }

    /// Returns all accepted names including aliases.
    pub fn all_names() -> &'static [&'static str] {
        &[
            "sharepoint",
            "onedrive",
            "teams-meeting",
            "teams",
            "organizational-email",
            "email",
            "web",
            "other",
        ]
    }
}

impl std::fmt::Display for UrlCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for UrlCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect();
        match key.as_str() {
            "sharepoint" => Ok(UrlCategory::SharePoint),
            "onedrive" => Ok(UrlCategory::OneDrive),
            "teamsmeeting" | "teams" => Ok(UrlCategory::TeamsMeeting),
            "organizationalemail" | "email" => Ok(UrlCategory::OrganizationalEmail),
            "web" | "http" => Ok(UrlCategory::Web),
            "other" => Ok(UrlCategory::Other),
            _ => Err(format!(
                "Unknown URL category: '{}'. Expected one of: {}",
                s,
                UrlCategory::all_names().join(", ")
            )),
        }
    }
}

/// Where a URL was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlSource {
    /// Matched in the message body text.
    Body,
    /// Anchor target whose URL does not appear in the body text.
    Link,
}

/// A URL extracted from one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedUrl {
    /// URL exactly as matched (trailing punctuation trimmed).
    pub raw: String,
    /// Absolute serialized form, `None` if the URL does not parse.
    pub normalized: Option<String>,
    pub category: UrlCategory,
    /// Byte offset in the normalized body; `None` for anchor-only links.
    pub position: Option<usize>,
    pub source: UrlSource,
}

/// File type inferred from an attachment's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum FileKind {
    Document,
    Spreadsheet,
    Presentation,
    Image,
    Video,
    Audio,
    Archive,
    Code,
}

impl FileKind {
    /// Maps a lowercase extension (without the dot) to a kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let kind = match ext {
            "pdf" | "doc" | "docx" | "txt" | "rtf" | "odt" => FileKind::Document,
            "xls" | "xlsx" | "csv" | "ods" => FileKind::Spreadsheet,
            "ppt" | "pptx" | "odp" => FileKind::Presentation,
            "jpg" | "jpeg" | "png" | "gif" | "bmp" | "svg" | "webp" => FileKind::Image,
            "mp4" | "avi" | "mov" | "wmv" | "flv" | "mkv" => FileKind::Video,
            "mp3" | "wav" | "ogg" | "m4a" | "flac" => FileKind::Audio,
            "zip" | "rar" | "7z" | "tar" | "gz" => FileKind::Archive,
            "py" | "js" | "html" | "css" | "java" | "cpp" | "c" | "h" => FileKind::Code,
            _ => return None,
        };
        Some(kind)
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FileKind::Document => "Document",
            FileKind::Spreadsheet => "Spreadsheet",
            FileKind::Presentation => "Presentation",
            FileKind::Image => "Image",
            FileKind::Video => "Video",
            FileKind::Audio => "Audio",
            FileKind::Archive => "Archive",
            FileKind::Code => "Code",
        };
        f.write_str(name)
    }
}

/// An attachment referenced by one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentReference {
    /// Display name; `None` if the label could not be interpreted.
    pub name: Option<String>,
    /// Lowercase extension, if the name has one.
    pub extension: Option<String>,
    /// Kind inferred from the extension, `None` if unrecognized.
    pub kind: Option<FileKind>,
    /// Label text as found in the markup.
    pub raw_label: String,
    pub link: Option<String>,
    pub size: Option<String>,
}

impl AttachmentReference {
    /// Returns `true` if only the raw label could be recovered.
    pub fn is_malformed(&self) -> bool {
        self.name.is_none()
    }
}

/// Final, fully annotated unit of output: one message per record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub message: NormalizedMessage,
    pub timing: TimestampAnnotation,
    pub urls: Vec<ExtractedUrl>,
    pub attachments: Vec<AttachmentReference>,
}

impl ConversationRecord {
    pub fn sequence_index(&self) -> usize {
        self.timing.sequence_index
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.message.timestamp
    }

    pub fn content_hash(&self) -> &str {
        &self.message.content_hash
    }
}

/// Configuration for output format.
/// Controls which optional columns are included in the output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Include the content hash of each record
    pub include_hash: bool,
    /// Include the source position of each record
    pub include_position: bool,
}

impl OutputConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables every optional column.
    pub fn all() -> Self {
        Self {
            include_hash: true,
            include_position: true,
        }
    }

    #[must_use]
    pub fn with_hash(mut self) -> Self {
        self.include_hash = true;
        self
    }

    #[must_use]
    pub fn with_position(mut self) -> Self {
        self.include_position = true;
        self
    }
}
