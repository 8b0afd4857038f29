//! Unified error types for chataudit.
//!
//! This module provides a single [`ChatauditError`] enum that covers every
//! fatal condition in the library. Record-level irregularities (unparsable
//! timestamps, odd URLs, broken attachment labels) are never errors: they
//! degrade to empty fields and are counted in the report instead.
//!
//! # Error Handling Philosophy
//!
//! - Only document-level failure aborts a conversion
//! - **Library users** get typed errors they can match on
//! - **Application users** get clear, actionable error messages

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A specialized [`Result`] type for chataudit operations.
///
/// # Example
///
/// ```rust
/// use chataudit::error::Result;
/// use chataudit::core::ConversationRecord;
///
/// fn my_function() -> Result<Vec<ConversationRecord>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, ChatauditError>;

/// The error type for all chataudit operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatauditError {
    /// An I/O error occurred.
    ///
    /// This typically happens when:
    /// - The input file doesn't exist
    /// - Permission denied
    /// - Disk is full (when writing output)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The input could not be turned into a traversable document at all.
    ///
    /// Fatal for the run; no partial output is produced.
    #[error("Malformed input{}: {reason}", path.as_ref().map(|p| format!(" (file: {})", p.display())).unwrap_or_default())]
    MalformedInput {
        /// What went wrong while loading
        reason: String,
        /// The file path, if available
        path: Option<PathBuf>,
    },

    /// A configuration value was rejected.
    #[error("Invalid configuration for '{field}': {message}")]
    InvalidConfig {
        /// The offending field
        field: &'static str,
        /// Description of what's wrong
        message: String,
    },

    /// A value did not match any known format (output extension,
    /// encoding label, URL category name).
    #[error("Invalid {format} format: {message}")]
    InvalidFormat {
        /// The format that was expected
        format: &'static str,
        /// Description of what's wrong
        message: String,
    },

    /// CSV writing error.
    #[cfg(feature = "csv-output")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing/serialization error.
    ///
    /// Raised when reading a configuration file or writing JSON output.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl ChatauditError {
    /// Creates a malformed input error without a path.
    pub fn malformed(reason: impl Into<String>) -> Self {
        ChatauditError::MalformedInput {
            reason: reason.into(),
            path: None,
        }
    }

    /// Attaches a file path to a malformed input error.
    ///
    /// Other variants are returned unchanged.
    #[must_use]
    pub fn with_path(self, file: impl Into<PathBuf>) -> Self {
        match self {
            ChatauditError::MalformedInput { reason, .. } => ChatauditError::MalformedInput {
                reason,
                path: Some(file.into()),
            },
            other => other,
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(field: &'static str, message: impl Into<String>) -> Self {
        ChatauditError::InvalidConfig {
            field,
            message: message.into(),
        }
    }

    /// Creates an invalid format error.
    pub fn invalid_format(format: &'static str, message: impl Into<String>) -> Self {
        ChatauditError::InvalidFormat {
            format,
            message: message.into(),
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, ChatauditError::Io(_))
    }

    /// Returns `true` if the input could not be parsed as markup.
    pub fn is_malformed(&self) -> bool {
        matches!(self, ChatauditError::MalformedInput { .. })
    }

    /// Returns `true` if this is a configuration error.
    pub fn is_invalid_config(&self) -> bool {
        matches!(self, ChatauditError::InvalidConfig { .. })
    }

    /// Returns `true` if this is an invalid format error.
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, ChatauditError::InvalidFormat { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = ChatauditError::from(io_err);
        let display = err.to_string();
        assert!(display.contains("IO error"));
        assert!(display.contains("file not found"));
    }

    #[test]
    fn test_malformed_with_path() {
        let err = ChatauditError::malformed("no markup elements found").with_path("/tmp/chat.html");
        let display = err.to_string();
        assert!(display.contains("Malformed input"));
        assert!(display.contains("/tmp/chat.html"));
        assert!(display.contains("no markup elements found"));
    }

    #[test]
    fn test_malformed_without_path() {
        let err = ChatauditError::malformed("invalid UTF-8");
        assert!(!err.to_string().contains("file:"));
        assert!(err.is_malformed());
        assert!(!err.is_io());
    }

    #[test]
    fn test_with_path_leaves_other_variants() {
        let err = ChatauditError::invalid_config("timestamp_formats", "empty").with_path("x.html");
        assert!(err.is_invalid_config());
        assert!(!err.to_string().contains("x.html"));
    }

    #[test]
    fn test_invalid_config_display() {
        let err = ChatauditError::invalid_config("gap_threshold_secs", "must not be negative");
        let display = err.to_string();
        assert!(display.contains("gap_threshold_secs"));
        assert!(display.contains("must not be negative"));
    }

    #[test]
    fn test_invalid_format_display() {
        let err = ChatauditError::invalid_format("output", "Unknown file extension: '.xlsx'");
        assert!(err.is_invalid_format());
        assert!(err.to_string().contains(".xlsx"));
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error;
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = ChatauditError::from(io_err);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: ChatauditError = json_err.into();
        assert!(err.to_string().contains("JSON error"));
    }

    #[cfg(feature = "csv-output")]
    #[test]
    fn test_from_csv_error() {
        let io_err = std::io::Error::other("test");
        let csv_err = csv::Error::from(io_err);
        let err: ChatauditError = csv_err.into();
        assert!(err.to_string().contains("CSV error"));
    }
}
