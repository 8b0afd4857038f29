//! Shared parsing utilities for all export layouts.
//!
//! This module contains the label finders, text clean-up and timestamp
//! parsing used by the layout implementations in [`crate::parsers`], the
//! streaming extractor and the normalizer.

pub mod labels;
pub mod text;
pub mod timestamp;

// Re-export commonly used items
pub use labels::{
    LabelLimits, find_attachments, find_body, find_bold_sender, find_links, find_recipient,
    find_sender, find_sender_by_class, find_timestamp, has_class_token, is_attachment_marker,
    is_download_link, label_text, timestamp_hint,
};
pub use text::{collapse_whitespace, non_blank};
pub use timestamp::{DEFAULT_TIMESTAMP_FORMATS, default_timestamp_formats, parse_timestamp};
