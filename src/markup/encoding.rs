//! Character encoding detection and decoding for export files.
//!
//! Exports are usually UTF-8, but older compliance tools write UTF-16 with a
//! byte order mark or declare a legacy single-byte charset in a `<meta>` tag.
//! Resolution order: explicit override, BOM, `<meta charset>` sniff, UTF-8.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ChatauditError, Result};

/// Number of leading bytes inspected when sniffing a `<meta charset>` declaration.
const SNIFF_LIMIT: usize = 1024;

static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]*charset\s*=\s*["']?\s*([a-z0-9_\-]+)"#).unwrap()
});

/// Windows-1252 code points for bytes 0x80..=0x9F. Undefined slots map to the C1 control.
const WINDOWS_1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{81}', '\u{201A}', '\u{192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{2C6}', '\u{2030}', '\u{160}', '\u{2039}', '\u{152}', '\u{8D}', '\u{17D}', '\u{8F}',
    '\u{90}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{2DC}', '\u{2122}', '\u{161}', '\u{203A}', '\u{153}', '\u{9D}', '\u{17E}', '\u{178}',
];

/// Character encodings the loader can decode.
///
/// # Example
///
/// ```rust
/// use chataudit::markup::Encoding;
///
/// let enc: Encoding = "latin1".parse().unwrap();
/// assert_eq!(enc, Encoding::Latin1);
/// assert_eq!(enc.label(), "iso-8859-1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Encoding {
    #[default]
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    #[serde(rename = "utf-16le")]
    Utf16Le,
    #[serde(rename = "utf-16be")]
    Utf16Be,
    #[serde(rename = "iso-8859-1", alias = "latin1")]
    Latin1,
    #[serde(rename = "windows-1252", alias = "cp1252")]
    Windows1252,
}

impl Encoding {
    /// Returns the canonical label of this encoding.
    pub fn label(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Utf16Le => "utf-16le",
            Encoding::Utf16Be => "utf-16be",
            Encoding::Latin1 => "iso-8859-1",
            Encoding::Windows1252 => "windows-1252",
        }
    }

    /// Returns all accepted labels including aliases.
    pub fn all_names() -> &'static [&'static str] {
        &[
            "utf-8",
            "utf8",
            "utf-16le",
            "utf-16be",
            "iso-8859-1",
            "latin1",
            "windows-1252",
            "cp1252",
        ]
    }

    /// Looks up an encoding from a charset label, as found in `<meta>` tags.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(Encoding::Utf8),
            "utf-16le" | "utf-16" | "utf16" | "unicode" => Some(Encoding::Utf16Le),
            "utf-16be" => Some(Encoding::Utf16Be),
            "iso-8859-1" | "iso8859-1" | "latin1" | "latin-1" | "l1" => Some(Encoding::Latin1),
            "windows-1252" | "cp1252" | "x-cp1252" => Some(Encoding::Windows1252),
            _ => None,
        }
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Encoding::from_label(s).ok_or_else(|| {
            format!(
                "Unknown encoding: '{}'. Expected one of: {}",
                s,
                Encoding::all_names().join(", ")
            )
        })
    }
}

/// Detects the encoding of `bytes` without an override.
///
/// Returns the encoding and the number of BOM bytes to skip.
pub fn detect_encoding(bytes: &[u8]) -> (Encoding, usize) {
    if let Some(found) = detect_bom(bytes) {
        return found;
    }
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(SNIFF_LIMIT)]);
    // A UTF-16 label readable as ASCII cannot describe BOM-less UTF-16 bytes.
    let sniffed = META_CHARSET
        .captures(&head)
        .and_then(|caps| Encoding::from_label(&caps[1]))
        .map(|found| match found {
            Encoding::Utf16Le | Encoding::Utf16Be => Encoding::Utf8,
            other => other,
        });
    (sniffed.unwrap_or_default(), 0)
}

fn detect_bom(bytes: &[u8]) -> Option<(Encoding, usize)> {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        Some((Encoding::Utf8, 3))
    } else if bytes.starts_with(&[0xFF, 0xFE]) {
        Some((Encoding::Utf16Le, 2))
    } else if bytes.starts_with(&[0xFE, 0xFF]) {
        Some((Encoding::Utf16Be, 2))
    } else {
        None
    }
}

/// Decodes raw export bytes into text.
///
/// An explicit `override_encoding` wins over detection, though a matching BOM
/// is still stripped.
///
/// # Errors
///
/// Returns [`ChatauditError::MalformedInput`] when the bytes are not valid in
/// the chosen encoding.
pub fn decode(bytes: &[u8], override_encoding: Option<Encoding>) -> Result<(String, Encoding)> {
    let (encoding, skip) = match override_encoding {
        Some(enc) => {
            let skip = match detect_bom(bytes) {
                Some((bom_enc, len)) if bom_enc == enc => len,
                _ => 0,
            };
            (enc, skip)
        }
        None => detect_encoding(bytes),
    };
    let body = &bytes[skip..];

    let text = match encoding {
        Encoding::Utf8 => String::from_utf8(body.to_vec()).map_err(|e| {
            ChatauditError::malformed(format!(
                "invalid UTF-8 at byte {}",
                e.utf8_error().valid_up_to() + skip
            ))
        })?,
        Encoding::Utf16Le => decode_utf16(body, u16::from_le_bytes)?,
        Encoding::Utf16Be => decode_utf16(body, u16::from_be_bytes)?,
        Encoding::Latin1 => body.iter().map(|&b| char::from(b)).collect(),
        Encoding::Windows1252 => body
            .iter()
            .map(|&b| match b {
                0x80..=0x9F => WINDOWS_1252_HIGH[usize::from(b - 0x80)],
                _ => char::from(b),
            })
            .collect(),
    };

    Ok((text, encoding))
}

fn decode_utf16(body: &[u8], to_unit: fn([u8; 2]) -> u16) -> Result<String> {
    if body.len() % 2 != 0 {
        return Err(ChatauditError::malformed(
            "UTF-16 input has an odd number of bytes",
        ));
    }
    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| to_unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).map_err(|e| ChatauditError::malformed(format!("invalid UTF-16: {e}")))
}
