//! URL extraction and classification, attachment interpretation.
//!
//! Classification is an ordered rule list evaluated top to bottom; the first
//! rule whose pattern is found in the selected part of the URL wins. URLs no
//! rule claims are [`UrlCategory::Web`] for `http`/`https` and
//! [`UrlCategory::Other`] otherwise.

use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::models::{AttachmentReference, ExtractedUrl, FileKind, UrlCategory, UrlSource};
use crate::message::{NormalizedMessage, RawAttachment};

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\b[a-z][a-z0-9+.\-]*://[^\s<>"'`]+"#).unwrap());

static TRAILING_SIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*\(\s*\d+(?:[.,]\d+)?\s*(?:b|bytes|kb|mb|gb|tb)\s*\)\s*$").unwrap());

/// Characters that end a sentence rather than a URL.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '\'', '"'];

/// Which part of a URL a rule pattern is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTarget {
    /// Hostname only.
    #[default]
    Host,
    /// Path only.
    Path,
    /// The whole normalized URL without its scheme.
    Url,
}

/// One `pattern -> category` classification rule.
///
/// Patterns are case-insensitive substrings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRule {
    pub pattern: String,
    #[serde(default)]
    pub target: MatchTarget,
    pub category: UrlCategory,
}

impl UrlRule {
    pub fn host(pattern: impl Into<String>, category: UrlCategory) -> Self {
        Self::new(pattern, MatchTarget::Host, category)
    }

    pub fn path(pattern: impl Into<String>, category: UrlCategory) -> Self {
        Self::new(pattern, MatchTarget::Path, category)
    }

    pub fn url(pattern: impl Into<String>, category: UrlCategory) -> Self {
        Self::new(pattern, MatchTarget::Url, category)
    }

    fn new(pattern: impl Into<String>, target: MatchTarget, category: UrlCategory) -> Self {
        Self {
            pattern: pattern.into().to_lowercase(),
            target,
            category,
        }
    }

    /// Returns `true` if this rule claims `url`.
    pub fn matches(&self, url: &Url) -> bool {
        let haystack = match self.target {
            MatchTarget::Host => url.host_str().unwrap_or_default().to_lowercase(),
            MatchTarget::Path => url.path().to_lowercase(),
            MatchTarget::Url => {
                let full = url.as_str().to_lowercase();
                match full.split_once("://") {
                    Some((_, rest)) => rest.to_string(),
                    None => full,
                }
            }
        };
        haystack.contains(&self.pattern.to_lowercase())
    }
}

impl std::str::FromStr for UrlRule {
    type Err = String;

    /// Parses `PATTERN=CATEGORY`.
    ///
    /// A pattern containing `/` is matched against the whole URL, anything
    /// else against the host.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (pattern, category) = s
            .rsplit_once('=')
            .ok_or_else(|| format!("Invalid URL rule '{}': expected PATTERN=CATEGORY", s))?;
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(format!("Invalid URL rule '{}': empty pattern", s));
        }
        let category: UrlCategory = category.parse()?;
        Ok(if pattern.contains('/') {
            UrlRule::url(pattern, category)
        } else {
            UrlRule::host(pattern, category)
        })
    }
}

/// Built-in rules, in evaluation order.
pub fn default_url_rules() -> Vec<UrlRule> {
    vec![
        UrlRule::host("sharepoint.", UrlCategory::SharePoint),
        UrlRule::host("onedrive.", UrlCategory::OneDrive),
        UrlRule::host("1drv.ms", UrlCategory::OneDrive),
        UrlRule::url("teams.microsoft.com/l/meetup-join", UrlCategory::TeamsMeeting),
        UrlRule::url("teams.microsoft.com/meet", UrlCategory::TeamsMeeting),
        UrlRule::url("teams.live.com/meet", UrlCategory::TeamsMeeting),
        UrlRule::host("outlook.office.com", UrlCategory::OrganizationalEmail),
        UrlRule::host("outlook.office365.com", UrlCategory::OrganizationalEmail),
    ]
}

/// Classifies a parsed URL against `rules`.
pub fn classify_url(url: &Url, rules: &[UrlRule]) -> UrlCategory {
    if let Some(rule) = rules.iter().find(|rule| rule.matches(url)) {
        return rule.category;
    }
    match url.scheme() {
        "http" | "https" => UrlCategory::Web,
        _ => UrlCategory::Other,
    }
}

/// Strips sentence punctuation and unbalanced closing brackets from the end
/// of a matched URL.
fn trim_url(candidate: &str) -> &str {
    let mut url = candidate;
    loop {
        let before = url.len();
        url = url.trim_end_matches(TRAILING_PUNCTUATION);
        for (open, close) in [('(', ')'), ('[', ']'), ('{', '}')] {
            if url.ends_with(close) && url.matches(close).count() > url.matches(open).count() {
                url = &url[..url.len() - close.len_utf8()];
            }
        }
        if url.len() == before {
            return url;
        }
    }
}

/// Extracts URLs, interprets attachments.
///
/// # Example
///
/// ```rust
/// use chataudit::core::classifier::ContentClassifier;
/// use chataudit::core::UrlCategory;
///
/// let classifier = ContentClassifier::default();
/// let urls = classifier.extract_urls(
///     "See https://contoso.sharepoint.com/doc and https://contoso-my.sharepoint.com/personal/x",
///     &[],
/// );
/// assert_eq!(urls.len(), 2);
/// assert!(urls.iter().all(|u| u.category == UrlCategory::SharePoint));
/// ```
#[derive(Debug, Clone)]
pub struct ContentClassifier {
    rules: Vec<UrlRule>,
    max_attachment_label_len: usize,
}

impl Default for ContentClassifier {
    fn default() -> Self {
        Self::new(default_url_rules(), 200)
    }
}

impl ContentClassifier {
    pub fn new(rules: Vec<UrlRule>, max_attachment_label_len: usize) -> Self {
        Self {
            rules,
            max_attachment_label_len,
        }
    }

    pub fn rules(&self) -> &[UrlRule] {
        &self.rules
    }

    /// Classifies one URL string.
    ///
    /// Returns the normalized form (if it parses) and the category;
    /// unparsable URLs are [`UrlCategory::Other`].
    pub fn classify_str(&self, raw: &str) -> (Option<String>, UrlCategory) {
        match Url::parse(raw) {
            Ok(url) => {
                let category = classify_url(&url, &self.rules);
                (Some(url.to_string()), category)
            }
            Err(_) => (None, UrlCategory::Other),
        }
    }

    /// Extracts URLs from `body` in discovery order, then appends absolute
    /// anchor targets that do not already appear in the body.
    ///
    /// Repeated URLs are kept, each at its own position.
    pub fn extract_urls(&self, body: &str, links: &[String]) -> Vec<ExtractedUrl> {
        let mut urls: Vec<ExtractedUrl> = URL_PATTERN
            .find_iter(body)
            .filter_map(|m| {
                let raw = trim_url(m.as_str());
                if !raw.contains("://") || raw.ends_with("://") {
                    return None;
                }
                let (normalized, category) = self.classify_str(raw);
                Some(ExtractedUrl {
                    raw: raw.to_string(),
                    normalized,
                    category,
                    position: Some(m.start()),
                    source: UrlSource::Body,
                })
            })
            .collect();

        for link in links {
            let link = link.trim();
            if !link.contains("://") {
                continue;
            }
            if urls.iter().any(|u| u.raw == link) {
                continue;
            }
            let (normalized, category) = self.classify_str(link);
            urls.push(ExtractedUrl {
                raw: link.to_string(),
                normalized,
                category,
                position: None,
                source: UrlSource::Link,
            });
        }

        urls
    }

    /// Interprets one raw attachment label.
    ///
    /// Never fails: a label that cannot be read yields a reference with only
    /// `raw_label` (and `link`/`size` when present) populated.
    pub fn attachment(&self, raw: &RawAttachment) -> AttachmentReference {
        let label = TRAILING_SIZE.replace(raw.label.trim(), "").trim().to_string();
        let plausible = !label.is_empty() && label.chars().count() < self.max_attachment_label_len;

        let name = match (plausible, extension_of(&label)) {
            (true, Some(_)) => Some(label),
            (plausible, None) => raw
                .link
                .as_deref()
                .and_then(filename_from_link)
                .or(plausible.then_some(label)),
            (false, Some(_)) => raw.link.as_deref().and_then(filename_from_link),
        };

        let extension = name.as_deref().and_then(extension_of);
        let kind = extension.as_deref().and_then(FileKind::from_extension);

        AttachmentReference {
            name,
            extension,
            kind,
            raw_label: raw.label.clone(),
            link: raw.link.clone(),
            size: raw.size.clone(),
        }
    }

    /// Extracts URLs and attachments for one message.
    pub fn classify(&self, message: &NormalizedMessage) -> (Vec<ExtractedUrl>, Vec<AttachmentReference>) {
        let urls = self.extract_urls(&message.body, &message.links);
        let attachments = message.attachments.iter().map(|a| self.attachment(a)).collect();
        (urls, attachments)
    }
}

/// Lowercase extension of a file name, without the dot.
fn extension_of(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.trim().is_empty() || ext.is_empty() || ext.len() > 10 {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Last path segment of a link, percent-decoded, if it looks like a file.
fn filename_from_link(link: &str) -> Option<String> {
    let path = match Url::parse(link) {
        Ok(url) => url.path().to_string(),
        Err(_) => link.split(['?', '#']).next().unwrap_or_default().to_string(),
    };
    let segment = path.rsplit('/').next()?;
    let decoded = percent_decode_str(segment).decode_utf8_lossy().trim().to_string();
    extension_of(&decoded).map(|_| decoded)
}
