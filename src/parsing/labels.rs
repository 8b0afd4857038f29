//! Label recognition inside a message block.
//!
//! Export tools mark up message parts with descriptive class names
//! (`message-sender`, `msg-time`, `attachment-item`, ...). Matching is done
//! on class *tokens*: each class is split on `-` and `_` and a piece must
//! equal one of the role words, case-insensitively. `file-name` therefore
//! counts as a sender candidate only until attachment markers are excluded.

use crate::markup::{ElementRef, NodeId};
use crate::message::RawAttachment;

use super::text::{collapse_whitespace, non_blank};

const SENDER_WORDS: &[&str] = &["sender", "from", "author", "name", "username", "displayname"];
const RECIPIENT_WORDS: &[&str] = &["recipient", "recipients", "to"];
const TIMESTAMP_WORDS: &[&str] = &["time", "date", "timestamp", "datetime"];
const BODY_WORDS: &[&str] = &["content", "body", "text"];
const BODY_FALLBACK_WORDS: &[&str] = &["message", "msg", "text"];
const ATTACHMENT_WORDS: &[&str] = &["attachment", "attachments", "file", "document"];
const ICON_WORDS: &[&str] = &["icon"];
const SIZE_WORDS: &[&str] = &["size", "filesize"];

const TIMESTAMP_ATTRS: &[&str] = &["datetime", "data-timestamp", "data-time"];
const ATTACHMENT_LABEL_ATTRS: &[&str] = &["title", "data-filename", "data-file", "aria-label"];
const SKIPPED_LINK_PREFIXES: &[&str] = &["javascript:", "mailto:", "#", "tel:"];

/// Extensions that make an anchor a download link.
pub(crate) const DOWNLOAD_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "zip", "rar", "txt", "csv", "jpg",
    "jpeg", "png", "gif", "mp4",
];

/// Plausibility limits for extracted labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelLimits {
    /// Sender labels this long (in characters) or longer are rejected.
    pub max_sender_len: usize,
    /// Attachment text labels this long or longer are rejected.
    pub max_attachment_label_len: usize,
}

impl Default for LabelLimits {
    fn default() -> Self {
        Self {
            max_sender_len: 100,
            max_attachment_label_len: 200,
        }
    }
}

/// Returns `true` if any class token of `el` equals one of `words`.
pub fn has_class_token(el: &ElementRef<'_>, words: &[&str]) -> bool {
    el.classes().any(|class| {
        class
            .split(['-', '_'])
            .any(|piece| words.iter().any(|w| piece.eq_ignore_ascii_case(w)))
    })
}

/// Returns `true` if `el` carries an attachment class token.
pub fn is_attachment_marker(el: &ElementRef<'_>) -> bool {
    has_class_token(el, ATTACHMENT_WORDS)
}

/// Collapsed text of an element.
pub fn label_text(el: &ElementRef<'_>) -> String {
    collapse_whitespace(&el.text())
}

fn plausible_sender(el: &ElementRef<'_>, limits: &LabelLimits) -> bool {
    let text = label_text(el);
    !text.is_empty() && text.chars().count() < limits.max_sender_len
}

/// Finds the sender label: sender-classed elements first, then `<strong>`/`<b>`.
///
/// Labels that are empty or not shorter than `max_sender_len` characters are skipped.
pub fn find_sender<'a>(block: &ElementRef<'a>, limits: &LabelLimits) -> Option<ElementRef<'a>> {
    find_sender_by_class(block, limits).or_else(|| find_bold_sender(block, limits))
}

/// Finds a sender-classed element only.
pub fn find_sender_by_class<'a>(
    block: &ElementRef<'a>,
    limits: &LabelLimits,
) -> Option<ElementRef<'a>> {
    block.find(|el| {
        has_class_token(el, SENDER_WORDS) && !is_attachment_marker(el) && plausible_sender(el, limits)
    })
}

/// Finds the first plausible `<strong>` or `<b>` label.
pub fn find_bold_sender<'a>(block: &ElementRef<'a>, limits: &LabelLimits) -> Option<ElementRef<'a>> {
    block.find(|el| el.is_any(&["strong", "b"]) && plausible_sender(el, limits))
}

/// Finds the recipient label.
pub fn find_recipient<'a>(block: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    block.find(|el| has_class_token(el, RECIPIENT_WORDS) && !label_text(el).is_empty())
}

/// Finds the timestamp label: a `<time>` element, then a time/date-classed element.
pub fn find_timestamp<'a>(block: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    let usable = |el: &ElementRef<'a>| {
        !label_text(el).is_empty() || el.first_attr(TIMESTAMP_ATTRS).is_some()
    };
    block
        .find(|el| el.name() == "time" && usable(el))
        .or_else(|| {
            block.find(|el| {
                has_class_token(el, TIMESTAMP_WORDS) && !is_attachment_marker(el) && usable(el)
            })
        })
}

/// Machine-readable timestamp from a `datetime`-style attribute.
///
/// The timestamp label is consulted first, then the block itself.
pub fn timestamp_hint(block: &ElementRef<'_>, label: Option<&ElementRef<'_>>) -> Option<String> {
    label
        .and_then(|el| el.first_attr(TIMESTAMP_ATTRS))
        .or_else(|| block.first_attr(TIMESTAMP_ATTRS))
        .map(|v| v.trim().to_string())
}

/// Finds the body region, skipping elements in `roles` and anything inside them.
pub fn find_body<'a>(block: &ElementRef<'a>, roles: &[NodeId]) -> Option<ElementRef<'a>> {
    let doc = block.document();
    let outside_roles = |el: &ElementRef<'a>| {
        !roles.iter().any(|&id| {
            id == el.id() || doc.element(id).is_some_and(|role| role.contains(el))
        })
    };
    let has_text = |el: &ElementRef<'a>| !collapse_whitespace(&el.text_excluding(roles)).is_empty();

    block
        .find(|el| {
            el.is_any(&["div", "p", "span", "section", "td"])
                && has_class_token(el, BODY_WORDS)
                && outside_roles(el)
                && has_text(el)
        })
        .or_else(|| {
            block.find(|el| {
                el.is_any(&["p", "span"])
                    && has_class_token(el, BODY_FALLBACK_WORDS)
                    && outside_roles(el)
                    && has_text(el)
            })
        })
}

/// Anchor targets in document order, without duplicates or script/mail links.
pub fn find_links(block: &ElementRef<'_>) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();
    for anchor in block.descendants().filter(|el| el.name() == "a") {
        let Some(href) = anchor.attr("href").map(str::trim) else {
            continue;
        };
        let lowered = href.to_ascii_lowercase();
        if href.is_empty() || SKIPPED_LINK_PREFIXES.iter().any(|p| lowered.starts_with(p)) {
            continue;
        }
        if !links.iter().any(|l| l == href) {
            links.push(href.to_string());
        }
    }
    links
}

/// Returns `true` if `href` points at a downloadable file.
pub fn is_download_link(href: &str) -> bool {
    let lowered = href.to_ascii_lowercase();
    if lowered.contains("download") {
        return true;
    }
    let path = lowered.split(['?', '#']).next().unwrap_or_default();
    path.rsplit_once('.')
        .is_some_and(|(_, ext)| DOWNLOAD_EXTENSIONS.contains(&ext))
}

/// Collects attachment markers in nested (document) order.
///
/// Three kinds of marker are recognized: attachment-classed elements, the
/// parent of a file icon, and download anchors. A marker nested inside
/// another marker is folded into the outer one.
pub fn find_attachments(block: &ElementRef<'_>, limits: &LabelLimits) -> Vec<RawAttachment> {
    let mut markers: Vec<ElementRef<'_>> = Vec::new();

    for el in block.descendants() {
        let is_marker = (el.is_any(&["div", "span", "a", "li"]) && is_attachment_marker(&el))
            || (el.name() == "a" && el.attr("href").is_some_and(is_download_link));
        if is_marker {
            markers.push(el);
        }
        if el.is_any(&["img", "i", "span"]) && has_class_token(&el, ICON_WORDS) {
            if let Some(parent) = el.parent().filter(|p| *p != *block) {
                markers.push(parent);
            }
        }
    }

    markers.sort_by_key(ElementRef::id);
    markers.dedup();
    let outermost: Vec<ElementRef<'_>> = markers
        .iter()
        .filter(|m| !markers.iter().any(|other| other.contains(m)))
        .copied()
        .collect();

    let mut attachments: Vec<RawAttachment> = Vec::new();
    for marker in outermost {
        if let Some(attachment) = read_attachment(&marker, limits) {
            if !attachments.contains(&attachment) {
                attachments.push(attachment);
            }
        }
    }
    attachments
}

fn read_attachment(marker: &ElementRef<'_>, limits: &LabelLimits) -> Option<RawAttachment> {
    let size_el = marker.find(|el| has_class_token(el, SIZE_WORDS));
    let skip: Vec<NodeId> = size_el.iter().map(ElementRef::id).collect();

    let label = marker
        .first_attr(ATTACHMENT_LABEL_ATTRS)
        .map(collapse_whitespace)
        .or_else(|| {
            non_blank(&marker.text_excluding(&skip))
                .filter(|t| t.chars().count() < limits.max_attachment_label_len)
        });

    let href = if marker.name() == "a" {
        marker.attr("href")
    } else {
        marker
            .find(|el| el.name() == "a" && el.attr("href").is_some())
            .and_then(|a| a.attr("href"))
    };
    let link = href
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_string);

    if label.is_none() && link.is_none() {
        return None;
    }

    Some(RawAttachment {
        label: label.unwrap_or_default(),
        link,
        size: size_el.and_then(|el| non_blank(&el.text())),
    })
}
