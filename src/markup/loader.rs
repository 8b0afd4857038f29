//! Lenient markup loader built on `quick-xml`.
//!
//! Real exports are HTML, not XML: void elements are never closed, end tags
//! go missing, attributes are unquoted and named entities are everywhere.
//! Stray `<` and `&` characters in text are escaped before tokenizing, the
//! way an HTML tokenizer treats them as literal text. The reader then runs
//! with end-name checks disabled and a small tree builder repairs the
//! structure instead of rejecting it. Only input that yields no elements at
//! all, or breaks before the first element, is malformed.

use std::borrow::Cow;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use quick_xml::Reader;
use quick_xml::escape::resolve_html5_entity;
use quick_xml::events::{BytesStart, Event};
use regex::{Captures, Regex};
use tracing::debug;

use super::encoding::{Encoding, decode};
use super::tree::{Document, Node, NodeId, NodeKind};
use crate::error::{ChatauditError, Result};

static SCRIPT_OR_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<!--.*?-->").unwrap()
});

/// A `<` that may open markup, or an `&` with an optional reference after it.
static STRAY_MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<([A-Za-z/!?])?|&(#[0-9]{1,7};|#[xX][0-9A-Fa-f]{1,6};|[A-Za-z][A-Za-z0-9]*;)?").unwrap()
});

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Reads an export file and builds its document tree.
///
/// The file handle is closed before parsing starts, on success and failure.
pub fn load_file(path: &Path, encoding: Option<Encoding>) -> Result<Document> {
    let bytes = fs::read(path)?;
    load_bytes(&bytes, encoding).map_err(|e| e.with_path(path))
}

/// Decodes `bytes` and builds the document tree.
pub fn load_bytes(bytes: &[u8], encoding: Option<Encoding>) -> Result<Document> {
    let (text, encoding) = decode(bytes, encoding)?;
    let mut doc = build(&text)?;
    doc.encoding = encoding;
    Ok(doc)
}

/// Builds the document tree from already-decoded text.
pub fn load_str(text: &str) -> Result<Document> {
    build(text)
}

fn build(text: &str) -> Result<Document> {
    let cleaned = SCRIPT_OR_STYLE.replace_all(text, " ");
    let cleaned = escape_stray_markup(&cleaned);

    let mut reader = Reader::from_str(&cleaned);
    {
        let config = reader.config_mut();
        config.check_end_names = false;
        config.allow_unmatched_ends = true;
        config.check_comments = false;
    }

    let mut builder = TreeBuilder::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = tag_name(e.name().as_ref());
                let attrs = read_attributes(&e);
                if VOID_ELEMENTS.contains(&name.as_str()) {
                    builder.leaf(name, attrs);
                } else {
                    builder.open(name, attrs);
                }
            }
            Ok(Event::Empty(e)) => {
                let name = tag_name(e.name().as_ref());
                let attrs = read_attributes(&e);
                builder.leaf(name, attrs);
            }
            Ok(Event::End(e)) => builder.close(&tag_name(e.name().as_ref())),
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape_with(resolve_html5_entity)
                    .map(|t| t.into_owned())
                    .unwrap_or_else(|_| String::from_utf8_lossy(&e).into_owned());
                builder.text(text);
            }
            Ok(Event::CData(e)) => builder.text(String::from_utf8_lossy(&e).into_owned()),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                let position = reader.buffer_position();
                if builder.has_elements() {
                    debug!(%err, position, "markup truncated after syntax error");
                    builder
                        .doc
                        .recoveries
                        .push(format!("stopped at byte {position}: {err}"));
                    break;
                }
                return Err(ChatauditError::malformed(format!(
                    "markup syntax error at byte {position}: {err}"
                )));
            }
        }
    }

    builder.finish()
}

fn tag_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_ascii_lowercase()
}

fn read_attributes(e: &BytesStart<'_>) -> Vec<(String, String)> {
    e.html_attributes()
        .filter_map(std::result::Result::ok)
        .map(|attr| {
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
            let value = attr
                .unescape_value_with(resolve_html5_entity)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
            (key, value)
        })
        .collect()
}

/// Escapes `<` that cannot start a tag and `&` that does not begin a known
/// character reference, so both survive as literal text.
fn escape_stray_markup(text: &str) -> Cow<'_, str> {
    STRAY_MARKUP.replace_all(text, |caps: &Captures<'_>| {
        let matched = &caps[0];
        if matched.starts_with('<') {
            return if caps.get(1).is_some() {
                matched.to_string()
            } else {
                "&lt;".to_string()
            };
        }
        match caps.get(2) {
            Some(reference) if is_known_reference(reference.as_str()) => matched.to_string(),
            Some(reference) => format!("&amp;{}", reference.as_str()),
            None => "&amp;".to_string(),
        }
    })
}

/// `reference` is the part after `&`, including the trailing `;`.
fn is_known_reference(reference: &str) -> bool {
    let name = reference.trim_end_matches(';');
    if let Some(number) = name.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => number.parse::<u32>(),
        };
        return code.ok().and_then(char::from_u32).is_some_and(|c| c != '\0');
    }
    resolve_html5_entity(name).is_some()
}

#[derive(Default)]
struct TreeBuilder {
    doc: Document,
    stack: Vec<NodeId>,
}

impl TreeBuilder {
    fn has_elements(&self) -> bool {
        self.doc
            .nodes
            .iter()
            .any(|n| matches!(n.kind, NodeKind::Element { .. }))
    }

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = self.doc.nodes.len();
        let parent = self.stack.last().copied();
        self.doc.nodes.push(Node { parent, kind });
        match parent {
            Some(p) => {
                if let NodeKind::Element { children, .. } = &mut self.doc.nodes[p].kind {
                    children.push(id);
                }
            }
            None => self.doc.roots.push(id),
        }
        id
    }

    fn top_name(&self) -> Option<&str> {
        let id = *self.stack.last()?;
        match &self.doc.nodes[id].kind {
            NodeKind::Element { name, .. } => Some(name),
            NodeKind::Text(_) => None,
        }
    }

    /// Applies the implicit end tags HTML allows for list items, paragraphs and table cells.
    fn close_implied(&mut self, name: &str) {
        match name {
            "li" | "p" | "option" => {
                if self.top_name() == Some(name) {
                    self.stack.pop();
                }
            }
            "td" | "th" => {
                if matches!(self.top_name(), Some("td" | "th")) {
                    self.stack.pop();
                }
            }
            "tr" => {
                if matches!(self.top_name(), Some("td" | "th")) {
                    self.stack.pop();
                }
                if self.top_name() == Some("tr") {
                    self.stack.pop();
                }
            }
            _ => {}
        }
    }

    fn open(&mut self, name: String, attrs: Vec<(String, String)>) {
        self.close_implied(&name);
        let id = self.push_node(NodeKind::Element {
            name,
            attrs,
            children: Vec::new(),
        });
        self.stack.push(id);
    }

    fn leaf(&mut self, name: String, attrs: Vec<(String, String)>) {
        self.push_node(NodeKind::Element {
            name,
            attrs,
            children: Vec::new(),
        });
    }

    fn close(&mut self, name: &str) {
        let open_at = self.stack.iter().rposition(|&id| {
            matches!(&self.doc.nodes[id].kind, NodeKind::Element { name: n, .. } if n == name)
        });
        match open_at {
            Some(index) => {
                let unclosed = self.stack.len() - index - 1;
                if unclosed > 0 {
                    self.doc
                        .recoveries
                        .push(format!("closed {unclosed} element(s) implicitly at </{name}>"));
                }
                self.stack.truncate(index);
            }
            None => {
                if !VOID_ELEMENTS.contains(&name) {
                    self.doc.recoveries.push(format!("ignored unmatched </{name}>"));
                }
            }
        }
    }

    fn text(&mut self, text: String) {
        if self.stack.is_empty() && text.trim().is_empty() {
            return;
        }
        self.push_node(NodeKind::Text(text));
    }

    fn finish(self) -> Result<Document> {
        if !self.has_elements() {
            return Err(ChatauditError::malformed("no markup elements found"));
        }
        let mut doc = self.doc;
        let open: Vec<String> = self
            .stack
            .iter()
            .filter_map(|&id| match &doc.nodes[id].kind {
                NodeKind::Element { name, .. } => Some(name.clone()),
                NodeKind::Text(_) => None,
            })
            .filter(|name| !matches!(name.as_str(), "html" | "body" | "head"))
            .collect();
        if !open.is_empty() {
            doc.recoveries
                .push(format!("{} element(s) left unclosed at end of input", open.len()));
        }
        Ok(doc)
    }
}
