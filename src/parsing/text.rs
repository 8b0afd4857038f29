//! Text clean-up shared by the extractor and the normalizer.

/// Trims `text` and collapses every run of whitespace into one space.
///
/// Non-breaking spaces count as whitespace.
///
/// # Example
///
/// ```rust
/// use chataudit::parsing::collapse_whitespace;
///
/// assert_eq!(collapse_whitespace("  hello \n\t world\u{a0} "), "hello world");
/// ```
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Returns `None` for blank strings, the collapsed text otherwise.
pub fn non_blank(text: &str) -> Option<String> {
    let collapsed = collapse_whitespace(text);
    (!collapsed.is_empty()).then_some(collapsed)
}
