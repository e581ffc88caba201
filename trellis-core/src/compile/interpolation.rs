//! Text Interpolation
//!
//! Finds the single `{{ expr }}` placeholder a text node binds to. Only the
//! first placeholder per node is recognized and delimiters must close on
//! the same line; the binding then replaces the node's whole text. Text
//! nodes with several placeholders are not split into several bindings.

/// Return the trimmed expression of the first placeholder in `text`.
pub fn find_interpolation<'a>(text: &'a str, open: &str, close: &str) -> Option<&'a str> {
    if open.is_empty() || close.is_empty() {
        return None;
    }

    text.lines().find_map(|line| {
        let start = line.find(open)? + open.len();
        let end = line[start..].find(close)? + start;
        Some(line[start..end].trim())
    })
}
