//! Text extraction from markup subtrees.

use roxmltree::Node;

/// Left double quotation mark, which opens every quoted defined term.
const LEFT_DOUBLE_QUOTE: char = '\u{201C}';

/// All descendant text of `node` in document order, trimmed and with
/// quoted terms separated from the text before them.
pub(crate) fn node_text(node: Node<'_, '_>) -> String {
    let raw: String = node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    separate_quoted_terms(raw.trim())
}

/// Insert a sentence boundary (`. `) before every `“` that directly follows
/// a non-whitespace character.
///
/// Without it the tokenizer fuses a heading run-in such as
/// `In general.—“widget”` onto the sentence defining the quoted term.
pub fn separate_quoted_terms(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut prev: Option<char> = None;
    for ch in text.chars() {
        if ch == LEFT_DOUBLE_QUOTE && prev.is_some_and(|p| !p.is_whitespace()) {
            out.push_str(". ");
        }
        out.push(ch);
        prev = Some(ch);
    }
    out
}
