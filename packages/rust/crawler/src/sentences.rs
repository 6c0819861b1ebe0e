//! Rule-based sentence tokenizer tuned for statutory text.
//!
//! A boundary follows `.`, `?` or `!` (plus any closing quotes or brackets)
//! and whitespace, unless the next word starts lowercase or the period ends
//! a known abbreviation such as `U.S.` or `Stat.`.

use std::sync::LazyLock;

use regex::Regex;

static TERMINATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[.?!][”’"')\]]*\s+"#).expect("valid regex"));

/// Lowercased abbreviations that never end a sentence.
const ABBREVIATIONS: &[&str] = &[
    "al", "art", "cf", "ch", "cl", "co", "corp", "dr", "etc", "inc", "jr", "ltd", "mr", "mrs",
    "ms", "no", "nos", "par", "pt", "pub", "sec", "secs", "seq", "sr", "st", "stat", "subch",
    "subpar", "viz", "vol",
];

/// Lowercased multi-word abbreviations whose final word is too short to list alone.
const COMPOUND_ABBREVIATIONS: &[&str] = &["pub. l"];

/// Split `text` into trimmed, non-empty sentences in reading order.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in TERMINATOR_RE.find_iter(text) {
        let Some(next) = text[m.end()..].chars().next() else {
            continue;
        };
        if next.is_lowercase() {
            continue;
        }
        if text[m.start()..].starts_with('.') && ends_with_abbreviation(&text[start..m.start()]) {
            continue;
        }

        push_trimmed(&mut sentences, &text[start..m.end()]);
        start = m.end();
    }

    push_trimmed(&mut sentences, &text[start..]);
    sentences
}

fn push_trimmed(sentences: &mut Vec<String>, piece: &str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        sentences.push(piece.to_string());
    }
}

/// Whether the last word of `head` (the text before a period) is an
/// abbreviation: an explicit one, or a dotted run like `U.S` or `e.g`.
fn ends_with_abbreviation(head: &str) -> bool {
    let word = head
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or("")
        .trim_start_matches(['(', '[', '“', '‘', '"']);

    if word.is_empty() {
        return false;
    }
    let lower_head = head.to_lowercase();
    if COMPOUND_ABBREVIATIONS
        .iter()
        .any(|abbr| lower_head.ends_with(abbr))
    {
        return true;
    }
    if word.contains('.') && word.chars().all(|c| c.is_alphabetic() || c == '.') {
        return true;
    }
    let lower = word.to_lowercase();
    ABBREVIATIONS.contains(&lower.as_str())
}
