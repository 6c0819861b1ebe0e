//! Unique lookup keys for ordered maps that tolerate duplicate names.

use crate::error::{Result, UscDefsError};

/// Marker appended to a child level key whose `num` is already taken.
pub const CHILD_KEY_MARKER: char = '?';

/// Marker appended to a term key for each repeat definition.
pub const TERM_KEY_MARKER: char = '#';

/// Return `base`, or `base` followed by the fewest `marker` characters that
/// make it free according to `is_taken`.
///
/// At most `max_suffixes` markers are appended; a key still colliding after
/// that is an invariant violation.
pub fn unique_key(
    base: &str,
    marker: char,
    max_suffixes: usize,
    is_taken: impl Fn(&str) -> bool,
) -> Result<String> {
    let mut key = base.to_string();
    for _ in 0..=max_suffixes {
        if !is_taken(&key) {
            return Ok(key);
        }
        key.push(marker);
    }
    Err(UscDefsError::invariant(format!(
        "key {base:?} still collides after {max_suffixes} '{marker}' suffixes"
    )))
}
