//! Query text normalization
//!
//! Case folding and whitespace cleanup run first; character stripping only
//! ever sees already-folded text.

use std::sync::LazyLock;

use regex::Regex;

/// Characters kept by [`strip_disallowed_characters`] unless told otherwise.
pub const DEFAULT_KEEP_CHARS: &[char] = &['-', '\''];

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Trim, lowercase, and collapse whitespace runs to a single space.
///
/// Never fails; blank input yields an empty string.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    collapse_whitespace(&lowered)
}

/// Remove everything that is not an ASCII letter or digit, whitespace, or
/// one of `keep`, then re-collapse whitespace.
#[must_use]
pub fn strip_disallowed_characters(text: &str, keep: &[char]) -> String {
    let filtered: String = text
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || keep.contains(c))
        .collect();
    collapse_whitespace(&filtered).trim().to_string()
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").into_owned()
}
