//! Canonical page identifiers.

use once_cell::sync::Lazy;
use regex::Regex;

static SPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new("[ ]{2,}").expect("valid regex"));

/// Normalizes a raw page identifier into its canonical form.
///
/// Runs of spaces collapse to one, surrounding whitespace is trimmed, the
/// result is lower-cased, spaces become underscores, and Windows-style
/// separators (`\\` or `\`) become `/`.
///
/// # Examples
///
/// ```
/// use quire_core::normalize_url;
///
/// assert_eq!(normalize_url("  A   B\\C "), "a_b/c");
/// assert_eq!(normalize_url("Getting Started"), "getting_started");
/// ```
pub fn normalize_url(raw: &str) -> String {
    let collapsed = SPACE_RUNS.replace_all(raw, " ");
    collapsed
        .trim()
        .to_lowercase()
        .replace(' ', "_")
        .replace("\\\\", "/")
        .replace('\\', "/")
}
