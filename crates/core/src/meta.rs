use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

static BEGIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-{3}(\s.*)?$").expect("valid regex"));
static END: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(-{3}|\.{3})(\s.*)?$").expect("valid regex"));
static FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ ]{0,3}(?P<key>[A-Za-z0-9_-]+):\s*(?P<value>.*)$").expect("valid regex")
});
static CONTINUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ ]{4,}(?P<value>.*)$").expect("valid regex"));

/// Metadata as reported by the engine: lower-cased key to value lines.
///
/// Like most engines this keeps no ordering; the pipeline restores the
/// source order from the raw front-matter lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineMeta {
    values: HashMap<String, Vec<String>>,
}

impl EngineMeta {
    /// Value lines for `key` (already lower-cased).
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.values.get(key).map(Vec::as_slice)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no metadata was found.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keys in unspecified order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// Result of scanning the leading metadata block.
#[derive(Debug)]
pub struct MetaExtraction {
    /// Parsed metadata.
    pub meta: EngineMeta,
    /// Byte offset where markdown content begins.
    pub body_start: usize,
}

/// Reads `key: value` lines from the start of `input`.
///
/// An optional `---` opener is skipped. Lines indented by four or more spaces
/// continue the previous key. The block ends at a blank line or a `---` /
/// `...` closer (both consumed), or at the first line that is neither a field
/// nor a continuation (left for the body). A repeated key replaces the
/// earlier value.
pub fn extract_meta(input: &str) -> MetaExtraction {
    let (without_bom, bom_len) = strip_bom(input);
    let mut values: HashMap<String, Vec<String>> = HashMap::new();
    let mut current: Option<String> = None;
    let mut cursor = 0usize;

    if let Some((line, next)) = next_line(without_bom, cursor)
        && BEGIN.is_match(normalize_line(line))
    {
        cursor = next;
    }

    while let Some((raw, next)) = next_line(without_bom, cursor) {
        let line = normalize_line(raw);
        if line.trim().is_empty() || END.is_match(line) {
            cursor = next;
            break;
        }

        if let Some(caps) = FIELD.captures(line) {
            let key = caps["key"].trim().to_lowercase();
            let value = caps["value"].trim().to_string();
            values.insert(key.clone(), vec![value]);
            current = Some(key);
        } else if let Some(caps) = CONTINUATION.captures(line)
            && let Some(key) = current.as_ref()
            && let Some(lines) = values.get_mut(key)
        {
            lines.push(caps["value"].trim().to_string());
        } else {
            break;
        }
        cursor = next;
    }

    MetaExtraction {
        meta: EngineMeta { values },
        body_start: bom_len + cursor,
    }
}

fn strip_bom(input: &str) -> (&str, usize) {
    if let Some(stripped) = input.strip_prefix('\u{feff}') {
        (stripped, '\u{feff}'.len_utf8())
    } else {
        (input, 0)
    }
}

fn next_line(input: &str, start: usize) -> Option<(&str, usize)> {
    if start >= input.len() {
        return None;
    }

    let bytes = &input.as_bytes()[start..];
    if let Some(pos) = bytes.iter().position(|b| *b == b'\n') {
        let line_end = start + pos;
        Some((&input[start..line_end], line_end + 1))
    } else {
        Some((&input[start..], input.len()))
    }
}

fn normalize_line(line: &str) -> &str {
    line.trim_end_matches('\r')
}
