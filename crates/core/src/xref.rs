//! Cross-reference rewriting for rendered HTML.
//!
//! Pages link to each other with `[[Target]]` or `[[path/to/page|Label]]`.
//! The rewrite runs after markdown rendering, so it works on HTML text and
//! must leave `<code>` content alone.

use std::borrow::Cow;
use std::ops::Range;

use once_cell::sync::Lazy;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use regex::{Captures, Regex};

use crate::pipeline::TextTransform;
use crate::url::normalize_url;

static REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\[\s*([^\[\]|<\s][^\[\]|<\n]*?)\s*(?:\|\s*([^\[\]\n]*?)\s*)?\]\]")
        .expect("valid regex")
});

static CODE_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<code\b[^>]*>").expect("valid regex"));

static CODE_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</code\s*>").expect("valid regex"));

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^<>]*>").expect("valid regex"));

/// Characters escaped in a route path; `/` is kept so nested pages stay nested.
const ROUTE_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Strategy turning a canonical page identifier into an `href`.
pub trait LinkFormatter {
    /// Build the link target for `identifier`.
    fn format(&self, identifier: &str) -> String;
}

impl<F> LinkFormatter for F
where
    F: Fn(&str) -> String,
{
    fn format(&self, identifier: &str) -> String {
        (self)(identifier)
    }
}

/// Default formatter: `{base}{identifier}/`, percent-encoded.
///
/// Leading `/` in the identifier is dropped so every link stays under `base`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePath {
    base: String,
}

impl RoutePath {
    /// Create a formatter rooted at `base` (a trailing `/` is added when missing).
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        if !base.ends_with('/') {
            base.push('/');
        }
        Self { base }
    }

    /// Route prefix used for every link.
    pub fn base(&self) -> &str {
        &self.base
    }
}

impl Default for RoutePath {
    fn default() -> Self {
        Self::new("/")
    }
}

impl LinkFormatter for RoutePath {
    fn format(&self, identifier: &str) -> String {
        let identifier = identifier.trim_start_matches('/');
        if identifier.is_empty() {
            return self.base.clone();
        }
        format!(
            "{}{}/",
            self.base,
            utf8_percent_encode(identifier, ROUTE_SEGMENT)
        )
    }
}

/// A single `[[target]]` or `[[target|label]]` occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossReference {
    /// Target text as written (entities decoded, whitespace trimmed).
    pub target: String,
    /// Visible text; the raw target when no label was given.
    pub label: String,
}

impl CrossReference {
    fn from_captures(caps: &Captures<'_>) -> Self {
        let raw_target = caps.get(1).map_or("", |m| m.as_str()).trim();
        let label = caps
            .get(2)
            .map(|m| m.as_str().trim())
            .filter(|label| !label.is_empty())
            .unwrap_or(raw_target);
        Self {
            target: html_escape::decode_html_entities(raw_target).into_owned(),
            label: label.to_string(),
        }
    }

    /// Canonical identifier of the linked page.
    pub fn identifier(&self) -> String {
        normalize_url(&self.target)
    }

    /// Render as an anchor element using `formatter` for the href.
    pub fn to_anchor<L: LinkFormatter + ?Sized>(&self, formatter: &L) -> String {
        let href = formatter.format(&self.identifier());
        format!(
            "<a href=\"{}\">{}</a>",
            html_escape::encode_double_quoted_attribute(&href),
            self.label
        )
    }
}

/// Lists the cross-references found in text content outside of `<code>`
/// elements, in order. References inside tags (attribute values) are skipped.
pub fn find_cross_references(html: &str) -> Vec<CrossReference> {
    let mut found = Vec::new();
    for_each_prose_segment(html, |segment, is_code| {
        if is_code {
            return;
        }
        let tags = tag_spans(segment);
        found.extend(
            REFERENCE
                .captures_iter(segment)
                .filter(|caps| !overlaps_tag(&tags, caps))
                .map(|caps| CrossReference::from_captures(&caps)),
        );
    });
    found
}

/// Replaces every cross-reference in text content outside of `<code>`
/// elements with an anchor. Attribute values are never touched.
///
/// Matches are consumed left to right and never overlap; inserted anchors
/// are not scanned again. Unbalanced brackets stay as written.
pub fn rewrite_cross_references<L: LinkFormatter + ?Sized>(html: &str, formatter: &L) -> String {
    if !html.contains("[[") {
        return html.to_string();
    }

    let mut out = String::with_capacity(html.len());
    let mut rewritten = 0usize;
    for_each_prose_segment(html, |segment, is_code| {
        if is_code {
            out.push_str(segment);
            return;
        }
        let tags = tag_spans(segment);
        let mut last = 0usize;
        for caps in REFERENCE.captures_iter(segment) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            out.push_str(&segment[last..whole.start()]);
            if overlaps_tag(&tags, &caps) {
                out.push_str(whole.as_str());
            } else {
                rewritten += 1;
                out.push_str(&CrossReference::from_captures(&caps).to_anchor(formatter));
            }
            last = whole.end();
        }
        out.push_str(&segment[last..]);
    });

    log::debug!("rewrote {} cross-reference(s)", rewritten);
    out
}

/// Walks `html`, calling `visit` with alternating prose and `<code>` slices.
fn for_each_prose_segment<'a>(html: &'a str, mut visit: impl FnMut(&'a str, bool)) {
    let mut cursor = 0usize;
    while cursor < html.len() {
        let Some(open) = CODE_OPEN.find_at(html, cursor) else {
            visit(&html[cursor..], false);
            return;
        };
        if open.start() > cursor {
            visit(&html[cursor..open.start()], false);
        }
        let code_end = CODE_CLOSE
            .find_at(html, open.end())
            .map_or(html.len(), |close| close.end());
        visit(&html[open.start()..code_end], true);
        cursor = code_end;
    }
}

fn tag_spans(segment: &str) -> Vec<Range<usize>> {
    TAG.find_iter(segment).map(|tag| tag.range()).collect()
}

/// Whether the match starts or ends inside a `<...>` tag.
fn overlaps_tag(tags: &[Range<usize>], caps: &Captures<'_>) -> bool {
    let Some(whole) = caps.get(0) else {
        return false;
    };
    let inside = |pos: usize| tags.iter().any(|tag| tag.start < pos && pos < tag.end);
    inside(whole.start()) || inside(whole.end())
}

/// Post-processing transform that rewrites cross-references with a formatter.
pub struct CrossReferences<L> {
    formatter: L,
}

impl<L: LinkFormatter> CrossReferences<L> {
    /// Bind the rewrite to `formatter`.
    pub fn new(formatter: L) -> Self {
        Self { formatter }
    }
}

impl Default for CrossReferences<RoutePath> {
    fn default() -> Self {
        Self::new(RoutePath::default())
    }
}

impl<L: LinkFormatter> TextTransform for CrossReferences<L> {
    fn transform<'a>(&self, input: &'a str) -> Cow<'a, str> {
        if input.contains("[[") {
            Cow::Owned(rewrite_cross_references(input, &self.formatter))
        } else {
            Cow::Borrowed(input)
        }
    }
}
