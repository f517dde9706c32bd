//! Code-highlighting markup for rendered code blocks.
//!
//! Every `<pre>` gets wrapped in `<div class="{class}">`, and the language
//! named by the fence info string is mirrored onto the `<pre>` as
//! `data-lang`, so stylesheet or client-side highlighters can pick it up.

use std::borrow::Cow;

use lol_html::html_content::ContentType;
use lol_html::{ElementContentHandlers, RewriteStrSettings, Selector, element, rewrite_str};

use crate::error::PipelineError;

/// Wraps code blocks in `html` for highlighting.
pub fn highlight_code_blocks(html: &str, class: &str) -> Result<String, PipelineError> {
    if !html.contains("<pre") {
        return Ok(html.to_string());
    }

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: highlight_handlers(class),
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|err| PipelineError::render_error(err.to_string(), 1, 1))
}

fn highlight_handlers(
    class: &str,
) -> Vec<(Cow<'static, Selector>, ElementContentHandlers<'static>)> {
    vec![pre_handler(class.to_string()), code_language_handler()]
}

fn pre_handler(class: String) -> (Cow<'static, Selector>, ElementContentHandlers<'static>) {
    element!("pre", move |el| {
        let open = format!("<div class=\"{}\">", html_escape::encode_double_quoted_attribute(&class));
        el.before(&open, ContentType::Html);
        el.after("</div>", ContentType::Html);
        Ok(())
    })
}

fn code_language_handler() -> (Cow<'static, Selector>, ElementContentHandlers<'static>) {
    element!("pre > code[class]", |el| {
        let language = el
            .get_attribute("class")
            .and_then(|classes| {
                classes
                    .split_whitespace()
                    .find_map(|c| c.strip_prefix("language-").map(str::to_string))
            })
            .filter(|lang| !lang.is_empty());
        if let Some(lang) = language {
            el.set_attribute("data-lang", &lang)?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_pre_blocks() {
        let html = "<pre><code>let x = 1;\n</code></pre>";
        let out = highlight_code_blocks(html, "codehilite").unwrap();
        assert_eq!(
            out,
            "<div class=\"codehilite\"><pre><code>let x = 1;\n</code></pre></div>"
        );
    }

    #[test]
    fn tags_language_on_code() {
        let html = "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>";
        let out = highlight_code_blocks(html, "codehilite").unwrap();
        assert!(out.starts_with("<div class=\"codehilite\"><pre>"));
        assert!(out.contains("data-lang=\"rust\""));
        assert!(out.ends_with("</pre></div>"));
    }

    #[test]
    fn inline_code_is_untouched() {
        let html = "<p><code>x</code></p>";
        assert_eq!(highlight_code_blocks(html, "codehilite").unwrap(), html);
    }
}
