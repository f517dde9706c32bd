//! Markdown rendering through markdown-rs.
//!
//! The renderer always runs the same extension set: the metadata block,
//! fenced code, tables, and code-highlighting markup.

use markdown::message::{Message, Place};

use crate::error::{PipelineError, SourceLocation};
use crate::highlight::highlight_code_blocks;
use crate::meta::{EngineMeta, extract_meta};
use crate::options::PipelineOptions;

/// Output of a single render: HTML plus the engine's metadata view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutput {
    /// Rendered HTML of everything after the metadata block.
    pub html: String,
    /// Metadata values keyed by lower-cased name.
    pub meta: EngineMeta,
}

/// Markdown-to-HTML renderer with a fixed extension set.
#[derive(Debug, Clone)]
pub struct MarkupRenderer {
    allow_raw_html: bool,
    highlight_class: String,
}

impl MarkupRenderer {
    /// Create a renderer from pipeline options.
    pub fn new(options: &PipelineOptions) -> Self {
        Self {
            allow_raw_html: options.allow_raw_html,
            highlight_class: options.highlight_class.clone(),
        }
    }

    /// Render `text` to HTML and collect its metadata block.
    pub fn render(&self, text: &str) -> Result<RenderOutput, PipelineError> {
        let extraction = extract_meta(text);
        let content = &text[extraction.body_start..];

        // markdown::Options is not Sync; build it per call.
        let options = markdown_options(self.allow_raw_html);
        let html = markdown::to_html_with_options(content, &options).map_err(|err| {
            PipelineError::Render {
                message: err.to_string(),
                location: message_location(&err),
            }
        })?;
        let html = highlight_code_blocks(&html, &self.highlight_class)?;

        log::debug!(
            "rendered {} bytes of markdown with {} metadata key(s)",
            content.len(),
            extraction.meta.len()
        );

        Ok(RenderOutput {
            html,
            meta: extraction.meta,
        })
    }
}

impl Default for MarkupRenderer {
    fn default() -> Self {
        Self::new(&PipelineOptions::default())
    }
}

fn markdown_options(allow_raw_html: bool) -> markdown::Options {
    let constructs = markdown::Constructs {
        code_fenced: true,
        code_indented: true,
        gfm_table: true,
        frontmatter: false,
        html_flow: allow_raw_html,
        html_text: allow_raw_html,
        ..markdown::Constructs::default()
    };

    markdown::Options {
        parse: markdown::ParseOptions {
            constructs,
            ..markdown::ParseOptions::default()
        },
        compile: markdown::CompileOptions {
            allow_dangerous_html: allow_raw_html,
            ..markdown::CompileOptions::default()
        },
    }
}

fn message_location(message: &Message) -> SourceLocation {
    match &message.place {
        Some(place) => match place.as_ref() {
            Place::Point(point) => SourceLocation::new(point.line, point.column),
            Place::Position(position) => {
                SourceLocation::new(position.start.line, position.start.column)
            }
        },
        None => SourceLocation::start(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_body_without_metadata_lines() {
        let out = MarkupRenderer::default()
            .render("title: Test\n\n# Heading")
            .unwrap();
        assert!(out.html.contains("<h1>Heading</h1>"));
        assert!(!out.html.contains("title"));
        assert_eq!(out.meta.get("title").unwrap(), ["Test".to_string()]);
    }

    #[test]
    fn renders_tables() {
        let text = "\n\n| a | b |\n| - | - |\n| 1 | 2 |";
        let out = MarkupRenderer::default().render(text).unwrap();
        assert!(out.html.contains("<table>"));
        assert!(out.html.contains("<td>1</td>"));
    }

    #[test]
    fn fenced_code_is_highlighted() {
        let text = "\n\n```python\nprint('[[x]]')\n```";
        let out = MarkupRenderer::default().render(text).unwrap();
        assert!(out.html.contains("<div class=\"codehilite\"><pre"));
        assert!(out.html.contains("data-lang=\"python\""));
    }

    #[test]
    fn raw_html_is_escaped_by_default() {
        let out = MarkupRenderer::default()
            .render("\n\n<b>bold</b>")
            .unwrap();
        assert!(out.html.contains("&lt;b&gt;"));
    }

    #[test]
    fn raw_html_passes_when_allowed() {
        let options = PipelineOptions {
            allow_raw_html: true,
            ..PipelineOptions::default()
        };
        let out = MarkupRenderer::new(&options)
            .render("\n\n<b>bold</b>")
            .unwrap();
        assert!(out.html.contains("<b>bold</b>"));
    }

    #[test]
    fn wiki_brackets_survive_rendering() {
        let out = MarkupRenderer::default()
            .render("\n\nHello [[target]].")
            .unwrap();
        assert!(out.html.contains("Hello [[target]]."));
    }
}
