//! The document pipeline and its extension hooks.
//!
//! `process` runs five stages in a fixed order: pre-processing, markdown
//! rendering, front-matter split, metadata normalization, post-processing.
//! Each stage consumes the previous stage's output and every intermediate
//! value ends up in [`Processed`].

use std::borrow::Cow;

use crate::error::PipelineError;
use crate::meta::EngineMeta;
use crate::metadata::MetadataRecord;
use crate::options::PipelineOptions;
use crate::render::MarkupRenderer;
use crate::xref::{CrossReferences, LinkFormatter, RoutePath};

/// Text-to-text hook run before rendering or after it.
pub trait TextTransform {
    /// Transform the input text, returning an owned or borrowed string.
    fn transform<'a>(&self, input: &'a str) -> Cow<'a, str>;
}

impl<F> TextTransform for F
where
    F: for<'a> Fn(&'a str) -> Cow<'a, str>,
{
    fn transform<'a>(&self, input: &'a str) -> Cow<'a, str> {
        (self)(input)
    }
}

type BoxedTransform = Box<dyn TextTransform + Send + Sync>;

/// Every intermediate value of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processed {
    /// Input after pre-processing.
    pub preprocessed: String,
    /// HTML as produced by the renderer.
    pub html: String,
    /// Front-matter lines, before normalization.
    pub meta_raw: String,
    /// Markdown after the front-matter.
    pub body: String,
    /// Ordered metadata.
    pub metadata: MetadataRecord,
    /// HTML after post-processing.
    pub rendered: String,
}

/// Turns raw page text into rendered HTML, body, and metadata.
pub struct DocumentPipeline {
    renderer: MarkupRenderer,
    preprocessors: Vec<BoxedTransform>,
    postprocessors: Vec<BoxedTransform>,
}

impl DocumentPipeline {
    /// Pipeline with the default hooks: no pre-processing, cross-references
    /// rewritten against `options.link_base`.
    pub fn new(options: &PipelineOptions) -> Self {
        Self::with_link_formatter(options, RoutePath::new(options.link_base.clone()))
    }

    /// Pipeline whose cross-references use `formatter` for hrefs.
    pub fn with_link_formatter<L>(options: &PipelineOptions, formatter: L) -> Self
    where
        L: LinkFormatter + Send + Sync + 'static,
    {
        let mut pipeline = Self::bare(options);
        pipeline.add_postprocessor(CrossReferences::new(formatter));
        pipeline
    }

    /// Pipeline without any hooks.
    pub fn bare(options: &PipelineOptions) -> Self {
        Self {
            renderer: MarkupRenderer::new(options),
            preprocessors: Vec::new(),
            postprocessors: Vec::new(),
        }
    }

    /// Append a hook run on the raw text, before rendering.
    pub fn add_preprocessor<T: TextTransform + Send + Sync + 'static>(&mut self, transform: T) {
        self.preprocessors.push(Box::new(transform));
    }

    /// Append a hook run on the rendered HTML.
    pub fn add_postprocessor<T: TextTransform + Send + Sync + 'static>(&mut self, transform: T) {
        self.postprocessors.push(Box::new(transform));
    }

    /// Run every stage over `raw`.
    pub fn process(&self, raw: &str) -> Result<Processed, PipelineError> {
        let preprocessed = apply(&self.preprocessors, raw);
        let rendered = self.renderer.render(&preprocessed)?;
        let (meta_raw, body) = split_front_matter(&preprocessed)?;
        let metadata = normalize_metadata(meta_raw, &rendered.meta);
        let (meta_raw, body) = (meta_raw.to_string(), body.to_string());
        let final_html = apply(&self.postprocessors, &rendered.html);

        log::debug!(
            "processed document: {} metadata field(s), {} byte body",
            metadata.len(),
            body.len()
        );

        Ok(Processed {
            preprocessed,
            html: rendered.html,
            meta_raw,
            body,
            metadata,
            rendered: final_html,
        })
    }

    /// Run every stage and return `(rendered, body, metadata)`.
    pub fn process_parts(&self, raw: &str) -> Result<(String, String, MetadataRecord), PipelineError> {
        let processed = self.process(raw)?;
        Ok((processed.rendered, processed.body, processed.metadata))
    }
}

impl Default for DocumentPipeline {
    fn default() -> Self {
        Self::new(&PipelineOptions::default())
    }
}

impl std::fmt::Debug for DocumentPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentPipeline")
            .field("renderer", &self.renderer)
            .field("preprocessors", &self.preprocessors.len())
            .field("postprocessors", &self.postprocessors.len())
            .finish()
    }
}

/// Converts `\r\n` line endings to `\n`.
///
/// Not installed by default; register it with
/// [`DocumentPipeline::add_preprocessor`] when pages come from Windows editors.
pub fn normalize_line_endings(input: &str) -> Cow<'_, str> {
    if input.contains('\r') {
        Cow::Owned(input.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(input)
    }
}

fn apply(transforms: &[BoxedTransform], input: &str) -> String {
    let mut current = Cow::Borrowed(input);
    for transform in transforms {
        let next = transform.transform(current.as_ref());
        current = Cow::Owned(next.into_owned());
    }
    current.into_owned()
}

/// Splits at the first blank line into `(front-matter, body)`.
fn split_front_matter(text: &str) -> Result<(&str, &str), PipelineError> {
    let boundary = [("\n\n", 2usize), ("\n\r\n", 3usize)]
        .iter()
        .filter_map(|(sep, len)| text.find(*sep).map(|pos| (pos, *len)))
        .min_by_key(|(pos, _)| *pos);

    match boundary {
        Some((pos, len)) => Ok((&text[..pos], &text[pos + len..])),
        None => Err(PipelineError::MalformedDocument),
    }
}

/// Rebuilds metadata in front-matter order, taking values from the engine.
fn normalize_metadata(meta_raw: &str, engine: &EngineMeta) -> MetadataRecord {
    let mut record = MetadataRecord::new();
    for line in meta_raw.lines() {
        let key = line.split(':').next().unwrap_or_default().trim().to_lowercase();
        if key.is_empty() {
            continue;
        }
        match engine.get(&key) {
            Some(values) => record.insert(&key, values.join("\n")),
            None => log::trace!("skipping front-matter line without a field: {:?}", line),
        }
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::extract_meta;

    fn shout(input: &str) -> Cow<'_, str> {
        Cow::Owned(input.replace("hello", "HELLO"))
    }

    fn strip_paragraphs(input: &str) -> Cow<'_, str> {
        Cow::Owned(input.replace("<p>", "").replace("</p>", ""))
    }

    #[test]
    fn splits_at_first_blank_line() {
        let (meta, body) = split_front_matter("a: 1\n\nbody\n\nmore").unwrap();
        assert_eq!(meta, "a: 1");
        assert_eq!(body, "body\n\nmore");
    }

    #[test]
    fn splits_crlf_blank_line() {
        let (meta, body) = split_front_matter("a: 1\r\n\r\nbody").unwrap();
        assert_eq!(meta, "a: 1\r");
        assert_eq!(body, "body");
    }

    #[test]
    fn split_without_boundary_fails() {
        assert_eq!(
            split_front_matter("title: x\nbody"),
            Err(PipelineError::MalformedDocument)
        );
    }

    #[test]
    fn metadata_follows_source_order() {
        let text = "Zeta: last\nalpha: first\n\nbody";
        let engine = extract_meta(text).meta;
        let record = normalize_metadata("Zeta: last\nalpha: first", &engine);
        assert_eq!(record.keys().collect::<Vec<_>>(), ["zeta", "alpha"]);
    }

    #[test]
    fn continuation_values_are_joined() {
        let text = "summary: one\n    two\n\nbody";
        let processed = DocumentPipeline::default().process(text).unwrap();
        assert_eq!(processed.metadata.get("summary"), Some("one\ntwo"));
        assert_eq!(processed.metadata.len(), 1);
    }

    #[test]
    fn keeps_every_stage_output() {
        let processed = DocumentPipeline::default()
            .process("title: T\n\nsee [[Other Page]]")
            .unwrap();
        assert_eq!(processed.preprocessed, "title: T\n\nsee [[Other Page]]");
        assert_eq!(processed.meta_raw, "title: T");
        assert_eq!(processed.body, "see [[Other Page]]");
        assert!(processed.html.contains("[[Other Page]]"));
        assert!(
            processed
                .rendered
                .contains("<a href=\"/other_page/\">Other Page</a>")
        );
    }

    #[test]
    fn preprocessors_run_in_registration_order() {
        let mut pipeline = DocumentPipeline::bare(&PipelineOptions::default());
        pipeline.add_preprocessor(shout);
        pipeline.add_preprocessor(normalize_line_endings);
        let processed = pipeline.process("title: hello\r\n\r\nhello world").unwrap();
        assert_eq!(processed.body, "HELLO world");
        assert_eq!(processed.metadata.get("title"), Some("HELLO"));
    }

    #[test]
    fn postprocessors_see_rendered_html() {
        let mut pipeline = DocumentPipeline::default();
        pipeline.add_postprocessor(strip_paragraphs);
        let processed = pipeline.process("\n\n[[a]]").unwrap();
        assert_eq!(processed.rendered, "<a href=\"/a/\">a</a>");
    }

    #[test]
    fn bare_pipeline_leaves_references() {
        let pipeline = DocumentPipeline::bare(&PipelineOptions::default());
        let processed = pipeline.process("\n\n[[a]]").unwrap();
        assert_eq!(processed.rendered, processed.html);
    }

    #[test]
    fn link_base_comes_from_options() {
        let options = PipelineOptions {
            link_base: "/wiki".into(),
            ..PipelineOptions::default()
        };
        let (rendered, _, _) = DocumentPipeline::new(&options)
            .process_parts("\n\n[[Home]]")
            .unwrap();
        assert!(rendered.contains("href=\"/wiki/home/\""));
    }

    #[test]
    fn pipeline_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DocumentPipeline>();
    }
}
