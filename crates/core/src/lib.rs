#![deny(missing_docs)]
//! quire core: page front-matter, markdown rendering, and cross-reference links.

/// Rendered pages and storage records.
pub mod document;
/// Pipeline error types.
pub mod error;
/// Code-highlighting markup for code blocks.
pub mod highlight;
/// Metadata block extraction used by the renderer.
pub mod meta;
/// Ordered page metadata.
pub mod metadata;
/// Pipeline configuration.
pub mod options;
/// The staged document pipeline.
pub mod pipeline;
/// Markdown rendering.
pub mod render;
/// Page identifier normalization.
pub mod url;
/// Cross-reference rewriting.
pub mod xref;

pub use document::{Document, PageRecord};
pub use error::{PipelineError, SourceLocation};
pub use meta::EngineMeta;
pub use metadata::MetadataRecord;
pub use options::PipelineOptions;
pub use pipeline::{DocumentPipeline, Processed, TextTransform, normalize_line_endings};
pub use render::{MarkupRenderer, RenderOutput};
pub use url::normalize_url;
pub use xref::{
    CrossReference, CrossReferences, LinkFormatter, RoutePath, find_cross_references,
    rewrite_cross_references,
};
