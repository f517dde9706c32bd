//! Rendered pages and the storage records they come from.

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::metadata::MetadataRecord;
use crate::pipeline::DocumentPipeline;
use crate::url::normalize_url;

/// A page as kept by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Canonical page identifier.
    pub identifier: String,
    /// Page title, when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Comma-separated tags, when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    /// Markdown body.
    #[serde(default)]
    pub body: String,
}

impl PageRecord {
    /// Record with a body and no front-matter fields.
    pub fn new(identifier: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            title: None,
            tags: None,
            body: body.into(),
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the tags.
    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    /// Raw page text: front-matter lines for the fields that are set, a
    /// blank line, then the body.
    ///
    /// Multi-line values are written as indented continuation lines so the
    /// renderer reads them back as a single field. Blank lines inside a value
    /// are dropped, since a blank line ends the front-matter.
    pub fn to_raw_text(&self) -> String {
        let mut lines = Vec::new();
        if let Some(title) = &self.title {
            lines.push(field_line("title", title));
        }
        if let Some(tags) = &self.tags {
            lines.push(field_line("tags", tags));
        }

        let mut text = lines.join("\n");
        text.push_str("\n\n");
        text.push_str(&self.body);
        text
    }
}

fn field_line(key: &str, value: &str) -> String {
    let mut values = value.split('\n');
    let mut line = format!("{}: {}", key, values.next().unwrap_or_default());
    for more in values.filter(|more| !more.trim().is_empty()) {
        line.push_str("\n    ");
        line.push_str(more);
    }
    line
}

/// A processed page: rendered HTML, markdown body, and ordered metadata.
///
/// Documents never change; re-render the updated text to get a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    identifier: String,
    rendered: String,
    body: String,
    metadata: MetadataRecord,
}

impl Document {
    /// Run `pipeline` over `raw` and keep the result under `identifier`.
    pub fn render(
        identifier: &str,
        raw: &str,
        pipeline: &DocumentPipeline,
    ) -> Result<Self, PipelineError> {
        let (rendered, body, metadata) = pipeline.process_parts(raw)?;
        Ok(Self {
            identifier: normalize_url(identifier),
            rendered,
            body,
            metadata,
        })
    }

    /// Render a stored page.
    pub fn from_record(
        record: &PageRecord,
        pipeline: &DocumentPipeline,
    ) -> Result<Self, PipelineError> {
        Self::render(&record.identifier, &record.to_raw_text(), pipeline)
    }

    /// Canonical identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// HTML after cross-reference rewriting.
    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    /// Markdown body without front-matter.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Ordered metadata.
    pub fn metadata(&self) -> &MetadataRecord {
        &self.metadata
    }

    /// The `title` field, or the identifier.
    pub fn title(&self) -> &str {
        self.metadata.get_or_default("title", &self.identifier)
    }

    /// The `tags` field, or an empty string.
    pub fn tags(&self) -> &str {
        self.metadata.get_or_default("tags", "")
    }

    /// Tags split on commas, trimmed, empties dropped.
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags()
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .collect()
    }

    /// Storage record for this page.
    pub fn to_record(&self) -> PageRecord {
        PageRecord {
            identifier: self.identifier.clone(),
            title: self.metadata.get("title").map(str::to_string),
            tags: self.metadata.get("tags").map(str::to_string),
            body: self.body.clone(),
        }
    }
}
