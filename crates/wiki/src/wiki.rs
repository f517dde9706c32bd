//! Wiki operations over a page store.

use std::collections::{BTreeMap, BTreeSet};

use quire_core::{Document, DocumentPipeline, PageRecord, normalize_url};
use rayon::prelude::*;
use regex::RegexBuilder;

use crate::batch::{BatchOutcome, render_all};
use crate::config::WikiConfig;
use crate::error::WikiError;
use crate::store::PageStore;

/// Page attribute used for grouping and searching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageField {
    /// The page title (identifier when unset).
    Title,
    /// The raw tags string.
    Tags,
    /// The markdown body.
    Body,
}

impl PageField {
    fn value<'a>(&self, document: &'a Document) -> &'a str {
        match self {
            Self::Title => document.title(),
            Self::Tags => document.tags(),
            Self::Body => document.body(),
        }
    }
}

/// Options for [`Wiki::search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Match without regard to case.
    pub ignore_case: bool,
    /// Fields searched, in order.
    pub fields: Vec<PageField>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            ignore_case: true,
            fields: vec![PageField::Title, PageField::Tags, PageField::Body],
        }
    }
}

/// A wiki: a page store plus the pipeline that renders its pages.
pub struct Wiki<S> {
    store: S,
    pipeline: DocumentPipeline,
}

impl<S: PageStore> Wiki<S> {
    /// Create a wiki over `store`.
    pub fn new(store: S, pipeline: DocumentPipeline) -> Self {
        Self { store, pipeline }
    }

    /// Create a wiki using the pipeline described by `config`.
    pub fn from_config(store: S, config: &WikiConfig) -> Self {
        Self::new(store, config.build_pipeline())
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The rendering pipeline.
    pub fn pipeline(&self) -> &DocumentPipeline {
        &self.pipeline
    }

    /// Whether a page exists.
    pub fn exists(&self, url: &str) -> Result<bool, WikiError> {
        Ok(self.store.exists(&normalize_url(url))?)
    }

    /// Fetch and render a page.
    pub fn get(&self, url: &str) -> Result<Option<Document>, WikiError> {
        let identifier = normalize_url(url);
        match self.store.get(&identifier)? {
            Some(record) => self.render(&record).map(Some),
            None => Ok(None),
        }
    }

    /// An empty record for a page that does not exist yet; `None` if it does.
    pub fn get_bare(&self, url: &str) -> Result<Option<PageRecord>, WikiError> {
        let identifier = normalize_url(url);
        if self.store.exists(&identifier)? {
            return Ok(None);
        }
        Ok(Some(PageRecord::new(identifier, "")))
    }

    /// Store `record` and return the freshly rendered page.
    ///
    /// The page is rendered before it is stored, so a page that cannot be
    /// rendered is never written.
    pub fn save(&self, record: PageRecord) -> Result<Document, WikiError> {
        let record = PageRecord {
            identifier: normalize_url(&record.identifier),
            ..record
        };
        let document = self.render(&record)?;
        self.store.put(record)?;
        log::debug!("saved page {}", document.identifier());
        Ok(document)
    }

    /// Move a page to a new identifier.
    pub fn move_page(&self, url: &str, new_url: &str) -> Result<(), WikiError> {
        let (from, to) = (normalize_url(url), normalize_url(new_url));
        self.store.rename(&from, &to)?;
        log::debug!("moved page {} to {}", from, to);
        Ok(())
    }

    /// Delete a page; `false` when it did not exist.
    pub fn delete(&self, url: &str) -> Result<bool, WikiError> {
        Ok(self.store.delete(&normalize_url(url))?)
    }

    /// Every page, sorted by lower-cased title.
    pub fn index(&self) -> Result<Vec<Document>, WikiError> {
        let records = self.store.list()?;
        let mut documents = records
            .par_iter()
            .map(|record| self.render(record))
            .collect::<Result<Vec<_>, _>>()?;
        documents.sort_by_cached_key(|doc| doc.title().to_lowercase());
        Ok(documents)
    }

    /// Render every page, collecting failures instead of stopping at the first.
    pub fn render_all(&self) -> Result<BatchOutcome, WikiError> {
        let records = self.store.list()?;
        Ok(render_all(&records, &self.pipeline))
    }

    /// Pages grouped by the value of `field`.
    pub fn index_by(&self, field: PageField) -> Result<BTreeMap<String, Vec<Document>>, WikiError> {
        let mut groups: BTreeMap<String, Vec<Document>> = BTreeMap::new();
        for document in self.index()? {
            groups
                .entry(field.value(&document).to_string())
                .or_default()
                .push(document);
        }
        Ok(groups)
    }

    /// Pages whose title is exactly `title`.
    pub fn get_by_title(&self, title: &str) -> Result<Vec<Document>, WikiError> {
        Ok(self
            .index_by(PageField::Title)?
            .remove(title)
            .unwrap_or_default())
    }

    /// Pages grouped by tag; a page appears once per distinct tag.
    pub fn tags(&self) -> Result<BTreeMap<String, Vec<Document>>, WikiError> {
        let mut tags: BTreeMap<String, Vec<Document>> = BTreeMap::new();
        for document in self.index()? {
            let distinct: BTreeSet<&str> = document.tag_list().into_iter().collect();
            for tag in distinct {
                tags.entry(tag.to_string())
                    .or_default()
                    .push(document.clone());
            }
        }
        Ok(tags)
    }

    /// Pages carrying `tag`, sorted by lower-cased title.
    pub fn index_by_tag(&self, tag: &str) -> Result<Vec<Document>, WikiError> {
        let tag = tag.trim();
        Ok(self
            .index()?
            .into_iter()
            .filter(|document| document.tag_list().contains(&tag))
            .collect())
    }

    /// Pages where any of `options.fields` matches the regular expression `term`.
    pub fn search(&self, term: &str, options: &SearchOptions) -> Result<Vec<Document>, WikiError> {
        let pattern = RegexBuilder::new(term)
            .case_insensitive(options.ignore_case)
            .build()?;
        Ok(self
            .index()?
            .into_iter()
            .filter(|document| {
                options
                    .fields
                    .iter()
                    .any(|field| pattern.is_match(field.value(document)))
            })
            .collect())
    }

    fn render(&self, record: &PageRecord) -> Result<Document, WikiError> {
        Document::from_record(record, &self.pipeline)
            .map_err(|err| WikiError::render(&record.identifier, err))
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for Wiki<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wiki")
            .field("store", &self.store)
            .field("pipeline", &self.pipeline)
            .finish()
    }
}
