//! Parallel rendering of many pages.

use quire_core::{Document, DocumentPipeline, PageRecord};
use rayon::prelude::*;

/// Outcome for one page.
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// Identifier of the record.
    pub identifier: String,
    /// Rendered page (present on success).
    pub document: Option<Document>,
    /// Error message (present on failure).
    pub error: Option<String>,
}

/// Counters for a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Number of records processed.
    pub total: usize,
    /// Number rendered successfully.
    pub succeeded: usize,
    /// Number that failed.
    pub failed: usize,
}

/// Results in input order, plus counters.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// One entry per input record.
    pub results: Vec<BatchResult>,
    /// Counters.
    pub stats: BatchStats,
}

impl BatchOutcome {
    /// Successfully rendered documents, in input order.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.results.iter().filter_map(|r| r.document.as_ref())
    }
}

/// Renders every record in parallel; failures are collected, not raised.
pub fn render_all(records: &[PageRecord], pipeline: &DocumentPipeline) -> BatchOutcome {
    let results: Vec<BatchResult> = records
        .par_iter()
        .map(|record| match Document::from_record(record, pipeline) {
            Ok(document) => BatchResult {
                identifier: record.identifier.clone(),
                document: Some(document),
                error: None,
            },
            Err(err) => {
                log::warn!("failed to render {}: {}", record.identifier, err);
                BatchResult {
                    identifier: record.identifier.clone(),
                    document: None,
                    error: Some(err.to_string()),
                }
            }
        })
        .collect();

    let failed = results.iter().filter(|r| r.error.is_some()).count();
    let stats = BatchStats {
        total: results.len(),
        succeeded: results.len() - failed,
        failed,
    };
    log::debug!(
        "batch rendered {} page(s), {} failed",
        stats.total,
        stats.failed
    );

    BatchOutcome { results, stats }
}
