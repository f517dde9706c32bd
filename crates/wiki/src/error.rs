use quire_core::PipelineError;
use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced by wiki operations.
#[derive(Debug, Error)]
pub enum WikiError {
    /// The storage backend failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A page could not be rendered.
    #[error("could not render page {identifier}: {source}")]
    Render {
        /// Identifier of the page.
        identifier: String,
        /// Underlying pipeline error.
        #[source]
        source: PipelineError,
    },
    /// A search term is not a valid regular expression.
    #[error("invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    /// A YAML configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_yaml::Error),
    /// A JSON configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    ConfigJson(#[from] serde_json::Error),
}

impl WikiError {
    pub(crate) fn render(identifier: &str, source: PipelineError) -> Self {
        Self::Render {
            identifier: identifier.to_string(),
            source,
        }
    }
}
