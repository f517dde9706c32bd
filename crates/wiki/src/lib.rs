#![deny(missing_docs)]
//! quire wiki: page storage, index, tags, and search on top of `quire-core`.

/// Parallel rendering of many pages.
pub mod batch;
/// Wiki configuration.
pub mod config;
/// Wiki error types.
pub mod error;
/// Page storage.
pub mod store;
/// Wiki operations.
pub mod wiki;

pub use batch::{BatchOutcome, BatchResult, BatchStats, render_all};
pub use config::WikiConfig;
pub use error::WikiError;
pub use store::{MemoryStore, PageStore, StoreError};
pub use wiki::{PageField, SearchOptions, Wiki};
