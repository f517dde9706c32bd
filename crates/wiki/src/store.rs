//! Page storage.
//!
//! The wiki only talks to storage through [`PageStore`]; callers construct a
//! store once and hand it to [`crate::Wiki`]. [`MemoryStore`] is the bundled
//! implementation.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use quire_core::PageRecord;
use thiserror::Error;

/// Errors reported by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No page with this identifier.
    #[error("page not found: {0}")]
    NotFound(String),
    /// A page with this identifier already exists.
    #[error("page already exists: {0}")]
    AlreadyExists(String),
    /// The backend itself failed.
    #[error("storage backend error: {0}")]
    Backend(String),
    /// A snapshot could not be read or written.
    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Storage for page records, keyed by canonical identifier.
pub trait PageStore: Send + Sync {
    /// Fetch a page.
    fn get(&self, identifier: &str) -> Result<Option<PageRecord>, StoreError>;

    /// Insert or replace a page.
    fn put(&self, record: PageRecord) -> Result<(), StoreError>;

    /// Remove a page; `false` when there was nothing to remove.
    fn delete(&self, identifier: &str) -> Result<bool, StoreError>;

    /// Every page, ordered by identifier.
    fn list(&self) -> Result<Vec<PageRecord>, StoreError>;

    /// Move a page to a new identifier.
    fn rename(&self, identifier: &str, new_identifier: &str) -> Result<(), StoreError>;

    /// Whether a page exists.
    fn exists(&self, identifier: &str) -> Result<bool, StoreError> {
        Ok(self.get(identifier)?.is_some())
    }
}

/// In-process [`PageStore`] backed by an ordered map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pages: RwLock<BTreeMap<String, PageRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a JSON array of records.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let records: Vec<PageRecord> = serde_json::from_str(json)?;
        let pages = records
            .into_iter()
            .map(|record| (record.identifier.clone(), record))
            .collect();
        Ok(Self {
            pages: RwLock::new(pages),
        })
    }

    /// Dump every record as a JSON array, ordered by identifier.
    pub fn to_json(&self) -> Result<String, StoreError> {
        let records = self.list()?;
        Ok(serde_json::to_string_pretty(&records)?)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, PageRecord>>, StoreError> {
        self.pages
            .read()
            .map_err(|_| StoreError::Backend("page map lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<String, PageRecord>>, StoreError> {
        self.pages
            .write()
            .map_err(|_| StoreError::Backend("page map lock poisoned".to_string()))
    }
}

impl PageStore for MemoryStore {
    fn get(&self, identifier: &str) -> Result<Option<PageRecord>, StoreError> {
        Ok(self.read()?.get(identifier).cloned())
    }

    fn put(&self, record: PageRecord) -> Result<(), StoreError> {
        self.write()?.insert(record.identifier.clone(), record);
        Ok(())
    }

    fn delete(&self, identifier: &str) -> Result<bool, StoreError> {
        Ok(self.write()?.remove(identifier).is_some())
    }

    fn list(&self) -> Result<Vec<PageRecord>, StoreError> {
        Ok(self.read()?.values().cloned().collect())
    }

    fn rename(&self, identifier: &str, new_identifier: &str) -> Result<(), StoreError> {
        let mut pages = self.write()?;
        if identifier == new_identifier {
            return if pages.contains_key(identifier) {
                Ok(())
            } else {
                Err(StoreError::NotFound(identifier.to_string()))
            };
        }
        if pages.contains_key(new_identifier) {
            return Err(StoreError::AlreadyExists(new_identifier.to_string()));
        }
        let mut record = pages
            .remove(identifier)
            .ok_or_else(|| StoreError::NotFound(identifier.to_string()))?;
        record.identifier = new_identifier.to_string();
        pages.insert(new_identifier.to_string(), record);
        Ok(())
    }

    fn exists(&self, identifier: &str) -> Result<bool, StoreError> {
        Ok(self.read()?.contains_key(identifier))
    }
}
