use std::sync::Mutex;

use crate::app::{Result, TributaryError};
use crate::domain::Item;
use crate::store::DateBucketedStore;

/// A [`DateBucketedStore`] shared between collector workers.
///
/// The lock is only reachable through [`insert`](Self::insert) and is held for a single insert.
#[derive(Debug, Default)]
pub struct SharedStore {
    inner: Mutex<DateBucketedStore>,
}

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, item: Item) -> Result<bool> {
        let mut store = self
            .inner
            .lock()
            .map_err(|e| TributaryError::StorePoisoned(e.to_string()))?;
        store.insert(item)
    }

    /// Consume the shared store, sorting its day list once.
    pub fn into_finalized(self) -> Result<DateBucketedStore> {
        let mut store = self
            .inner
            .into_inner()
            .map_err(|e| TributaryError::StorePoisoned(e.to_string()))?;
        store.finalize_ordering();
        Ok(store)
    }
}
