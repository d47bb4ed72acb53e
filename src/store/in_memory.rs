//! InMemoryDocumentStore - Vec-per-collection store for testing and development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{Document, DocumentStore, StoreError};

type Collections = HashMap<String, Vec<Document>>;

/// In-memory document store.
///
/// Collections keep insertion order. Clone-friendly via Arc; clones share data.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<Collections>>,
}

impl InMemoryDocumentStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .map(|c| c.get(collection).map(Vec::len).unwrap_or(0))
            .unwrap_or(0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Collections>, StoreError> {
        self.collections
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collections>, StoreError> {
        self.collections
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))
    }

    fn insert_into(
        collections: &mut Collections,
        collection: &str,
        doc: Document,
    ) -> Result<Document, StoreError> {
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.iter().any(|d| d.identity == doc.identity) {
            return Err(StoreError::Duplicate {
                collection: collection.to_string(),
                identity: doc.identity,
            });
        }
        if docs.iter().any(|d| d.id == doc.id) {
            return Err(StoreError::DuplicateId {
                collection: collection.to_string(),
                id: doc.id,
            });
        }

        let doc = Document { version: 1, ..doc };
        docs.push(doc.clone());
        Ok(doc)
    }

    fn update_within(
        collections: &mut Collections,
        collection: &str,
        doc: Document,
    ) -> Result<Document, StoreError> {
        let slot = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == doc.id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                key: doc.id.clone(),
            })?;

        let doc = Document {
            version: slot.version + 1,
            ..doc
        };
        *slot = doc.clone();
        Ok(doc)
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn find_by_identity(
        &self,
        collection: &str,
        identity: &str,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self
            .read()?
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.identity == identity))
            .cloned())
    }

    fn find_by_key(&self, collection: &str, key: &str) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .read()?
            .get(collection)
            .map(|docs| docs.iter().filter(|d| d.key == key).cloned().collect())
            .unwrap_or_default())
    }

    fn insert(&self, collection: &str, doc: Document) -> Result<Document, StoreError> {
        let mut collections = self.write()?;
        Self::insert_into(&mut collections, collection, doc)
    }

    fn update_in_place(&self, collection: &str, doc: Document) -> Result<Document, StoreError> {
        let mut collections = self.write()?;
        Self::update_within(&mut collections, collection, doc)
    }

    fn delete_matching(&self, collection: &str, key: &str) -> Result<usize, StoreError> {
        let mut collections = self.write()?;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };

        let before = docs.len();
        docs.retain(|d| d.key != key);
        Ok(before - docs.len())
    }

    fn scan_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        Ok(self.read()?.get(collection).cloned().unwrap_or_default())
    }

    /// Lookup and write happen under one write lock, so concurrent upserts of
    /// the same identity within this process never produce a duplicate.
    fn upsert(&self, collection: &str, doc: Document) -> Result<Document, StoreError> {
        let mut collections = self.write()?;
        let existing = collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.identity == doc.identity))
            .map(|d| d.id.clone());

        match existing {
            Some(id) => Self::update_within(&mut collections, collection, Document { id, ..doc }),
            None => Self::insert_into(&mut collections, collection, doc),
        }
    }
}
