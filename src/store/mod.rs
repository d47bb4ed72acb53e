//! Document store - keyed collections of serialized entity documents.
//!
//! A store holds one collection per entity kind. Documents are addressed three
//! ways: by store id, by identity key (unique per collection, the upsert key)
//! and by request key (possibly shared by several documents).
//!
//! Backends implement the primitive operations; [`DocumentStore::upsert`]
//! composes them into create-or-update and may be overridden by backends that
//! can do the lookup and the write atomically.
//!
//! ## Example
//!
//! ```
//! use tlparser::store::{Document, DocumentStore, InMemoryDocumentStore};
//!
//! let store = InMemoryDocumentStore::new();
//! let doc = Document::new("ninja", "ninja", br#"{"login":"ninja"}"#.to_vec());
//! let stored = store.upsert("twitch_users", doc).unwrap();
//! assert_eq!(stored.version, 1);
//! assert_eq!(store.find_by_key("twitch_users", "ninja").unwrap().len(), 1);
//! ```

mod in_memory;

use thiserror::Error;

pub use in_memory::InMemoryDocumentStore;

/// A stored document.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    /// Store-assigned id; stable across updates.
    pub id: String,
    /// Identity key, unique within the collection.
    pub identity: String,
    /// Request key.
    pub key: String,
    /// Starts at 1, incremented by every update.
    pub version: u64,
    /// Serialized entity (JSON).
    pub body: Vec<u8>,
}

impl Document {
    /// A new, not yet stored document with a fresh id.
    pub fn new(identity: impl Into<String>, key: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            identity: identity.into(),
            key: key.into(),
            version: 0,
            body,
        }
    }

    /// Replace the generated id with a known one.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

/// Error type for store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No document matched.
    #[error("{collection} not found: {key}")]
    NotFound { collection: String, key: String },
    /// A document with this identity already exists.
    #[error("duplicate identity in {collection}: {identity}")]
    Duplicate { collection: String, identity: String },
    /// Another document already has this store id.
    #[error("duplicate id in {collection}: {id}")]
    DuplicateId { collection: String, id: String },
    /// Serialization/deserialization error.
    #[error("document serialization error: {0}")]
    Serde(String),
    /// Storage-level error.
    #[error("document storage error: {0}")]
    Storage(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serde(err.to_string())
    }
}

/// Primitive operations of a document-oriented store.
pub trait DocumentStore: Send + Sync {
    /// The document with this identity, if any.
    fn find_by_identity(
        &self,
        collection: &str,
        identity: &str,
    ) -> Result<Option<Document>, StoreError>;

    /// All documents under a request key, in insertion order.
    fn find_by_key(&self, collection: &str, key: &str) -> Result<Vec<Document>, StoreError>;

    /// Insert a new document at version 1. Fails on a duplicate identity or id.
    fn insert(&self, collection: &str, doc: Document) -> Result<Document, StoreError>;

    /// Overwrite the document with `doc.id` in place, bumping its version.
    fn update_in_place(&self, collection: &str, doc: Document) -> Result<Document, StoreError>;

    /// Remove every document under a request key. Returns how many went.
    fn delete_matching(&self, collection: &str, key: &str) -> Result<usize, StoreError>;

    /// Every document of the collection, in insertion order.
    fn scan_all(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Create-or-update by identity.
    ///
    /// An existing document keeps its id and gets `doc`'s key and body; otherwise
    /// `doc` is inserted as is. The default lookup-then-write is not atomic
    /// across processes: concurrent writers race and the last write wins.
    fn upsert(&self, collection: &str, doc: Document) -> Result<Document, StoreError> {
        match self.find_by_identity(collection, &doc.identity)? {
            Some(existing) => self.update_in_place(
                collection,
                Document {
                    id: existing.id,
                    version: existing.version,
                    ..doc
                },
            ),
            None => self.insert(collection, doc),
        }
    }
}

impl<S: DocumentStore + ?Sized> DocumentStore for std::sync::Arc<S> {
    fn find_by_identity(
        &self,
        collection: &str,
        identity: &str,
    ) -> Result<Option<Document>, StoreError> {
        (**self).find_by_identity(collection, identity)
    }

    fn find_by_key(&self, collection: &str, key: &str) -> Result<Vec<Document>, StoreError> {
        (**self).find_by_key(collection, key)
    }

    fn insert(&self, collection: &str, doc: Document) -> Result<Document, StoreError> {
        (**self).insert(collection, doc)
    }

    fn update_in_place(&self, collection: &str, doc: Document) -> Result<Document, StoreError> {
        (**self).update_in_place(collection, doc)
    }

    fn delete_matching(&self, collection: &str, key: &str) -> Result<usize, StoreError> {
        (**self).delete_matching(collection, key)
    }

    fn scan_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        (**self).scan_all(collection)
    }

    fn upsert(&self, collection: &str, doc: Document) -> Result<Document, StoreError> {
        (**self).upsert(collection, doc)
    }
}
