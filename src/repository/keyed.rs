//! KeyedRepository - one repository implementation for every tracked kind.

use std::marker::PhantomData;

use tracing::debug;

use crate::entity::{Stored, Tracked};
use crate::event::{DeletedByKey, ResultWithEvent};
use crate::store::{Document, DocumentStore, InMemoryDocumentStore, StoreError};

use super::{CreateOrUpdate, DeleteByKey, GetByKey, ListAll, RequestParse, Upserted};

/// Typed repository over a [`DocumentStore`] collection.
///
/// Entities are stored as JSON documents in `E::COLLECTION`, indexed by
/// `E::identity()` and `E::key()`.
///
/// ## Example
///
/// ```
/// use tlparser::{InMemoryDocumentStore, KeyedRepository, TwitchGame};
/// use tlparser::repository::{CreateOrUpdate, GetByKey};
///
/// let games = KeyedRepository::<TwitchGame>::new(InMemoryDocumentStore::new());
/// # let game = TwitchGame {
/// #     game_id: "33214".into(), name: "Fortnite".into(), igdb_id: "1905".into(),
/// #     box_art_url: String::new(), parsed_at: chrono::Utc::now(),
/// # };
/// let written = games.create_or_update(game).unwrap();
/// assert_eq!(games.get_by_key("Fortnite").unwrap().id, written.result().id);
/// ```
pub struct KeyedRepository<E, S = InMemoryDocumentStore> {
    store: S,
    _marker: PhantomData<fn() -> E>,
}

impl<E: Tracked, S: DocumentStore> KeyedRepository<E, S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// Get a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fails, before anything is written, on a body that would not read back
    /// (serde_json writes a non-finite float as `null`).
    fn to_document(entity: &E) -> Result<Document, StoreError> {
        let body = serde_json::to_vec(entity)?;
        serde_json::from_slice::<E>(&body)?;
        Ok(Document::new(entity.identity(), entity.key(), body))
    }

    fn from_document(doc: Document) -> Result<Stored<E>, StoreError> {
        let entity: E = serde_json::from_slice(&doc.body)?;
        Ok(Stored::new(doc.id, entity))
    }

    fn write(&self, doc: Document) -> Result<Upserted<E>, StoreError> {
        let written = self.store.upsert(E::COLLECTION, doc)?;
        debug!(
            kind = E::KIND,
            key = %written.key,
            id = %written.id,
            version = written.version,
            "entity written"
        );
        Ok(ResultWithEvent::created_or_updated(Self::from_document(
            written,
        )?))
    }
}

impl<E: Tracked, S: DocumentStore + Clone> Clone for KeyedRepository<E, S> {
    fn clone(&self) -> Self {
        Self::new(self.store.clone())
    }
}

impl<E: Tracked, S: DocumentStore> RequestParse<E> for KeyedRepository<E, S> {}

impl<E: Tracked, S: DocumentStore> CreateOrUpdate<E> for KeyedRepository<E, S> {
    fn create_or_update(&self, entity: E) -> Result<Upserted<E>, StoreError> {
        self.write(Self::to_document(&entity)?)
    }

    fn restore(&self, stored: Stored<E>) -> Result<Upserted<E>, StoreError> {
        self.write(Self::to_document(&stored.entity)?.with_id(stored.id))
    }
}

impl<E: Tracked, S: DocumentStore> DeleteByKey<E> for KeyedRepository<E, S> {
    fn delete_by_key(&self, key: &str) -> Result<DeletedByKey, StoreError> {
        let removed = self.store.delete_matching(E::COLLECTION, key)?;
        debug!(kind = E::KIND, key, removed, "entities deleted");
        Ok(DeletedByKey::new(key))
    }
}

impl<E: Tracked, S: DocumentStore> GetByKey<E> for KeyedRepository<E, S> {
    fn get_by_key(&self, key: &str) -> Result<Stored<E>, StoreError> {
        let doc = self
            .store
            .find_by_key(E::COLLECTION, key)?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound {
                collection: E::COLLECTION.to_string(),
                key: key.to_string(),
            })?;
        Self::from_document(doc)
    }

    fn find_by_key(&self, key: &str) -> Result<Vec<Stored<E>>, StoreError> {
        self.store
            .find_by_key(E::COLLECTION, key)?
            .into_iter()
            .map(Self::from_document)
            .collect()
    }
}

impl<E: Tracked, S: DocumentStore> ListAll<E> for KeyedRepository<E, S> {
    fn list_all(&self) -> Result<Vec<Stored<E>>, StoreError> {
        self.store
            .scan_all(E::COLLECTION)?
            .into_iter()
            .map(Self::from_document)
            .collect()
    }
}
