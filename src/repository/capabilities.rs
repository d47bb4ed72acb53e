use crate::entity::{Stored, Tracked};
use crate::event::{CreatedOrUpdated, DeletedByKey, ParseRequested, ResultWithEvent};
use crate::store::StoreError;

/// What a create-or-update hands back: the written entity and its event.
pub type Upserted<E> = ResultWithEvent<Stored<E>, CreatedOrUpdated<E>>;

/// Describe a parse request without touching the store.
pub trait RequestParse<E: Tracked> {
    fn request_parse_event(&self, key: &str) -> ParseRequested {
        ParseRequested::new(key)
    }
}

/// Insert or overwrite by identity key.
pub trait CreateOrUpdate<E: Tracked> {
    /// Overwrites the record with the same identity (keeping its store id) or
    /// inserts a new one under a fresh store id.
    fn create_or_update(&self, entity: E) -> Result<Upserted<E>, StoreError>;

    /// Like `create_or_update`, but a newly inserted record takes the id of
    /// `stored`. Used to project CreatedOrUpdated events from other stores.
    fn restore(&self, stored: Stored<E>) -> Result<Upserted<E>, StoreError>;
}

/// Idempotent removal by request key.
pub trait DeleteByKey<E: Tracked> {
    /// Removes every record under `key`; succeeds even if none matched.
    fn delete_by_key(&self, key: &str) -> Result<DeletedByKey, StoreError>;
}

/// Lookup by request key.
pub trait GetByKey<E: Tracked> {
    /// The first record under `key`, or `StoreError::NotFound`.
    fn get_by_key(&self, key: &str) -> Result<Stored<E>, StoreError>;

    /// Every record under `key`.
    fn find_by_key(&self, key: &str) -> Result<Vec<Stored<E>>, StoreError>;
}

/// Full scan.
pub trait ListAll<E: Tracked> {
    fn list_all(&self) -> Result<Vec<Stored<E>>, StoreError>;
}

/// Full repository trait combining all capabilities.
pub trait Repository<E: Tracked>:
    RequestParse<E> + CreateOrUpdate<E> + DeleteByKey<E> + GetByKey<E> + ListAll<E> + Send + Sync
{
}

// Blanket implementation: anything implementing all capabilities is a Repository
impl<E, T> Repository<E> for T
where
    E: Tracked,
    T: RequestParse<E> + CreateOrUpdate<E> + DeleteByKey<E> + GetByKey<E> + ListAll<E> + Send + Sync,
{
}
