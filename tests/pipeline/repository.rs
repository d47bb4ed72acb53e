//! Repository contract over the in-memory document store.

use std::sync::Arc;
use std::thread;

use tlparser::repository::{CreateOrUpdate, DeleteByKey, GetByKey, ListAll, RequestParse};
use tlparser::{
    InMemoryDocumentStore, KeyedRepository, LamodaProduct, Repository, StoreError, TwitchUser,
};

use crate::support::{ninja, product};

#[test]
fn upsert_convergence() {
    let repo = KeyedRepository::<TwitchUser>::new(InMemoryDocumentStore::new());

    let first = repo.create_or_update(ninja()).unwrap();
    let mut renamed = ninja();
    renamed.display_name = "NINJA".into();
    let second = repo.create_or_update(renamed).unwrap();

    let all = repo.list_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].entity.display_name, "NINJA");
    assert_eq!(first.result().id, second.result().id);
}

#[test]
fn event_mirrors_written_entity() {
    let repo = KeyedRepository::<TwitchUser>::new(InMemoryDocumentStore::new());
    let written = repo.create_or_update(ninja()).unwrap();

    assert_eq!(written.event().id, written.result().id);
    assert_eq!(&written.event().entity, &written.result().entity);
}

#[test]
fn delete_twice_never_fails() {
    let repo = KeyedRepository::<TwitchUser>::new(InMemoryDocumentStore::new());
    repo.create_or_update(ninja()).unwrap();

    repo.delete_by_key("ninja").unwrap();
    assert!(repo.find_by_key("ninja").unwrap().is_empty());
    repo.delete_by_key("ninja").unwrap();
    assert!(repo.find_by_key("ninja").unwrap().is_empty());
}

#[test]
fn get_unknown_key_is_not_found() {
    let repo = KeyedRepository::<TwitchUser>::new(InMemoryDocumentStore::new());
    assert!(matches!(
        repo.get_by_key("ghost"),
        Err(StoreError::NotFound { .. })
    ));
}

#[test]
fn request_event_touches_nothing() {
    let store = InMemoryDocumentStore::new();
    let repo = KeyedRepository::<TwitchUser>::new(store.clone());

    assert_eq!(repo.request_parse_event("ninja").key, "ninja");
    assert_eq!(store.count("twitch_users"), 0);
}

#[test]
fn kinds_share_a_store_without_mixing() {
    let store = InMemoryDocumentStore::new();
    let users = KeyedRepository::<TwitchUser>::new(store.clone());
    let products = KeyedRepository::<LamodaProduct>::new(store.clone());

    users.create_or_update(ninja()).unwrap();
    products.create_or_update(product("shoes", "A1", 10.0)).unwrap();

    assert_eq!(store.count("twitch_users"), 1);
    assert_eq!(store.count("lamoda_products"), 1);
    assert_eq!(users.list_all().unwrap().len(), 1);
}

#[test]
fn concurrent_writers_leave_one_record() {
    let repo: Arc<dyn Repository<TwitchUser>> =
        Arc::new(KeyedRepository::<TwitchUser>::new(InMemoryDocumentStore::new()));

    let writers: Vec<_> = (0..8)
        .map(|i| {
            let repo = Arc::clone(&repo);
            thread::spawn(move || {
                let mut user = ninja();
                user.display_name = format!("Ninja {i}");
                repo.create_or_update(user).unwrap().into_result().id
            })
        })
        .collect();

    let ids: Vec<String> = writers.into_iter().map(|w| w.join().unwrap()).collect();
    assert_eq!(repo.list_all().unwrap().len(), 1);
    assert!(ids.iter().all(|id| id == &ids[0]));
}
