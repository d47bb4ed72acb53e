//! HTTP trigger boundary tests.
//!
//! Starts the axum router over a running runtime and exercises it with reqwest.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tlparser::{
    http, InMemoryBroker, InMemoryDocumentStore, LamodaProduct, Runtime, SourceError, Sources,
    StaticSource, TwitchGame, TwitchStream, TwitchUser,
};

use crate::support::{fortnite, ninja, product, POLL};

fn sources() -> Sources {
    Sources {
        users: Arc::new(
            StaticSource::<TwitchUser>::new()
                .with(ninja())
                .failing("banned", SourceError::Rejected { key: "banned".into() })
                .failing("expired", SourceError::Unauthorized),
        ),
        games: Arc::new(StaticSource::<TwitchGame>::new().with(fortnite())),
        streams: Arc::new(StaticSource::<TwitchStream>::new()),
        products: Arc::new(StaticSource::<LamodaProduct>::new().with_all(
            "shoes",
            vec![product("shoes", "A1", 10.0), product("shoes", "B2", 20.0)],
        )),
    }
}

/// Bind to port 0 and return the actual address.
async fn start_server(broker: InMemoryBroker) -> (String, Runtime) {
    let runtime = Runtime::with_sources(sources(), broker, InMemoryDocumentStore::new(), POLL);
    let app = http::router(runtime.services());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), runtime)
}

#[tokio::test]
async fn health_check() {
    let (base, _runtime) = start_server(InMemoryBroker::new()).await;

    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);
    let kinds = body["kinds"].as_array().unwrap();
    assert!(kinds.iter().any(|k| k == "lamoda_product"));
}

#[tokio::test]
async fn parse_is_accepted_then_stored_in_the_background() {
    let broker = InMemoryBroker::new();
    let (base, _runtime) = start_server(broker.clone()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/twitch/users/ninja/parse"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 202);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);

    let mut found = None;
    for _ in 0..200 {
        let resp = client
            .get(format!("{base}/twitch/users/ninja"))
            .send()
            .await
            .unwrap();
        if resp.status() == 200 {
            found = Some(resp.json::<Value>().await.unwrap());
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let found = found.expect("ninja was never stored");
    assert_eq!(found[0]["entity"]["login"], "ninja");
    assert!(!found[0]["id"].as_str().unwrap().is_empty());
    assert_eq!(broker.len("twitch_user.results"), 1);
}

#[tokio::test]
async fn sync_parse_returns_stored_entities() {
    let (base, _runtime) = start_server(InMemoryBroker::new()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/lamoda/products/shoes/parse/sync"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 2);

    let listed: Value = client
        .get(format!("{base}/lamoda/products"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn sync_parse_maps_source_failures() {
    let (base, _runtime) = start_server(InMemoryBroker::new()).await;
    let client = reqwest::Client::new();

    for (login, status) in [("banned", 400), ("expired", 401), ("ghost", 404)] {
        let resp = client
            .post(format!("{base}/twitch/users/{login}/parse/sync"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), status, "login {login}");
        let body: Value = resp.json().await.unwrap();
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn unknown_key_is_404() {
    let (base, _runtime) = start_server(InMemoryBroker::new()).await;

    let resp = reqwest::get(format!("{base}/twitch/games/Unknown")).await.unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn delete_removes_and_announces() {
    let broker = InMemoryBroker::new();
    let (base, _runtime) = start_server(broker.clone()).await;
    let client = reqwest::Client::new();

    client
        .post(format!("{base}/twitch/games/Fortnite/parse/sync"))
        .send()
        .await
        .unwrap();

    let resp = client
        .delete(format!("{base}/twitch/games/Fortnite"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .get(format!("{base}/twitch/games/Fortnite"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    assert_eq!(
        broker.event_types("twitch_game.results"),
        vec!["twitch_game.created_or_updated", "twitch_game.deleted_by_key"]
    );
}
