//! HttpSource against a local stand-in for the Helix and catalogue APIs.
//!
//! The server runs on its own tokio runtime; the blocking client is called
//! from the test thread.

use std::collections::HashMap;
use std::sync::mpsc;
use std::thread;

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tlparser::source::{Credentials, HttpSource, Source, SourceError};
use tlparser::{LamodaProduct, TwitchUser};

fn authorized(headers: &HeaderMap) -> bool {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    header("client-id") == Some("client") && header("authorization") == Some("Bearer token")
}

async fn helix_users(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> Response {
    if !authorized(&headers) {
        let body = json!({ "error": "Unauthorized", "status": 401 });
        return (StatusCode::UNAUTHORIZED, Json(body)).into_response();
    }

    match params.get("login").map(String::as_str) {
        None | Some("") => {
            let body = json!({ "error": "Bad Request", "status": 400 });
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
        Some("ninja") => Json(json!({
            "data": [{
                "id": "19571641",
                "login": "ninja",
                "display_name": "Ninja",
                "type": "",
                "broadcaster_type": "partner",
                "description": "Professional Battle Royale player.",
                "profile_image_url": "https://static-cdn.jtvnw.net/jtv_user_pictures/ninja.png",
                "offline_image_url": "",
                "view_count": 0,
                "created_at": "2011-11-20T06:34:27Z"
            }]
        }))
        .into_response(),
        Some(_) => Json(json!({ "data": [] })).into_response(),
    }
}

async fn catalogue(Query(params): Query<HashMap<String, String>>) -> Response {
    match params.get("category").map(String::as_str) {
        Some("shoes") => Json(json!({
            "data": [
                { "sku": "A1", "url": "https://www.lamoda.ru/p/a1/", "price": 4990 },
                { "sku": "B2", "url": "https://www.lamoda.ru/p/b2/", "price": 2490.5,
                  "price_valid_until": "2030-01-01 00:00:00" }
            ]
        }))
        .into_response(),
        _ => Json(json!({ "data": [] })).into_response(),
    }
}

/// Serve on an ephemeral port from a background runtime.
fn spawn_server() -> String {
    let app = Router::new()
        .route("/helix/users", get(helix_users))
        .route("/products", get(catalogue));

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });
    format!("http://{}", rx.recv().unwrap())
}

fn users(base: &str, credentials: Credentials) -> HttpSource<TwitchUser> {
    HttpSource::new(format!("{base}/helix/users"), credentials).unwrap()
}

#[test]
fn fetches_and_maps_a_user() {
    let base = spawn_server();
    let source = users(&base, Credentials::new("client", "token"));

    let fetched = source.fetch("ninja").unwrap();

    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].login, "ninja");
    assert_eq!(fetched[0].broadcaster_type, "partner");
    assert_eq!(fetched[0].created_at.to_rfc3339(), "2011-11-20T06:34:27+00:00");
}

#[test]
fn classifies_failures() {
    let base = spawn_server();
    let source = users(&base, Credentials::new("client", "token"));

    assert_eq!(
        source.fetch("").unwrap_err(),
        SourceError::Rejected { key: String::new() }
    );
    assert_eq!(
        source.fetch("ghost").unwrap_err(),
        SourceError::not_found::<TwitchUser>("ghost")
    );

    let anonymous = users(&base, Credentials::default());
    assert_eq!(anonymous.fetch("ninja").unwrap_err(), SourceError::Unauthorized);
}

#[test]
fn unreachable_source_is_a_transport_error() {
    let source = users("http://127.0.0.1:9", Credentials::default());
    assert!(matches!(
        source.fetch("ninja"),
        Err(SourceError::Transport(_))
    ));
}

#[test]
fn fetches_a_whole_category() {
    let base = spawn_server();
    let source =
        HttpSource::<LamodaProduct>::new(format!("{base}/products"), Credentials::default())
            .unwrap();

    let products = source.fetch("shoes").unwrap();

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].price, 4990.0);
    assert_eq!(products[0].price_currency, "RUB");
    assert!(products[1].price_valid_until.is_some());
    assert!(products.iter().all(|p| p.category == "shoes"));
}
