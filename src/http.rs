//! HTTP trigger boundary - one axum router per entity kind.
//!
//! Requires the `http` feature.
//!
//! ## Routes
//!
//! Each kind is nested under its prefix (`/twitch/users`, `/twitch/games`,
//! `/twitch/streams`, `/lamoda/products`):
//!
//! - `POST /:key/parse` - publish a parse request, `202 { "ok": true }`.
//! - `POST /:key/parse/sync` - fetch and store now, returns the stored entities.
//! - `GET /` - every stored entity of the kind.
//! - `GET /:key` - the stored entities under `key`, 404 when there are none.
//! - `DELETE /:key` - delete and announce, `200 { "ok": true }`.
//!
//! `GET /health` returns `{ "ok": true, "kinds": [...] }`.
//!
//! ## Example
//!
//! ```ignore
//! let runtime = Runtime::start(&config, InMemoryBroker::new(), InMemoryDocumentStore::new())?;
//! let app = tlparser::http::router(runtime.services());
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! ```

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tracing::error;

use crate::entity::{LamodaProduct, Tracked, TwitchGame, TwitchStream, TwitchUser};
use crate::runtime::Services;
use crate::service::{ParseService, ServiceError};

/// Build the application router over every kind's service.
pub fn router(services: Services) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/twitch/users", kind_router(services.users))
        .nest("/twitch/games", kind_router(services.games))
        .nest("/twitch/streams", kind_router(services.streams))
        .nest("/lamoda/products", kind_router(services.products))
}

/// Routes for a single kind.
pub fn kind_router<E: Tracked>(service: ParseService<E>) -> Router {
    Router::new()
        .route("/", get(list_handler::<E>))
        .route("/:key", get(find_handler::<E>).delete(remove_handler::<E>))
        .route("/:key/parse", post(parse_handler::<E>))
        .route("/:key/parse/sync", post(parse_sync_handler::<E>))
        .with_state(service)
}

/// `GET /health`
async fn health_handler() -> impl IntoResponse {
    let kinds = [
        TwitchUser::KIND,
        TwitchGame::KIND,
        TwitchStream::KIND,
        LamodaProduct::KIND,
    ];
    Json(json!({ "ok": true, "kinds": kinds }))
}

/// `POST /:key/parse`
async fn parse_handler<E: Tracked>(
    State(service): State<ParseService<E>>,
    Path(key): Path<String>,
) -> Response {
    match service.parse(&key) {
        Ok(()) => (StatusCode::ACCEPTED, Json(json!({ "ok": true }))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// `POST /:key/parse/sync`
async fn parse_sync_handler<E: Tracked>(
    State(service): State<ParseService<E>>,
    Path(key): Path<String>,
) -> Response {
    // Sources block on network I/O
    match tokio::task::spawn_blocking(move || service.private_parse(&key)).await {
        Ok(Ok(stored)) => Json(stored).into_response(),
        Ok(Err(e)) => error_response(&e),
        Err(join) => {
            error!(kind = E::KIND, error = %join, "sync parse task failed");
            let body = json!({ "error": "internal error" });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

/// `GET /`
async fn list_handler<E: Tracked>(State(service): State<ParseService<E>>) -> Response {
    match service.list_all() {
        Ok(all) => Json(all).into_response(),
        Err(e) => error_response(&e),
    }
}

/// `GET /:key`
async fn find_handler<E: Tracked>(
    State(service): State<ParseService<E>>,
    Path(key): Path<String>,
) -> Response {
    match service.find_by_key(&key) {
        Ok(found) if found.is_empty() => {
            let body = json!({ "error": format!("{} not found: {}", E::KIND, key) });
            (StatusCode::NOT_FOUND, Json(body)).into_response()
        }
        Ok(found) => Json(found).into_response(),
        Err(e) => error_response(&e),
    }
}

/// `DELETE /:key`
async fn remove_handler<E: Tracked>(
    State(service): State<ParseService<E>>,
    Path(key): Path<String>,
) -> Response {
    match service.remove(&key) {
        Ok(_) => Json(json!({ "ok": true })).into_response(),
        Err(e) => error_response(&e),
    }
}

fn error_response(e: &ServiceError) -> Response {
    let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = json!({ "error": e.to_string() });
    (status, Json(body)).into_response()
}
