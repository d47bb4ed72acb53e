//! HTTP JSON source: `GET <url>?<param>=<key>` returning `{ "data": [...] }`.

use std::marker::PhantomData;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::entity::Tracked;

use super::{Source, SourceError};

/// Maps one raw source record onto an entity.
pub trait SourceRecord: Tracked {
    /// Query parameter carrying the request key.
    const PARAM: &'static str;

    /// Map every element of `data` (grouped kinds) instead of only the first.
    const ALL_ROWS: bool = false;

    /// The record as the source serializes it.
    type Raw: DeserializeOwned;

    /// Build the entity. `key` is the request key the record was fetched for;
    /// `parsed_at` is the fetch time.
    fn from_raw(raw: Self::Raw, key: &str, parsed_at: DateTime<Utc>)
        -> Result<Self, SourceError>;
}

/// Credentials sent with every source request.
#[derive(Clone, Debug, Default)]
pub struct Credentials {
    /// Sent as `Client-Id`.
    pub client_id: Option<String>,
    /// Sent as `Authorization: Bearer <token>`.
    pub access_token: Option<String>,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            client_id: Some(client_id.into()),
            access_token: Some(access_token.into()),
        }
    }

    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        let request = match &self.client_id {
            Some(id) => request.header("Client-Id", id),
            None => request,
        };
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[derive(Deserialize)]
struct DataList {
    #[serde(default)]
    data: Option<Vec<serde_json::Value>>,
}

/// Interpret a source response.
///
/// 400 and 401 map to `Rejected` and `Unauthorized`; any other non-2xx status
/// is a transport failure. A 2xx body without records is `NotFound`.
pub fn interpret_response<E: SourceRecord>(
    key: &str,
    status: u16,
    body: &[u8],
    parsed_at: DateTime<Utc>,
) -> Result<Vec<E>, SourceError> {
    match status {
        400 => return Err(SourceError::Rejected { key: key.to_string() }),
        401 => return Err(SourceError::Unauthorized),
        200..=299 => {}
        other => return Err(SourceError::Transport(format!("unexpected status {other}"))),
    }

    let list: DataList =
        serde_json::from_slice(body).map_err(|e| SourceError::Decode(e.to_string()))?;
    let rows = list.data.unwrap_or_default();
    if rows.is_empty() {
        return Err(SourceError::not_found::<E>(key));
    }

    let take = if E::ALL_ROWS { rows.len() } else { 1 };
    rows.into_iter()
        .take(take)
        .map(|row| {
            let raw: E::Raw =
                serde_json::from_value(row).map_err(|e| SourceError::Decode(e.to_string()))?;
            E::from_raw(raw, key, parsed_at)
        })
        .collect()
}

/// A [`Source`] backed by a JSON HTTP endpoint.
///
/// Uses a blocking client: call it from a plain thread (a dispatcher thread or
/// a blocking task), never directly from async code.
pub struct HttpSource<E> {
    client: Client,
    url: String,
    credentials: Credentials,
    _marker: PhantomData<fn() -> E>,
}

impl<E: SourceRecord> HttpSource<E> {
    pub fn new(url: impl Into<String>, credentials: Credentials) -> Result<Self, SourceError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, url, credentials))
    }

    pub fn with_client(client: Client, url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            client,
            url: url.into(),
            credentials,
            _marker: PhantomData,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl<E: SourceRecord> Source<E> for HttpSource<E> {
    fn fetch(&self, key: &str) -> Result<Vec<E>, SourceError> {
        debug!(kind = E::KIND, key, url = %self.url, "fetching from source");

        let request = self.client.get(&self.url).query(&[(E::PARAM, key)]);
        let response = self
            .credentials
            .apply(request)
            .send()
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let result = interpret_response::<E>(key, status, &body, Utc::now());
        if let Err(err) = &result {
            warn!(kind = E::KIND, key, status, error = %err, "source fetch failed");
        }
        result
    }
}
