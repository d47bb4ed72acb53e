//! StaticSource - canned responses for tests and local development.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::Utc;

use crate::entity::Tracked;

use super::{Source, SourceError};

/// A [`Source`] answering from a fixed table of keys.
///
/// Unknown keys are `NotFound`. Every call is recorded. Clones share state.
/// Like a live source, every answer is stamped with the fetch time.
#[derive(Clone)]
pub struct StaticSource<E> {
    responses: Arc<RwLock<HashMap<String, Result<Vec<E>, SourceError>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl<E: Tracked> Default for StaticSource<E> {
    fn default() -> Self {
        Self {
            responses: Arc::new(RwLock::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<E: Tracked> StaticSource<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `entity` for its own request key.
    pub fn with(self, entity: E) -> Self {
        self.respond(entity.key().to_string(), Ok(vec![entity]));
        self
    }

    /// Answer all `entities` for `key`.
    pub fn with_all(self, key: impl Into<String>, entities: Vec<E>) -> Self {
        self.respond(key.into(), Ok(entities));
        self
    }

    /// Fail every fetch of `key` with `error`.
    pub fn failing(self, key: impl Into<String>, error: SourceError) -> Self {
        self.respond(key.into(), Err(error));
        self
    }

    /// Replace the response for `key`.
    pub fn respond(&self, key: String, response: Result<Vec<E>, SourceError>) {
        self.responses
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, response);
    }

    /// Keys fetched so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl<E: Tracked> Source<E> for StaticSource<E> {
    fn fetch(&self, key: &str) -> Result<Vec<E>, SourceError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(key.to_string());

        let responses = self.responses.read().unwrap_or_else(|e| e.into_inner());
        match responses.get(key) {
            Some(Ok(entities)) if !entities.is_empty() => {
                let parsed_at = Utc::now();
                Ok(entities
                    .iter()
                    .cloned()
                    .map(|mut entity| {
                        entity.stamp_parsed_at(parsed_at);
                        entity
                    })
                    .collect())
            }
            Some(Ok(_)) | None => Err(SourceError::not_found::<E>(key)),
            Some(Err(err)) => Err(err.clone()),
        }
    }
}
