//! ParseService - fetch, persist and announce entities of one kind.

use std::sync::Arc;

use tracing::{debug, info};

use crate::bus::{Message, Publisher};
use crate::dispatcher::Handler;
use crate::entity::{LamodaProduct, Stored, Tracked, TwitchGame, TwitchStream, TwitchUser};
use crate::event::{CreatedOrUpdated, DeletedByKey, Envelope, ParseRequested, CAUSATION_ID};
use crate::repository::Repository;
use crate::source::Source;

use super::{ServiceError, Topics};

pub type TwitchUserService = ParseService<TwitchUser>;
pub type TwitchGameService = ParseService<TwitchGame>;
pub type TwitchStreamService = ParseService<TwitchStream>;
pub type LamodaProductService = ParseService<LamodaProduct>;

/// Orchestration service for entity kind `E`.
///
/// Cheap to clone; clones share the repository, source and publisher.
pub struct ParseService<E: Tracked> {
    repository: Arc<dyn Repository<E>>,
    source: Arc<dyn Source<E>>,
    publisher: Arc<dyn Publisher>,
    topics: Topics,
}

impl<E: Tracked> Clone for ParseService<E> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            source: Arc::clone(&self.source),
            publisher: Arc::clone(&self.publisher),
            topics: self.topics.clone(),
        }
    }
}

impl<E: Tracked> ParseService<E> {
    /// A service publishing on the default topics for `E`.
    pub fn new(
        repository: Arc<dyn Repository<E>>,
        source: Arc<dyn Source<E>>,
        publisher: Arc<dyn Publisher>,
    ) -> Self {
        Self {
            repository,
            source,
            publisher,
            topics: Topics::for_kind::<E>(),
        }
    }

    /// Override the topics.
    pub fn with_topics(mut self, topics: Topics) -> Self {
        self.topics = topics;
        self
    }

    pub fn topics(&self) -> &Topics {
        &self.topics
    }

    pub fn repository(&self) -> &Arc<dyn Repository<E>> {
        &self.repository
    }

    // =========================================================================
    // Trigger family
    // =========================================================================

    /// Publish a ParseRequested for `key` and return. No fetch happens here.
    pub fn parse(&self, key: &str) -> Result<(), ServiceError> {
        let event = self.repository.request_parse_event(key);
        let message = Envelope::<E>::from(event).to_message()?;
        let message_id = message.id.clone();

        self.publisher.publish(&self.topics.requests, message)?;
        info!(
            kind = E::KIND,
            key,
            topic = %self.topics.requests,
            message_id = %message_id,
            "parse requested"
        );
        Ok(())
    }

    /// Delete every record under `key` and publish the DeletedByKey event.
    pub fn remove(&self, key: &str) -> Result<DeletedByKey, ServiceError> {
        let event = self.repository.delete_by_key(key)?;
        let message = Envelope::<E>::from(event.clone()).to_message()?;
        self.publisher.publish(&self.topics.results, message)?;
        info!(kind = E::KIND, key, topic = %self.topics.results, "entities removed");
        Ok(event)
    }

    // =========================================================================
    // Execution family
    // =========================================================================

    /// Fetch `key` from the source, persist what came back and publish one
    /// CreatedOrUpdated per persisted entity.
    ///
    /// Source failures are returned unchanged and nothing is written.
    pub fn private_parse(&self, key: &str) -> Result<Vec<Stored<E>>, ServiceError> {
        self.fetch_and_store(key, None)
    }

    /// [`private_parse`](Self::private_parse) on behalf of a delivered request
    /// message; result events carry its id as `causation_id`.
    pub fn private_parse_caused_by(
        &self,
        key: &str,
        causation_id: &str,
    ) -> Result<Vec<Stored<E>>, ServiceError> {
        self.fetch_and_store(key, Some(causation_id))
    }

    fn fetch_and_store(
        &self,
        key: &str,
        causation_id: Option<&str>,
    ) -> Result<Vec<Stored<E>>, ServiceError> {
        let entities = self.source.fetch(key)?;

        let mut stored = Vec::with_capacity(entities.len());
        for entity in entities {
            let (result, event) = self.repository.create_or_update(entity)?.into_parts();
            self.announce(event, causation_id)?;
            stored.push(result);
        }

        info!(kind = E::KIND, key, count = stored.len(), "parsed");
        Ok(stored)
    }

    fn announce(
        &self,
        event: CreatedOrUpdated<E>,
        causation_id: Option<&str>,
    ) -> Result<(), ServiceError> {
        let message: Message = Envelope::from(event).to_message()?;
        let message = match causation_id {
            Some(id) => message.with_metadata(CAUSATION_ID, id),
            None => message,
        };
        debug!(
            kind = E::KIND,
            topic = %self.topics.results,
            message_id = %message.id,
            "publishing created_or_updated"
        );
        self.publisher.publish(&self.topics.results, message)?;
        Ok(())
    }

    // =========================================================================
    // Pass-throughs
    // =========================================================================

    /// Project a stored entity received from elsewhere. No fetch, no publish.
    pub fn create(&self, stored: Stored<E>) -> Result<Stored<E>, ServiceError> {
        Ok(self.repository.restore(stored)?.into_result())
    }

    pub fn delete_by_key(&self, key: &str) -> Result<DeletedByKey, ServiceError> {
        Ok(self.repository.delete_by_key(key)?)
    }

    pub fn get_by_key(&self, key: &str) -> Result<Stored<E>, ServiceError> {
        Ok(self.repository.get_by_key(key)?)
    }

    pub fn find_by_key(&self, key: &str) -> Result<Vec<Stored<E>>, ServiceError> {
        Ok(self.repository.find_by_key(key)?)
    }

    pub fn list_all(&self) -> Result<Vec<Stored<E>>, ServiceError> {
        Ok(self.repository.list_all()?)
    }
}

impl<E: Tracked> Handler<E> for ParseService<E> {
    fn on_parse_requested(
        &self,
        event: ParseRequested,
        message_id: &str,
    ) -> Result<(), ServiceError> {
        self.private_parse_caused_by(&event.key, message_id)
            .map(|_| ())
    }

    fn on_created_or_updated(&self, event: CreatedOrUpdated<E>) -> Result<(), ServiceError> {
        self.create(event.into_stored()).map(|_| ())
    }

    fn on_deleted_by_key(&self, event: DeletedByKey) -> Result<(), ServiceError> {
        self.delete_by_key(&event.key).map(|_| ())
    }
}
