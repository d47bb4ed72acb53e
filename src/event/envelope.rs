//! Envelope types and the tagged decode step at the broker boundary.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bus::Message;
use crate::entity::{Stored, Tracked};

/// Metadata key carrying the entity kind of an envelope.
pub const KIND: &str = "kind";

/// Metadata key carrying the id of the message that caused this one.
pub const CAUSATION_ID: &str = "causation_id";

/// The declared type of an envelope, independent of kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    ParseRequested,
    CreatedOrUpdated,
    DeletedByKey,
}

impl EventType {
    pub const ALL: [EventType; 3] = [
        EventType::ParseRequested,
        EventType::CreatedOrUpdated,
        EventType::DeletedByKey,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            EventType::ParseRequested => "parse_requested",
            EventType::CreatedOrUpdated => "created_or_updated",
            EventType::DeletedByKey => "deleted_by_key",
        }
    }

    /// The wire tag of this type for kind `E`, e.g. `twitch_user.parse_requested`.
    pub fn tag<E: Tracked>(self) -> String {
        format!("{}.{}", E::KIND, self.suffix())
    }

    /// Classify a wire tag for kind `E`. Tags of other kinds or unknown
    /// suffixes yield `None`.
    pub fn classify<E: Tracked>(tag: &str) -> Option<Self> {
        let suffix = tag.strip_prefix(E::KIND)?.strip_prefix('.')?;
        Self::ALL.into_iter().find(|t| t.suffix() == suffix)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Someone asked for the entity under `key` to be fetched and stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseRequested {
    pub key: String,
}

impl ParseRequested {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// An entity was inserted or overwritten; carries its full post-write state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreatedOrUpdated<E> {
    pub id: String,
    pub entity: E,
}

impl<E: Tracked> CreatedOrUpdated<E> {
    pub fn from_stored(stored: &Stored<E>) -> Self {
        Self {
            id: stored.id.clone(),
            entity: stored.entity.clone(),
        }
    }

    pub fn into_stored(self) -> Stored<E> {
        Stored::new(self.id, self.entity)
    }
}

/// Every record under `key` was removed (possibly none).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedByKey {
    pub key: String,
}

impl DeletedByKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// Error raised at the envelope boundary.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The tag was recognized but the payload could not be decoded.
    #[error("malformed {event_type} message {id}: {reason}")]
    Malformed {
        id: String,
        event_type: String,
        reason: String,
    },
    /// The envelope could not be serialized.
    #[error("failed to encode {event_type}: {reason}")]
    Encode { event_type: String, reason: String },
}

/// A decoded envelope for kind `E`.
#[derive(Clone, Debug, PartialEq)]
pub enum Envelope<E> {
    ParseRequested(ParseRequested),
    CreatedOrUpdated(CreatedOrUpdated<E>),
    DeletedByKey(DeletedByKey),
}

impl<E: Tracked> Envelope<E> {
    pub fn event_type(&self) -> EventType {
        match self {
            Envelope::ParseRequested(_) => EventType::ParseRequested,
            Envelope::CreatedOrUpdated(_) => EventType::CreatedOrUpdated,
            Envelope::DeletedByKey(_) => EventType::DeletedByKey,
        }
    }

    /// The request key the envelope is about.
    pub fn key(&self) -> &str {
        match self {
            Envelope::ParseRequested(event) => &event.key,
            Envelope::CreatedOrUpdated(event) => event.entity.key(),
            Envelope::DeletedByKey(event) => &event.key,
        }
    }

    /// Serialize into a bus message with a fresh id.
    pub fn to_message(&self) -> Result<Message, EnvelopeError> {
        let tag = self.event_type().tag::<E>();
        let encoded = match self {
            Envelope::ParseRequested(event) => Message::encode(tag.clone(), event),
            Envelope::CreatedOrUpdated(event) => Message::encode(tag.clone(), event),
            Envelope::DeletedByKey(event) => Message::encode(tag.clone(), event),
        };

        encoded
            .map(|message| message.with_metadata(KIND, E::KIND))
            .map_err(|e| EnvelopeError::Encode {
                event_type: tag,
                reason: e.to_string(),
            })
    }

    /// Tagged decode of a bus message.
    ///
    /// Returns `Ok(None)` for tags that are not an envelope of kind `E`
    /// (unroutable, not an error) and `Err(Malformed)` when the tag is known
    /// but the payload does not decode.
    pub fn from_message(message: &Message) -> Result<Option<Self>, EnvelopeError> {
        let Some(event_type) = EventType::classify::<E>(&message.event_type) else {
            return Ok(None);
        };

        let decoded = match event_type {
            EventType::ParseRequested => message.decode().map(Envelope::ParseRequested),
            EventType::CreatedOrUpdated => message.decode().map(Envelope::CreatedOrUpdated),
            EventType::DeletedByKey => message.decode().map(Envelope::DeletedByKey),
        };

        decoded.map(Some).map_err(|e| EnvelopeError::Malformed {
            id: message.id.clone(),
            event_type: message.event_type.clone(),
            reason: e.to_string(),
        })
    }
}

impl<E> From<ParseRequested> for Envelope<E> {
    fn from(event: ParseRequested) -> Self {
        Envelope::ParseRequested(event)
    }
}

impl<E> From<CreatedOrUpdated<E>> for Envelope<E> {
    fn from(event: CreatedOrUpdated<E>) -> Self {
        Envelope::CreatedOrUpdated(event)
    }
}

impl<E> From<DeletedByKey> for Envelope<E> {
    fn from(event: DeletedByKey) -> Self {
        Envelope::DeletedByKey(event)
    }
}
