//! Entities - the tracked domain records and their persisted form.
//!
//! An entity is a plain value built by a source from fetched data. It has no
//! store identity until a repository persists it, at which point it is wrapped
//! in [`Stored`] together with the store-assigned id.
//!
//! ## Example
//!
//! ```ignore
//! use tlparser::Tracked;
//!
//! #[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Tracked)]
//! #[tracked(kind = "twitch_game", collection = "twitch_games")]
//! pub struct TwitchGame {
//!     pub game_id: String,
//!     #[tracked(key)]
//!     pub name: String,
//!     #[tracked(parsed_at)]
//!     pub parsed_at: DateTime<Utc>,
//! }
//! ```

mod lamoda;
mod twitch;

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

pub use lamoda::LamodaProduct;
pub use twitch::{TwitchGame, TwitchStream, TwitchUser};

/// A tracked entity kind.
///
/// Usually derived with `#[derive(Tracked)]`.
pub trait Tracked:
    Serialize + DeserializeOwned + Clone + Debug + PartialEq + Send + Sync + 'static
{
    /// Stable kind name, used as event type prefix and default topic name.
    const KIND: &'static str;

    /// Store collection holding this kind.
    const COLLECTION: &'static str;

    /// Request key: what parse requests, deletes and lookups are addressed by.
    fn key(&self) -> &str;

    /// Identity key: unique per kind in the store; create-or-update matches on it.
    fn identity(&self) -> String;

    /// Record when this entity was fetched. Kinds without a
    /// `#[tracked(parsed_at)]` field ignore it.
    fn stamp_parsed_at(&mut self, _at: Timestamp) {}
}

/// Canonical timestamp of every entity field.
pub type Timestamp = DateTime<Utc>;

/// Join identity parts with `:`.
///
/// `\` and `:` inside a part are backslash-escaped, so different parts never
/// produce the same identity.
pub fn join_identity(parts: &[String]) -> String {
    let mut identity = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            identity.push(':');
        }
        for ch in part.chars() {
            if ch == '\\' || ch == ':' {
                identity.push('\\');
            }
            identity.push(ch);
        }
    }
    identity
}

/// An entity together with its store-assigned id.
///
/// This is also the external representation handed out by the services.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stored<E> {
    pub id: String,
    pub entity: E,
}

impl<E: Tracked> Stored<E> {
    pub fn new(id: impl Into<String>, entity: E) -> Self {
        Self {
            id: id.into(),
            entity,
        }
    }

    pub fn key(&self) -> &str {
        self.entity.key()
    }

    pub fn identity(&self) -> String {
        self.entity.identity()
    }

    pub fn into_entity(self) -> E {
        self.entity
    }
}
