//! Orchestration - one `ParseService` per entity kind.
//!
//! A service composes a [`Source`](crate::source::Source), a
//! [`Repository`](crate::repository::Repository) and a
//! [`Publisher`](crate::bus::Publisher):
//!
//! ```text
//!  parse(key)          ── ParseRequested ──▶ requests topic
//!  private_parse(key)  ── fetch ─▶ create_or_update ─▶ CreatedOrUpdated ──▶ results topic
//!  remove(key)         ── delete_by_key ─▶ DeletedByKey ──▶ results topic
//!  create / delete_by_key / get_by_key / find_by_key / list_all  (pass-through)
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use tlparser::{InMemoryBroker, InMemoryDocumentStore, KeyedRepository, ParseService, TwitchGame};
//! use tlparser::source::StaticSource;
//!
//! let broker = InMemoryBroker::new();
//! let service = ParseService::<TwitchGame>::new(
//!     Arc::new(KeyedRepository::<TwitchGame>::new(InMemoryDocumentStore::new())),
//!     Arc::new(StaticSource::<TwitchGame>::new()),
//!     Arc::new(broker.clone()),
//! );
//!
//! service.parse("Fortnite").unwrap();
//! assert_eq!(broker.event_types("twitch_game"), vec!["twitch_game.parse_requested"]);
//! ```

mod error;
mod parse_service;
mod topics;

pub use error::ServiceError;
pub use parse_service::{
    LamodaProductService, ParseService, TwitchGameService, TwitchStreamService,
    TwitchUserService,
};
pub use topics::Topics;
