//! Broker-driven parse pipelines.
//!
//! Each tracked entity kind (Twitch users, games and streams, Lamoda products)
//! gets the same pipeline:
//!
//! ```text
//! trigger ─▶ ParseService::parse ─▶ <kind> topic ─▶ Dispatcher
//!        ─▶ ParseService::private_parse ─▶ Source::fetch ─▶ Repository::create_or_update
//!        ─▶ <kind>.results topic ─▶ any Dispatcher following it
//! ```
//!
//! The engine is generic over [`Tracked`]; per-kind glue is a derive on the
//! entity struct plus a [`source::SourceRecord`] impl.

// Lets `#[derive(Tracked)]` expand to `::tlparser::Tracked` inside this crate.
extern crate self as tlparser;

pub mod bus;
pub mod config;
pub mod dispatcher;
pub mod entity;
pub mod event;
#[cfg(feature = "http")]
pub mod http;
pub mod repository;
pub mod runtime;
pub mod service;
pub mod source;
pub mod store;
pub mod telemetry;

pub use bus::{Broker, InMemoryBroker, Message, PublishError, Publisher, Subscriber};
pub use config::Config;
pub use dispatcher::{
    DispatchOutcome, Dispatcher, DispatcherHandle, DispatcherState, DispatcherStats, Handler,
};
pub use entity::{LamodaProduct, Stored, Tracked, TwitchGame, TwitchStream, TwitchUser};
pub use event::{
    CreatedOrUpdated, DeletedByKey, Envelope, EnvelopeError, EventType, ParseRequested,
    ResultWithEvent,
};
pub use repository::{KeyedRepository, Repository};
pub use runtime::{Pipeline, Runtime, Services, Sources};
pub use service::{
    LamodaProductService, ParseService, ServiceError, Topics, TwitchGameService,
    TwitchStreamService, TwitchUserService,
};
pub use source::{HttpSource, Source, SourceError, StaticSource};
pub use store::{DocumentStore, InMemoryDocumentStore, StoreError};

// Derive macro for entity kinds
pub use tlparser_macros::Tracked;
