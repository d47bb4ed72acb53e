//! Process wiring: services, dispatchers and their lifecycle.
//!
//! Nothing starts consuming on construction. [`Pipeline::start`] and
//! [`Pipeline::follow`] spawn dispatchers explicitly, and the owner stops
//! them with [`Pipeline::shutdown`] / [`Runtime::shutdown`].

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::bus::{Broker, InMemoryBroker, Publisher};
use crate::config::Config;
use crate::dispatcher::{Dispatcher, DispatcherHandle, DispatcherStats};
use crate::entity::{LamodaProduct, Tracked, TwitchGame, TwitchStream, TwitchUser};
use crate::repository::KeyedRepository;
use crate::service::{
    LamodaProductService, ParseService, TwitchGameService, TwitchStreamService,
    TwitchUserService,
};
use crate::source::{HttpSource, Source, SourceError};
use crate::store::DocumentStore;

/// One service and the dispatchers feeding it.
pub struct Pipeline<E: Tracked, B: Broker = InMemoryBroker> {
    service: ParseService<E>,
    broker: B,
    poll_interval: Duration,
    dispatchers: Vec<DispatcherHandle>,
}

impl<E: Tracked, B: Broker> Pipeline<E, B> {
    /// Start a dispatcher on the service's request topic.
    pub fn start(service: ParseService<E>, broker: B, poll_interval: Duration) -> Self {
        let mut pipeline = Self {
            service,
            broker,
            poll_interval,
            dispatchers: Vec::new(),
        };
        let requests = pipeline.service.topics().requests.clone();
        pipeline.follow(&requests);
        pipeline
    }

    /// Add a dispatcher applying envelopes from `topic` to this service,
    /// e.g. another pipeline's result topic.
    pub fn follow(&mut self, topic: &str) -> &mut Self {
        let handle = Dispatcher::<E, _>::new(topic, self.service.clone())
            .start(self.broker.clone(), self.poll_interval);
        info!(kind = E::KIND, topic, "dispatcher started");
        self.dispatchers.push(handle);
        self
    }

    pub fn service(&self) -> &ParseService<E> {
        &self.service
    }

    pub fn dispatchers(&self) -> &[DispatcherHandle] {
        &self.dispatchers
    }

    /// Whether every dispatcher has opened its subscription within `timeout`.
    pub fn wait_until_consuming(&self, timeout: Duration) -> bool {
        self.dispatchers
            .iter()
            .all(|d| d.wait_until_consuming(timeout))
    }

    /// Stop every dispatcher. Returns `(topic, stats)` per dispatcher.
    pub fn shutdown(self) -> Vec<(String, DispatcherStats)> {
        self.dispatchers
            .into_iter()
            .map(|d| {
                let topic = d.topic().to_string();
                (topic, d.stop())
            })
            .collect()
    }
}

/// Where each kind fetches from.
pub struct Sources {
    pub users: Arc<dyn Source<TwitchUser>>,
    pub games: Arc<dyn Source<TwitchGame>>,
    pub streams: Arc<dyn Source<TwitchStream>>,
    pub products: Arc<dyn Source<LamodaProduct>>,
}

impl Sources {
    /// HTTP sources for every kind, as configured.
    pub fn http(config: &Config) -> Result<Self, SourceError> {
        let credentials = config.twitch_credentials();
        Ok(Self {
            users: Arc::new(HttpSource::<TwitchUser>::new(
                &config.twitch_users_url,
                credentials.clone(),
            )?),
            games: Arc::new(HttpSource::<TwitchGame>::new(
                &config.twitch_games_url,
                credentials.clone(),
            )?),
            streams: Arc::new(HttpSource::<TwitchStream>::new(
                &config.twitch_streams_url,
                credentials,
            )?),
            products: Arc::new(HttpSource::<LamodaProduct>::new(
                &config.lamoda_products_url,
                Default::default(),
            )?),
        })
    }
}

/// The services of every kind; what the HTTP boundary serves.
#[derive(Clone)]
pub struct Services {
    pub users: TwitchUserService,
    pub games: TwitchGameService,
    pub streams: TwitchStreamService,
    pub products: LamodaProductService,
}

/// All four pipelines over one broker and one store.
pub struct Runtime<B: Broker = InMemoryBroker> {
    pub users: Pipeline<TwitchUser, B>,
    pub games: Pipeline<TwitchGame, B>,
    pub streams: Pipeline<TwitchStream, B>,
    pub products: Pipeline<LamodaProduct, B>,
}

impl<B: Broker> Runtime<B> {
    /// Build HTTP sources from `config` and start every pipeline.
    pub fn start<S>(config: &Config, broker: B, store: S) -> anyhow::Result<Self>
    where
        S: DocumentStore + Clone + 'static,
    {
        let sources = Sources::http(config)?;
        Ok(Self::with_sources(sources, broker, store, config.poll_interval))
    }

    /// Start every pipeline with the given sources.
    pub fn with_sources<S>(sources: Sources, broker: B, store: S, poll_interval: Duration) -> Self
    where
        S: DocumentStore + Clone + 'static,
    {
        let publisher: Arc<dyn Publisher> = Arc::new(broker.clone());

        let runtime = Self {
            users: Pipeline::start(
                ParseService::new(
                    Arc::new(KeyedRepository::<TwitchUser, S>::new(store.clone())),
                    sources.users,
                    publisher.clone(),
                ),
                broker.clone(),
                poll_interval,
            ),
            games: Pipeline::start(
                ParseService::new(
                    Arc::new(KeyedRepository::<TwitchGame, S>::new(store.clone())),
                    sources.games,
                    publisher.clone(),
                ),
                broker.clone(),
                poll_interval,
            ),
            streams: Pipeline::start(
                ParseService::new(
                    Arc::new(KeyedRepository::<TwitchStream, S>::new(store.clone())),
                    sources.streams,
                    publisher.clone(),
                ),
                broker.clone(),
                poll_interval,
            ),
            products: Pipeline::start(
                ParseService::new(
                    Arc::new(KeyedRepository::<LamodaProduct, S>::new(store)),
                    sources.products,
                    publisher,
                ),
                broker,
                poll_interval,
            ),
        };

        info!("runtime started");
        runtime
    }

    pub fn services(&self) -> Services {
        Services {
            users: self.users.service().clone(),
            games: self.games.service().clone(),
            streams: self.streams.service().clone(),
            products: self.products.service().clone(),
        }
    }

    pub fn wait_until_consuming(&self, timeout: Duration) -> bool {
        self.users.wait_until_consuming(timeout)
            && self.games.wait_until_consuming(timeout)
            && self.streams.wait_until_consuming(timeout)
            && self.products.wait_until_consuming(timeout)
    }

    /// Stop every dispatcher. Returns `(topic, stats)` per dispatcher.
    pub fn shutdown(self) -> Vec<(String, DispatcherStats)> {
        let mut stats = self.users.shutdown();
        stats.extend(self.games.shutdown());
        stats.extend(self.streams.shutdown());
        stats.extend(self.products.shutdown());
        info!("runtime stopped");
        stats
    }
}
