//! Message bus - broker-facing abstractions for the parse pipelines.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │   ParseService (trigger path)      ParseService (results)     │
//! │            │ publish(topic, msg)          │                   │
//! └────────────┼──────────────────────────────┼───────────────────┘
//!              ▼                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                  Broker: Publisher + subscribe                │
//! │   Publisher: publish(topic, message)                          │
//! │   Subscriber: poll(timeout) / ack(id) / nack(id)              │
//! └──────────────────────────────────────────────────────────────┘
//!          │                     │                      │
//!          ▼                     ▼                      ▼
//! ┌────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │ InMemoryBroker │    │  Kafka broker   │    │  other brokers  │
//! │  (included)    │    │   (external)    │    │   (external)    │
//! └────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! Every subscription sees every message published to its topic after the
//! subscription's starting point (fan-out). Dispatchers poll one subscription
//! each and process messages strictly in delivery order.

mod broker;
mod in_memory;
mod message;
mod publisher;
mod subscriber;

pub use broker::Broker;
pub use in_memory::{InMemoryBroker, TopicSubscriber};
pub use message::Message;
pub use publisher::{PublishError, Publisher};
pub use subscriber::Subscriber;
