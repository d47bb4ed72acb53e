//! A broker combines publishing with the ability to open subscriptions.

use super::{PublishError, Publisher, Subscriber};

/// A message broker: publish to topics, subscribe to topics.
///
/// Brokers are cheap handles (`Clone`) so each dispatcher thread can own one.
pub trait Broker: Publisher + Clone + 'static {
    type Subscription: Subscriber + 'static;

    /// Open a subscription to `topic`. Only messages published after the
    /// subscription exists are guaranteed to be delivered to it.
    fn subscribe(&self, topic: &str) -> Result<Self::Subscription, PublishError>;
}
