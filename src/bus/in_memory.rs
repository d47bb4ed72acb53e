//! In-memory broker for testing and single-process deployments.
//!
//! Topics are append-only logs. Each subscription keeps its own read
//! position, so two subscriptions to the same topic both see every message.
//! A broker built with [`InMemoryBroker::with_retention`] keeps only the most
//! recent messages of each topic; a subscription that falls behind the
//! retained window skips to its start.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use tracing::warn;

use super::{Broker, Message, PublishError, Publisher, Subscriber};

/// The retained messages of one topic.
#[derive(Default)]
struct TopicLog {
    /// Absolute position of `messages[0]`.
    base: usize,
    messages: VecDeque<Message>,
}

impl TopicLog {
    fn push(&mut self, message: Message, retention: Option<usize>) {
        self.messages.push_back(message);
        if let Some(limit) = retention {
            while self.messages.len() > limit {
                self.messages.pop_front();
                self.base += 1;
            }
        }
    }
}

type Topics = Arc<RwLock<HashMap<String, TopicLog>>>;

/// Acknowledgement records, capped like the topic logs.
#[derive(Default)]
struct Receipts<T> {
    entries: Mutex<VecDeque<T>>,
}

impl<T: Clone> Receipts<T> {
    fn record(&self, entry: T, retention: Option<usize>) -> Result<(), PublishError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| PublishError::ConnectionFailed("broker lock poisoned".into()))?;
        entries.push_back(entry);
        if let Some(limit) = retention {
            while entries.len() > limit {
                entries.pop_front();
            }
        }
        Ok(())
    }

    fn snapshot(&self) -> Vec<T> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    fn clear(&self) {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

/// In-memory broker.
///
/// Features:
/// - Thread-safe (can be shared across threads via `Clone`)
/// - One log per topic, created on first publish or subscribe
/// - Any number of independent subscriptions per topic
/// - Acknowledgements are recorded for inspection
/// - Optional per-topic retention bounding memory use
///
/// ## Example
///
/// ```
/// use tlparser::bus::{Broker, InMemoryBroker, Message, Publisher, Subscriber};
///
/// let broker = InMemoryBroker::new();
/// let subscription = broker.subscribe("twitch_user").unwrap();
///
/// broker
///     .publish("twitch_user", Message::with_string_payload("m-1", "ping", "{}"))
///     .unwrap();
///
/// let message = subscription.poll(100).unwrap().unwrap();
/// assert_eq!(message.event_type, "ping");
/// ```
#[derive(Clone, Default)]
pub struct InMemoryBroker {
    topics: Topics,
    retention: Option<usize>,
    acked: Arc<Receipts<String>>,
    nacked: Arc<Receipts<(String, String)>>,
}

impl InMemoryBroker {
    /// Create a new broker with no topics. Nothing is ever dropped.
    pub fn new() -> Self {
        Self::default()
    }

    /// A broker keeping at most `limit` messages per topic, and at most
    /// `limit` acknowledgement records of each kind. Oldest go first.
    pub fn with_retention(limit: usize) -> Self {
        Self {
            retention: Some(limit.max(1)),
            ..Self::default()
        }
    }

    /// Retained messages of `topic`, in publish order.
    pub fn messages(&self, topic: &str) -> Vec<Message> {
        let topics = self.topics.read().unwrap_or_else(|e| e.into_inner());
        topics
            .get(topic)
            .map(|log| log.messages.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Event types of the retained messages of `topic`, in publish order.
    pub fn event_types(&self, topic: &str) -> Vec<String> {
        self.messages(topic)
            .into_iter()
            .map(|m| m.event_type)
            .collect()
    }

    /// Number of retained messages in `topic`.
    pub fn len(&self, topic: &str) -> usize {
        let topics = self.topics.read().unwrap_or_else(|e| e.into_inner());
        topics.get(topic).map(|log| log.messages.len()).unwrap_or(0)
    }

    /// Whether `topic` has no retained messages.
    pub fn is_empty(&self, topic: &str) -> bool {
        self.len(topic) == 0
    }

    /// Ids acknowledged by any subscription, in acknowledgement order.
    pub fn acknowledged(&self) -> Vec<String> {
        self.acked.snapshot()
    }

    /// `(id, reason)` pairs rejected by any subscription.
    pub fn rejected(&self) -> Vec<(String, String)> {
        self.nacked.snapshot()
    }

    /// Drop every topic and acknowledgement.
    pub fn clear(&self) {
        self.topics
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        self.acked.clear();
        self.nacked.clear();
    }
}

impl Publisher for InMemoryBroker {
    fn publish(&self, topic: &str, message: Message) -> Result<(), PublishError> {
        self.publish_batch(topic, vec![message])
    }

    fn publish_batch(&self, topic: &str, messages: Vec<Message>) -> Result<(), PublishError> {
        let mut topics = self
            .topics
            .write()
            .map_err(|_| PublishError::ConnectionFailed("broker lock poisoned".into()))?;
        let log = topics.entry(topic.to_string()).or_default();
        for message in messages {
            log.push(message, self.retention);
        }
        Ok(())
    }
}

impl Broker for InMemoryBroker {
    type Subscription = TopicSubscriber;

    fn subscribe(&self, topic: &str) -> Result<TopicSubscriber, PublishError> {
        self.topics
            .write()
            .map_err(|_| PublishError::ConnectionFailed("broker lock poisoned".into()))?
            .entry(topic.to_string())
            .or_default();

        Ok(TopicSubscriber {
            topic: topic.to_string(),
            topics: Arc::clone(&self.topics),
            retention: self.retention,
            position: Arc::new(Mutex::new(0)),
            acked: Arc::clone(&self.acked),
            nacked: Arc::clone(&self.nacked),
        })
    }
}

/// A subscription to one topic of an [`InMemoryBroker`].
///
/// Starts reading at the oldest retained message of the topic.
#[derive(Clone)]
pub struct TopicSubscriber {
    topic: String,
    topics: Topics,
    retention: Option<usize>,
    position: Arc<Mutex<usize>>,
    acked: Arc<Receipts<String>>,
    nacked: Arc<Receipts<(String, String)>>,
}

impl TopicSubscriber {
    /// The subscribed topic.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Absolute position of the next message this subscription will read.
    pub fn current_position(&self) -> usize {
        *self.position.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn next_message(&self) -> Result<Option<Message>, PublishError> {
        let topics = self
            .topics
            .read()
            .map_err(|_| PublishError::ConnectionFailed("broker lock poisoned".into()))?;
        let mut position = self
            .position
            .lock()
            .map_err(|_| PublishError::ConnectionFailed("subscriber lock poisoned".into()))?;

        let Some(log) = topics.get(&self.topic) else {
            return Ok(None);
        };
        if *position < log.base {
            warn!(
                topic = %self.topic,
                skipped = log.base - *position,
                "subscription fell behind retention"
            );
            *position = log.base;
        }

        let message = log.messages.get(*position - log.base).cloned();
        if message.is_some() {
            *position += 1;
        }
        Ok(message)
    }
}

impl Subscriber for TopicSubscriber {
    fn poll(&self, timeout_ms: u64) -> Result<Option<Message>, PublishError> {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);

        loop {
            if let Some(message) = self.next_message()? {
                return Ok(Some(message));
            }

            if Instant::now() >= deadline {
                return Ok(None);
            }

            // Small sleep to avoid busy-waiting
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    fn ack(&self, message_id: &str) -> Result<(), PublishError> {
        self.acked.record(message_id.to_string(), self.retention)
    }

    fn nack(&self, message_id: &str, reason: &str) -> Result<(), PublishError> {
        // No redelivery in memory; the message stays in the log
        self.nacked
            .record((message_id.to_string(), reason.to_string()), self.retention)
    }
}
