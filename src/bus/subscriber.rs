//! Consuming side of the bus.

use super::{Message, PublishError};

/// A pull-based subscription to one topic.
pub trait Subscriber: Send + Sync {
    /// Poll for the next message, blocking until one is available or timeout.
    fn poll(&self, timeout_ms: u64) -> Result<Option<Message>, PublishError>;

    /// Acknowledge that a message has been consumed.
    fn ack(&self, message_id: &str) -> Result<(), PublishError>;

    /// Reject a message (redelivered or dead-lettered, broker permitting).
    fn nack(&self, message_id: &str, reason: &str) -> Result<(), PublishError>;
}
