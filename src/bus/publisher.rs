//! Publishing side of the bus.

use thiserror::Error;

use super::Message;

/// Error type for broker operations.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Connection to the broker failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    /// Serialization of the message failed
    #[error("serialization failed: {0}")]
    SerializationFailed(String),
    /// The broker rejected the message
    #[error("message rejected: {0}")]
    Rejected(String),
    /// Timeout waiting for acknowledgment
    #[error("publish timeout")]
    Timeout,
    /// Other error
    #[error("publish error: {0}")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<bitcode::Error> for PublishError {
    fn from(err: bitcode::Error) -> Self {
        PublishError::SerializationFailed(err.to_string())
    }
}

/// Trait for publishing messages to a broker topic.
pub trait Publisher: Send + Sync {
    /// Publish a single message to `topic`.
    fn publish(&self, topic: &str, message: Message) -> Result<(), PublishError>;

    /// Publish multiple messages to `topic`, preserving order.
    ///
    /// Default implementation publishes messages sequentially.
    fn publish_batch(&self, topic: &str, messages: Vec<Message>) -> Result<(), PublishError> {
        for message in messages {
            self.publish(topic, message)?;
        }
        Ok(())
    }
}

impl<P: Publisher + ?Sized> Publisher for std::sync::Arc<P> {
    fn publish(&self, topic: &str, message: Message) -> Result<(), PublishError> {
        (**self).publish(topic, message)
    }

    fn publish_batch(&self, topic: &str, messages: Vec<Message>) -> Result<(), PublishError> {
        (**self).publish_batch(topic, messages)
    }
}
