//! Dispatcher - the broker-consumer loop routing envelopes to a handler.
//!
//! One dispatcher consumes one topic for one entity kind. Each message goes
//! through a tagged decode ([`Envelope::from_message`]) and is routed by its
//! declared type:
//!
//! | Type tag                      | Handler call              |
//! |-------------------------------|---------------------------|
//! | `<kind>.parse_requested`      | `on_parse_requested`      |
//! | `<kind>.created_or_updated`   | `on_created_or_updated`   |
//! | `<kind>.deleted_by_key`       | `on_deleted_by_key`       |
//! | anything else                 | nothing (unroutable)      |
//!
//! Messages are processed strictly one after another. Handler failures and
//! undecodable payloads are logged, counted and acknowledged; the loop keeps
//! going.
//!
//! [`Envelope::from_message`]: crate::event::Envelope::from_message

mod engine;
mod handle;

use std::sync::Arc;

use crate::entity::Tracked;
use crate::event::{CreatedOrUpdated, DeletedByKey, ParseRequested};
use crate::service::ServiceError;

pub use engine::{DispatchOutcome, Dispatcher};
pub use handle::{DispatcherHandle, DispatcherState, DispatcherStats};

/// Receives routed envelopes of kind `E`.
pub trait Handler<E: Tracked>: Send + Sync {
    /// `message_id` is the id of the delivered request message.
    fn on_parse_requested(&self, event: ParseRequested, message_id: &str)
        -> Result<(), ServiceError>;

    fn on_created_or_updated(&self, event: CreatedOrUpdated<E>) -> Result<(), ServiceError>;

    fn on_deleted_by_key(&self, event: DeletedByKey) -> Result<(), ServiceError>;
}

impl<E: Tracked, H: Handler<E> + ?Sized> Handler<E> for Arc<H> {
    fn on_parse_requested(
        &self,
        event: ParseRequested,
        message_id: &str,
    ) -> Result<(), ServiceError> {
        (**self).on_parse_requested(event, message_id)
    }

    fn on_created_or_updated(&self, event: CreatedOrUpdated<E>) -> Result<(), ServiceError> {
        (**self).on_created_or_updated(event)
    }

    fn on_deleted_by_key(&self, event: DeletedByKey) -> Result<(), ServiceError> {
        (**self).on_deleted_by_key(event)
    }
}
