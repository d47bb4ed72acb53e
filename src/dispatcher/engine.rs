//! Routing of single messages and the background consumption loop.

use std::any::Any;
use std::marker::PhantomData;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{channel, TryRecvError};
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::bus::{Broker, Message, Subscriber};
use crate::entity::Tracked;
use crate::event::{Envelope, EventType};

use super::handle::{DispatcherHandle, DispatcherState, DispatcherStats, SharedState};
use super::Handler;

/// What happened to one message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Routed; the handler succeeded.
    Handled(EventType),
    /// Routed; the handler failed or panicked. The failure was logged.
    Failed(EventType),
    /// Known tag, undecodable payload. Dropped.
    Malformed,
    /// Unknown tag. Ignored.
    Unroutable,
}

/// Routes messages from one topic to a [`Handler`] for entity kind `E`.
///
/// ## Example
///
/// ```
/// use std::time::Duration;
/// use tlparser::bus::{InMemoryBroker, Message};
/// use tlparser::dispatcher::{DispatchOutcome, Dispatcher, Handler};
/// use tlparser::event::{CreatedOrUpdated, DeletedByKey, ParseRequested};
/// use tlparser::{ServiceError, TwitchUser};
///
/// struct Noop;
///
/// impl Handler<TwitchUser> for Noop {
///     fn on_parse_requested(&self, _: ParseRequested, _: &str) -> Result<(), ServiceError> { Ok(()) }
///     fn on_created_or_updated(&self, _: CreatedOrUpdated<TwitchUser>) -> Result<(), ServiceError> { Ok(()) }
///     fn on_deleted_by_key(&self, _: DeletedByKey) -> Result<(), ServiceError> { Ok(()) }
/// }
///
/// let dispatcher = Dispatcher::<TwitchUser, _>::new("twitch_user", Noop);
/// let unknown = Message::with_string_payload("m-1", "twitch_user.renamed", "");
/// assert_eq!(dispatcher.dispatch(&unknown), DispatchOutcome::Unroutable);
///
/// let broker = InMemoryBroker::new();
/// let handle = dispatcher.start(broker, Duration::from_millis(10));
/// assert!(handle.wait_until_consuming(Duration::from_secs(1)));
/// handle.stop();
/// ```
pub struct Dispatcher<E, H> {
    topic: String,
    handler: H,
    _marker: PhantomData<fn() -> E>,
}

impl<E: Tracked, H: Handler<E>> Dispatcher<E, H> {
    pub fn new(topic: impl Into<String>, handler: H) -> Self {
        Self {
            topic: topic.into(),
            handler,
            _marker: PhantomData,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Decode and route one message.
    pub fn dispatch(&self, message: &Message) -> DispatchOutcome {
        let envelope = match Envelope::<E>::from_message(message) {
            Ok(Some(envelope)) => envelope,
            Ok(None) => {
                debug!(
                    kind = E::KIND,
                    topic = %self.topic,
                    message_id = %message.id,
                    event_type = %message.event_type,
                    "ignoring unroutable message"
                );
                return DispatchOutcome::Unroutable;
            }
            Err(err) => {
                warn!(
                    kind = E::KIND,
                    topic = %self.topic,
                    message_id = %message.id,
                    error = %err,
                    "dropping malformed message"
                );
                return DispatchOutcome::Malformed;
            }
        };

        let event_type = envelope.event_type();
        let key = envelope.key().to_string();
        // A panicking handler must not take the consuming thread down with it
        let result = catch_unwind(AssertUnwindSafe(|| match envelope {
            Envelope::ParseRequested(event) => {
                self.handler.on_parse_requested(event, &message.id)
            }
            Envelope::CreatedOrUpdated(event) => self.handler.on_created_or_updated(event),
            Envelope::DeletedByKey(event) => self.handler.on_deleted_by_key(event),
        }));

        match result {
            Ok(Ok(())) => {
                debug!(
                    kind = E::KIND,
                    key = %key,
                    message_id = %message.id,
                    event_type = %event_type,
                    "message handled"
                );
                DispatchOutcome::Handled(event_type)
            }
            Ok(Err(err)) => {
                error!(
                    kind = E::KIND,
                    key = %key,
                    message_id = %message.id,
                    event_type = %event_type,
                    error = %err,
                    "handler failed"
                );
                DispatchOutcome::Failed(event_type)
            }
            Err(panic) => {
                error!(
                    kind = E::KIND,
                    key = %key,
                    message_id = %message.id,
                    event_type = %event_type,
                    panic = %panic_message(panic.as_ref()),
                    "handler panicked"
                );
                DispatchOutcome::Failed(event_type)
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl<E: Tracked, H: Handler<E> + 'static> Dispatcher<E, H> {
    /// Subscribe to the topic on a background thread and consume until stopped.
    ///
    /// The returned handle reports `Starting` until the subscription is open.
    /// If subscribing fails the thread exits and the handle reports `Stopped`.
    pub fn start<B: Broker>(self, broker: B, poll_interval: Duration) -> DispatcherHandle {
        let (stop_tx, stop_rx) = channel();
        let state = SharedState::default();
        let topic = self.topic.clone();
        let thread_state = state.clone();

        let handle = thread::spawn(move || {
            let _stopped = thread_state.stopped_on_exit();
            let mut stats = DispatcherStats::default();

            let subscription = match broker.subscribe(&self.topic) {
                Ok(subscription) => subscription,
                Err(err) => {
                    error!(kind = E::KIND, topic = %self.topic, error = %err, "subscribe failed");
                    return stats;
                }
            };
            thread_state.set(DispatcherState::Consuming);
            info!(kind = E::KIND, topic = %self.topic, "dispatcher consuming");

            loop {
                match stop_rx.try_recv() {
                    Ok(()) | Err(TryRecvError::Disconnected) => break,
                    Err(TryRecvError::Empty) => {}
                }

                stats.polls += 1;

                match subscription.poll(poll_interval.as_millis() as u64) {
                    Ok(Some(message)) => {
                        match self.dispatch(&message) {
                            DispatchOutcome::Handled(_) => stats.handled += 1,
                            DispatchOutcome::Failed(_) => stats.failed += 1,
                            DispatchOutcome::Malformed => stats.malformed += 1,
                            DispatchOutcome::Unroutable => stats.unroutable += 1,
                        }
                        if let Err(err) = subscription.ack(&message.id) {
                            warn!(topic = %self.topic, message_id = %message.id, error = %err, "ack failed");
                        }
                    }
                    Ok(None) => {}
                    Err(err) => {
                        warn!(topic = %self.topic, error = %err, "poll failed");
                        thread::sleep(poll_interval);
                    }
                }
            }

            info!(kind = E::KIND, topic = %self.topic, ?stats, "dispatcher stopped");
            stats
        });

        DispatcherHandle::new(topic, state, stop_tx, handle)
    }
}
