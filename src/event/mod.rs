//! Events - the typed envelopes exchanged over the broker.
//!
//! Each tracked kind has three envelope families:
//!
//! | Event type                   | Payload                           |
//! |------------------------------|-----------------------------------|
//! | `<kind>.parse_requested`     | request key                       |
//! | `<kind>.created_or_updated`  | persisted entity + store id       |
//! | `<kind>.deleted_by_key`      | request key                       |
//!
//! "Not found" and source failures are never events; they surface as
//! synchronous errors to whoever called the service.

mod envelope;
mod result;

pub use envelope::{
    CreatedOrUpdated, DeletedByKey, Envelope, EnvelopeError, EventType, ParseRequested,
    CAUSATION_ID, KIND,
};
pub use result::ResultWithEvent;
