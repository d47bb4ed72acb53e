use crate::entity::{Stored, Tracked};

use super::CreatedOrUpdated;

/// A mutation's persisted outcome paired with the event describing it.
///
/// Fields are private: the only way to build one is from the stored entity
/// itself, so the event can never drift from the result it describes.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultWithEvent<R, Ev> {
    result: R,
    event: Ev,
}

impl<R, Ev> ResultWithEvent<R, Ev> {
    pub fn result(&self) -> &R {
        &self.result
    }

    pub fn event(&self) -> &Ev {
        &self.event
    }

    pub fn into_result(self) -> R {
        self.result
    }

    pub fn into_event(self) -> Ev {
        self.event
    }

    pub fn into_parts(self) -> (R, Ev) {
        (self.result, self.event)
    }
}

impl<E: Tracked> ResultWithEvent<Stored<E>, CreatedOrUpdated<E>> {
    /// Pair a freshly written entity with its CreatedOrUpdated event.
    pub fn created_or_updated(stored: Stored<E>) -> Self {
        let event = CreatedOrUpdated::from_stored(&stored);
        Self {
            result: stored,
            event,
        }
    }
}
