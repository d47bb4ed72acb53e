use crate::entity::Tracked;

/// Broker topics a service publishes to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topics {
    /// Where ParseRequested envelopes go.
    pub requests: String,
    /// Where CreatedOrUpdated and DeletedByKey envelopes go.
    pub results: String,
}

impl Topics {
    pub fn new(requests: impl Into<String>, results: impl Into<String>) -> Self {
        Self {
            requests: requests.into(),
            results: results.into(),
        }
    }

    /// `<kind>` for requests, `<kind>.results` for results.
    pub fn for_kind<E: Tracked>() -> Self {
        Self::new(E::KIND, format!("{}.results", E::KIND))
    }
}
