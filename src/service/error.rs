//! Error type for orchestration operations.

use thiserror::Error;

use crate::bus::PublishError;
use crate::event::EnvelopeError;
use crate::source::SourceError;
use crate::store::StoreError;

/// Anything a service operation can fail with. Source failures are carried
/// unchanged so synchronous callers can tell them apart.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("publish failed: {0}")]
    Publish(#[from] PublishError),
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
}

impl ServiceError {
    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Source(SourceError::Rejected { .. }) => 400,
            ServiceError::Source(SourceError::Unauthorized) => 401,
            ServiceError::Source(SourceError::NotFound { .. }) => 404,
            ServiceError::Source(_) => 502,
            ServiceError::Store(StoreError::NotFound { .. }) => 404,
            ServiceError::Store(_) => 500,
            ServiceError::Publish(_) => 503,
            ServiceError::Envelope(_) => 500,
        }
    }

    /// Whether this is a "no record" outcome, from the source or the store.
    pub fn is_not_found(&self) -> bool {
        self.status_code() == 404
    }
}
