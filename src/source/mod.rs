//! Sources - single-shot retrieval of an entity's current state.
//!
//! A source turns a request key into freshly built entities, or into one of
//! the classified failures below. Sources never cache, retry or back off;
//! redelivery is the broker's business.
//!
//! | Outcome                   | Meaning                                         |
//! |---------------------------|-------------------------------------------------|
//! | `SourceError::Rejected`     | bad request shape; needs an operator          |
//! | `SourceError::Unauthorized` | credentials invalid; refresh them upstream    |
//! | `SourceError::NotFound`     | the source has no record for the key          |
//! | `SourceError::Transport`    | the call itself failed                        |
//! | `SourceError::Decode`       | the response did not have the expected shape  |

mod fixed;
mod http;
mod lamoda;
mod timestamp;
mod twitch;

use thiserror::Error;

use crate::entity::Tracked;

pub use fixed::StaticSource;
pub use http::{interpret_response, Credentials, HttpSource, SourceRecord};
pub use lamoda::RawLamodaProduct;
pub use timestamp::parse_timestamp;
pub use twitch::{RawTwitchGame, RawTwitchStream, RawTwitchUser};

/// Classified source failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("source rejected the request for {key}")]
    Rejected { key: String },
    #[error("source rejected the credentials")]
    Unauthorized,
    #[error("{kind} not found at source: {key}")]
    NotFound { kind: String, key: String },
    #[error("source transport error: {0}")]
    Transport(String),
    #[error("source response could not be decoded: {0}")]
    Decode(String),
}

impl SourceError {
    pub fn not_found<E: Tracked>(key: &str) -> Self {
        SourceError::NotFound {
            kind: E::KIND.to_string(),
            key: key.to_string(),
        }
    }
}

/// Retrieves the current state of the entities under a request key.
pub trait Source<E: Tracked>: Send + Sync {
    /// One outbound call. Single-record kinds return exactly one entity;
    /// grouped kinds (products by category) return one per record found.
    /// Never returns an empty vector: no record is `SourceError::NotFound`.
    fn fetch(&self, key: &str) -> Result<Vec<E>, SourceError>;
}

impl<E: Tracked, S: Source<E> + ?Sized> Source<E> for std::sync::Arc<S> {
    fn fetch(&self, key: &str) -> Result<Vec<E>, SourceError> {
        (**self).fetch(key)
    }
}
