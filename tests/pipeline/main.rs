//! Parse pipeline integration tests.

mod support;
mod dispatcher;
mod end_to_end;
mod repository;
mod sources;
mod tracked;

#[cfg(feature = "http")]
mod http;
