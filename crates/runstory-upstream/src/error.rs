//! Error type for client construction.
//!
//! Request-time failures are reported through the collaborator error types
//! in [`runstory_core::upstream`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to build HTTP client: {0}")]
  Client(#[from] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Render a request-time failure without its URL, which can carry
/// credentials.
pub(crate) fn describe(err: reqwest::Error) -> String { err.without_url().to_string() }
