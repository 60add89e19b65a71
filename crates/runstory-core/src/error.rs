//! Error types for `runstory-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("malformed token: {0:?}")]
  MalformedToken(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
