//! Traits for the two external collaborators: the page fetcher and the text
//! generator.
//!
//! Concrete HTTP clients live in `runstory-upstream`; tests substitute
//! in-process doubles.

use std::future::Future;

use thiserror::Error;

/// A fetched upstream page rendered as markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
  pub markdown: String,
}

#[derive(Debug, Error)]
pub enum FetchError {
  /// The upstream reported that the resource does not exist.
  #[error("upstream resource not found")]
  NotFound,

  /// The client's own deadline elapsed before the upstream answered.
  #[error("fetch timed out")]
  Timeout,

  #[error("fetch failed: {0}")]
  Transport(String),
}

#[derive(Debug, Error)]
pub enum GenerateError {
  #[error("generation timed out")]
  Timeout,

  #[error("generation failed: {0}")]
  Transport(String),

  #[error("generator returned no text")]
  Empty,
}

/// Scrapes a URL into markdown.
pub trait Fetcher: Send + Sync {
  fn fetch<'a>(
    &'a self,
    url: &'a str,
  ) -> impl Future<Output = Result<FetchedPage, FetchError>> + Send + 'a;
}

/// Turns a prompt into text.
pub trait Generator: Send + Sync {
  fn generate<'a>(
    &'a self,
    prompt: &'a str,
  ) -> impl Future<Output = Result<String, GenerateError>> + Send + 'a;
}
