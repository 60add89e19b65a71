use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error("no parkrunner found for athlete ID {0}")]
  UnknownEntity(String),

  #[error("upstream unavailable: {0}")]
  UpstreamUnavailable(String),

  /// The named upstream call did not finish within the configured timeout.
  #[error("upstream {0} timed out")]
  UpstreamTimeout(&'static str),

  #[error("story not found")]
  NotFound,

  #[error("failed to render social card: {0}")]
  Render(#[from] runstory_card::Error),

  #[error("social card task failed: {0}")]
  RenderTask(#[from] tokio::task::JoinError),

  #[error("storage error: {0}")]
  Persistence(#[source] BoxError),
}

impl Error {
  pub(crate) fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Persistence(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
