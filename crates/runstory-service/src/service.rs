use std::{fmt::Display, future::Future, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use runstory_card::CardRenderer;
use runstory_core::{
  Token,
  cache::{self, CacheDecision},
  profile,
  prompt::story_prompt,
  record::{NewRecord, Record},
  store::{LinkIndex, RecordStore, StoryStore, WriteOutcome},
  upstream::{FetchError, Fetcher, GenerateError, Generator},
};

use crate::{EntityLocks, Error, Result};

/// Token draws per generation before giving up on persistence.
pub const MAX_TOKEN_ATTEMPTS: u32 = 5;

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;
type TokenSource = Arc<dyn Fn() -> Token + Send + Sync>;

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct StoryConfig {
  /// Profile page URL with an `{id}` placeholder for the athlete number.
  pub profile_url_template: String,
  /// Deadline for each individual upstream call.
  pub upstream_timeout:     Duration,
  /// Total attempts for an upstream call that fails in transport. At least
  /// one attempt is always made.
  pub upstream_attempts:    u32,
  /// Delay before the first retry; doubles on each further retry.
  pub retry_backoff:        Duration,
}

impl Default for StoryConfig {
  fn default() -> Self {
    Self {
      profile_url_template: profile::DEFAULT_PROFILE_URL_TEMPLATE.to_owned(),
      upstream_timeout:     Duration::from_secs(60),
      upstream_attempts:    1,
      retry_backoff:        Duration::from_millis(500),
    }
  }
}

// ─── Results ─────────────────────────────────────────────────────────────────

/// Outcome of a successful generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedStory {
  pub token:        Token,
  pub content:      String,
  pub display_name: String,
  pub entity_id:    String,
  /// Whether cached upstream data was used instead of a fresh fetch.
  pub reused:       bool,
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// Generates, stores and serves stories.
///
/// Generation for one athlete is single-flight within the process: a
/// request holds the athlete's lease from the cache check until its record
/// is written, so a concurrent request for the same athlete sees the fresh
/// record and reuses its upstream data.
pub struct StoryService<S, F, G> {
  store:     S,
  fetcher:   F,
  generator: G,
  renderer:  CardRenderer,
  config:    StoryConfig,
  locks:     EntityLocks,
  clock:     Clock,
  tokens:    TokenSource,
}

impl<S, F, G> StoryService<S, F, G>
where
  S: StoryStore,
  F: Fetcher,
  G: Generator,
{
  pub fn new(store: S, fetcher: F, generator: G, renderer: CardRenderer, config: StoryConfig) -> Self {
    Self {
      store,
      fetcher,
      generator,
      renderer,
      config,
      locks: EntityLocks::new(),
      clock: Arc::new(Utc::now),
      tokens: Arc::new(Token::generate),
    }
  }

  /// Replace the wall clock used for freshness checks and timestamps.
  pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
    self.clock = Arc::new(clock);
    self
  }

  /// Replace the token generator.
  pub fn with_token_source(mut self, tokens: impl Fn() -> Token + Send + Sync + 'static) -> Self {
    self.tokens = Arc::new(tokens);
    self
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn config(&self) -> &StoryConfig { &self.config }

  // ─── Generation ────────────────────────────────────────────────────────────

  /// Produce a new story for `entity_id`, reusing upstream data fetched in
  /// the last seven days when available.
  pub async fn generate(&self, entity_id: &str) -> Result<GeneratedStory> {
    let entity_id = entity_id.trim();
    if entity_id.is_empty() {
      return Err(Error::InvalidInput("athlete ID is required".into()));
    }
    let target = profile::lookup_target(entity_id).ok_or_else(|| {
      Error::InvalidInput(format!("athlete ID {entity_id:?} does not end in an athlete number"))
    })?;

    let _lease = self.locks.acquire(entity_id).await;
    let now = (self.clock)();

    let decision = cache::decide(&self.store, entity_id, now)
      .await
      .map_err(Error::persistence)?;
    let reused = decision.is_hit();

    let (raw_data, display_name, fetched_at) = match decision {
      CacheDecision::Reuse(record) => {
        tracing::info!(%entity_id, fetched_at = %record.fetched_at, "reusing cached athlete data");
        let Record { raw_data, display_name, fetched_at, .. } = record;
        (raw_data.unwrap_or_default(), display_name, fetched_at)
      }
      CacheDecision::Miss => {
        tracing::info!(%entity_id, "no fresh athlete data; fetching");
        let raw_data = self.fetch_profile(entity_id, target).await?;
        let display_name = profile::extract_display_name(&raw_data);
        (raw_data, display_name, now)
      }
    };

    let content = self.generate_text(&story_prompt(&raw_data)).await?;

    let new = NewRecord {
      entity_id: entity_id.to_owned(),
      content,
      raw_data: Some(raw_data),
      display_name,
      fetched_at,
    };
    let record = self.persist(new, (self.clock)()).await?;
    tracing::info!(%entity_id, token = %record.token, reused, "story generated");

    Ok(GeneratedStory {
      token: record.token,
      content: record.content,
      display_name: record.display_name,
      entity_id: record.entity_id,
      reused,
    })
  }

  async fn fetch_profile(&self, entity_id: &str, target: &str) -> Result<String> {
    let url = profile::profile_url(&self.config.profile_url_template, target);
    tracing::debug!(%url, "fetching athlete profile");
    let url = url.as_str();

    let page = match self
      .call_upstream("fetch", move || self.fetcher.fetch(url), |e: &FetchError| {
        matches!(e, FetchError::Transport(_))
      })
      .await?
    {
      Ok(page) => page,
      Err(FetchError::NotFound) => return Err(Error::UnknownEntity(entity_id.to_owned())),
      Err(FetchError::Timeout) => return Err(Error::UpstreamTimeout("fetch")),
      Err(FetchError::Transport(msg)) => return Err(Error::UpstreamUnavailable(msg)),
    };

    if page.markdown.trim().is_empty() {
      return Err(Error::UpstreamUnavailable("could not fetch runner data".into()));
    }
    if profile::indicates_missing_profile(&page.markdown) {
      return Err(Error::UnknownEntity(entity_id.to_owned()));
    }
    tracing::debug!(bytes = page.markdown.len(), "fetched athlete profile");
    Ok(page.markdown)
  }

  async fn generate_text(&self, prompt: &str) -> Result<String> {
    match self
      .call_upstream("generate", move || self.generator.generate(prompt), |e: &GenerateError| {
        matches!(e, GenerateError::Transport(_))
      })
      .await?
    {
      Ok(text) => Ok(text),
      Err(GenerateError::Timeout) => Err(Error::UpstreamTimeout("generate")),
      Err(e) => Err(Error::UpstreamUnavailable(e.to_string())),
    }
  }

  /// Run `call` under the upstream timeout, retrying failures `retryable`
  /// accepts with exponential backoff. The collaborator's own error is
  /// handed back once attempts run out.
  async fn call_upstream<T, E, Fut>(
    &self,
    what: &'static str,
    mut call: impl FnMut() -> Fut,
    retryable: fn(&E) -> bool,
  ) -> Result<Result<T, E>>
  where
    Fut: Future<Output = Result<T, E>>,
    E: Display,
  {
    let attempts = self.config.upstream_attempts.max(1);
    let mut backoff = self.config.retry_backoff;
    let mut attempt = 1;

    loop {
      let outcome = tokio::time::timeout(self.config.upstream_timeout, call())
        .await
        .map_err(|_| {
          tracing::warn!(what, timeout = ?self.config.upstream_timeout, "upstream call timed out");
          Error::UpstreamTimeout(what)
        })?;

      match outcome {
        Err(e) if retryable(&e) && attempt < attempts => {
          tracing::warn!(what, attempt, ?backoff, "upstream call failed, retrying: {e}");
          tokio::time::sleep(backoff).await;
          backoff *= 2;
          attempt += 1;
        }
        outcome => return Ok(outcome),
      }
    }
  }

  /// Write the record and its link under a fresh token, drawing again on
  /// collision.
  async fn persist(&self, new: NewRecord, created_at: DateTime<Utc>) -> Result<Record> {
    for attempt in 1..=MAX_TOKEN_ATTEMPTS {
      let record = new.clone().into_record((self.tokens)(), created_at);
      let outcome = self
        .store
        .persist(&record, &record.link_entry())
        .await
        .map_err(Error::persistence)?;

      match outcome {
        WriteOutcome::Written => return Ok(record),
        WriteOutcome::TokenCollision => {
          tracing::warn!(attempt, token = %record.token, "token collision, drawing a new token");
        }
      }
    }

    tracing::error!(entity_id = %new.entity_id, "no free token after {MAX_TOKEN_ATTEMPTS} attempts");
    Err(Error::Persistence(
      format!("no free token after {MAX_TOKEN_ATTEMPTS} attempts").into(),
    ))
  }

  // ─── Retrieval ─────────────────────────────────────────────────────────────

  /// The record behind a share token. Malformed and unknown tokens are both
  /// [`Error::NotFound`]; the record collection is only consulted once the
  /// link index has resolved the token.
  pub async fn story(&self, token: &str) -> Result<Record> {
    let token = Token::parse(token).map_err(|_| Error::NotFound)?;

    let entity_id = LinkIndex::resolve(&self.store, &token)
      .await
      .map_err(Error::persistence)?
      .ok_or(Error::NotFound)?;

    self
      .store
      .get_by_entity_and_token(&entity_id, &token)
      .await
      .map_err(Error::persistence)?
      .ok_or(Error::NotFound)
  }

  /// PNG social card for a share token. Rasterising runs on the blocking
  /// pool.
  pub async fn social_card(&self, token: &str) -> Result<Vec<u8>> {
    let record = self.story(token).await?;
    let renderer = self.renderer.clone();
    let (content, entity_id) = (record.content, record.entity_id);
    let png = tokio::task::spawn_blocking(move || renderer.render(&content, &entity_id))
      .await??;
    tracing::debug!(token = %record.token, bytes = png.len(), "rendered social card");
    Ok(png)
  }

  /// Every story generated for `entity_id`, newest first.
  pub async fn stories_for(&self, entity_id: &str) -> Result<Vec<Record>> {
    let entity_id = entity_id.trim();
    if entity_id.is_empty() {
      return Err(Error::InvalidInput("athlete ID is required".into()));
    }
    RecordStore::list_for(&self.store, entity_id)
      .await
      .map_err(Error::persistence)
  }
}
