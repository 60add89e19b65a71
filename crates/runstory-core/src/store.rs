//! The storage traits.
//!
//! [`RecordStore`] and [`LinkIndex`] are implemented by storage backends
//! (e.g. `runstory-store-sqlite`). Higher layers (`runstory-service`,
//! `runstory-server`) depend on these abstractions, not on any concrete
//! backend.
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use crate::{link::LinkEntry, record::Record, token::Token};

/// Result of an insert keyed by a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum WriteOutcome {
  Written,
  /// The token is already taken; nothing was written. The caller should
  /// draw a new token and try again.
  TokenCollision,
}

impl WriteOutcome {
  pub fn is_written(self) -> bool { matches!(self, Self::Written) }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// Per-athlete record collection. Append-only: there is no update or delete.
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The record with the greatest `fetched_at` for `entity_id` (ties go to
  /// the latest `created_at`), or `None` if the athlete has no records.
  ///
  /// Must not touch other athletes' records.
  fn most_recent_for<'a>(
    &'a self,
    entity_id: &'a str,
  ) -> impl Future<Output = Result<Option<Record>, Self::Error>> + Send + 'a;

  /// Insert `record`. Never overwrites: an existing `(entity_id, token)` pair
  /// yields [`WriteOutcome::TokenCollision`].
  fn create_record<'a>(
    &'a self,
    record: &'a Record,
  ) -> impl Future<Output = Result<WriteOutcome, Self::Error>> + Send + 'a;

  /// Direct lookup once the owning athlete is known.
  fn get_by_entity_and_token<'a>(
    &'a self,
    entity_id: &'a str,
    token: &'a Token,
  ) -> impl Future<Output = Result<Option<Record>, Self::Error>> + Send + 'a;

  /// All records for `entity_id`, newest `fetched_at` first.
  fn list_for<'a>(
    &'a self,
    entity_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Record>, Self::Error>> + Send + 'a;
}

// ─── Links ───────────────────────────────────────────────────────────────────

/// Flat token → athlete index.
pub trait LinkIndex: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert `entry`. A token that is already indexed yields
  /// [`WriteOutcome::TokenCollision`] and leaves the old mapping untouched.
  fn create_link<'a>(
    &'a self,
    entry: &'a LinkEntry,
  ) -> impl Future<Output = Result<WriteOutcome, Self::Error>> + Send + 'a;

  /// Point lookup; cost is independent of the number of athletes or
  /// records.
  fn resolve<'a>(
    &'a self,
    token: &'a Token,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;
}

// ─── Combined ────────────────────────────────────────────────────────────────

/// A backend holding both collections that can write a record and its link
/// entry as one unit.
pub trait StoryStore:
  RecordStore + LinkIndex<Error = <Self as RecordStore>::Error>
{
  /// Write `record` and `link` atomically: either both rows exist afterwards
  /// or neither does. A collision in either collection writes nothing and
  /// yields [`WriteOutcome::TokenCollision`].
  fn persist<'a>(
    &'a self,
    record: &'a Record,
    link: &'a LinkEntry,
  ) -> impl Future<Output = Result<WriteOutcome, <Self as RecordStore>::Error>>
  + Send
  + 'a;
}
