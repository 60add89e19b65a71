//! Records: the persisted story artifacts.
//!
//! A record is written once and never updated. Generating a new story for
//! the same athlete always produces a new record under a new token.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{link::LinkEntry, token::Token};

/// How long fetched upstream data stays reusable.
pub const FRESHNESS_TTL_DAYS: i64 = 7;

/// [`FRESHNESS_TTL_DAYS`] as a [`Duration`].
pub fn freshness_ttl() -> Duration { Duration::days(FRESHNESS_TTL_DAYS) }

// ─── Record ──────────────────────────────────────────────────────────────────

/// One generated story for an athlete, plus the upstream payload it was
/// generated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
  pub entity_id:    String,
  pub token:        Token,
  pub content:      String,
  /// Cached upstream markdown. `None` for rows written before the payload
  /// was cached; such rows are never eligible for reuse.
  pub raw_data:     Option<String>,
  pub display_name: String,
  /// When the upstream fetch that produced `raw_data` happened.
  pub fetched_at:   DateTime<Utc>,
  /// Server-assigned write timestamp.
  pub created_at:   DateTime<Utc>,
  /// `fetched_at + 7 days`. Advisory; nothing evicts on it.
  pub expires_at:   DateTime<Utc>,
}

impl Record {
  /// The cached payload, if present and non-empty.
  pub fn cached_raw_data(&self) -> Option<&str> {
    self.raw_data.as_deref().filter(|raw| !raw.is_empty())
  }

  /// Strictly `now - fetched_at < TTL`; an age of exactly seven days is
  /// stale.
  pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(self.fetched_at) < freshness_ttl()
  }

  /// The index entry that points at this record.
  pub fn link_entry(&self) -> LinkEntry {
    LinkEntry {
      token:      self.token.clone(),
      entity_id:  self.entity_id.clone(),
      created_at: self.created_at,
      expires_at: self.expires_at,
    }
  }
}

// ─── NewRecord ───────────────────────────────────────────────────────────────

/// A record before it has a token and a write timestamp.
#[derive(Debug, Clone)]
pub struct NewRecord {
  pub entity_id:    String,
  pub content:      String,
  pub raw_data:     Option<String>,
  pub display_name: String,
  pub fetched_at:   DateTime<Utc>,
}

impl NewRecord {
  /// Stamp the record with its token and creation time. `expires_at` is
  /// derived from `fetched_at`.
  pub fn into_record(self, token: Token, created_at: DateTime<Utc>) -> Record {
    Record {
      entity_id: self.entity_id,
      token,
      content: self.content,
      raw_data: self.raw_data,
      display_name: self.display_name,
      expires_at: self.fetched_at + freshness_ttl(),
      fetched_at: self.fetched_at,
      created_at,
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn record_fetched_at(fetched_at: DateTime<Utc>) -> Record {
    NewRecord {
      entity_id:    "12345".into(),
      content:      "A story.".into(),
      raw_data:     Some("# Jane DOE".into()),
      display_name: "Jane DOE".into(),
      fetched_at,
    }
    .into_record(Token::generate(), fetched_at)
  }

  #[test]
  fn expires_seven_days_after_fetch() {
    let fetched = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    let record = record_fetched_at(fetched);
    assert_eq!(
      record.expires_at,
      Utc.with_ymd_and_hms(2024, 3, 8, 9, 0, 0).unwrap()
    );
  }

  #[test]
  fn freshness_boundary_is_exclusive() {
    let fetched = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    let record = record_fetched_at(fetched);

    assert!(record.is_fresh_at(fetched));
    assert!(record.is_fresh_at(fetched + freshness_ttl() - Duration::seconds(1)));
    assert!(!record.is_fresh_at(fetched + freshness_ttl()));
    assert!(!record.is_fresh_at(fetched + freshness_ttl() + Duration::seconds(1)));
  }

  #[test]
  fn empty_raw_data_is_not_cached() {
    let mut record = record_fetched_at(Utc::now());
    record.raw_data = Some(String::new());
    assert_eq!(record.cached_raw_data(), None);
    record.raw_data = None;
    assert_eq!(record.cached_raw_data(), None);
  }

  #[test]
  fn link_entry_mirrors_record() {
    let record = record_fetched_at(Utc::now());
    let link = record.link_entry();
    assert_eq!(link.token, record.token);
    assert_eq!(link.entity_id, record.entity_id);
    assert_eq!(link.created_at, record.created_at);
    assert_eq!(link.expires_at, record.expires_at);
  }
}
