//! Whether a generation request may reuse previously fetched upstream data.

use chrono::{DateTime, Utc};

use crate::{record::Record, store::RecordStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheDecision {
  /// The athlete's latest record is fresh and carries its upstream payload.
  Reuse(Record),
  Miss,
}

impl CacheDecision {
  pub fn is_hit(&self) -> bool { matches!(self, Self::Reuse(_)) }
}

/// Decide from the athlete's most recent record, if any.
///
/// Reuse requires cached raw data and an age strictly below the TTL.
pub fn evaluate(latest: Option<Record>, now: DateTime<Utc>) -> CacheDecision {
  match latest {
    Some(record) if record.cached_raw_data().is_some() && record.is_fresh_at(now) => {
      CacheDecision::Reuse(record)
    }
    _ => CacheDecision::Miss,
  }
}

/// Query `store` for the athlete's latest record and [`evaluate`] it.
pub async fn decide<S>(
  store: &S,
  entity_id: &str,
  now: DateTime<Utc>,
) -> Result<CacheDecision, S::Error>
where
  S: RecordStore,
{
  let latest = store.most_recent_for(entity_id).await?;
  Ok(evaluate(latest, now))
}
