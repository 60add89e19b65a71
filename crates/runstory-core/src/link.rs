//! Link entries: the token → athlete secondary index.
//!
//! Entries exist so a share token resolves with a single point lookup rather
//! than a scan over every athlete's records. They are never mutated or
//! deleted; an expired story still resolves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::token::Token;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
  pub token:      Token,
  pub entity_id:  String,
  pub created_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}
