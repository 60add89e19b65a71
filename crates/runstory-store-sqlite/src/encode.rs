//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings with a fixed nanosecond
//! width, so lexical order equals chronological order and values round-trip
//! exactly. Tokens are stored in their canonical lowercase form.

use chrono::{DateTime, SecondsFormat, Utc};
use runstory_core::{Token, link::LinkEntry, record::Record};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column values of a `records` row.
pub struct RecordRow {
  pub entity_id:    String,
  pub token:        String,
  pub content:      String,
  pub raw_data:     Option<String>,
  pub display_name: String,
  pub fetched_at:   String,
  pub created_at:   String,
  pub expires_at:   String,
}

/// Column list matching [`RecordRow::from_row`].
pub const RECORD_COLUMNS: &str =
  "entity_id, token, content, raw_data, display_name, fetched_at, created_at, expires_at";

impl RecordRow {
  pub fn encode(record: &Record) -> Self {
    Self {
      entity_id:    record.entity_id.clone(),
      token:        record.token.to_string(),
      content:      record.content.clone(),
      raw_data:     record.raw_data.clone(),
      display_name: record.display_name.clone(),
      fetched_at:   encode_dt(record.fetched_at),
      created_at:   encode_dt(record.created_at),
      expires_at:   encode_dt(record.expires_at),
    }
  }

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      entity_id:    row.get(0)?,
      token:        row.get(1)?,
      content:      row.get(2)?,
      raw_data:     row.get(3)?,
      display_name: row.get(4)?,
      fetched_at:   row.get(5)?,
      created_at:   row.get(6)?,
      expires_at:   row.get(7)?,
    })
  }

  pub fn into_record(self) -> Result<Record> {
    Ok(Record {
      entity_id:    self.entity_id,
      token:        Token::parse(&self.token)?,
      content:      self.content,
      raw_data:     self.raw_data,
      display_name: self.display_name,
      fetched_at:   decode_dt(&self.fetched_at)?,
      created_at:   decode_dt(&self.created_at)?,
      expires_at:   decode_dt(&self.expires_at)?,
    })
  }
}

/// Column values of a `links` row.
pub struct LinkRow {
  pub token:      String,
  pub entity_id:  String,
  pub created_at: String,
  pub expires_at: String,
}

impl LinkRow {
  pub fn encode(entry: &LinkEntry) -> Self {
    Self {
      token:      entry.token.to_string(),
      entity_id:  entry.entity_id.clone(),
      created_at: encode_dt(entry.created_at),
      expires_at: encode_dt(entry.expires_at),
    }
  }
}
