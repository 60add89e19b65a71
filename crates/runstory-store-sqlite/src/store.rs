//! [`SqliteStore`], the SQLite implementation of the runstory storage
//! traits.

use std::path::Path;

use rusqlite::OptionalExtension as _;
use runstory_core::{
  Token,
  link::LinkEntry,
  record::Record,
  store::{LinkIndex, RecordStore, StoryStore, WriteOutcome},
};

use crate::{
  Result,
  encode::{LinkRow, RECORD_COLUMNS, RecordRow},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Story records and share links backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row writers ─────────────────────────────────────────────────────────────

fn insert_record(conn: &rusqlite::Connection, row: &RecordRow) -> rusqlite::Result<WriteOutcome> {
  insert_outcome(conn.execute(
    "INSERT INTO records (
       entity_id, token, content, raw_data, display_name,
       fetched_at, created_at, expires_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    rusqlite::params![
      row.entity_id,
      row.token,
      row.content,
      row.raw_data,
      row.display_name,
      row.fetched_at,
      row.created_at,
      row.expires_at,
    ],
  ))
}

fn insert_link(conn: &rusqlite::Connection, row: &LinkRow) -> rusqlite::Result<WriteOutcome> {
  insert_outcome(conn.execute(
    "INSERT INTO links (token, entity_id, created_at, expires_at)
     VALUES (?1, ?2, ?3, ?4)",
    rusqlite::params![row.token, row.entity_id, row.created_at, row.expires_at],
  ))
}

/// Map a key violation to [`WriteOutcome::TokenCollision`]; every other
/// failure stays an error.
fn insert_outcome(result: rusqlite::Result<usize>) -> rusqlite::Result<WriteOutcome> {
  match result {
    Ok(_) => Ok(WriteOutcome::Written),
    Err(rusqlite::Error::SqliteFailure(e, _))
      if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
    {
      Ok(WriteOutcome::TokenCollision)
    }
    Err(e) => Err(e),
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = crate::Error;

  async fn most_recent_for(&self, entity_id: &str) -> Result<Option<Record>> {
    let entity_id = entity_id.to_owned();

    let raw: Option<RecordRow> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {RECORD_COLUMNS} FROM records
                 WHERE entity_id = ?1
                 ORDER BY fetched_at DESC, created_at DESC
                 LIMIT 1"
              ),
              rusqlite::params![entity_id],
              RecordRow::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RecordRow::into_record).transpose()
  }

  async fn create_record(&self, record: &Record) -> Result<WriteOutcome> {
    let row = RecordRow::encode(record);
    let outcome = self.conn.call(move |conn| Ok(insert_record(conn, &row)?)).await?;
    Ok(outcome)
  }

  async fn get_by_entity_and_token(
    &self,
    entity_id: &str,
    token:     &Token,
  ) -> Result<Option<Record>> {
    let entity_id = entity_id.to_owned();
    let token_str = token.to_string();

    let raw: Option<RecordRow> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {RECORD_COLUMNS} FROM records
                 WHERE entity_id = ?1 AND token = ?2"
              ),
              rusqlite::params![entity_id, token_str],
              RecordRow::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RecordRow::into_record).transpose()
  }

  async fn list_for(&self, entity_id: &str) -> Result<Vec<Record>> {
    let entity_id = entity_id.to_owned();

    let raws: Vec<RecordRow> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RECORD_COLUMNS} FROM records
           WHERE entity_id = ?1
           ORDER BY fetched_at DESC, created_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![entity_id], RecordRow::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RecordRow::into_record).collect()
  }
}

// ─── LinkIndex impl ──────────────────────────────────────────────────────────

impl LinkIndex for SqliteStore {
  type Error = crate::Error;

  async fn create_link(&self, entry: &LinkEntry) -> Result<WriteOutcome> {
    let row = LinkRow::encode(entry);
    let outcome = self.conn.call(move |conn| Ok(insert_link(conn, &row)?)).await?;
    Ok(outcome)
  }

  async fn resolve(&self, token: &Token) -> Result<Option<String>> {
    let token_str = token.to_string();

    let entity_id: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT entity_id FROM links WHERE token = ?1",
              rusqlite::params![token_str],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(entity_id)
  }
}

// ─── StoryStore impl ─────────────────────────────────────────────────────────

impl StoryStore for SqliteStore {
  async fn persist(&self, record: &Record, link: &LinkEntry) -> Result<WriteOutcome> {
    let record_row = RecordRow::encode(record);
    let link_row = LinkRow::encode(link);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        // Returning early drops `tx`, which rolls back.
        if insert_record(&tx, &record_row)? == WriteOutcome::TokenCollision {
          return Ok(WriteOutcome::TokenCollision);
        }
        if insert_link(&tx, &link_row)? == WriteOutcome::TokenCollision {
          return Ok(WriteOutcome::TokenCollision);
        }
        tx.commit()?;
        Ok(WriteOutcome::Written)
      })
      .await?;

    if outcome == WriteOutcome::TokenCollision {
      tracing::warn!(token = %record.token, "token collision; nothing written");
    }
    Ok(outcome)
  }
}
