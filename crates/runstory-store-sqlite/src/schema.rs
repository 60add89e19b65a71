//! SQL schema for the runstory SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Per-athlete story records; the relational form of
-- entities/{entity_id}/records/{token}.
CREATE TABLE IF NOT EXISTS records (
    entity_id     TEXT NOT NULL,
    token         TEXT NOT NULL UNIQUE,
    content       TEXT NOT NULL,
    raw_data      TEXT,            -- cached upstream markdown; NULL on legacy rows
    display_name  TEXT NOT NULL,
    fetched_at    TEXT NOT NULL,   -- RFC 3339 UTC, fixed nanosecond width
    created_at    TEXT NOT NULL,
    expires_at    TEXT NOT NULL,
    PRIMARY KEY (entity_id, token)
);

-- Latest-record lookups read one index range per athlete.
CREATE INDEX IF NOT EXISTS records_entity_fetched_idx
    ON records(entity_id, fetched_at DESC, created_at DESC);

-- Flat token index; the relational form of links/{token}.
CREATE TABLE IF NOT EXISTS links (
    token       TEXT PRIMARY KEY,
    entity_id   TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    expires_at  TEXT NOT NULL
);

-- Both tables are append-only.
CREATE TRIGGER IF NOT EXISTS records_no_update BEFORE UPDATE ON records
BEGIN SELECT RAISE(ABORT, 'records are immutable'); END;

CREATE TRIGGER IF NOT EXISTS links_no_update BEFORE UPDATE ON links
BEGIN SELECT RAISE(ABORT, 'links are immutable'); END;

PRAGMA user_version = 1;
";
