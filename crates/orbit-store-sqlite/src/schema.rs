//! SQL schema for the orbit SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per document slot. Saves overwrite the row; the last write wins.
CREATE TABLE IF NOT EXISTS documents (
    slot      TEXT PRIMARY KEY,
    body      TEXT NOT NULL,   -- the whole Document as JSON
    saved_at  TEXT NOT NULL    -- ISO 8601 UTC
);

PRAGMA user_version = 1;
";
