//! [`SqliteStore`]: the SQLite implementation of [`DocumentStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;

use orbit_core::{document::Document, store::DocumentStore};

use crate::{
  Result,
  encode::{RawDocument, decode_dt, encode_dt},
  schema::SCHEMA,
};

/// Slot used when the caller does not pick one.
pub const DEFAULT_SLOT: &str = "default";

// ─── Store ───────────────────────────────────────────────────────────────────

/// An orbit document store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
  slot: String,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self::from_connection(conn).await?;
    tracing::debug!(path = %path.display(), "sqlite store opened");
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::from_connection(conn).await
  }

  async fn from_connection(conn: tokio_rusqlite::Connection) -> Result<Self> {
    let store = Self {
      conn,
      slot: DEFAULT_SLOT.to_owned(),
    };
    store.init_schema().await?;
    Ok(store)
  }

  /// Address a different document slot on the same database.
  pub fn with_slot(mut self, slot: impl Into<String>) -> Self {
    self.slot = slot.into();
    self
  }

  pub fn slot(&self) -> &str { &self.slot }

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

  async fn load_raw(&self) -> Result<Option<RawDocument>> {
    let slot = self.slot.clone();
    let raw = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            "SELECT body, saved_at FROM documents WHERE slot = ?1",
            rusqlite::params![slot],
            |r| {
              Ok(RawDocument {
                body:     r.get(0)?,
                saved_at: r.get(1)?,
              })
            },
          )
          .optional()?;
        Ok(raw)
      })
      .await?;
    Ok(raw)
  }

  /// When this slot was last written, or `None` if it never was.
  pub async fn last_saved_at(&self) -> Result<Option<DateTime<Utc>>> {
    self
      .load_raw()
      .await?
      .map(|raw| decode_dt(&raw.saved_at))
      .transpose()
  }
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = crate::Error;

  async fn load(&self) -> Result<Option<Document>> {
    let Some(raw) = self.load_raw().await? else {
      tracing::debug!(slot = %self.slot, "no saved document; first run");
      return Ok(None);
    };
    let (document, saved_at) = raw.into_document()?;
    tracing::debug!(
      slot = %self.slot,
      %saved_at,
      contacts = document.contacts.len(),
      "document loaded"
    );
    Ok(Some(document))
  }

  async fn save(&self, document: &Document) -> Result<()> {
    let body = document.to_json()?;
    let saved_at = encode_dt(Utc::now());
    let slot = self.slot.clone();
    let contacts = document.contacts.len();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO documents (slot, body, saved_at) VALUES (?1, ?2, ?3)
           ON CONFLICT(slot) DO UPDATE SET
             body = excluded.body,
             saved_at = excluded.saved_at",
          rusqlite::params![slot, body, saved_at],
        )?;
        Ok(())
      })
      .await?;

    tracing::info!(slot = %self.slot, contacts, "document saved");
    Ok(())
  }
}
