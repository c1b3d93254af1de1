//! Encoding and decoding helpers between the domain document and the
//! plain-text columns stored in SQLite.
//!
//! Timestamps use the same ISO-8601 millisecond format as the document body.

use chrono::{DateTime, Utc};
use orbit_core::{document::Document, timestamp};

use crate::{Error, Result};

pub fn encode_dt(dt: DateTime<Utc>) -> String { timestamp::format(dt) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  timestamp::parse(s).map_err(|e| Error::DateParse(e.to_string()))
}

/// Raw strings read directly from a `documents` row.
pub struct RawDocument {
  pub body:     String,
  pub saved_at: String,
}

impl RawDocument {
  pub fn into_document(self) -> Result<(Document, DateTime<Utc>)> {
    let document = Document::from_json(&self.body)?;
    let saved_at = decode_dt(&self.saved_at)?;
    Ok((document, saved_at))
  }
}
