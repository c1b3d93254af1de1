//! The persisted document: every contact plus the global stats record.
//!
//! This is the only shape that crosses the persistence boundary. It
//! serialises to plain JSON with camelCase keys and ISO-8601 timestamps.

use serde::{Deserialize, Serialize};

use crate::{Result, contact::Contact, stats::UserStats};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
  #[serde(default)]
  pub contacts: Vec<Contact>,
  #[serde(default)]
  pub stats:    UserStats,
}

impl Document {
  pub fn to_json(&self) -> Result<String> { Ok(serde_json::to_string(self)?) }

  pub fn to_json_pretty(&self) -> Result<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  pub fn from_json(s: &str) -> Result<Self> { Ok(serde_json::from_str(s)?) }
}
