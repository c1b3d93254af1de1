//! Error types for `orbit-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("contact name must not be empty")]
  EmptyName,

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
