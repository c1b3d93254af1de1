//! Error types for the orbit-vcard importer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("vCard missing BEGIN/END:VCARD envelope")]
  MissingEnvelope,

  #[error("malformed content-line: {0}")]
  MalformedContentLine(String),

  #[error("vCard has no FN or N name")]
  MissingName,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
