//! Serde adapters for persisted timestamps.
//!
//! All timestamps are stored as ISO-8601 UTC strings with millisecond
//! precision (`2025-03-01T12:00:00.000Z`). "Never" is stored as the Unix epoch
//! and surfaces in memory as `None`.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format an instant the way it is written to the persisted document.
pub fn format(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an ISO-8601 / RFC 3339 timestamp in any offset, normalised to UTC.
pub fn parse(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
  DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

/// `#[serde(with = "timestamp::iso")]` for `DateTime<Utc>` fields.
pub mod iso {
  use chrono::{DateTime, Utc};
  use serde::{Deserialize as _, Deserializer, Serializer, de::Error as _};

  use super::{format, parse};

  pub fn serialize<S: Serializer>(
    dt: &DateTime<Utc>,
    serializer: S,
  ) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(*dt))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<DateTime<Utc>, D::Error> {
    let s = String::deserialize(deserializer)?;
    parse(&s).map_err(D::Error::custom)
  }
}

/// `#[serde(with = "timestamp::sentinel")]` for `Option<DateTime<Utc>>`
/// fields where the epoch means "never".
pub mod sentinel {
  use chrono::{DateTime, Utc};
  use serde::{Deserialize as _, Deserializer, Serializer, de::Error as _};

  use super::{format, parse};

  pub fn serialize<S: Serializer>(
    dt: &Option<DateTime<Utc>>,
    serializer: S,
  ) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(dt.unwrap_or(DateTime::UNIX_EPOCH)))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<Option<DateTime<Utc>>, D::Error> {
    let s = String::deserialize(deserializer)?;
    let dt = parse(&s).map_err(D::Error::custom)?;
    Ok((dt != DateTime::UNIX_EPOCH).then_some(dt))
  }
}
