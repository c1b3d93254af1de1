//! The drift classifier: maps elapsed time to a [`DriftStatus`] bucket.
//!
//! Outer orbits tolerate proportionally longer silences before drifting.

use chrono::{DateTime, Utc};

use crate::{
  clock::elapsed_days,
  contact::{DriftStatus, Orbit},
};

impl Orbit {
  /// How much the target cadence is stretched for this tier.
  pub fn multiplier(self) -> f64 {
    match self {
      Self::Inner => 1.0,
      Self::Middle => 2.0,
      Self::Outer => 4.0,
      Self::Extended => 6.0,
    }
  }
}

/// Classify a relationship last touched at `last_contacted` as of `now`.
///
/// With `adjusted = target_days * orbit.multiplier()`, the thresholds are
/// `<= adjusted` stable, `<= 2x` drifting, `<= 4x` fading, beyond that ghost.
/// A `target_days` of `0` is permanently stable.
pub fn classify(
  last_contacted: DateTime<Utc>,
  target_days: u32,
  orbit: Orbit,
  now: DateTime<Utc>,
) -> DriftStatus {
  if target_days == 0 {
    return DriftStatus::Stable;
  }

  let adjusted = f64::from(target_days) * orbit.multiplier();
  let elapsed = elapsed_days(last_contacted, now) as f64;

  if elapsed <= adjusted {
    DriftStatus::Stable
  } else if elapsed <= adjusted * 2.0 {
    DriftStatus::Drifting
  } else if elapsed <= adjusted * 4.0 {
    DriftStatus::Fading
  } else {
    DriftStatus::Ghost
  }
}
