//! The health model: a 0–100 freshness score for a relationship.
//!
//! Health decays linearly from the last interaction, losing 100 points over
//! twice the target cadence. The first day is free.

use chrono::{DateTime, Utc};

use crate::clock::elapsed_days;

pub const MAX_HEALTH: u8 = 100;

/// Score a relationship last touched at `last_contacted` as of `now`.
///
/// A `target_days` of `0` means the user never expects contact, so the
/// relationship never decays.
pub fn score(
  last_contacted: DateTime<Utc>,
  target_days: u32,
  now: DateTime<Utc>,
) -> u8 {
  if target_days == 0 {
    return MAX_HEALTH;
  }

  let elapsed = elapsed_days(last_contacted, now);
  if elapsed <= 1 {
    return MAX_HEALTH;
  }

  let decay_per_day = 100.0 / (f64::from(target_days) * 2.0);
  let raw = 100.0 - elapsed as f64 * decay_per_day;
  raw.clamp(0.0, 100.0).round() as u8
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone as _};

  use super::*;

  fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap()
  }

  fn after_days(days: i64, target: u32) -> u8 {
    score(start(), target, start() + Duration::days(days))
  }

  #[test]
  fn first_day_is_full_health() {
    assert_eq!(after_days(0, 7), 100);
    assert_eq!(after_days(1, 7), 100);
    assert_eq!(score(start(), 1, start() + Duration::hours(23)), 100);
  }

  #[test]
  fn partial_day_rounds_up_before_decay() {
    // 1 day and 1 hour counts as 2 days: 100 - 2 * (100 / 20) = 90.
    let now = start() + Duration::days(1) + Duration::hours(1);
    assert_eq!(score(start(), 10, now), 90);
  }

  #[test]
  fn decays_linearly_over_twice_the_target() {
    assert_eq!(after_days(5, 10), 75);
    assert_eq!(after_days(10, 10), 50);
    assert_eq!(after_days(20, 10), 0);
  }

  #[test]
  fn rounds_to_nearest_integer() {
    // 100 - 4 * (100 / 6) = 33.33…
    assert_eq!(after_days(4, 3), 33);
    // 100 - 2 * (100 / 6) = 66.66…
    assert_eq!(after_days(2, 3), 67);
  }

  #[test]
  fn clamps_at_zero() {
    assert_eq!(after_days(65, 30), 0);
    assert_eq!(after_days(10_000, 1), 0);
  }

  #[test]
  fn zero_target_never_decays() {
    assert_eq!(after_days(0, 0), 100);
    assert_eq!(after_days(3650, 0), 100);
  }

  #[test]
  fn clock_skew_is_treated_as_elapsed_time() {
    // A last-contacted timestamp in the future decays symmetrically.
    let now = start();
    assert_eq!(score(start() + Duration::days(5), 10, now), 75);
  }

  #[test]
  fn monotonically_non_increasing() {
    for target in [1, 2, 7, 30, 90, 365] {
      let mut prev = u8::MAX;
      for days in 0..(target as i64 * 3) {
        let s = after_days(days, target);
        assert!(s <= prev, "target={target} day={days}: {s} > {prev}");
        prev = s;
      }
      assert_eq!(prev, 0);
    }
  }
}
