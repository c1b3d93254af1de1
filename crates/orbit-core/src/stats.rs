//! Global gamification state: XP, the activity streak and the daily task gate.
//!
//! Both the streak and the gate are calendar-day state machines keyed on the
//! clock's local date. Re-evaluating them any number of times within one day
//! is a no-op after the first transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, elapsed_days};

/// A streak survives gaps of up to this many (rounded-up) days, which lets a
/// user skip a single calendar day.
pub const STREAK_GRACE_DAYS: u64 = 2;

// ─── Stats record ────────────────────────────────────────────────────────────

/// The single global stats record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
  /// Total XP; only ever increases.
  pub points:               u64,
  pub current_streak:       u32,
  /// Always `>= current_streak`.
  pub longest_streak:       u32,
  /// `None` until the streak is first evaluated.
  #[serde(with = "crate::timestamp::sentinel")]
  pub last_active_date:     Option<DateTime<Utc>>,
  pub total_interactions:   u64,
  pub daily_task_completed: bool,
  /// `None` until the daily task is first completed.
  #[serde(with = "crate::timestamp::sentinel")]
  pub last_daily_task_date: Option<DateTime<Utc>>,
}

// ─── Streak ──────────────────────────────────────────────────────────────────

/// What a streak evaluation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakOutcome {
  /// First evaluation ever; the streak starts at 1.
  Started,
  /// Already evaluated today.
  Unchanged,
  /// Activity on a new day within the grace window.
  Extended,
  /// The gap was too long; the streak restarts at 1.
  Reset,
}

impl UserStats {
  /// Advance the streak state machine for activity at `now`.
  pub fn evaluate_streak<C: Clock + ?Sized>(
    &mut self,
    clock: &C,
    now: DateTime<Utc>,
  ) -> StreakOutcome {
    let outcome = match self.last_active_date {
      None => {
        self.current_streak = 1;
        StreakOutcome::Started
      }
      Some(last) if clock.same_day(last, now) => {
        return StreakOutcome::Unchanged;
      }
      Some(last) => {
        if elapsed_days(last, now) <= STREAK_GRACE_DAYS {
          self.current_streak += 1;
          StreakOutcome::Extended
        } else {
          self.current_streak = 1;
          StreakOutcome::Reset
        }
      }
    };

    self.longest_streak = self.longest_streak.max(self.current_streak);
    self.last_active_date = Some(now);

    tracing::debug!(
      ?outcome,
      current = self.current_streak,
      longest = self.longest_streak,
      "streak evaluated"
    );
    outcome
  }

  /// Credit one logged interaction worth `xp`.
  pub fn record_interaction(&mut self, xp: u32) {
    self.points += u64::from(xp);
    self.total_interactions += 1;
  }
}

// ─── Daily task gate ─────────────────────────────────────────────────────────

/// How the daily task was completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DailyTaskMethod {
  Pay,
  Ad,
}

impl DailyTaskMethod {
  pub fn xp(self) -> u32 {
    match self {
      Self::Pay => 100,
      Self::Ad => 50,
    }
  }
}

impl std::str::FromStr for DailyTaskMethod {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "pay" => Ok(Self::Pay),
      "ad" => Ok(Self::Ad),
      other => Err(format!("unknown daily task method: {other:?}")),
    }
  }
}

impl UserStats {
  /// Clear the gate if it was completed on an earlier calendar day.
  ///
  /// Returns `true` when the gate was reset.
  pub fn check_daily_task_reset<C: Clock + ?Sized>(
    &mut self,
    clock: &C,
    now: DateTime<Utc>,
  ) -> bool {
    if !self.daily_task_completed {
      return false;
    }
    let completed_today = self
      .last_daily_task_date
      .is_some_and(|last| clock.same_day(last, now));
    if completed_today {
      return false;
    }

    self.daily_task_completed = false;
    tracing::debug!("daily task gate reset");
    true
  }

  /// Complete today's task, returning the XP awarded.
  ///
  /// Completing twice on the same calendar day awards nothing the second
  /// time.
  pub fn complete_daily_task<C: Clock + ?Sized>(
    &mut self,
    clock: &C,
    now: DateTime<Utc>,
    method: DailyTaskMethod,
  ) -> u32 {
    self.check_daily_task_reset(clock, now);
    if self.daily_task_completed {
      tracing::debug!(?method, "daily task already completed today");
      return 0;
    }

    let xp = method.xp();
    self.points += u64::from(xp);
    self.daily_task_completed = true;
    self.last_daily_task_date = Some(now);
    xp
  }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, FixedOffset, TimeZone as _};

  use super::*;
  use crate::clock::ManualClock;

  fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, d, h, m, 0).unwrap()
  }

  fn clock() -> ManualClock { ManualClock::new(at(1, 0, 0)) }

  fn active_since(last: DateTime<Utc>, current: u32, longest: u32) -> UserStats {
    UserStats {
      current_streak: current,
      longest_streak: longest,
      last_active_date: Some(last),
      ..UserStats::default()
    }
  }

  // ── Streak ────────────────────────────────────────────────────────────────

  #[test]
  fn first_evaluation_starts_streak() {
    let mut stats = UserStats::default();
    let now = at(10, 9, 0);
    assert_eq!(stats.evaluate_streak(&clock(), now), StreakOutcome::Started);
    assert_eq!(stats.current_streak, 1);
    assert_eq!(stats.longest_streak, 1);
    assert_eq!(stats.last_active_date, Some(now));
  }

  #[test]
  fn same_day_is_idempotent() {
    let mut stats = active_since(at(10, 0, 5), 4, 6);
    let before = stats.clone();
    assert_eq!(
      stats.evaluate_streak(&clock(), at(10, 23, 59)),
      StreakOutcome::Unchanged
    );
    assert_eq!(stats, before);
  }

  #[test]
  fn twice_in_one_day_only_counts_once() {
    let mut stats = active_since(at(9, 12, 0), 2, 2);
    stats.evaluate_streak(&clock(), at(10, 8, 0));
    let after_first = stats.clone();
    stats.evaluate_streak(&clock(), at(10, 20, 0));
    assert_eq!(stats, after_first);
    assert_eq!(stats.current_streak, 3);
  }

  #[test]
  fn yesterday_extends_streak() {
    let mut stats = active_since(at(9, 12, 0), 5, 5);
    assert_eq!(
      stats.evaluate_streak(&clock(), at(10, 12, 0)),
      StreakOutcome::Extended
    );
    assert_eq!(stats.current_streak, 6);
    assert_eq!(stats.longest_streak, 6);
    assert_eq!(stats.last_active_date, Some(at(10, 12, 0)));
  }

  #[test]
  fn midnight_boundary_counts_as_new_day() {
    let mut stats = active_since(at(9, 23, 59), 1, 1);
    assert_eq!(
      stats.evaluate_streak(&clock(), at(10, 0, 1)),
      StreakOutcome::Extended
    );
    assert_eq!(stats.current_streak, 2);
  }

  #[test]
  fn skipping_one_day_within_grace_window() {
    // 9th 20:00 → 11th 08:00 is 36h, rounded up to 2 days.
    let mut stats = active_since(at(9, 20, 0), 3, 3);
    assert_eq!(
      stats.evaluate_streak(&clock(), at(11, 8, 0)),
      StreakOutcome::Extended
    );
    assert_eq!(stats.current_streak, 4);
  }

  #[test]
  fn grace_window_is_measured_in_elapsed_days() {
    // Only one calendar day skipped, but 60h elapsed rounds up to 3 days.
    let mut stats = active_since(at(9, 8, 0), 3, 3);
    assert_eq!(
      stats.evaluate_streak(&clock(), at(11, 20, 0)),
      StreakOutcome::Reset
    );
    assert_eq!(stats.current_streak, 1);
  }

  #[test]
  fn three_days_resets_but_keeps_longest() {
    let mut stats = active_since(at(7, 12, 0), 9, 12);
    assert_eq!(
      stats.evaluate_streak(&clock(), at(10, 12, 0)),
      StreakOutcome::Reset
    );
    assert_eq!(stats.current_streak, 1);
    assert_eq!(stats.longest_streak, 12);
  }

  #[test]
  fn calendar_day_uses_clock_offset() {
    // 04:00 UTC on the 10th is still the 9th at UTC-05:00.
    let eastern =
      ManualClock::with_offset(at(1, 0, 0), FixedOffset::west_opt(5 * 3600).unwrap());
    let mut stats = active_since(at(9, 15, 0), 2, 2);
    assert_eq!(
      stats.evaluate_streak(&eastern, at(10, 4, 0)),
      StreakOutcome::Unchanged
    );
  }

  #[test]
  fn longest_never_below_current() {
    let mut stats = UserStats::default();
    let clock = clock();
    let mut now = at(1, 10, 0);
    for step in 0..40 {
      // Alternate short and long gaps.
      let gap = if step % 7 == 6 { 4 } else { 1 };
      now += Duration::days(gap);
      stats.evaluate_streak(&clock, now);
      assert!(stats.longest_streak >= stats.current_streak);
    }
  }

  // ── Daily task ────────────────────────────────────────────────────────────

  #[test]
  fn pay_grants_hundred_and_closes_gate() {
    let mut stats = UserStats::default();
    let now = at(10, 9, 0);
    assert_eq!(stats.complete_daily_task(&clock(), now, DailyTaskMethod::Pay), 100);
    assert_eq!(stats.points, 100);
    assert!(stats.daily_task_completed);
    assert_eq!(stats.last_daily_task_date, Some(now));
  }

  #[test]
  fn ad_grants_fifty() {
    let mut stats = UserStats::default();
    assert_eq!(
      stats.complete_daily_task(&clock(), at(10, 9, 0), DailyTaskMethod::Ad),
      50
    );
    assert_eq!(stats.points, 50);
  }

  #[test]
  fn second_completion_same_day_awards_nothing() {
    let mut stats = UserStats::default();
    stats.complete_daily_task(&clock(), at(10, 9, 0), DailyTaskMethod::Ad);
    let xp = stats.complete_daily_task(&clock(), at(10, 22, 0), DailyTaskMethod::Pay);
    assert_eq!(xp, 0);
    assert_eq!(stats.points, 50);
    assert_eq!(stats.last_daily_task_date, Some(at(10, 9, 0)));
  }

  #[test]
  fn reset_check_same_day_keeps_gate() {
    let mut stats = UserStats::default();
    stats.complete_daily_task(&clock(), at(10, 9, 0), DailyTaskMethod::Pay);
    assert!(!stats.check_daily_task_reset(&clock(), at(10, 23, 0)));
    assert!(stats.daily_task_completed);
  }

  #[test]
  fn reset_check_next_day_opens_gate() {
    let mut stats = UserStats::default();
    stats.complete_daily_task(&clock(), at(10, 23, 0), DailyTaskMethod::Pay);
    assert!(stats.check_daily_task_reset(&clock(), at(11, 0, 30)));
    assert!(!stats.daily_task_completed);
    // Idempotent once open.
    assert!(!stats.check_daily_task_reset(&clock(), at(11, 1, 0)));
  }

  #[test]
  fn completing_on_a_new_day_works_without_explicit_reset() {
    let mut stats = UserStats::default();
    stats.complete_daily_task(&clock(), at(10, 9, 0), DailyTaskMethod::Pay);
    let xp = stats.complete_daily_task(&clock(), at(11, 9, 0), DailyTaskMethod::Pay);
    assert_eq!(xp, 100);
    assert_eq!(stats.points, 200);
  }

  #[test]
  fn record_interaction_accumulates() {
    let mut stats = UserStats::default();
    stats.record_interaction(10);
    stats.record_interaction(40);
    assert_eq!(stats.points, 50);
    assert_eq!(stats.total_interactions, 2);
  }
}
