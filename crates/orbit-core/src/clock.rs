//! Wall-clock time source.
//!
//! The decay and streak rules are pure functions of "now", so every caller
//! reads time through a [`Clock`]. Calendar-day comparisons use the clock's
//! UTC offset rather than a rolling 24h window.

use std::sync::{Mutex, PoisonError};

use chrono::{
  DateTime, Duration, FixedOffset, Local, NaiveDate, Offset as _,
  SubsecRound as _, Utc,
};

const MILLIS_PER_DAY: u64 = 24 * 60 * 60 * 1000;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A source of the current time plus the local offset used to decide which
/// calendar day an instant falls on.
pub trait Clock: Send + Sync {
  /// The current instant, truncated to millisecond precision.
  fn now(&self) -> DateTime<Utc>;

  /// The local UTC offset used for calendar-day boundaries.
  fn offset(&self) -> FixedOffset;

  /// The local calendar date on which `at` falls.
  fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&self.offset()).date_naive()
  }

  /// Whether `a` and `b` fall on the same local calendar day.
  fn same_day(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    self.local_date(a) == self.local_date(b)
  }
}

/// Whole days between two instants, rounded up. Order does not matter.
///
/// `elapsed_days(t, t) == 0`; anything from one millisecond to exactly 24h
/// apart counts as one day.
pub fn elapsed_days(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
  let millis = (to - from).num_milliseconds().unsigned_abs();
  millis.div_ceil(MILLIS_PER_DAY)
}

// ─── System clock ────────────────────────────────────────────────────────────

/// The real wall clock in the machine's local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now().trunc_subsecs(3) }

  fn offset(&self) -> FixedOffset { *Local::now().offset() }

  /// Each instant is resolved with the offset in force at that instant, so
  /// dates on either side of a daylight-saving change stay correct.
  fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&Local).date_naive()
  }
}

// ─── Manual clock ────────────────────────────────────────────────────────────

/// A clock that only moves when told to. Used by tests and simulations.
#[derive(Debug)]
pub struct ManualClock {
  now:    Mutex<DateTime<Utc>>,
  offset: FixedOffset,
}

impl ManualClock {
  /// A clock frozen at `start`, with calendar days evaluated in UTC.
  pub fn new(start: DateTime<Utc>) -> Self {
    Self::with_offset(start, Utc.fix())
  }

  /// A clock frozen at `start`, with calendar days evaluated at `offset`.
  pub fn with_offset(start: DateTime<Utc>, offset: FixedOffset) -> Self {
    Self {
      now: Mutex::new(start.trunc_subsecs(3)),
      offset,
    }
  }

  pub fn set(&self, at: DateTime<Utc>) {
    *self.now.lock().unwrap_or_else(PoisonError::into_inner) =
      at.trunc_subsecs(3);
  }

  pub fn advance(&self, by: Duration) {
    let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
    *now = (*now + by).trunc_subsecs(3);
  }
}

impl Clock for ManualClock {
  fn now(&self) -> DateTime<Utc> {
    *self.now.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn offset(&self) -> FixedOffset { self.offset }
}

impl<C: Clock + ?Sized> Clock for &C {
  fn now(&self) -> DateTime<Utc> { (**self).now() }

  fn offset(&self) -> FixedOffset { (**self).offset() }

  fn local_date(&self, at: DateTime<Utc>) -> NaiveDate { (**self).local_date(at) }
}
