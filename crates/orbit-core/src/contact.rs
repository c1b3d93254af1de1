//! Contact records and their derived relationship state.
//!
//! A contact owns its descriptive fields plus two derived fields,
//! `health_score` and `drift_status`, which are only ever written by
//! re-deriving them from `last_contacted` (or reset by an interaction).

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::interaction::InteractionType;

/// Cadence assigned when the caller does not specify one.
pub const DEFAULT_TARGET_FREQUENCY_DAYS: u32 = 30;

// ─── Tiers and states ────────────────────────────────────────────────────────

/// A user-assigned closeness tier that scales how tolerant drift is to
/// elapsed time.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Orbit {
  Inner,
  Middle,
  #[default]
  Outer,
  Extended,
}

impl Orbit {
  pub const ALL: [Orbit; 4] =
    [Orbit::Inner, Orbit::Middle, Orbit::Outer, Orbit::Extended];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Inner => "inner",
      Self::Middle => "middle",
      Self::Outer => "outer",
      Self::Extended => "extended",
    }
  }
}

impl std::fmt::Display for Orbit {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.pad(self.as_str())
  }
}

impl std::str::FromStr for Orbit {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|o| o.as_str().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| format!("unknown orbit: {s:?}"))
  }
}

/// Discrete summary of how far a relationship has decayed. Variants are
/// ordered from healthiest to most neglected.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Default,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DriftStatus {
  #[default]
  Stable,
  Drifting,
  Fading,
  Ghost,
}

impl DriftStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Stable => "stable",
      Self::Drifting => "drifting",
      Self::Fading => "fading",
      Self::Ghost => "ghost",
    }
  }
}

impl std::fmt::Display for DriftStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.pad(self.as_str())
  }
}

// ─── Notes ───────────────────────────────────────────────────────────────────

/// A timestamped free-text entry. Stored newest first on the contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
  pub id:               Uuid,
  #[serde(with = "crate::timestamp::iso")]
  pub timestamp:        DateTime<Utc>,
  pub text:             String,
  /// Set when the note was written as part of a detailed interaction log.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub interaction_type: Option<InteractionType>,
}

// ─── Contact ─────────────────────────────────────────────────────────────────

/// One tracked relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
  pub id:                    Uuid,
  pub name:                  String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub phone_number:          Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email:                 Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub avatar:                Option<String>,
  #[serde(default)]
  pub tags:                  BTreeSet<String>,
  #[serde(with = "crate::timestamp::iso")]
  pub last_contacted:        DateTime<Utc>,
  /// Expected cadence in days; `0` means "never expect contact".
  pub target_frequency_days: u32,
  /// Always in `0..=100`.
  pub health_score:          u8,
  #[serde(default)]
  pub orbit:                 Orbit,
  #[serde(default)]
  pub drift_status:          DriftStatus,
  #[serde(default)]
  pub notes:                 Vec<Note>,
}

impl Contact {
  /// Re-derive `health_score` and `drift_status` as of `now`.
  pub fn refresh(&mut self, now: DateTime<Utc>) {
    self.health_score = crate::health::score(
      self.last_contacted,
      self.target_frequency_days,
      now,
    );
    self.drift_status = crate::drift::classify(
      self.last_contacted,
      self.target_frequency_days,
      self.orbit,
      now,
    );
  }

  /// Prepend a note so the list stays newest first.
  pub(crate) fn push_note(
    &mut self,
    text: String,
    interaction_type: Option<InteractionType>,
    at: DateTime<Utc>,
  ) {
    self.notes.insert(0, Note {
      id: Uuid::new_v4(),
      timestamp: at,
      text,
      interaction_type,
    });
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::tracker::Tracker::add_contact`]. Identity, timestamps and
/// derived fields are always assigned by the tracker.
#[derive(Debug, Clone, Default)]
pub struct NewContact {
  pub name:                  String,
  pub phone_number:          Option<String>,
  pub email:                 Option<String>,
  pub avatar:                Option<String>,
  pub tags:                  BTreeSet<String>,
  /// Falls back to the tracker's [`ContactDefaults`].
  pub target_frequency_days: Option<u32>,
  /// Falls back to the tracker's [`ContactDefaults`].
  pub orbit:                 Option<Orbit>,
}

impl NewContact {
  /// Convenience constructor with every optional field left unset.
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ..Self::default()
    }
  }
}

/// Partial update for [`crate::tracker::Tracker::update_contact`]. `None`
/// leaves the field untouched; an empty phone, email or avatar clears it.
#[derive(Debug, Clone, Default)]
pub struct ContactPatch {
  pub name:                  Option<String>,
  pub phone_number:          Option<String>,
  pub email:                 Option<String>,
  pub avatar:                Option<String>,
  pub tags:                  Option<BTreeSet<String>>,
  pub target_frequency_days: Option<u32>,
  pub orbit:                 Option<Orbit>,
}

impl ContactPatch {
  pub fn is_empty(&self) -> bool {
    self.name.is_none()
      && self.phone_number.is_none()
      && self.email.is_none()
      && self.avatar.is_none()
      && self.tags.is_none()
      && self.target_frequency_days.is_none()
      && self.orbit.is_none()
  }
}

/// A contact proposed by an importer (e.g. a parsed vCard).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportCandidate {
  pub name:         String,
  pub phone_number: Option<String>,
  pub email:        Option<String>,
}

/// Values applied to new contacts when the caller leaves them unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactDefaults {
  pub target_frequency_days: u32,
  pub orbit:                 Orbit,
}

impl Default for ContactDefaults {
  fn default() -> Self {
    Self {
      target_frequency_days: DEFAULT_TARGET_FREQUENCY_DAYS,
      orbit:                 Orbit::default(),
    }
  }
}
