//! Logged interactions and the XP they award.

use serde::{Deserialize, Serialize};

/// XP for any logged interaction.
pub const BASE_XP: u32 = 10;
/// Extra XP for a richer channel (a call or meeting in person).
pub const RICH_CHANNEL_BONUS_XP: u32 = 20;
/// Extra XP when the interaction went awesomely.
pub const AWESOME_VIBE_BONUS_XP: u32 = 10;

/// The channel an interaction happened over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionType {
  Call,
  Text,
  Meetup,
  Email,
  Social,
  Other,
}

impl InteractionType {
  pub const ALL: [InteractionType; 6] = [
    Self::Call,
    Self::Text,
    Self::Meetup,
    Self::Email,
    Self::Social,
    Self::Other,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Call => "call",
      Self::Text => "text",
      Self::Meetup => "meetup",
      Self::Email => "email",
      Self::Social => "social",
      Self::Other => "other",
    }
  }

  fn is_rich_channel(self) -> bool { matches!(self, Self::Call | Self::Meetup) }
}

impl std::fmt::Display for InteractionType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for InteractionType {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| format!("unknown interaction type: {s:?}"))
  }
}

/// How the interaction felt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vibe {
  Awesome,
  Good,
  Neutral,
  Awkward,
}

impl Vibe {
  pub const ALL: [Vibe; 4] =
    [Self::Awesome, Self::Good, Self::Neutral, Self::Awkward];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Awesome => "awesome",
      Self::Good => "good",
      Self::Neutral => "neutral",
      Self::Awkward => "awkward",
    }
  }
}

impl std::fmt::Display for Vibe {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for Vibe {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| format!("unknown vibe: {s:?}"))
  }
}

// ─── Interaction ─────────────────────────────────────────────────────────────

/// A single interaction event, the unit that resets health and drives XP.
///
/// An interaction is *detailed* when its type is known; otherwise it is a
/// quick log and `vibe` does not count towards XP.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interaction {
  pub kind: Option<InteractionType>,
  pub vibe: Option<Vibe>,
  pub note: Option<String>,
}

impl Interaction {
  /// A quick "we talked" log with no detail.
  pub fn quick() -> Self { Self::default() }

  pub fn detailed(kind: InteractionType, vibe: Option<Vibe>) -> Self {
    Self {
      kind: Some(kind),
      vibe,
      note: None,
    }
  }

  pub fn with_note(mut self, note: impl Into<String>) -> Self {
    self.note = Some(note.into());
    self
  }

  pub fn is_detailed(&self) -> bool { self.kind.is_some() }

  /// XP awarded for logging this interaction.
  pub fn xp(&self) -> u32 {
    let Some(kind) = self.kind else {
      return BASE_XP;
    };

    let mut xp = BASE_XP;
    if kind.is_rich_channel() {
      xp += RICH_CHANNEL_BONUS_XP;
    }
    if self.vibe == Some(Vibe::Awesome) {
      xp += AWESOME_VIBE_BONUS_XP;
    }
    xp
  }
}
