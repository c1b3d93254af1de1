//! [`Tracker`]: the in-memory contact store and gamification engine.
//!
//! A tracker owns the [`Document`] for one session. It is constructed
//! explicitly with [`Tracker::init`] and handed back with
//! [`Tracker::dispose`]; there is no ambient global state. Every mutation is
//! synchronous and either applies fully or is a no-op.
//!
//! Operations addressing an unknown contact id are silently ignored: they
//! return `None` / `false` and log at `debug`, since a caller may race with a
//! deletion.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  Error, Result,
  clock::Clock,
  contact::{
    Contact, ContactDefaults, ContactPatch, DriftStatus, ImportCandidate,
    NewContact, Orbit,
  },
  document::Document,
  health::MAX_HEALTH,
  interaction::Interaction,
  stats::{DailyTaskMethod, StreakOutcome, UserStats},
};

// ─── Tracker ─────────────────────────────────────────────────────────────────

pub struct Tracker<C: Clock> {
  document: Document,
  clock:    C,
  defaults: ContactDefaults,
}

impl<C: Clock> Tracker<C> {
  /// Take ownership of `document` and bring its derived state up to date:
  /// health and drift are recomputed and a stale daily task gate is reopened.
  pub fn init(document: Document, clock: C) -> Self {
    let mut tracker = Self {
      document,
      clock,
      defaults: ContactDefaults::default(),
    };
    tracker.recompute_health_and_drift();
    tracker.check_daily_task_reset();
    tracker
  }

  /// Override the cadence and orbit given to new contacts.
  pub fn with_defaults(mut self, defaults: ContactDefaults) -> Self {
    self.defaults = defaults;
    self
  }

  /// End the session, returning the document for persistence.
  pub fn dispose(self) -> Document { self.document }

  // ── Reads ─────────────────────────────────────────────────────────────────

  pub fn document(&self) -> &Document { &self.document }

  pub fn clock(&self) -> &C { &self.clock }

  pub fn contacts(&self) -> &[Contact] { &self.document.contacts }

  pub fn contact(&self, id: Uuid) -> Option<&Contact> {
    self.document.contacts.iter().find(|c| c.id == id)
  }

  pub fn stats(&self) -> &UserStats { &self.document.stats }

  /// Contacts that are no longer stable, least healthy first.
  pub fn needs_attention(&self) -> Vec<&Contact> {
    let mut out: Vec<&Contact> = self
      .document
      .contacts
      .iter()
      .filter(|c| c.drift_status != DriftStatus::Stable)
      .collect();
    out.sort_by(|a, b| {
      a.health_score
        .cmp(&b.health_score)
        .then_with(|| b.drift_status.cmp(&a.drift_status))
        .then_with(|| a.last_contacted.cmp(&b.last_contacted))
    });
    out
  }

  fn contact_mut(&mut self, id: Uuid) -> Option<&mut Contact> {
    self.document.contacts.iter_mut().find(|c| c.id == id)
  }

  // ── Contacts ──────────────────────────────────────────────────────────────

  /// Create a contact. It starts fully healthy, stable and just contacted.
  pub fn add_contact(&mut self, input: NewContact) -> Result<&Contact> {
    let name = validate_name(&input.name)?;
    let now = self.clock.now();

    let contact = Contact {
      id: Uuid::new_v4(),
      name,
      phone_number: non_blank(input.phone_number),
      email: non_blank(input.email),
      avatar: non_blank(input.avatar),
      tags: input.tags,
      last_contacted: now,
      target_frequency_days: input
        .target_frequency_days
        .unwrap_or(self.defaults.target_frequency_days),
      health_score: MAX_HEALTH,
      orbit: input.orbit.unwrap_or(self.defaults.orbit),
      drift_status: DriftStatus::Stable,
      notes: Vec::new(),
    };

    tracing::debug!(id = %contact.id, name = %contact.name, "contact added");
    let index = self.document.contacts.len();
    self.document.contacts.push(contact);
    Ok(&self.document.contacts[index])
  }

  /// Apply `patch` to a contact and re-derive its health and drift.
  ///
  /// Returns `Ok(false)` if the contact does not exist.
  pub fn update_contact(&mut self, id: Uuid, patch: ContactPatch) -> Result<bool> {
    let name = patch.name.as_deref().map(validate_name).transpose()?;
    let now = self.clock.now();

    let Some(contact) = self.contact_mut(id) else {
      tracing::debug!(%id, "update_contact: no such contact; ignoring");
      return Ok(false);
    };

    if let Some(name) = name {
      contact.name = name;
    }
    if let Some(phone) = patch.phone_number {
      contact.phone_number = non_blank(Some(phone));
    }
    if let Some(email) = patch.email {
      contact.email = non_blank(Some(email));
    }
    if let Some(avatar) = patch.avatar {
      contact.avatar = non_blank(Some(avatar));
    }
    if let Some(tags) = patch.tags {
      contact.tags = tags;
    }
    if let Some(days) = patch.target_frequency_days {
      contact.target_frequency_days = days;
    }
    if let Some(orbit) = patch.orbit {
      contact.orbit = orbit;
    }
    contact.refresh(now);
    Ok(true)
  }

  /// Remove a contact. Returns `false` if it did not exist.
  pub fn delete_contact(&mut self, id: Uuid) -> bool {
    let before = self.document.contacts.len();
    self.document.contacts.retain(|c| c.id != id);
    let removed = self.document.contacts.len() != before;
    if !removed {
      tracing::debug!(%id, "delete_contact: no such contact; ignoring");
    }
    removed
  }

  /// Move a contact to another orbit and re-derive its drift.
  pub fn set_orbit(&mut self, id: Uuid, orbit: Orbit) -> bool {
    let now = self.clock.now();
    let Some(contact) = self.contact_mut(id) else {
      tracing::debug!(%id, "set_orbit: no such contact; ignoring");
      return false;
    };
    contact.orbit = orbit;
    contact.refresh(now);
    true
  }

  /// Prepend a plain note. Health and XP are untouched.
  pub fn add_note(&mut self, id: Uuid, text: &str) -> bool {
    let Some(text) = non_blank(Some(text.to_owned())) else {
      return false;
    };
    let now = self.clock.now();
    let Some(contact) = self.contact_mut(id) else {
      tracing::debug!(%id, "add_note: no such contact; ignoring");
      return false;
    };
    contact.push_note(text, None, now);
    true
  }

  // ── Interactions ──────────────────────────────────────────────────────────

  /// Log an interaction with a contact.
  ///
  /// The contact becomes fully healthy and stable, XP and the interaction
  /// count are credited, and the streak is evaluated, all at a single
  /// instant. Returns the XP awarded, or `None` if the contact does not exist.
  pub fn log_interaction(
    &mut self,
    id: Uuid,
    interaction: Interaction,
  ) -> Option<u32> {
    let now = self.clock.now();
    let Some(contact) = self.contact_mut(id) else {
      tracing::debug!(%id, "log_interaction: no such contact; ignoring");
      return None;
    };

    contact.last_contacted = now;
    contact.health_score = MAX_HEALTH;
    contact.drift_status = DriftStatus::Stable;
    if let Some(note) = non_blank(interaction.note.clone()) {
      contact.push_note(note, interaction.kind, now);
    }

    let xp = interaction.xp();
    tracing::debug!(
      %id,
      kind = ?interaction.kind,
      vibe = ?interaction.vibe,
      xp,
      "interaction logged"
    );

    self.document.stats.record_interaction(xp);
    self.evaluate_streak_at(now);
    Some(xp)
  }

  // ── Derived state ─────────────────────────────────────────────────────────

  /// Re-derive every contact's health and drift against the current time.
  ///
  /// Safe to call at any time and any number of times.
  pub fn recompute_health_and_drift(&mut self) {
    let now = self.clock.now();
    for contact in &mut self.document.contacts {
      contact.refresh(now);
    }
  }

  // ── Streak and daily task ─────────────────────────────────────────────────

  pub fn evaluate_streak(&mut self) -> StreakOutcome {
    let now = self.clock.now();
    self.evaluate_streak_at(now)
  }

  fn evaluate_streak_at(&mut self, now: DateTime<Utc>) -> StreakOutcome {
    self.document.stats.evaluate_streak(&self.clock, now)
  }

  /// Complete today's task. Returns the XP awarded, which is `0` if the task
  /// was already completed today.
  pub fn complete_daily_task(&mut self, method: DailyTaskMethod) -> u32 {
    let now = self.clock.now();
    self.document.stats.complete_daily_task(&self.clock, now, method)
  }

  /// Reopen the daily task gate if it was closed on an earlier day.
  pub fn check_daily_task_reset(&mut self) -> bool {
    let now = self.clock.now();
    self.document.stats.check_daily_task_reset(&self.clock, now)
  }

  // ── Import ────────────────────────────────────────────────────────────────

  /// Add every candidate whose name is not already tracked.
  ///
  /// Names are compared trimmed and case-insensitively, against existing
  /// contacts and earlier candidates in the same batch. Candidates without a
  /// name are dropped. Returns the number of contacts added.
  pub fn import_contacts<I>(&mut self, candidates: I) -> usize
  where
    I: IntoIterator<Item = ImportCandidate>,
  {
    let mut seen: HashSet<String> = self
      .document
      .contacts
      .iter()
      .map(|c| name_key(&c.name))
      .collect();

    let mut added = 0;
    for candidate in candidates {
      let key = name_key(&candidate.name);
      if key.is_empty() || !seen.insert(key) {
        continue;
      }
      let input = NewContact {
        phone_number: candidate.phone_number,
        email: candidate.email,
        ..NewContact::new(candidate.name)
      };
      if self.add_contact(input).is_ok() {
        added += 1;
      }
    }

    tracing::info!(added, "contacts imported");
    added
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn validate_name(name: &str) -> Result<String> {
  let name = name.trim();
  if name.is_empty() {
    return Err(Error::EmptyName);
  }
  Ok(name.to_owned())
}

fn non_blank(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}

fn name_key(name: &str) -> String { name.trim().to_lowercase() }
