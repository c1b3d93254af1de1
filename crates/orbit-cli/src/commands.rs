//! Subcommands and their terminal output.
//!
//! Every command runs against an already-initialised [`Tracker`] and writes
//! its human-readable result to `out`. Persistence is left to the caller.

use std::{collections::BTreeSet, io::Write, path::PathBuf};

use anyhow::{Context as _, bail};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use orbit_core::{
  clock::{Clock, elapsed_days},
  contact::{Contact, ContactPatch, NewContact, Orbit},
  interaction::{Interaction, InteractionType, Vibe},
  stats::DailyTaskMethod,
  tracker::Tracker,
};
use uuid::Uuid;

// ─── Command definitions ─────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Start tracking a new contact.
  Add {
    name:   String,
    #[command(flatten)]
    fields: ContactFields,
  },

  /// Change a contact's details.
  Edit {
    /// Contact id prefix or exact name.
    contact:    String,
    #[arg(long)]
    name:       Option<String>,
    #[command(flatten)]
    fields:     ContactFields,
    /// Remove every tag before applying `--tag`.
    #[arg(long)]
    clear_tags: bool,
  },

  /// Stop tracking a contact.
  Rm { contact: String },

  /// Record that you were in touch with someone.
  Log {
    contact: String,
    /// How you talked: call, text, meetup, email, social, other.
    #[arg(long = "type", value_name = "TYPE")]
    kind:    Option<InteractionType>,
    /// How it went: awesome, good, neutral, awkward.
    #[arg(long, requires = "kind")]
    vibe:    Option<Vibe>,
    #[arg(long)]
    note:    Option<String>,
  },

  /// Attach a free-text note to a contact.
  Note { contact: String, text: String },

  /// Move a contact to another orbit.
  Move { contact: String, orbit: Orbit },

  /// List contacts.
  List {
    /// Only show contacts that are drifting away, least healthy first.
    #[arg(long)]
    attention: bool,
  },

  /// Show one contact in full.
  Show { contact: String },

  /// Show points, streak and daily task status.
  Stats,

  /// Complete today's task (`pay` or `ad`).
  Daily { method: DailyTaskMethod },

  /// Import contacts from a vCard file.
  Import { file: PathBuf },

  /// Print the whole document as JSON.
  Export,
}

/// Optional fields shared by `add` and `edit`.
#[derive(Args, Debug, Default)]
pub struct ContactFields {
  #[arg(long)]
  pub phone:  Option<String>,
  #[arg(long)]
  pub email:  Option<String>,
  #[arg(long)]
  pub avatar: Option<String>,
  #[arg(long = "tag", value_name = "TAG")]
  pub tags:   Vec<String>,
  /// Expected cadence in days; 0 means no expectation.
  #[arg(long, value_name = "DAYS")]
  pub every:  Option<u32>,
  #[arg(long)]
  pub orbit:  Option<Orbit>,
}

impl ContactFields {
  fn tag_set(&self) -> BTreeSet<String> {
    self
      .tags
      .iter()
      .map(|t| t.trim().to_owned())
      .filter(|t| !t.is_empty())
      .collect()
  }
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

pub fn run<C: Clock>(
  tracker: &mut Tracker<C>,
  command: Command,
  out: &mut impl Write,
) -> anyhow::Result<()> {
  match command {
    Command::Add { name, fields } => {
      let input = NewContact {
        phone_number: fields.phone.clone(),
        email: fields.email.clone(),
        avatar: fields.avatar.clone(),
        tags: fields.tag_set(),
        target_frequency_days: fields.every,
        orbit: fields.orbit,
        ..NewContact::new(name)
      };
      let contact = tracker.add_contact(input)?;
      writeln!(out, "added {} ({})", contact.name, short_id(contact.id))?;
    }

    Command::Edit {
      contact,
      name,
      fields,
      clear_tags,
    } => {
      let id = resolve(tracker, &contact)?;
      let tags = match (clear_tags, fields.tags.is_empty()) {
        (false, true) => None,
        (true, _) => Some(fields.tag_set()),
        (false, false) => {
          let mut tags = tracker
            .contact(id)
            .map(|c| c.tags.clone())
            .unwrap_or_default();
          tags.extend(fields.tag_set());
          Some(tags)
        }
      };
      let patch = ContactPatch {
        name,
        phone_number: fields.phone,
        email: fields.email,
        avatar: fields.avatar,
        tags,
        target_frequency_days: fields.every,
        orbit: fields.orbit,
      };
      if patch.is_empty() {
        bail!("nothing to change");
      }
      tracker.update_contact(id, patch)?;
      writeln!(out, "updated {}", short_id(id))?;
    }

    Command::Rm { contact } => {
      let id = resolve(tracker, &contact)?;
      tracker.delete_contact(id);
      writeln!(out, "removed {}", short_id(id))?;
    }

    Command::Log {
      contact,
      kind,
      vibe,
      note,
    } => {
      let id = resolve(tracker, &contact)?;
      let interaction = Interaction { kind, vibe, note };
      let streak_before = tracker.stats().current_streak;
      let xp = tracker
        .log_interaction(id, interaction)
        .context("contact disappeared while logging")?;
      let stats = tracker.stats();
      writeln!(out, "+{xp} XP ({} total)", stats.points)?;
      if stats.current_streak != streak_before {
        writeln!(out, "streak: {} days", stats.current_streak)?;
      }
    }

    Command::Note { contact, text } => {
      let id = resolve(tracker, &contact)?;
      if !tracker.add_note(id, &text) {
        bail!("note text is empty");
      }
      writeln!(out, "noted")?;
    }

    Command::Move { contact, orbit } => {
      let id = resolve(tracker, &contact)?;
      tracker.set_orbit(id, orbit);
      writeln!(out, "moved {} to {orbit}", short_id(id))?;
    }

    Command::List { attention } => {
      let now = tracker.clock().now();
      let contacts: Vec<&Contact> = if attention {
        tracker.needs_attention()
      } else {
        let mut all: Vec<&Contact> = tracker.contacts().iter().collect();
        all.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        all
      };
      if contacts.is_empty() {
        let msg = if attention {
          "everyone is in orbit"
        } else {
          "no contacts yet"
        };
        writeln!(out, "{msg}")?;
      }
      for contact in contacts {
        print_row(out, contact, now)?;
      }
    }

    Command::Show { contact } => {
      let id = resolve(tracker, &contact)?;
      let contact = tracker.contact(id).context("no such contact")?;
      print_contact(out, tracker.clock(), contact)?;
    }

    Command::Stats => {
      let stats = tracker.stats();
      writeln!(out, "points:        {}", stats.points)?;
      writeln!(out, "streak:        {} days", stats.current_streak)?;
      writeln!(out, "best streak:   {} days", stats.longest_streak)?;
      writeln!(out, "interactions:  {}", stats.total_interactions)?;
      let daily = if stats.daily_task_completed {
        "done"
      } else {
        "open"
      };
      writeln!(out, "daily task:    {daily}")?;
    }

    Command::Daily { method } => {
      let xp = tracker.complete_daily_task(method);
      if xp == 0 {
        writeln!(out, "daily task already completed today")?;
      } else {
        writeln!(out, "+{xp} XP ({} total)", tracker.stats().points)?;
      }
    }

    Command::Import { file } => {
      let raw = std::fs::read_to_string(&file)
        .with_context(|| format!("reading {}", file.display()))?;
      let candidates = orbit_vcard::parse_candidates(&raw);
      let found = candidates.len();
      let added = tracker.import_contacts(candidates);
      writeln!(out, "imported {added} of {found} contacts")?;
    }

    Command::Export => {
      writeln!(out, "{}", tracker.document().to_json_pretty()?)?;
    }
  }
  Ok(())
}

// ─── Contact lookup ──────────────────────────────────────────────────────────

/// Shortest id prefix accepted when no name matches.
const MIN_ID_PREFIX: usize = 4;

/// Resolve a user-supplied reference to a contact id.
///
/// An exact (case-insensitive) name wins. Otherwise the query must be a
/// unique id prefix of at least [`MIN_ID_PREFIX`] characters.
pub fn resolve<C: Clock>(tracker: &Tracker<C>, query: &str) -> anyhow::Result<Uuid> {
  let query = query.trim();
  if query.is_empty() {
    bail!("no contact given");
  }

  let name = query.to_lowercase();
  let by_name: Vec<Uuid> = tracker
    .contacts()
    .iter()
    .filter(|c| c.name.to_lowercase() == name)
    .map(|c| c.id)
    .collect();
  match by_name.as_slice() {
    [id] => return Ok(*id),
    [] => {}
    many => bail!("{} contacts are named {query:?}; use an id", many.len()),
  }

  if query.len() < MIN_ID_PREFIX {
    bail!("no contact matches {query:?}");
  }
  let prefix = query.to_ascii_lowercase();
  let by_id: Vec<Uuid> = tracker
    .contacts()
    .iter()
    .map(|c| c.id)
    .filter(|id| id.to_string().starts_with(&prefix))
    .collect();
  match by_id.as_slice() {
    [id] => Ok(*id),
    [] => bail!("no contact matches {query:?}"),
    many => bail!("{query:?} matches {} contacts; use a longer id", many.len()),
  }
}

// ─── Formatting ──────────────────────────────────────────────────────────────

fn short_id(id: Uuid) -> String { id.to_string()[..8].to_owned() }

fn ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
  match elapsed_days(then, now) {
    0 => "just now".to_owned(),
    1 => "1 day ago".to_owned(),
    n => format!("{n} days ago"),
  }
}

fn print_row(
  out: &mut impl Write,
  contact: &Contact,
  now: DateTime<Utc>,
) -> std::io::Result<()> {
  writeln!(
    out,
    "{}  {:<24}  {:<8}  {:>3}  {:<8}  {}",
    short_id(contact.id),
    contact.name,
    contact.orbit,
    contact.health_score,
    contact.drift_status,
    ago(contact.last_contacted, now),
  )
}

fn print_contact<C: Clock>(
  out: &mut impl Write,
  clock: &C,
  contact: &Contact,
) -> std::io::Result<()> {
  let offset = clock.offset();
  let now = clock.now();

  writeln!(out, "{}", contact.name)?;
  writeln!(out, "  id:      {}", contact.id)?;
  if let Some(phone) = &contact.phone_number {
    writeln!(out, "  phone:   {phone}")?;
  }
  if let Some(email) = &contact.email {
    writeln!(out, "  email:   {email}")?;
  }
  if !contact.tags.is_empty() {
    let tags: Vec<&str> = contact.tags.iter().map(String::as_str).collect();
    writeln!(out, "  tags:    {}", tags.join(", "))?;
  }
  writeln!(out, "  orbit:   {}", contact.orbit)?;
  match contact.target_frequency_days {
    0 => writeln!(out, "  cadence: none")?,
    days => writeln!(out, "  cadence: every {days} days")?,
  }
  writeln!(
    out,
    "  health:  {} ({})",
    contact.health_score, contact.drift_status
  )?;
  writeln!(out, "  last:    {}", ago(contact.last_contacted, now))?;

  if !contact.notes.is_empty() {
    writeln!(out, "  notes:")?;
    for note in &contact.notes {
      let at = note.timestamp.with_timezone(&offset).format("%Y-%m-%d %H:%M");
      match note.interaction_type {
        Some(kind) => writeln!(out, "    {at} [{kind}] {}", note.text)?,
        None => writeln!(out, "    {at} {}", note.text)?,
      }
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone as _};
  use orbit_core::{clock::ManualClock, document::Document};

  use super::*;

  fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
  }

  fn exec<C: Clock>(tracker: &mut Tracker<C>, command: Command) -> String {
    let mut out = Vec::new();
    run(tracker, command, &mut out).unwrap();
    String::from_utf8(out).unwrap()
  }

  fn add(tracker: &mut Tracker<&ManualClock>, name: &str) -> Uuid {
    tracker.add_contact(NewContact::new(name)).unwrap().id
  }

  #[test]
  fn resolve_by_prefix_and_name() {
    let clock = clock();
    let mut tracker = Tracker::init(Document::default(), &clock);
    let alice = add(&mut tracker, "Alice");
    add(&mut tracker, "Bob");

    let full = alice.to_string();
    assert_eq!(resolve(&tracker, &full).unwrap(), alice);
    assert_eq!(resolve(&tracker, &full[..12]).unwrap(), alice);
    assert_eq!(resolve(&tracker, "alice").unwrap(), alice);
    assert!(resolve(&tracker, "Carol").is_err());
    assert!(resolve(&tracker, "  ").is_err());
  }

  /// Re-open `tracker`'s document with the named contacts' ids replaced.
  fn with_ids<'c>(
    tracker: Tracker<&'c ManualClock>,
    ids: &[(&str, &str)],
  ) -> Tracker<&'c ManualClock> {
    let clock = *tracker.clock();
    let mut document = tracker.dispose();
    for (name, id) in ids {
      let contact = document
        .contacts
        .iter_mut()
        .find(|c| c.name == *name)
        .unwrap();
      contact.id = Uuid::parse_str(id).unwrap();
    }
    Tracker::init(document, clock)
  }

  #[test]
  fn resolve_prefers_name_over_hex_id_prefix() {
    let clock = clock();
    let mut tracker = Tracker::init(Document::default(), &clock);
    add(&mut tracker, "Zed");
    add(&mut tracker, "Ed");
    let mut tracker = with_ids(tracker, &[
      ("Zed", "ed000000-0000-4000-8000-000000000000"),
      ("Ed", "11111111-1111-4111-8111-111111111111"),
    ]);
    let ed = tracker.contacts()[1].id;

    assert_eq!(resolve(&tracker, "Ed").unwrap(), ed);
    assert_eq!(resolve(&tracker, "ed").unwrap(), ed);

    exec(&mut tracker, Command::Log {
      contact: "Ed".into(),
      kind:    None,
      vibe:    None,
      note:    Some("lunch".into()),
    });
    assert_eq!(tracker.contact(ed).unwrap().notes.len(), 1);
    assert!(tracker.contacts()[0].notes.is_empty());
  }

  #[test]
  fn resolve_requires_minimum_id_prefix() {
    let clock = clock();
    let mut tracker = Tracker::init(Document::default(), &clock);
    add(&mut tracker, "Abe");
    let tracker = with_ids(tracker, &[(
      "Abe",
      "abcdef00-0000-4000-8000-000000000000",
    )]);
    let abe = tracker.contacts()[0].id;

    assert!(resolve(&tracker, "abc").is_err());
    assert_eq!(resolve(&tracker, "abcd").unwrap(), abe);
  }

  #[test]
  fn resolve_rejects_duplicate_names() {
    let clock = clock();
    let mut tracker = Tracker::init(Document::default(), &clock);
    let first = add(&mut tracker, "Sam");
    add(&mut tracker, "sam");

    assert!(resolve(&tracker, "Sam").is_err());
    assert_eq!(resolve(&tracker, &first.to_string()).unwrap(), first);
  }

  #[test]
  fn add_applies_flags() {
    let clock = clock();
    let mut tracker = Tracker::init(Document::default(), &clock);
    let out = exec(&mut tracker, Command::Add {
      name:   "Dana".into(),
      fields: ContactFields {
        email: Some("dana@example.com".into()),
        tags: vec!["work".into(), " ".into()],
        every: Some(7),
        orbit: Some(Orbit::Inner),
        ..ContactFields::default()
      },
    });
    assert!(out.starts_with("added Dana"));

    let dana = &tracker.contacts()[0];
    assert_eq!(dana.email.as_deref(), Some("dana@example.com"));
    assert_eq!(dana.tags.len(), 1);
    assert_eq!(dana.target_frequency_days, 7);
    assert_eq!(dana.orbit, Orbit::Inner);
  }

  #[test]
  fn edit_without_changes_is_an_error() {
    let clock = clock();
    let mut tracker = Tracker::init(Document::default(), &clock);
    add(&mut tracker, "Eve");

    let mut out = Vec::new();
    let result = run(
      &mut tracker,
      Command::Edit {
        contact:    "Eve".into(),
        name:       None,
        fields:     ContactFields::default(),
        clear_tags: false,
      },
      &mut out,
    );
    assert!(result.is_err());
  }

  #[test]
  fn edit_merges_tags_unless_cleared() {
    let clock = clock();
    let mut tracker = Tracker::init(Document::default(), &clock);
    let id = add(&mut tracker, "Finn");

    let tagged = |tags: &[&str]| ContactFields {
      tags: tags.iter().map(|t| t.to_string()).collect(),
      ..ContactFields::default()
    };
    exec(&mut tracker, Command::Edit {
      contact:    "Finn".into(),
      name:       None,
      fields:     tagged(&["climbing"]),
      clear_tags: false,
    });
    exec(&mut tracker, Command::Edit {
      contact:    "Finn".into(),
      name:       None,
      fields:     tagged(&["work"]),
      clear_tags: false,
    });
    assert_eq!(tracker.contact(id).unwrap().tags.len(), 2);

    exec(&mut tracker, Command::Edit {
      contact:    "Finn".into(),
      name:       None,
      fields:     ContactFields::default(),
      clear_tags: true,
    });
    assert!(tracker.contact(id).unwrap().tags.is_empty());
  }

  #[test]
  fn log_reports_xp_and_streak() {
    let clock = clock();
    let mut tracker = Tracker::init(Document::default(), &clock);
    add(&mut tracker, "Gus");

    let out = exec(&mut tracker, Command::Log {
      contact: "Gus".into(),
      kind:    Some(InteractionType::Call),
      vibe:    Some(Vibe::Awesome),
      note:    Some("long catch-up".into()),
    });
    assert!(out.contains("+40 XP (40 total)"), "{out}");
    assert!(out.contains("streak: 1 days"), "{out}");

    let shown = exec(&mut tracker, Command::Show {
      contact: "Gus".into(),
    });
    assert!(shown.contains("[call] long catch-up"), "{shown}");
  }

  #[test]
  fn daily_twice_reports_already_done() {
    let clock = clock();
    let mut tracker = Tracker::init(Document::default(), &clock);

    let first = exec(&mut tracker, Command::Daily {
      method: DailyTaskMethod::Ad,
    });
    assert!(first.contains("+50 XP"));
    let second = exec(&mut tracker, Command::Daily {
      method: DailyTaskMethod::Pay,
    });
    assert!(second.contains("already completed"));
    assert_eq!(tracker.stats().points, 50);
  }

  #[test]
  fn list_attention_shows_only_drifting() {
    let clock = clock();
    let mut tracker = Tracker::init(Document::default(), &clock);
    tracker
      .add_contact(NewContact {
        orbit: Some(Orbit::Inner),
        ..NewContact::new("Hana")
      })
      .unwrap();
    clock.advance(Duration::days(45));
    add(&mut tracker, "Ivo");
    tracker.recompute_health_and_drift();

    let out = exec(&mut tracker, Command::List { attention: true });
    assert!(out.contains("Hana"));
    assert!(!out.contains("Ivo"));

    let all = exec(&mut tracker, Command::List { attention: false });
    assert!(all.contains("Hana") && all.contains("Ivo"));
  }

  #[test]
  fn import_reads_vcard_file() {
    let clock = clock();
    let mut tracker = Tracker::init(Document::default(), &clock);
    add(&mut tracker, "Jo");

    let path = std::env::temp_dir()
      .join(format!("orbit-cli-import-{}.vcf", std::process::id()));
    std::fs::write(
      &path,
      "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:Jo\r\nEND:VCARD\r\n\
       BEGIN:VCARD\r\nVERSION:3.0\r\nFN:Kai\r\nTEL:+1 555 0100\r\nEND:VCARD\r\n",
    )
    .unwrap();

    let out = exec(&mut tracker, Command::Import { file: path.clone() });
    let _ = std::fs::remove_file(&path);

    assert_eq!(out.trim(), "imported 1 of 2 contacts");
    let kai = tracker.contact(resolve(&tracker, "kai").unwrap()).unwrap();
    assert_eq!(kai.phone_number.as_deref(), Some("+1 555 0100"));
  }

  #[test]
  fn export_is_loadable_json() {
    let clock = clock();
    let mut tracker = Tracker::init(Document::default(), &clock);
    add(&mut tracker, "Lee");

    let out = exec(&mut tracker, Command::Export);
    let document = Document::from_json(&out).unwrap();
    assert_eq!(&document, tracker.document());
  }
}
