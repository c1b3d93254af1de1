//! `orbit`: keep the people who matter from drifting out of your life.
//!
//! # Usage
//!
//! ```
//! orbit add "Ada Lovelace" --orbit inner --every 14
//! orbit log ada --type call --vibe awesome --note "talked engines"
//! orbit list --attention
//! orbit --config ~/.config/orbit/orbit.toml stats
//! ```

mod commands;
mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use commands::Command;
use orbit_core::{
  clock::SystemClock,
  store::DocumentStore as _,
  tracker::Tracker,
};
use orbit_store_sqlite::SqliteStore;
use settings::CliConfig;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "orbit", version, about = "A personal relationship tracker")]
struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", default_value = "orbit.toml")]
  config: PathBuf,

  /// Use this database instead of the configured `store_path`.
  #[arg(long, value_name = "FILE")]
  db: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();
  let cfg = CliConfig::load(&args.config)?;
  let store_path = args
    .db
    .map(|p| settings::expand_tilde(&p))
    .unwrap_or_else(|| cfg.store_path.clone());

  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("creating {}", parent.display()))?;
  }

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let document = store
    .load()
    .await
    .context("failed to load document")?
    .unwrap_or_default();

  let mut tracker = Tracker::init(document, SystemClock)
    .with_defaults(cfg.contact_defaults());
  // Opening the app counts as activity for the streak.
  let streak = tracker.evaluate_streak();
  tracing::debug!(?streak, "streak evaluated on launch");

  let outcome = {
    let mut stdout = std::io::stdout().lock();
    commands::run(&mut tracker, args.command, &mut stdout)
  };

  // Saved even when the command failed.
  let document = tracker.dispose();
  store
    .save(&document)
    .await
    .context("failed to save document")?;

  outcome
}

#[cfg(test)]
mod tests {
  use clap::CommandFactory as _;

  use super::*;

  #[test]
  fn args_are_well_formed() { Args::command().debug_assert(); }

  #[test]
  fn parses_log_with_detail() {
    let args = Args::try_parse_from([
      "orbit", "log", "ada", "--type", "meetup", "--vibe", "good",
    ])
    .unwrap();
    assert!(matches!(args.command, Command::Log { kind: Some(_), .. }));
    assert_eq!(args.config, PathBuf::from("orbit.toml"));
  }

  #[test]
  fn vibe_requires_type() {
    let result =
      Args::try_parse_from(["orbit", "log", "ada", "--vibe", "awesome"]);
    assert!(result.is_err());
  }

  #[test]
  fn rejects_unknown_orbit() {
    assert!(Args::try_parse_from(["orbit", "move", "ada", "pluto"]).is_err());
    assert!(Args::try_parse_from(["orbit", "move", "ada", "Extended"]).is_ok());
  }
}
