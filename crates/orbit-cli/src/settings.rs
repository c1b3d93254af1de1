//! Layered configuration: an optional TOML file under `ORBIT_*` environment
//! variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use orbit_core::contact::{ContactDefaults, DEFAULT_TARGET_FREQUENCY_DAYS, Orbit};
use serde::Deserialize;

const DEFAULT_STORE_PATH: &str = "~/.local/share/orbit/orbit.db";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
  /// SQLite database file; a leading `~/` is expanded.
  pub store_path:                    PathBuf,
  pub default_target_frequency_days: u32,
  pub default_orbit:                 Orbit,
}

impl Default for CliConfig {
  fn default() -> Self {
    Self {
      store_path:                    PathBuf::from(DEFAULT_STORE_PATH),
      default_target_frequency_days: DEFAULT_TARGET_FREQUENCY_DAYS,
      default_orbit:                 Orbit::default(),
    }
  }
}

impl CliConfig {
  /// Read `path` (if it exists) and overlay `ORBIT_*` variables.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("ORBIT"))
      .build()
      .context("failed to read config file")?;

    let mut cfg: CliConfig = settings
      .try_deserialize()
      .context("failed to deserialise CliConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }

  pub fn contact_defaults(&self) -> ContactDefaults {
    ContactDefaults {
      target_frequency_days: self.default_target_frequency_days,
      orbit:                 self.default_orbit,
    }
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
