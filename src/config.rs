//! Loading report configuration (validation limits) from TOML.
//!
//! See `ReportConfig` and `Limits` for the expected schema. Every limit has a
//! built-in default; the TOML file only needs the values it wants to change.

use serde::Deserialize;
use tracing::{error, info};

/// Inclusive lower/upper bound on a counted quantity (words or characters).
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub struct Bounds {
  pub min: usize,
  pub max: usize,
}

impl Bounds {
  pub const fn new(min: usize, max: usize) -> Self {
    Self { min, max }
  }
}

/// Tunable validation limits. Defaults reflect the report template the
/// dashboard ships with; a TOML override exists so programme staff can tune
/// narrative bounds without a redeploy.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Limits {
  pub problem_statement_words: Bounds,
  pub activities_words: Bounds,
  pub outcomes_words: Bounds,
  pub evidence_words: Bounds,
  pub reflection_words: Bounds,
  pub sustainability_words: Bounds,
  pub primary_sdg_chars: Bounds,
  pub max_team_members: usize,
  pub max_secondary_sdgs: usize,
}

impl Default for Limits {
  fn default() -> Self {
    Self {
      problem_statement_words: Bounds::new(50, 300),
      activities_words: Bounds::new(75, 400),
      outcomes_words: Bounds::new(50, 300),
      evidence_words: Bounds::new(30, 250),
      reflection_words: Bounds::new(50, 300),
      sustainability_words: Bounds::new(30, 250),
      primary_sdg_chars: Bounds::new(100, 1000),
      max_team_members: 19,
      max_secondary_sdgs: 2,
    }
  }
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ReportConfig {
  #[serde(default)]
  pub limits: Limits,
}

/// Attempt to load `ReportConfig` from REPORT_CONFIG_PATH. On any parsing/IO
/// error, returns None and the caller falls back to the built-in defaults.
pub fn load_report_config_from_env() -> Option<ReportConfig> {
  let path = std::env::var("REPORT_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<ReportConfig>(&s) {
      Ok(cfg) => {
        info!(target: "impactboard_backend", %path, "Loaded report config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "impactboard_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "impactboard_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn partial_toml_overrides_only_named_limits() {
    let cfg: ReportConfig = toml::from_str(
      r#"
        [limits]
        max_team_members = 9
        problem_statement_words = { min = 20, max = 120 }
      "#,
    )
    .expect("parse");

    assert_eq!(cfg.limits.max_team_members, 9);
    assert_eq!(cfg.limits.problem_statement_words, Bounds::new(20, 120));
    // Untouched limits keep their defaults.
    assert_eq!(cfg.limits.max_secondary_sdgs, 2);
    assert_eq!(cfg.limits.outcomes_words, Bounds::new(50, 300));
  }

  #[test]
  fn defaults_load_without_any_config_file() {
    let limits = Limits::default();
    assert_eq!(limits.max_team_members, 19);
    assert!(limits.problem_statement_words.min < limits.problem_statement_words.max);
  }
}
