//! Local draft mirror: one JSON file per project.
//!
//! This is the durability guarantee the student can rely on within a
//! session — every step transition overwrites the project's cache entry
//! synchronously before the best-effort remote push is even spawned. The
//! store is injected through `AppState` rather than reached for as ambient
//! state, so tests point it at a scratch directory.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::domain::ReportDocument;
use crate::util::safe_file_stem;

/// What the mirror stores per project: the whole document plus enough wizard
/// context to put the student back on the step they left.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CachedReport {
  pub document: ReportDocument,
  pub active_section: u8,
  #[serde(default)]
  pub saved_at_unix: u64,
}

#[derive(Clone, Debug)]
pub struct LocalCache {
  dir: PathBuf,
}

impl LocalCache {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    let dir = dir.into();
    if let Err(e) = std::fs::create_dir_all(&dir) {
      warn!(target: "impactboard_backend", dir = %dir.display(), error = %e, "Could not create cache directory");
    }
    Self { dir }
  }

  /// Build from REPORT_CACHE_DIR, defaulting to ./report_cache.
  pub fn from_env() -> Self {
    let dir = std::env::var("REPORT_CACHE_DIR").unwrap_or_else(|_| "./report_cache".into());
    info!(target: "impactboard_backend", %dir, "Local draft mirror ready");
    Self::new(dir)
  }

  fn entry_path(&self, project_id: &str) -> PathBuf {
    self.dir.join(format!("{}.json", safe_file_stem(project_id)))
  }

  /// Read the mirror entry for a project. Missing or unreadable entries are
  /// both reported as absent; a corrupt file is logged and ignored.
  pub fn read(&self, project_id: &str) -> Option<CachedReport> {
    let path = self.entry_path(project_id);
    if !path.exists() {
      return None;
    }
    match std::fs::read_to_string(&path) {
      Ok(s) => match serde_json::from_str::<CachedReport>(&s) {
        Ok(entry) => Some(entry),
        Err(e) => {
          error!(target: "impactboard_backend", path = %path.display(), error = %e, "Corrupt cache entry ignored");
          None
        }
      },
      Err(e) => {
        error!(target: "impactboard_backend", path = %path.display(), error = %e, "Failed to read cache entry");
        None
      }
    }
  }

  /// Synchronously overwrite the mirror entry for a project.
  pub fn write(&self, project_id: &str, document: &ReportDocument, active_section: u8) -> Result<(), String> {
    let entry = CachedReport {
      document: document.clone(),
      active_section,
      saved_at_unix: SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0),
    };
    let path = self.entry_path(project_id);
    let body = serde_json::to_string(&entry).map_err(|e| format!("Cache serialization failed: {e}"))?;
    std::fs::write(&path, body)
      .map_err(|e| format!("Cache write failed at {}: {e}", path.display()))
  }
}
