//! Application state: report sessions, the remote API client, the local
//! draft mirror, and validation limits.
//!
//! This module owns:
//!   - the session store, keyed by "{student_id}:{project_id}" so exactly one
//!     in-memory document exists per pair at a time
//!   - the optional remote report API client (absent env -> degraded mode on
//!     the local mirror only)
//!   - the local cache mirror and the tunable validation limits
//!
//! All session mutation runs inside synchronous critical sections behind the
//! store's write lock; nothing awaits while a session is borrowed.

use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::api::ReportApi;
use crate::cache::LocalCache;
use crate::config::{load_report_config_from_env, Limits};
use crate::wizard::WizardState;

/// One open editing session: the wizard plus the identity of its owner.
#[derive(Clone, Debug)]
pub struct ReportSession {
  pub student_id: String,
  pub project_id: String,
  pub wizard: WizardState,
}

#[derive(Clone)]
pub struct AppState {
  pub sessions: Arc<RwLock<HashMap<String, ReportSession>>>,
  pub api: Option<ReportApi>,
  pub cache: LocalCache,
  pub limits: Limits,
}

impl AppState {
  /// Build state from env: load limits config, open the local mirror, and
  /// construct the remote API client if configured.
  #[instrument(level = "info", skip_all)]
  pub fn new() -> Self {
    let limits = load_report_config_from_env()
      .map(|c| c.limits)
      .unwrap_or_default();

    let cache = LocalCache::from_env();

    let api = ReportApi::from_env();
    match &api {
      Some(api) => {
        info!(target: "impactboard_backend", base_url = %api.base_url, "Remote report API enabled.");
      }
      None => {
        info!(target: "impactboard_backend", "Remote report API disabled (no REPORT_API_BASE_URL). Drafts stay in the local mirror.");
      }
    }

    Self {
      sessions: Arc::new(RwLock::new(HashMap::new())),
      api,
      cache,
      limits,
    }
  }

  pub fn session_key(student_id: &str, project_id: &str) -> String {
    format!("{student_id}:{project_id}")
  }

  /// Insert (or replace) the session for a (student, project) pair.
  pub async fn insert_session(&self, session: ReportSession) -> String {
    let key = Self::session_key(&session.student_id, &session.project_id);
    self.sessions.write().await.insert(key.clone(), session);
    key
  }

  /// Tear down a session; durable state lives in the mirror and the remote
  /// draft record, so this only drops the in-memory copy.
  #[allow(dead_code)]
  pub async fn drop_session(&self, key: &str) -> bool {
    self.sessions.write().await.remove(key).is_some()
  }

  /// Run a closure against a mutable session inside one synchronous critical
  /// section. Returns Err for an unknown key.
  pub async fn mutate_session<T>(
    &self,
    key: &str,
    f: impl FnOnce(&mut ReportSession) -> T,
  ) -> Result<T, String> {
    let mut sessions = self.sessions.write().await;
    match sessions.get_mut(key) {
      Some(session) => Ok(f(session)),
      None => Err(format!("Unknown session: {key}")),
    }
  }

  /// Read-only variant of `mutate_session`.
  pub async fn read_session<T>(
    &self,
    key: &str,
    f: impl FnOnce(&ReportSession) -> T,
  ) -> Result<T, String> {
    let sessions = self.sessions.read().await;
    match sessions.get(key) {
      Some(session) => Ok(f(session)),
      None => Err(format!("Unknown session: {key}")),
    }
  }
}
