//! Hydration and persistence coordination.
//!
//! On session start the coordinator reconciles three potential sources into
//! one wizard state, in strict precedence order:
//!   1. a structured remote record (status not "none"),
//!   2. the local mirror entry for the project (also the fallback when the
//!      remote record is legacy/flat or the fetch fails),
//!   3. an empty document.
//! On every step transition and explicit save it dual-writes: a synchronous
//! local mirror overwrite, then a detached best-effort draft push that the
//! navigation path never awaits.

use serde_json::{json, Value};
use tracing::{error, info, instrument, warn};

use crate::api::{RemoteRecord, RemoteStatus, RosterMember, StructuredRecord};
use crate::cache::CachedReport;
use crate::domain::{Member, ParticipationType, ReportDocument};
use crate::state::{AppState, ReportSession};
use crate::validators::is_valid_mobile;
use crate::wizard::WizardState;

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HydrationSource {
  Remote,
  Cache,
  Empty,
}

pub struct Hydration {
  pub wizard: WizardState,
  pub source: HydrationSource,
  pub notice: Option<String>,
}

/// Pure precedence decision between whatever the remote and the mirror
/// produced. A legacy remote record never hydrates directly; it falls through
/// to the mirror like an absent record does.
pub enum DocumentSource {
  Remote(StructuredRecord),
  Cache(CachedReport),
  Empty,
}

pub fn choose_source(
  remote: Option<RemoteRecord>,
  cached: Option<CachedReport>,
) -> DocumentSource {
  match remote {
    Some(RemoteRecord::Structured(record)) => DocumentSource::Remote(record),
    Some(RemoteRecord::Legacy(_)) | None => match cached {
      Some(entry) => DocumentSource::Cache(entry),
      None => DocumentSource::Empty,
    },
  }
}

/// Reconstruct wizard state for (student, project) from remote and local
/// sources. Network failures degrade down the chain with a non-fatal notice;
/// the student is never blocked.
#[instrument(level = "info", skip(app), fields(%student_id, %project_id))]
pub async fn hydrate(app: &AppState, student_id: &str, project_id: &str) -> Hydration {
  let cached = app.cache.read(project_id);
  let mut notice: Option<String> = None;
  let mut remote_status: Option<RemoteStatus> = None;
  let mut remote_record: Option<RemoteRecord> = None;

  if let Some(api) = &app.api {
    match api.fetch_report_status(student_id, project_id).await {
      Ok(Some(status)) => {
        match api.fetch_report_by_id(&status.report_id).await {
          Ok(record) => {
            if matches!(record, RemoteRecord::Legacy(_)) {
              info!(target: "report", %project_id, "Remote record is legacy-shaped; falling back to the local mirror");
            }
            remote_record = Some(record);
          }
          Err(e) => {
            error!(target: "report", %project_id, error = %e, "Full record fetch failed");
            notice = Some("Could not load the saved report; showing locally saved data.".into());
          }
        }
        remote_status = Some(status);
      }
      Ok(None) => {}
      Err(e) => {
        error!(target: "report", %project_id, error = %e, "Status lookup failed");
        notice = Some("Could not reach the report service; working from locally saved data.".into());
      }
    }
  }

  let (mut wizard, source) = match choose_source(remote_record, cached) {
    DocumentSource::Remote(record) => {
      let document = ReportDocument {
        report_id: record
          .report_id
          .or_else(|| remote_status.as_ref().map(|s| s.report_id.clone())),
        project_id: project_id.to_string(),
        sections: record.sections,
      };
      let mut wizard = WizardState::new(document);
      wizard.apply_status(record.status);
      if let Some(section) = record.current_section {
        wizard.go_to(section);
      }
      (wizard, HydrationSource::Remote)
    }
    DocumentSource::Cache(entry) => {
      let mut document = entry.document;
      document.project_id = project_id.to_string();
      let mut wizard = WizardState::new(document);
      wizard.go_to(entry.active_section);
      (wizard, HydrationSource::Cache)
    }
    DocumentSource::Empty => (
      WizardState::new(ReportDocument::empty(project_id)),
      HydrationSource::Empty,
    ),
  };

  // The status endpoint is the lifecycle source of truth: it locks the
  // session even when the document itself came from a fallback source.
  if let Some(status) = &remote_status {
    wizard.apply_status(status.status);
    if wizard.document.report_id.is_none() {
      wizard.document.report_id = Some(status.report_id.clone());
    }
  }

  // One-time roster seed: only while nobody has been entered yet.
  if !wizard.read_only && wizard.document.sections.participation.is_untouched() {
    if let Some(api) = &app.api {
      match api.fetch_project_roster(project_id).await {
        Ok(roster) if !roster.is_empty() => {
          seed_participation(&mut wizard.document, &roster);
        }
        Ok(_) => {}
        Err(e) => {
          warn!(target: "report", %project_id, error = %e, "Roster fetch failed; skipping seed");
        }
      }
    }
  }

  info!(target: "report", %project_id, ?source, read_only = wizard.read_only, section = wizard.active_section, "Session hydrated");
  Hydration { wizard, source, notice }
}

/// Map an externally supplied roster into the participation section. Members
/// lacking a name or a well-formed mobile number are silently dropped — the
/// seed runs before the student has had any chance to edit, so there is
/// nothing actionable to report. If nothing survives the filter the section
/// is left untouched.
pub fn seed_participation(doc: &mut ReportDocument, roster: &[RosterMember]) {
  let members: Vec<Member> = roster
    .iter()
    .filter(|m| !m.name.trim().is_empty() && is_valid_mobile(&m.mobile))
    .map(|m| Member {
      name: m.name.trim().to_string(),
      cnic: m.cnic.clone(),
      mobile: m.mobile.clone(),
      email: m.email.clone(),
      university: m.university.clone(),
      degree: m.degree.clone(),
      hours: 0.0,
      role: String::new(),
    })
    .collect();

  if members.is_empty() {
    return;
  }

  let participation = &mut doc.sections.participation;
  participation.participation_type = ParticipationType::Team;
  participation.team_members = members;
}

/// Dual write for one session snapshot. The mirror write is synchronous and
/// is the durability guarantee; the remote push is spawned and forgotten.
/// Read-only sessions persist nothing — there is no draft to keep for a
/// submitted report.
pub fn persist_snapshot(app: &AppState, session: &ReportSession) {
  if session.wizard.read_only {
    return;
  }
  if let Err(e) = app.cache.write(
    &session.project_id,
    &session.wizard.document,
    session.wizard.active_section,
  ) {
    error!(target: "report", project_id = %session.project_id, error = %e, "Local mirror write failed");
  }
  spawn_draft_push(app, session);
}

fn spawn_draft_push(app: &AppState, session: &ReportSession) {
  let Some(api) = app.api.clone() else { return };
  let payload = draft_payload(&session.student_id, &session.wizard);
  let project_id = session.project_id.clone();
  tokio::spawn(async move {
    if let Err(e) = api.push_draft(&payload).await {
      // Swallowed by design of the call site: the mirror already holds the
      // snapshot. Logged for diagnostics only.
      error!(target: "report", %project_id, error = %e, "Draft push failed");
    }
  });
}

/// Draft snapshot wire payload: every section spread at the top level, tagged
/// with the owning pair, the active section, and the draft status marker.
pub fn draft_payload(student_id: &str, wizard: &WizardState) -> Value {
  let mut payload = match serde_json::to_value(&wizard.document.sections) {
    Ok(Value::Object(map)) => map,
    _ => serde_json::Map::new(),
  };
  payload.insert("studentId".into(), json!(student_id));
  payload.insert("projectId".into(), json!(wizard.document.project_id));
  if let Some(report_id) = &wizard.document.report_id {
    payload.insert("reportId".into(), json!(report_id));
  }
  payload.insert("currentSection".into(), json!(wizard.active_section));
  payload.insert("status".into(), json!("draft"));
  Value::Object(payload)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::LocalCache;
  use crate::config::Limits;
  use crate::domain::ReportStatus;
  use std::{collections::HashMap, sync::Arc};
  use tokio::sync::RwLock;

  fn structured(discipline: &str) -> StructuredRecord {
    let mut doc = ReportDocument::empty("p-1");
    doc.sections.project_context.discipline = discipline.into();
    StructuredRecord {
      report_id: Some("r-1".into()),
      status: ReportStatus::Draft,
      current_section: Some(3),
      sections: doc.sections,
    }
  }

  fn cached(discipline: &str) -> CachedReport {
    let mut doc = ReportDocument::empty("p-1");
    doc.sections.project_context.discipline = discipline.into();
    CachedReport { document: doc, active_section: 5, saved_at_unix: 0 }
  }

  #[test]
  fn structured_remote_record_beats_the_mirror() {
    let source = choose_source(
      Some(RemoteRecord::Structured(structured("from remote"))),
      Some(cached("from cache")),
    );
    match source {
      DocumentSource::Remote(record) => {
        assert_eq!(record.sections.project_context.discipline, "from remote");
      }
      _ => panic!("expected the remote record"),
    }
  }

  #[test]
  fn legacy_remote_record_falls_back_to_the_mirror() {
    let source = choose_source(
      Some(RemoteRecord::Legacy(serde_json::json!({ "q1": "flat" }))),
      Some(cached("from cache")),
    );
    match source {
      DocumentSource::Cache(entry) => {
        assert_eq!(entry.document.sections.project_context.discipline, "from cache");
      }
      _ => panic!("expected the mirror entry"),
    }
  }

  #[test]
  fn nothing_anywhere_means_an_empty_document() {
    assert!(matches!(choose_source(None, None), DocumentSource::Empty));
    assert!(matches!(
      choose_source(Some(RemoteRecord::Legacy(serde_json::json!({}))), None),
      DocumentSource::Empty
    ));
  }

  #[test]
  fn roster_seed_drops_members_without_name_or_valid_mobile() {
    let mut doc = ReportDocument::empty("p-1");
    let roster = vec![
      RosterMember { name: "Aisha Khan".into(), mobile: "0301-1234567".into(), ..RosterMember::default() },
      RosterMember { name: "".into(), mobile: "03001234567".into(), ..RosterMember::default() },
      RosterMember { name: "Bilal Ahmed".into(), mobile: "12345".into(), ..RosterMember::default() },
    ];

    seed_participation(&mut doc, &roster);

    let p = &doc.sections.participation;
    assert_eq!(p.participation_type, ParticipationType::Team);
    assert_eq!(p.team_members.len(), 1);
    assert_eq!(p.team_members[0].name, "Aisha Khan");
  }

  #[test]
  fn roster_seed_with_no_usable_members_leaves_the_section_untouched() {
    let mut doc = ReportDocument::empty("p-1");
    let roster = vec![RosterMember { name: "".into(), ..RosterMember::default() }];
    seed_participation(&mut doc, &roster);
    assert_eq!(doc.sections.participation.participation_type, ParticipationType::Individual);
    assert!(doc.sections.participation.team_members.is_empty());
  }

  #[test]
  fn draft_payload_carries_the_pair_the_section_and_the_marker() {
    let mut wizard = WizardState::new(ReportDocument::empty("p-7"));
    wizard.go_to(4);
    let payload = draft_payload("s-2", &wizard);

    assert_eq!(payload["studentId"], "s-2");
    assert_eq!(payload["projectId"], "p-7");
    assert_eq!(payload["currentSection"], 4);
    assert_eq!(payload["status"], "draft");
    assert!(payload.get("participation").is_some());
    assert!(payload.get("declaration").is_some());
  }

  fn offline_state(cache: LocalCache) -> AppState {
    AppState {
      sessions: Arc::new(RwLock::new(HashMap::new())),
      api: None,
      cache,
      limits: Limits::default(),
    }
  }

  #[tokio::test]
  async fn offline_hydration_prefers_the_mirror_then_empty() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let cache = LocalCache::new(tmp.path());

    let mut doc = ReportDocument::empty("p-1");
    doc.sections.project_context.discipline = "Sociology".into();
    cache.write("p-1", &doc, 6).expect("seed mirror");

    let app = offline_state(cache);

    let fresh = hydrate(&app, "s-1", "p-0").await;
    assert_eq!(fresh.source, HydrationSource::Empty);
    assert_eq!(fresh.wizard.active_section, 1);

    let mirrored = hydrate(&app, "s-1", "p-1").await;
    assert_eq!(mirrored.source, HydrationSource::Cache);
    assert_eq!(mirrored.wizard.active_section, 6);
    assert_eq!(
      mirrored.wizard.document.sections.project_context.discipline,
      "Sociology"
    );
  }
}
