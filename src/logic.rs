//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Opening a report session (hydration + session-store insert)
//!   - Section patching, validation, and field-error lookup
//!   - Validation-gated navigation with dual-write persistence
//!   - Explicit draft save and final submission

use serde_json::Value;
use tracing::{info, instrument};

use crate::domain::{ReportDocument, ReportStatus};
use crate::hydrate::{draft_payload, hydrate, persist_snapshot, HydrationSource};
use crate::packager::{flatten_document, FieldValue};
use crate::protocol::SessionSnapshot;
use crate::state::{AppState, ReportSession};
use crate::validators::{validate_section, ValidationError, ValidationResult, REGISTERED_SECTIONS};

/// Result of an advance/retreat request.
#[derive(Clone, Debug)]
pub enum MoveOutcome {
  Moved { active_section: u8 },
  Blocked { section: u8, errors: Vec<ValidationError> },
}

/// Result of a final submission request. All three variants leave the
/// in-memory document intact; only `Accepted` changes the session (it locks).
#[derive(Clone, Debug)]
pub enum SubmitOutcome {
  Invalid { section: u8, errors: Vec<ValidationError> },
  Failed { message: String },
  Accepted { message: Option<String> },
}

fn to_snapshot(key: &str, session: &ReportSession, source: HydrationSource, notice: Option<String>) -> SessionSnapshot {
  SessionSnapshot {
    session_key: key.to_string(),
    active_section: session.wizard.active_section,
    section_title: ReportDocument::section_title(session.wizard.active_section)
      .unwrap_or_default()
      .to_string(),
    read_only: session.wizard.read_only,
    status: session.wizard.status,
    source,
    notice,
    document: session.wizard.document.clone(),
  }
}

/// Open (or re-open) the report session for a (student, project) pair.
#[instrument(level = "info", skip(state), fields(%student_id, %project_id))]
pub async fn open_report(state: &AppState, student_id: &str, project_id: &str) -> SessionSnapshot {
  let hydration = hydrate(state, student_id, project_id).await;
  let session = ReportSession {
    student_id: student_id.to_string(),
    project_id: project_id.to_string(),
    wizard: hydration.wizard,
  };
  let key = AppState::session_key(student_id, project_id);
  let snapshot = to_snapshot(&key, &session, hydration.source, hydration.notice);
  state.insert_session(session).await;
  snapshot
}

/// Merge a patch into one section. `Ok(false)` means the session is
/// read-only and the patch was ignored.
#[instrument(level = "info", skip(state, patch), fields(%session_key, section))]
pub async fn patch_report_section(
  state: &AppState,
  session_key: &str,
  section: u8,
  patch: &Value,
) -> Result<bool, String> {
  state
    .mutate_session(session_key, |s| s.wizard.patch_section(section, patch))
    .await?
}

/// Validate the active section only, recording its errors on the session.
#[instrument(level = "info", skip(state), fields(%session_key))]
pub async fn validate_report_section(
  state: &AppState,
  session_key: &str,
) -> Result<(u8, ValidationResult), String> {
  let limits = state.limits.clone();
  state
    .mutate_session(session_key, |s| {
      (s.wizard.active_section, s.wizard.validate_active_section(&limits))
    })
    .await
}

/// Resolve a field probe against the active section's recorded errors.
#[instrument(level = "debug", skip(state), fields(%session_key, %field))]
pub async fn field_error_message(
  state: &AppState,
  session_key: &str,
  field: &str,
) -> Result<Option<String>, String> {
  state
    .read_session(session_key, |s| s.wizard.field_error(field).map(str::to_string))
    .await
}

/// Validation-gated forward navigation. On success the move is persisted
/// (mirror write + detached draft push); when blocked the pointer stays put
/// and the section's errors come back to the caller.
#[instrument(level = "info", skip(state), fields(%session_key))]
pub async fn advance_report(state: &AppState, session_key: &str) -> Result<MoveOutcome, String> {
  let limits = state.limits.clone();
  let (outcome, to_persist) = state
    .mutate_session(session_key, |s| {
      let result = s.wizard.validate_active_section(&limits);
      if !result.is_valid {
        let blocked = MoveOutcome::Blocked {
          section: s.wizard.active_section,
          errors: result.errors,
        };
        return (blocked, None);
      }
      let active_section = s.wizard.advance();
      (MoveOutcome::Moved { active_section }, Some(s.clone()))
    })
    .await?;

  if let Some(session) = to_persist {
    persist_snapshot(state, &session);
  }
  Ok(outcome)
}

/// Backward navigation never validates, but still persists the transition.
#[instrument(level = "info", skip(state), fields(%session_key))]
pub async fn retreat_report(state: &AppState, session_key: &str) -> Result<MoveOutcome, String> {
  let (outcome, session) = state
    .mutate_session(session_key, |s| {
      let active_section = s.wizard.retreat();
      (MoveOutcome::Moved { active_section }, s.clone())
    })
    .await?;
  persist_snapshot(state, &session);
  Ok(outcome)
}

/// Explicit save: same dual write as a step transition.
#[instrument(level = "info", skip(state), fields(%session_key))]
pub async fn save_draft(state: &AppState, session_key: &str) -> Result<(), String> {
  let session = state.read_session(session_key, |s| s.clone()).await?;
  persist_snapshot(state, &session);
  Ok(())
}

/// Final submission: re-run every registered validator, package the whole
/// document into flattened multipart fields, and send. Every failure path
/// leaves the document in memory so the student can retry without loss.
#[instrument(level = "info", skip(state), fields(%session_key))]
pub async fn submit_report(state: &AppState, session_key: &str) -> Result<SubmitOutcome, String> {
  let limits = state.limits.clone();
  let (first_invalid, session) = state
    .mutate_session(session_key, |s| {
      let mut first_invalid: Option<(u8, Vec<ValidationError>)> = None;
      if !s.wizard.read_only {
        for section in REGISTERED_SECTIONS {
          let result = validate_section(&s.wizard.document, section, &limits);
          s.wizard.errors_by_section.insert(section, result.errors.clone());
          if !result.is_valid && first_invalid.is_none() {
            first_invalid = Some((section, result.errors));
          }
        }
      }
      (first_invalid, s.clone())
    })
    .await?;

  if session.wizard.read_only {
    return Ok(SubmitOutcome::Failed {
      message: "This report is locked for review and cannot be resubmitted.".into(),
    });
  }
  if let Some((section, errors)) = first_invalid {
    return Ok(SubmitOutcome::Invalid { section, errors });
  }

  let Some(api) = &state.api else {
    return Ok(SubmitOutcome::Failed {
      message: "The report service is not configured; submission is unavailable.".into(),
    });
  };

  let mut fields = match flatten_document(&session.wizard.document) {
    Ok(fields) => fields,
    Err(message) => return Ok(SubmitOutcome::Failed { message }),
  };
  fields.insert(0, ("student_id".into(), FieldValue::Text(session.student_id.clone())));

  match api.submit_report(fields).await {
    Ok(ack) if ack.success => {
      let _ = state
        .mutate_session(session_key, |s| s.wizard.apply_status(ReportStatus::Submitted))
        .await;
      info!(target: "report", project_id = %session.project_id, "Report submitted");
      Ok(SubmitOutcome::Accepted { message: ack.message })
    }
    Ok(ack) => Ok(SubmitOutcome::Failed {
      message: ack.message.unwrap_or_else(|| "Submission was rejected.".into()),
    }),
    Err(message) => Ok(SubmitOutcome::Failed { message }),
  }
}

/// Expose the draft payload shape for diagnostics endpoints and tests.
#[allow(dead_code)]
pub fn draft_snapshot_payload(session: &ReportSession) -> Value {
  draft_payload(&session.student_id, &session.wizard)
}
