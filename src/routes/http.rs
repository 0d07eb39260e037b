//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; unknown sessions answer 404, malformed
//! patches answer 400, and everything else rides in the response body.

use std::sync::Arc;
use axum::{extract::{Query, State}, http::StatusCode, response::IntoResponse, Json};
use tracing::{info, instrument};

use crate::logic::{
  advance_report, field_error_message, open_report, patch_report_section, retreat_report,
  save_draft, submit_report, validate_report_section, MoveOutcome, SubmitOutcome,
};
use crate::protocol::*;
use crate::state::AppState;

type HandlerError = (StatusCode, Json<ErrorOut>);

fn reject(status: StatusCode, message: String) -> HandlerError {
  (status, Json(ErrorOut { message }))
}

fn session_error(message: String) -> HandlerError {
  let status = if message.starts_with("Unknown session") {
    StatusCode::NOT_FOUND
  } else {
    StatusCode::BAD_REQUEST
  };
  reject(status, message)
}

pub fn move_out(outcome: MoveOutcome) -> MoveOut {
  match outcome {
    MoveOutcome::Moved { active_section } => {
      MoveOut { moved: true, active_section, errors: Vec::new() }
    }
    MoveOutcome::Blocked { section, errors } => {
      MoveOut { moved: false, active_section: section, errors }
    }
  }
}

pub fn submit_out(outcome: SubmitOutcome) -> SubmitOut {
  match outcome {
    SubmitOutcome::Invalid { section, errors } => SubmitOut {
      success: false,
      message: Some("Fix the highlighted sections before submitting.".into()),
      section: Some(section),
      errors,
    },
    SubmitOutcome::Failed { message } => {
      SubmitOut { success: false, message: Some(message), section: None, errors: Vec::new() }
    }
    SubmitOutcome::Accepted { message } => {
      SubmitOut { success: true, message, section: None, errors: Vec::new() }
    }
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state, body), fields(%body.student_id, %body.project_id))]
pub async fn http_open_report(
  State(state): State<Arc<AppState>>,
  Json(body): Json<OpenIn>,
) -> impl IntoResponse {
  let snapshot = open_report(&state, &body.student_id, &body.project_id).await;
  info!(target: "report", session = %snapshot.session_key, source = ?snapshot.source, "HTTP report opened");
  Json(snapshot)
}

#[instrument(level = "info", skip(state, body), fields(%body.session_key, section = body.section))]
pub async fn http_patch_section(
  State(state): State<Arc<AppState>>,
  Json(body): Json<PatchIn>,
) -> Result<Json<PatchOut>, HandlerError> {
  match patch_report_section(&state, &body.session_key, body.section, &body.patch).await {
    Ok(applied) => Ok(Json(PatchOut { section: body.section, applied })),
    Err(message) => Err(session_error(message)),
  }
}

#[instrument(level = "info", skip(state, body), fields(%body.session_key))]
pub async fn http_validate_section(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SessionIn>,
) -> Result<Json<ValidationOut>, HandlerError> {
  match validate_report_section(&state, &body.session_key).await {
    Ok((section, result)) => {
      info!(target: "report", section, valid = result.is_valid, errors = result.errors.len(), "HTTP section validated");
      Ok(Json(ValidationOut { section, is_valid: result.is_valid, errors: result.errors }))
    }
    Err(message) => Err(session_error(message)),
  }
}

#[instrument(level = "info", skip(state), fields(%q.session_key, %q.field))]
pub async fn http_field_error(
  State(state): State<Arc<AppState>>,
  Query(q): Query<FieldErrorQuery>,
) -> Result<Json<FieldErrorOut>, HandlerError> {
  match field_error_message(&state, &q.session_key, &q.field).await {
    Ok(message) => Ok(Json(FieldErrorOut { field: q.field, message })),
    Err(message) => Err(session_error(message)),
  }
}

#[instrument(level = "info", skip(state, body), fields(%body.session_key))]
pub async fn http_advance(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SessionIn>,
) -> Result<Json<MoveOut>, HandlerError> {
  match advance_report(&state, &body.session_key).await {
    Ok(outcome) => Ok(Json(move_out(outcome))),
    Err(message) => Err(session_error(message)),
  }
}

#[instrument(level = "info", skip(state, body), fields(%body.session_key))]
pub async fn http_retreat(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SessionIn>,
) -> Result<Json<MoveOut>, HandlerError> {
  match retreat_report(&state, &body.session_key).await {
    Ok(outcome) => Ok(Json(move_out(outcome))),
    Err(message) => Err(session_error(message)),
  }
}

#[instrument(level = "info", skip(state, body), fields(%body.session_key))]
pub async fn http_save_draft(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SessionIn>,
) -> Result<Json<SaveOut>, HandlerError> {
  match save_draft(&state, &body.session_key).await {
    Ok(()) => Ok(Json(SaveOut { ok: true })),
    Err(message) => Err(session_error(message)),
  }
}

#[instrument(level = "info", skip(state, body), fields(%body.session_key))]
pub async fn http_submit(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SessionIn>,
) -> Result<Json<SubmitOut>, HandlerError> {
  match submit_report(&state, &body.session_key).await {
    Ok(outcome) => {
      let out = submit_out(outcome);
      info!(target: "report", success = out.success, "HTTP submission handled");
      Ok(Json(out))
    }
    Err(message) => Err(session_error(message)),
  }
}
