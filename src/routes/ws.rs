//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::logic::{
  advance_report, field_error_message, open_report, patch_report_section, retreat_report,
  save_draft, submit_report, validate_report_section, MoveOutcome, SubmitOutcome,
};
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "impactboard_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  let conn_id = uuid::Uuid::new_v4();
  info!(target: "impactboard_backend", %conn_id, "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "impactboard_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "impactboard_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "impactboard_backend", %conn_id, "WebSocket disconnected");
}

#[instrument(level = "info", skip(state, msg))]
async fn handle_client_ws(msg: ClientWsMessage, state: &Arc<AppState>) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::OpenReport { student_id, project_id } => {
      let snapshot = open_report(state, &student_id, &project_id).await;
      info!(target: "report", session = %snapshot.session_key, source = ?snapshot.source, "WS report opened");
      ServerWsMessage::Session { snapshot }
    }

    ClientWsMessage::PatchSection { session_key, section, patch } => {
      match patch_report_section(state, &session_key, section, &patch).await {
        Ok(applied) => ServerWsMessage::SectionPatched { section, applied },
        Err(message) => ServerWsMessage::Error { message },
      }
    }

    ClientWsMessage::ValidateSection { session_key } => {
      match validate_report_section(state, &session_key).await {
        Ok((section, result)) => {
          info!(target: "report", section, valid = result.is_valid, "WS section validated");
          ServerWsMessage::Validation { section, is_valid: result.is_valid, errors: result.errors }
        }
        Err(message) => ServerWsMessage::Error { message },
      }
    }

    ClientWsMessage::FieldError { session_key, field } => {
      match field_error_message(state, &session_key, &field).await {
        Ok(message) => ServerWsMessage::FieldErrorMessage { field, message },
        Err(message) => ServerWsMessage::Error { message },
      }
    }

    ClientWsMessage::Advance { session_key } => {
      match advance_report(state, &session_key).await {
        Ok(MoveOutcome::Moved { active_section }) => ServerWsMessage::Position { active_section },
        Ok(MoveOutcome::Blocked { section, errors }) => {
          ServerWsMessage::NavigationBlocked { section, errors }
        }
        Err(message) => ServerWsMessage::Error { message },
      }
    }

    ClientWsMessage::Retreat { session_key } => {
      match retreat_report(state, &session_key).await {
        Ok(MoveOutcome::Moved { active_section }) => ServerWsMessage::Position { active_section },
        Ok(MoveOutcome::Blocked { section, errors }) => {
          ServerWsMessage::NavigationBlocked { section, errors }
        }
        Err(message) => ServerWsMessage::Error { message },
      }
    }

    ClientWsMessage::SaveDraft { session_key } => {
      match save_draft(state, &session_key).await {
        Ok(()) => ServerWsMessage::DraftSaved,
        Err(message) => ServerWsMessage::Error { message },
      }
    }

    ClientWsMessage::Submit { session_key } => {
      match submit_report(state, &session_key).await {
        Ok(SubmitOutcome::Accepted { message }) => {
          ServerWsMessage::SubmitResult { success: true, message, section: None, errors: Vec::new() }
        }
        Ok(SubmitOutcome::Invalid { section, errors }) => ServerWsMessage::SubmitResult {
          success: false,
          message: Some("Fix the highlighted sections before submitting.".into()),
          section: Some(section),
          errors,
        },
        Ok(SubmitOutcome::Failed { message }) => ServerWsMessage::SubmitResult {
          success: false,
          message: Some(message),
          section: None,
          errors: Vec::new(),
        },
        Err(message) => ServerWsMessage::Error { message },
      }
    }
  }
}
