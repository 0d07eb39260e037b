//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{ReportDocument, ReportStatus};
use crate::hydrate::HydrationSource;
use crate::validators::ValidationError;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    OpenReport {
        #[serde(rename = "studentId")]
        student_id: String,
        #[serde(rename = "projectId")]
        project_id: String,
    },
    PatchSection {
        #[serde(rename = "sessionKey")]
        session_key: String,
        section: u8,
        patch: Value,
    },
    ValidateSection {
        #[serde(rename = "sessionKey")]
        session_key: String,
    },
    FieldError {
        #[serde(rename = "sessionKey")]
        session_key: String,
        field: String,
    },
    Advance {
        #[serde(rename = "sessionKey")]
        session_key: String,
    },
    Retreat {
        #[serde(rename = "sessionKey")]
        session_key: String,
    },
    SaveDraft {
        #[serde(rename = "sessionKey")]
        session_key: String,
    },
    Submit {
        #[serde(rename = "sessionKey")]
        session_key: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Session {
        snapshot: SessionSnapshot,
    },
    SectionPatched {
        section: u8,
        applied: bool,
    },
    Validation {
        section: u8,
        #[serde(rename = "isValid")]
        is_valid: bool,
        errors: Vec<ValidationError>,
    },
    FieldErrorMessage {
        field: String,
        message: Option<String>,
    },
    Position {
        #[serde(rename = "activeSection")]
        active_section: u8,
    },
    NavigationBlocked {
        section: u8,
        errors: Vec<ValidationError>,
    },
    DraftSaved,
    SubmitResult {
        success: bool,
        message: Option<String>,
        section: Option<u8>,
        errors: Vec<ValidationError>,
    },
    Error {
        message: String,
    },
}

/// Everything a client needs to render the wizard after hydration.
/// Used by both WS and HTTP for session delivery.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_key: String,
    pub active_section: u8,
    pub section_title: String,
    pub read_only: bool,
    pub status: ReportStatus,
    pub source: HydrationSource,
    pub notice: Option<String>,
    pub document: ReportDocument,
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenIn {
    pub student_id: String,
    pub project_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchIn {
    pub session_key: String,
    pub section: u8,
    pub patch: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIn {
    pub session_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrorQuery {
    pub session_key: String,
    pub field: String,
}

#[derive(Serialize)]
pub struct PatchOut {
    pub section: u8,
    pub applied: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOut {
    pub section: u8,
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

#[derive(Serialize)]
pub struct FieldErrorOut {
    pub field: String,
    pub message: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveOut {
    pub moved: bool,
    pub active_section: u8,
    pub errors: Vec<ValidationError>,
}

#[derive(Serialize)]
pub struct SaveOut {
    pub ok: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOut {
    pub success: bool,
    pub message: Option<String>,
    pub section: Option<u8>,
    pub errors: Vec<ValidationError>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub message: String,
}
