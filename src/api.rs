//! Remote report API client.
//!
//! Thin reqwest wrapper over the dashboard's report endpoints: status lookup,
//! full-record fetch, best-effort draft push, roster fetch, and the final
//! multipart submission. Calls are instrumented and log latencies and sizes,
//! not payload contents.
//!
//! NOTE: the bearer token is never logged, and error bodies are truncated
//! before logging to keep student PII out of the logs.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::domain::{ReportStatus, SectionSet};
use crate::packager::FieldValue;
use crate::util::trunc_for_log;

#[derive(Clone)]
pub struct ReportApi {
  pub client: reqwest::Client,
  pub base_url: String,
  token: Option<String>,
}

/// Full remote record, classified once at the fetch boundary. Anything that
/// does not expose the structured section shape is carried as `Legacy` and
/// the hydration chain falls through to the local mirror.
#[derive(Clone, Debug)]
pub enum RemoteRecord {
  Structured(StructuredRecord),
  Legacy(Value),
}

impl RemoteRecord {
  pub fn classify(value: Value) -> Self {
    if value.get("sections").is_some_and(Value::is_object) {
      match serde_json::from_value::<StructuredRecord>(value.clone()) {
        Ok(record) => return RemoteRecord::Structured(record),
        Err(e) => {
          warn!(target: "report", error = %e, "Remote record has a sections object but does not parse; treating as legacy");
        }
      }
    }
    RemoteRecord::Legacy(value)
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredRecord {
  #[serde(default)]
  pub report_id: Option<String>,
  #[serde(default)]
  pub status: ReportStatus,
  #[serde(default)]
  pub current_section: Option<u8>,
  pub sections: SectionSet,
}

/// Answer from the status endpoint when a report exists for the pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteStatus {
  pub report_id: String,
  pub status: ReportStatus,
}

/// Roster entry supplied by the opportunity's own application data; used only
/// for first-load seeding of the participation section.
#[derive(Clone, Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RosterMember {
  #[serde(default)] pub name: String,
  #[serde(default)] pub cnic: String,
  #[serde(default)] pub mobile: String,
  #[serde(default)] pub email: String,
  #[serde(default)] pub university: String,
  #[serde(default)] pub degree: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SubmitAck {
  pub success: bool,
  #[serde(default)]
  pub message: Option<String>,
}

impl ReportApi {
  /// Construct the client if REPORT_API_BASE_URL is set; otherwise None and
  /// the service runs on the local mirror alone.
  pub fn from_env() -> Option<Self> {
    let base_url = std::env::var("REPORT_API_BASE_URL").ok()?;
    let token = std::env::var("REPORT_API_TOKEN").ok();

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;

    Some(Self {
      client,
      base_url: base_url.trim_end_matches('/').to_string(),
      token,
    })
  }

  fn get(&self, path: &str) -> reqwest::RequestBuilder {
    self.authed(self.client.get(format!("{}{}", self.base_url, path)))
  }

  fn post(&self, path: &str) -> reqwest::RequestBuilder {
    self.authed(self.client.post(format!("{}{}", self.base_url, path)))
  }

  fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    let req = req.header(USER_AGENT, "impactboard-backend/0.1");
    match &self.token {
      Some(token) => req.header(AUTHORIZATION, format!("Bearer {token}")),
      None => req,
    }
  }

  /// Does a report exist for (student, project), and in what review state?
  /// A missing record (404 or a "none" status) is Ok(None), not an error.
  #[instrument(level = "info", skip(self), fields(%student_id, %project_id))]
  pub async fn fetch_report_status(
    &self,
    student_id: &str,
    project_id: &str,
  ) -> Result<Option<RemoteStatus>, String> {
    let res = self
      .get("/reports/status")
      .query(&[("studentId", student_id), ("projectId", project_id)])
      .send()
      .await
      .map_err(|e| e.to_string())?;

    if res.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    let out: ReportStatusOut = expect_json(res).await?;

    let status = out.status.as_deref().and_then(ReportStatus::parse);
    match (out.report_id, status) {
      (Some(report_id), Some(status)) => Ok(Some(RemoteStatus { report_id, status })),
      _ => Ok(None),
    }
  }

  #[instrument(level = "info", skip(self), fields(%report_id))]
  pub async fn fetch_report_by_id(&self, report_id: &str) -> Result<RemoteRecord, String> {
    let res = self
      .get(&format!("/reports/{report_id}"))
      .send()
      .await
      .map_err(|e| e.to_string())?;
    let value: Value = expect_json(res).await?;
    Ok(RemoteRecord::classify(value))
  }

  /// Best-effort draft snapshot push. The caller treats any Err as
  /// diagnostics only — the local mirror is the durability guarantee.
  #[instrument(level = "info", skip(self, payload))]
  pub async fn push_draft(&self, payload: &Value) -> Result<(), String> {
    let res = self
      .post("/reports/draft")
      .json(payload)
      .send()
      .await
      .map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_api_error(&body).unwrap_or_else(|| trunc_for_log(&body, 300));
      return Err(format!("Report API HTTP {status}: {msg}"));
    }
    Ok(())
  }

  /// Final submission: the flattened field set as one multipart form, files
  /// as raw binary parts under their path names.
  #[instrument(level = "info", skip(self, fields), fields(field_count = fields.len()))]
  pub async fn submit_report(&self, fields: Vec<(String, FieldValue)>) -> Result<SubmitAck, String> {
    let mut form = reqwest::multipart::Form::new();
    for (path, value) in fields {
      match value {
        FieldValue::Text(text) => {
          form = form.text(path, text);
        }
        FieldValue::File { filename, mime, bytes } => {
          let part = reqwest::multipart::Part::bytes(bytes).file_name(filename);
          let part = if mime.is_empty() {
            part
          } else {
            part
              .mime_str(&mime)
              .map_err(|e| format!("Attachment at \"{path}\" has an invalid mime type: {e}"))?
          };
          form = form.part(path, part);
        }
      }
    }

    let start = std::time::Instant::now();
    let res = self
      .post("/reports/submit")
      .multipart(form)
      .send()
      .await
      .map_err(|e| e.to_string())?;
    info!(elapsed = ?start.elapsed(), status = %res.status(), "Submission request completed");

    expect_json(res).await
  }

  /// Pre-populated roster from the opportunity's application data. A project
  /// without one answers 404; that is an empty roster, not an error.
  #[instrument(level = "info", skip(self), fields(%project_id))]
  pub async fn fetch_project_roster(&self, project_id: &str) -> Result<Vec<RosterMember>, String> {
    let res = self
      .get(&format!("/projects/{project_id}/roster"))
      .send()
      .await
      .map_err(|e| e.to_string())?;

    if res.status() == StatusCode::NOT_FOUND {
      return Ok(Vec::new());
    }
    expect_json(res).await
  }
}

async fn expect_json<T: for<'a> Deserialize<'a>>(res: reqwest::Response) -> Result<T, String> {
  if !res.status().is_success() {
    let status = res.status();
    let body = res.text().await.unwrap_or_default();
    let msg = extract_api_error(&body).unwrap_or_else(|| trunc_for_log(&body, 300));
    return Err(format!("Report API HTTP {status}: {msg}"));
  }
  res.json::<T>().await.map_err(|e| e.to_string())
}

/// Try to extract a clean error message from an API error body.
fn extract_api_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct Flat {
    message: String,
  }
  #[derive(Deserialize)]
  struct Wrapped {
    error: Flat,
  }
  if let Ok(w) = serde_json::from_str::<Wrapped>(body) {
    return Some(w.error.message);
  }
  serde_json::from_str::<Flat>(body).ok().map(|f| f.message)
}

// --- Wire DTOs ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportStatusOut {
  #[serde(default)]
  report_id: Option<String>,
  #[serde(default)]
  status: Option<String>,
}
