//! Wizard state for one report editing session.
//!
//! `WizardState` is the single source of truth while a report is open: the
//! document, the active-section pointer, accumulated validation errors, and
//! the read-only lock. Errors are ephemeral — any patch to a section clears
//! that section's error list, so a stale message can never outlive the data
//! it described.

use std::collections::HashMap;

use serde_json::Value;

use crate::config::Limits;
use crate::domain::{ReportDocument, ReportStatus, FIRST_SECTION, LAST_SECTION};
use crate::validators::{message_for, validate_section, ValidationError, ValidationResult};

#[derive(Clone, Debug)]
pub struct WizardState {
  pub document: ReportDocument,
  pub active_section: u8,
  pub errors_by_section: HashMap<u8, Vec<ValidationError>>,
  pub read_only: bool,
  pub status: ReportStatus,
}

impl WizardState {
  pub fn new(document: ReportDocument) -> Self {
    Self {
      document,
      active_section: FIRST_SECTION,
      errors_by_section: HashMap::new(),
      read_only: false,
      status: ReportStatus::Draft,
    }
  }

  /// Apply the remote lifecycle status: `submitted`/`verified` lock the
  /// session, `draft`/`rejected` keep it editable. Never driven by direct
  /// user action.
  pub fn apply_status(&mut self, status: ReportStatus) {
    self.status = status;
    if status.locks_editing() {
      self.lock_read_only();
    } else {
      self.unlock();
    }
  }

  pub fn lock_read_only(&mut self) {
    self.read_only = true;
  }

  pub fn unlock(&mut self) {
    self.read_only = false;
  }

  /// Merge a patch into one section. Under the read-only lock this is a
  /// no-op reported as `Ok(false)`; otherwise the patch is applied and that
  /// section's error list (and only that one) is cleared.
  pub fn patch_section(&mut self, section: u8, patch: &Value) -> Result<bool, String> {
    if self.read_only {
      return Ok(false);
    }
    self.document.patch_section(section, patch)?;
    self.errors_by_section.remove(&section);
    Ok(true)
  }

  /// Validate the active section only. Read-only sessions always validate
  /// clean so navigation is never blocked on an immutable report.
  pub fn validate_active_section(&mut self, limits: &Limits) -> ValidationResult {
    if self.read_only {
      return ValidationResult::valid();
    }
    let result = validate_section(&self.document, self.active_section, limits);
    self
      .errors_by_section
      .insert(self.active_section, result.errors.clone());
    result
  }

  pub fn advance(&mut self) -> u8 {
    self.go_to(self.active_section.saturating_add(1))
  }

  pub fn retreat(&mut self) -> u8 {
    self.go_to(self.active_section.saturating_sub(1))
  }

  /// Move the pointer, clamped to [1, 12]. Navigation itself never
  /// validates; callers gate `advance` on `validate_active_section`.
  pub fn go_to(&mut self, section: u8) -> u8 {
    self.active_section = section.clamp(FIRST_SECTION, LAST_SECTION);
    self.active_section
  }

  /// Resolve a field probe against the active section's accumulated errors.
  pub fn field_error(&self, probe: &str) -> Option<&str> {
    let errors = self.errors_by_section.get(&self.active_section)?;
    message_for(errors, probe)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn editable_state() -> WizardState {
    WizardState::new(ReportDocument::empty("p-9"))
  }

  #[test]
  fn advance_and_retreat_clamp_to_section_range() {
    let mut ws = editable_state();
    for _ in 0..40 {
      ws.advance();
    }
    assert_eq!(ws.active_section, LAST_SECTION);

    for _ in 0..40 {
      ws.retreat();
    }
    assert_eq!(ws.active_section, FIRST_SECTION);
  }

  #[test]
  fn patching_one_section_clears_only_its_errors() {
    let mut ws = editable_state();

    ws.go_to(2);
    ws.validate_active_section(&Limits::default());
    ws.go_to(12);
    ws.validate_active_section(&Limits::default());
    assert!(!ws.errors_by_section[&2].is_empty());
    assert!(!ws.errors_by_section[&12].is_empty());

    ws.patch_section(2, &json!({ "discipline": "Education" })).expect("patch");

    assert!(!ws.errors_by_section.contains_key(&2));
    assert!(!ws.errors_by_section[&12].is_empty());
  }

  #[test]
  fn read_only_patch_is_a_no_op() {
    let mut ws = editable_state();
    ws.apply_status(ReportStatus::Verified);
    assert!(ws.read_only);

    let applied = ws
      .patch_section(2, &json!({ "discipline": "Education" }))
      .expect("no-op patch");
    assert!(!applied);
    assert!(ws.document.sections.project_context.discipline.is_empty());
  }

  #[test]
  fn read_only_validation_always_passes() {
    let mut ws = editable_state();
    ws.go_to(12);
    assert!(!ws.validate_active_section(&Limits::default()).is_valid);

    ws.apply_status(ReportStatus::Submitted);
    assert!(ws.validate_active_section(&Limits::default()).is_valid);
  }

  #[test]
  fn rejected_status_returns_to_editable_semantics() {
    let mut ws = editable_state();
    ws.apply_status(ReportStatus::Submitted);
    assert!(ws.read_only);

    ws.apply_status(ReportStatus::Rejected);
    assert!(!ws.read_only);
    let applied = ws
      .patch_section(2, &json!({ "discipline": "Education" }))
      .expect("patch after rejection");
    assert!(applied);
  }

  #[test]
  fn field_error_reads_the_active_section_only() {
    let mut ws = editable_state();
    ws.go_to(12);
    ws.validate_active_section(&Limits::default());
    assert!(ws.field_error("declaration").is_some());

    ws.go_to(11);
    assert!(ws.field_error("declaration").is_none());
  }
}
