//! Report document model: the twelve wizard sections, default construction,
//! and section-scoped patching.
//!
//! Section keys are fixed integers 1..=12. Section 11 is a derived summary
//! with no backing data of its own; every other key maps to one struct in
//! `SectionSet`. Mutation happens exclusively through `patch_section`, which
//! shallow-merges a JSON patch into one section's top-level keys.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const FIRST_SECTION: u8 = 1;
pub const LAST_SECTION: u8 = 12;
pub const SUMMARY_SECTION: u8 = 11;

/// Remote review lifecycle of a report. `Submitted` and `Verified` freeze the
/// document; `Rejected` returns it to editable draft semantics so the student
/// can revise and resubmit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
  #[default]
  Draft,
  Submitted,
  Verified,
  Rejected,
}

impl ReportStatus {
  pub fn locks_editing(self) -> bool {
    matches!(self, ReportStatus::Submitted | ReportStatus::Verified)
  }

  /// Lenient wire parse. The status endpoint reports "none" when no report
  /// exists; anything unrecognized is treated the same way by the caller.
  pub fn parse(s: &str) -> Option<Self> {
    match s.trim().to_lowercase().as_str() {
      "draft" => Some(ReportStatus::Draft),
      "submitted" => Some(ReportStatus::Submitted),
      "verified" => Some(ReportStatus::Verified),
      "rejected" => Some(ReportStatus::Rejected),
      _ => None,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ParticipationType {
  #[default]
  Individual,
  Team,
}

/// Conditional gate used by several sections ("did the project use X?").
/// Stored as the literal answer; nothing negates it on the way in or out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum YesNo {
  Yes,
  #[default]
  No,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityTier {
  Public,
  Partners,
  #[default]
  Private,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContinuationStatus {
  Continuing,
  HandedOver,
  #[default]
  Concluded,
}

/// File bytes travel base64-encoded inside the JSON document and are decoded
/// into raw multipart parts only at submission time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct FileAttachment {
  pub filename: String,
  pub mime: String,
  pub data_base64: String,
}

/// Identity fields shared by the team lead and additional members.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct Member {
  #[serde(default)] pub name: String,
  #[serde(default)] pub cnic: String,
  #[serde(default)] pub mobile: String,
  #[serde(default)] pub email: String,
  #[serde(default)] pub university: String,
  #[serde(default)] pub degree: String,
  #[serde(default)] pub hours: f64,
  #[serde(default)] pub role: String,
}

// Section 1
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct Participation {
  #[serde(default)] pub participation_type: ParticipationType,
  #[serde(default)] pub team_lead: Member,
  #[serde(default)] pub team_members: Vec<Member>,
  #[serde(default)] pub privacy_consent: bool,
}

impl Participation {
  /// "Still empty" for roster seeding: nobody has been entered yet.
  pub fn is_untouched(&self) -> bool {
    self.team_lead.name.trim().is_empty() && self.team_members.is_empty()
  }
}

// Section 2
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct ProjectContext {
  #[serde(default)] pub problem_statement: String,
  #[serde(default)] pub discipline: String,
  #[serde(default)] pub baseline_evidence_type: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct SdgClaim {
  #[serde(default)] pub sdg_id: u8,
  #[serde(default)] pub justification: String,
  #[serde(default)] pub evidence_files: Vec<FileAttachment>,
}

// Section 3
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct SdgMapping {
  #[serde(default)] pub primary_sdg: u8,
  #[serde(default)] pub primary_sdg_explanation: String,
  #[serde(default)] pub secondary_sdgs: Vec<SdgClaim>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct FundPurpose {
  #[serde(default)] pub category: String,
  #[serde(default)] pub amount: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct FinancialRecord {
  #[serde(default)] pub personal_funds: f64,
  #[serde(default)] pub raised_funds: f64,
  #[serde(default)] pub purposes: Vec<FundPurpose>,
}

// Section 4
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct Activities {
  #[serde(default)] pub description: String,
  #[serde(default)] pub has_financial_resources: YesNo,
  #[serde(default)] pub financial: FinancialRecord,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct MetricRow {
  #[serde(default)] pub metric: String,
  #[serde(default)] pub baseline: String,
  #[serde(default)] pub endline: String,
  #[serde(default)] pub unit: String,
}

// Section 5
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct Outcomes {
  #[serde(default)] pub observed_change: String,
  #[serde(default)] pub metrics: Vec<MetricRow>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct ResourceRow {
  #[serde(default)] pub item: String,
  #[serde(default)] pub quantity: f64,
  #[serde(default)] pub source: String,
}

// Section 6
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct Resources {
  #[serde(default)] pub used_resources: YesNo,
  #[serde(default)] pub rows: Vec<ResourceRow>,
  #[serde(default)] pub evidence_files: Vec<FileAttachment>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct PartnerRow {
  #[serde(default)] pub organization: String,
  #[serde(default)] pub contact_person: String,
  #[serde(default)] pub contribution: String,
}

// Section 7
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct Partnerships {
  #[serde(default)] pub has_partners: YesNo,
  #[serde(default)] pub rows: Vec<PartnerRow>,
  #[serde(default)] pub evidence_files: Vec<FileAttachment>,
}

// Section 8
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct Evidence {
  #[serde(default)] pub evidence_types: Vec<String>,
  #[serde(default)] pub description: String,
  #[serde(default)] pub visibility: VisibilityTier,
  #[serde(default)] pub consent_obtained: bool,
  #[serde(default)] pub no_harm_verified: bool,
  #[serde(default)] pub data_accurate: bool,
}

// Section 9
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct Reflection {
  #[serde(default)] pub personal_reflection: String,
  #[serde(default)] pub challenges_faced: String,
  #[serde(default)] pub skills_gained: String,
}

// Section 10
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct Sustainability {
  #[serde(default)] pub continuation_status: ContinuationStatus,
  #[serde(default)] pub mechanisms: Vec<String>,
  #[serde(default)] pub sustainability_plan: String,
}

// Section 12
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct Declaration {
  #[serde(default)] pub information_accurate: bool,
  #[serde(default)] pub consent_to_publish: bool,
  #[serde(default)] pub verification_file: Option<FileAttachment>,
}

/// All data-bearing sections of one report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct SectionSet {
  #[serde(default)] pub participation: Participation,
  #[serde(default)] pub project_context: ProjectContext,
  #[serde(default)] pub sdg_mapping: SdgMapping,
  #[serde(default)] pub activities: Activities,
  #[serde(default)] pub outcomes: Outcomes,
  #[serde(default)] pub resources: Resources,
  #[serde(default)] pub partnerships: Partnerships,
  #[serde(default)] pub evidence: Evidence,
  #[serde(default)] pub reflection: Reflection,
  #[serde(default)] pub sustainability: Sustainability,
  #[serde(default)] pub declaration: Declaration,
}

/// Root aggregate for one in-progress report session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
  #[serde(default)] pub report_id: Option<String>,
  pub project_id: String,
  #[serde(flatten)]
  pub sections: SectionSet,
}

impl ReportDocument {
  /// Canonical default-valued document for a project's first report visit.
  pub fn empty(project_id: impl Into<String>) -> Self {
    Self {
      report_id: None,
      project_id: project_id.into(),
      sections: SectionSet::default(),
    }
  }

  pub fn section_title(section: u8) -> Option<&'static str> {
    match section {
      1 => Some("Participation & Team"),
      2 => Some("Project Context"),
      3 => Some("SDG Mapping"),
      4 => Some("Activities & Financial Resources"),
      5 => Some("Outcomes & Metrics"),
      6 => Some("Physical Resources"),
      7 => Some("Partnerships"),
      8 => Some("Evidence & Ethics"),
      9 => Some("Reflection"),
      10 => Some("Sustainability"),
      11 => Some("Summary"),
      12 => Some("Declaration"),
      _ => None,
    }
  }

  /// Shallow-merge `patch` into one section: only the top-level keys present
  /// in the patch are overwritten, and collection fields are replaced whole
  /// when supplied (callers send full replacement arrays). On any error the
  /// document is left exactly as it was.
  pub fn patch_section(&mut self, section: u8, patch: &Value) -> Result<(), String> {
    let s = &mut self.sections;
    match section {
      1 => merge_section(&mut s.participation, patch),
      2 => merge_section(&mut s.project_context, patch),
      3 => merge_section(&mut s.sdg_mapping, patch),
      4 => merge_section(&mut s.activities, patch),
      5 => merge_section(&mut s.outcomes, patch),
      6 => merge_section(&mut s.resources, patch),
      7 => merge_section(&mut s.partnerships, patch),
      8 => merge_section(&mut s.evidence, patch),
      9 => merge_section(&mut s.reflection, patch),
      10 => merge_section(&mut s.sustainability, patch),
      SUMMARY_SECTION => Err("Section 11 is a derived summary and holds no editable data.".into()),
      12 => merge_section(&mut s.declaration, patch),
      other => Err(format!("Unknown section key: {other}")),
    }
  }
}

fn merge_section<T>(target: &mut T, patch: &Value) -> Result<(), String>
where
  T: Serialize + for<'de> Deserialize<'de>,
{
  let Value::Object(patch_map) = patch else {
    return Err("Section patch must be a JSON object.".into());
  };

  let mut current =
    serde_json::to_value(&*target).map_err(|e| format!("Section serialization failed: {e}"))?;
  let Value::Object(map) = &mut current else {
    return Err("Section did not serialize to a JSON object.".into());
  };

  for (k, v) in patch_map {
    map.insert(k.clone(), v.clone());
  }

  // Only commit once the merged value still fits the section's shape.
  *target = serde_json::from_value(current)
    .map_err(|e| format!("Patch does not fit the section shape: {e}"))?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn patch_merges_shallow_and_keeps_siblings() {
    let mut doc = ReportDocument::empty("p-1");
    doc.sections.project_context.discipline = "Public Health".into();

    doc
      .patch_section(2, &json!({ "problem_statement": "Access to clean water." }))
      .expect("patch");

    assert_eq!(doc.sections.project_context.problem_statement, "Access to clean water.");
    assert_eq!(doc.sections.project_context.discipline, "Public Health");
  }

  #[test]
  fn patch_replaces_collections_whole() {
    let mut doc = ReportDocument::empty("p-1");
    doc
      .patch_section(
        1,
        &json!({ "team_members": [{ "name": "Aisha Khan", "hours": 12.0 }] }),
      )
      .expect("first patch");
    assert_eq!(doc.sections.participation.team_members.len(), 1);

    doc.patch_section(1, &json!({ "team_members": [] })).expect("second patch");
    assert!(doc.sections.participation.team_members.is_empty());
  }

  #[test]
  fn patch_to_one_section_never_touches_another() {
    let mut doc = ReportDocument::empty("p-1");
    doc.sections.outcomes.observed_change = "More students attended.".into();

    doc
      .patch_section(4, &json!({ "description": "Weekly tutoring." }))
      .expect("patch");

    assert_eq!(doc.sections.outcomes.observed_change, "More students attended.");
    assert_eq!(doc.sections.activities.description, "Weekly tutoring.");
  }

  #[test]
  fn bad_patch_leaves_document_unchanged() {
    let mut doc = ReportDocument::empty("p-1");
    doc.sections.participation.team_lead.name = "Bilal Ahmed".into();

    let err = doc
      .patch_section(1, &json!({ "team_members": "not-an-array" }))
      .expect_err("shape mismatch");
    assert!(err.contains("shape"));
    assert_eq!(doc.sections.participation.team_lead.name, "Bilal Ahmed");
  }

  #[test]
  fn summary_and_unknown_sections_reject_patches() {
    let mut doc = ReportDocument::empty("p-1");
    assert!(doc.patch_section(SUMMARY_SECTION, &json!({})).is_err());
    assert!(doc.patch_section(13, &json!({})).is_err());
    assert!(doc.patch_section(0, &json!({})).is_err());
  }

  #[test]
  fn status_parse_is_lenient_on_case_and_unknowns() {
    assert_eq!(ReportStatus::parse("Submitted"), Some(ReportStatus::Submitted));
    assert_eq!(ReportStatus::parse(" verified "), Some(ReportStatus::Verified));
    assert_eq!(ReportStatus::parse("none"), None);
    assert_eq!(ReportStatus::parse(""), None);
  }
}
