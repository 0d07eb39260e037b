//! Per-section validation engine and the field-error index.
//!
//! Every validator is pure and synchronous: section data in, field-addressed
//! errors out. Nothing here touches the network or the session store, so the
//! same rules run identically on step navigation and on final submission.
//! Error fields use dotted/indexed paths relative to the section, e.g.
//! `team_members.3.hours`, so any consumer can route a message to an input
//! without the validator knowing about presentation.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{Bounds, Limits};
use crate::domain::{
  Activities, ContinuationStatus, Declaration, Evidence, Participation, ParticipationType,
  Partnerships, ProjectContext, Reflection, ReportDocument, Resources, SdgMapping,
  Sustainability, Outcomes, YesNo,
};
use crate::util::{strip_dashes, word_count};

/// Section keys that have a registered validator. Section 11 (derived
/// summary) deliberately has none and always passes.
pub const REGISTERED_SECTIONS: [u8; 11] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 12];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
  pub field: String,
  pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
  pub is_valid: bool,
  pub errors: Vec<ValidationError>,
}

impl ValidationResult {
  pub fn valid() -> Self {
    Self { is_valid: true, errors: Vec::new() }
  }

  pub fn from_errors(errors: Vec<ValidationError>) -> Self {
    Self { is_valid: errors.is_empty(), errors }
  }
}

/// Resolve a field probe against a section's accumulated errors: an exact
/// path match wins, otherwise any error whose last path segment equals the
/// probe (so `cnic` finds `team_lead.cnic` and `team_members.2.cnic` alike).
pub fn message_for<'a>(errors: &'a [ValidationError], probe: &str) -> Option<&'a str> {
  errors
    .iter()
    .find(|e| e.field == probe || e.field.rsplit('.').next() == Some(probe))
    .map(|e| e.message.as_str())
}

/// Run the registered validator for one section. Sections without a
/// registered validator always pass.
pub fn validate_section(doc: &ReportDocument, section: u8, limits: &Limits) -> ValidationResult {
  let s = &doc.sections;
  let errors = match section {
    1 => validate_participation(&s.participation, limits),
    2 => validate_project_context(&s.project_context, limits),
    3 => validate_sdg_mapping(&s.sdg_mapping, limits),
    4 => validate_activities(&s.activities, limits),
    5 => validate_outcomes(&s.outcomes, limits),
    6 => validate_resources(&s.resources),
    7 => validate_partnerships(&s.partnerships),
    8 => validate_evidence(&s.evidence, limits),
    9 => validate_reflection(&s.reflection, limits),
    10 => validate_sustainability(&s.sustainability, limits),
    12 => validate_declaration(&s.declaration),
    _ => Vec::new(),
  };
  ValidationResult::from_errors(errors)
}

// -------- Identity field patterns --------

static CNIC_PLAIN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^\d{13}$").expect("CNIC digit pattern"));
static CNIC_DASHED: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^\d{5}-\d{7}-\d$").expect("CNIC dashed pattern"));
static MOBILE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^03\d{9}$").expect("mobile pattern"));
static EMAIL: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

/// A CNIC is exactly 13 digits. Dashes are allowed only in the official
/// 5-7-1 grouping (NNNNN-NNNNNNN-N); any other dashed shape is rejected.
pub fn is_valid_cnic(raw: &str) -> bool {
  let s = raw.trim();
  if s.contains('-') {
    CNIC_DASHED.is_match(s)
  } else {
    CNIC_PLAIN.is_match(s)
  }
}

/// Mobile numbers: dashes stripped, then 11 digits beginning 03.
pub fn is_valid_mobile(raw: &str) -> bool {
  MOBILE.is_match(&strip_dashes(raw.trim()))
}

pub fn is_valid_email(raw: &str) -> bool {
  EMAIL.is_match(raw.trim())
}

// -------- Shared combinators --------

fn err(field: impl Into<String>, message: impl Into<String>) -> ValidationError {
  ValidationError { field: field.into(), message: message.into() }
}

fn require_text(errors: &mut Vec<ValidationError>, field: &str, value: &str, label: &str) {
  if value.trim().is_empty() {
    errors.push(err(field, format!("{label} is required.")));
  }
}

/// Word-bounded narrative: too short and too long are equally blocking.
fn check_word_bounds(
  errors: &mut Vec<ValidationError>,
  field: &str,
  label: &str,
  text: &str,
  bounds: Bounds,
) {
  let n = word_count(text);
  if n < bounds.min {
    errors.push(err(field, format!("{label} is too short: {n} words (minimum {}).", bounds.min)));
  } else if n > bounds.max {
    errors.push(err(field, format!("{label} is too long: {n} words (maximum {}).", bounds.max)));
  }
}

/// Gate-conditioned collection: "yes" requires at least one row and runs the
/// per-row checks; "no" requires the collection to be empty and raises no
/// row-level errors at all.
fn check_gated_rows<T>(
  errors: &mut Vec<ValidationError>,
  gate: YesNo,
  gate_label: &str,
  collection_field: &str,
  rows: &[T],
  mut row_check: impl FnMut(usize, &T, &mut Vec<ValidationError>),
) {
  match gate {
    YesNo::Yes => {
      if rows.is_empty() {
        errors.push(err(
          collection_field,
          format!("Add at least one entry when \"{gate_label}\" is yes."),
        ));
      }
      for (i, row) in rows.iter().enumerate() {
        row_check(i, row, errors);
      }
    }
    YesNo::No => {
      if !rows.is_empty() {
        errors.push(err(
          collection_field,
          format!("Remove all entries when \"{gate_label}\" is no."),
        ));
      }
    }
  }
}

// -------- Section validators --------

fn validate_participation(p: &Participation, limits: &Limits) -> Vec<ValidationError> {
  let mut errors = Vec::new();
  let lead = &p.team_lead;

  if lead.name.trim().chars().count() < 3 {
    errors.push(err("team_lead.name", "Full name must be at least 3 characters."));
  }
  if !is_valid_cnic(&lead.cnic) {
    errors.push(err("team_lead.cnic", "CNIC must be 13 digits (NNNNN-NNNNNNN-N)."));
  }
  if !is_valid_mobile(&lead.mobile) {
    errors.push(err("team_lead.mobile", "Mobile number must be 11 digits starting with 03."));
  }
  if !is_valid_email(&lead.email) {
    errors.push(err("team_lead.email", "Enter a valid email address."));
  }
  require_text(&mut errors, "team_lead.university", &lead.university, "University");
  require_text(&mut errors, "team_lead.degree", &lead.degree, "Degree programme");
  if !(lead.hours > 0.0) {
    errors.push(err("team_lead.hours", "Hours must be a positive number."));
  }

  match p.participation_type {
    ParticipationType::Team => {
      if p.team_members.len() > limits.max_team_members {
        errors.push(err(
          "team_members",
          format!("A team may have at most {} members besides the lead.", limits.max_team_members),
        ));
      }
      for (i, m) in p.team_members.iter().enumerate() {
        if m.name.trim().chars().count() < 3 {
          errors.push(err(
            format!("team_members.{i}.name"),
            "Member name must be at least 3 characters.",
          ));
        }
        if !(m.hours > 0.0) {
          errors.push(err(format!("team_members.{i}.hours"), "Hours must be a positive number."));
        }
        // Optional identity fields: validated only when present.
        if !m.cnic.trim().is_empty() && !is_valid_cnic(&m.cnic) {
          errors.push(err(
            format!("team_members.{i}.cnic"),
            "CNIC must be 13 digits (NNNNN-NNNNNNN-N).",
          ));
        }
        if !m.mobile.trim().is_empty() && !is_valid_mobile(&m.mobile) {
          errors.push(err(
            format!("team_members.{i}.mobile"),
            "Mobile number must be 11 digits starting with 03.",
          ));
        }
        if !m.email.trim().is_empty() && !is_valid_email(&m.email) {
          errors.push(err(format!("team_members.{i}.email"), "Enter a valid email address."));
        }
      }
    }
    ParticipationType::Individual => {
      if !p.team_members.is_empty() {
        errors.push(err("team_members", "Remove team members for individual participation."));
      }
    }
  }

  if !p.privacy_consent {
    errors.push(err("privacy_consent", "Privacy consent is required."));
  }

  errors
}

fn validate_project_context(c: &ProjectContext, limits: &Limits) -> Vec<ValidationError> {
  let mut errors = Vec::new();
  check_word_bounds(
    &mut errors,
    "problem_statement",
    "Problem statement",
    &c.problem_statement,
    limits.problem_statement_words,
  );
  require_text(&mut errors, "discipline", &c.discipline, "Discipline");
  require_text(
    &mut errors,
    "baseline_evidence_type",
    &c.baseline_evidence_type,
    "Baseline evidence type",
  );
  errors
}

fn validate_sdg_mapping(m: &SdgMapping, limits: &Limits) -> Vec<ValidationError> {
  let mut errors = Vec::new();

  if !(1..=17).contains(&m.primary_sdg) {
    errors.push(err("primary_sdg", "Select a primary SDG (1-17)."));
  }

  let chars = m.primary_sdg_explanation.trim().chars().count();
  let bounds = limits.primary_sdg_chars;
  if chars < bounds.min {
    errors.push(err(
      "primary_sdg_explanation",
      format!("Explanation is too short: {chars} characters (minimum {}).", bounds.min),
    ));
  } else if chars > bounds.max {
    errors.push(err(
      "primary_sdg_explanation",
      format!("Explanation is too long: {chars} characters (maximum {}).", bounds.max),
    ));
  }

  if m.secondary_sdgs.len() > limits.max_secondary_sdgs {
    errors.push(err(
      "secondary_sdgs",
      format!("Claim at most {} secondary SDGs.", limits.max_secondary_sdgs),
    ));
  }
  for (i, claim) in m.secondary_sdgs.iter().enumerate() {
    if !(1..=17).contains(&claim.sdg_id) {
      errors.push(err(format!("secondary_sdgs.{i}.sdg_id"), "Select an SDG (1-17)."));
    }
    require_text(
      &mut errors,
      &format!("secondary_sdgs.{i}.justification"),
      &claim.justification,
      "Justification",
    );
  }

  errors
}

fn validate_activities(a: &Activities, limits: &Limits) -> Vec<ValidationError> {
  let mut errors = Vec::new();
  check_word_bounds(
    &mut errors,
    "description",
    "Activity description",
    &a.description,
    limits.activities_words,
  );

  check_gated_rows(
    &mut errors,
    a.has_financial_resources,
    "used financial resources",
    "financial.purposes",
    &a.financial.purposes,
    |i, row, errors| {
      require_text(
        errors,
        &format!("financial.purposes.{i}.category"),
        &row.category,
        "Spending category",
      );
      if !(row.amount > 0.0) {
        errors.push(err(
          format!("financial.purposes.{i}.amount"),
          "Amount must be a positive number.",
        ));
      }
    },
  );

  if a.has_financial_resources == YesNo::Yes {
    if a.financial.personal_funds < 0.0 {
      errors.push(err("financial.personal_funds", "Funds cannot be negative."));
    }
    if a.financial.raised_funds < 0.0 {
      errors.push(err("financial.raised_funds", "Funds cannot be negative."));
    }
    if a.financial.personal_funds <= 0.0 && a.financial.raised_funds <= 0.0 {
      errors.push(err("financial", "Record where the money came from (personal or raised funds)."));
    }
  }

  errors
}

fn validate_outcomes(o: &Outcomes, limits: &Limits) -> Vec<ValidationError> {
  let mut errors = Vec::new();
  check_word_bounds(
    &mut errors,
    "observed_change",
    "Observed change",
    &o.observed_change,
    limits.outcomes_words,
  );
  for (i, row) in o.metrics.iter().enumerate() {
    require_text(&mut errors, &format!("metrics.{i}.metric"), &row.metric, "Metric name");
    require_text(&mut errors, &format!("metrics.{i}.baseline"), &row.baseline, "Baseline value");
    require_text(&mut errors, &format!("metrics.{i}.endline"), &row.endline, "Endline value");
    require_text(&mut errors, &format!("metrics.{i}.unit"), &row.unit, "Unit");
  }
  errors
}

fn validate_resources(r: &Resources) -> Vec<ValidationError> {
  let mut errors = Vec::new();
  check_gated_rows(
    &mut errors,
    r.used_resources,
    "used physical resources",
    "rows",
    &r.rows,
    |i, row, errors| {
      require_text(errors, &format!("rows.{i}.item"), &row.item, "Resource item");
      if !(row.quantity > 0.0) {
        errors.push(err(format!("rows.{i}.quantity"), "Quantity must be a positive number."));
      }
    },
  );
  errors
}

fn validate_partnerships(p: &Partnerships) -> Vec<ValidationError> {
  let mut errors = Vec::new();
  check_gated_rows(
    &mut errors,
    p.has_partners,
    "worked with partners",
    "rows",
    &p.rows,
    |i, row, errors| {
      require_text(
        errors,
        &format!("rows.{i}.organization"),
        &row.organization,
        "Partner organization",
      );
      require_text(
        errors,
        &format!("rows.{i}.contribution"),
        &row.contribution,
        "Partner contribution",
      );
    },
  );
  errors
}

fn validate_evidence(e: &Evidence, limits: &Limits) -> Vec<ValidationError> {
  let mut errors = Vec::new();
  if e.evidence_types.is_empty() {
    errors.push(err("evidence_types", "Select at least one evidence type."));
  }
  check_word_bounds(
    &mut errors,
    "description",
    "Evidence description",
    &e.description,
    limits.evidence_words,
  );
  // The three ethical attestations report as one aggregate error.
  if !(e.consent_obtained && e.no_harm_verified && e.data_accurate) {
    errors.push(err(
      "ethical_compliance",
      "All three ethical compliance confirmations are required.",
    ));
  }
  errors
}

fn validate_reflection(r: &Reflection, limits: &Limits) -> Vec<ValidationError> {
  let mut errors = Vec::new();
  check_word_bounds(
    &mut errors,
    "personal_reflection",
    "Personal reflection",
    &r.personal_reflection,
    limits.reflection_words,
  );
  require_text(&mut errors, "challenges_faced", &r.challenges_faced, "Challenges faced");
  require_text(&mut errors, "skills_gained", &r.skills_gained, "Skills gained");
  errors
}

fn validate_sustainability(s: &Sustainability, limits: &Limits) -> Vec<ValidationError> {
  let mut errors = Vec::new();
  match s.continuation_status {
    ContinuationStatus::Continuing | ContinuationStatus::HandedOver => {
      if s.mechanisms.is_empty() {
        errors.push(err("mechanisms", "Select at least one continuation mechanism."));
      }
      check_word_bounds(
        &mut errors,
        "sustainability_plan",
        "Sustainability plan",
        &s.sustainability_plan,
        limits.sustainability_words,
      );
    }
    ContinuationStatus::Concluded => {
      if !s.mechanisms.is_empty() {
        errors.push(err("mechanisms", "Clear continuation mechanisms for a concluded project."));
      }
    }
  }
  errors
}

fn validate_declaration(d: &Declaration) -> Vec<ValidationError> {
  let mut errors = Vec::new();
  if !(d.information_accurate && d.consent_to_publish) {
    errors.push(err("declaration", "Both declaration confirmations are required."));
  }
  if let Some(file) = &d.verification_file {
    if file.filename.trim().is_empty() {
      errors.push(err("verification_file", "Attachment is missing a file name."));
    }
  }
  errors
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{
    FundPurpose, Member, MetricRow, PartnerRow, ResourceRow, SdgClaim,
  };

  fn narrative(words: usize) -> String {
    vec!["community"; words].join(" ")
  }

  fn member(name: &str, hours: f64) -> Member {
    Member { name: name.into(), hours, ..Member::default() }
  }

  /// A document that passes every registered validator under default limits.
  fn valid_document() -> ReportDocument {
    let mut doc = ReportDocument::empty("p-77");
    let s = &mut doc.sections;

    s.participation.participation_type = ParticipationType::Team;
    s.participation.team_lead = Member {
      name: "Sara Iqbal".into(),
      cnic: "35202-1234567-1".into(),
      mobile: "0300-1234567".into(),
      email: "sara.iqbal@nust.edu.pk".into(),
      university: "NUST".into(),
      degree: "BS Computer Science".into(),
      hours: 40.0,
      role: "Team lead".into(),
    };
    s.participation.team_members =
      vec![member("Bilal Ahmed", 25.0), member("Hina Raza", 18.0)];
    s.participation.privacy_consent = true;

    s.project_context.problem_statement = narrative(80);
    s.project_context.discipline = "Public Health".into();
    s.project_context.baseline_evidence_type = "survey".into();

    s.sdg_mapping.primary_sdg = 6;
    s.sdg_mapping.primary_sdg_explanation = "x".repeat(200);
    s.sdg_mapping.secondary_sdgs = vec![SdgClaim {
      sdg_id: 3,
      justification: "Hygiene sessions reduced waterborne illness.".into(),
      evidence_files: Vec::new(),
    }];

    s.activities.description = narrative(120);
    s.activities.has_financial_resources = YesNo::Yes;
    s.activities.financial.personal_funds = 5000.0;
    s.activities.financial.purposes =
      vec![FundPurpose { category: "materials".into(), amount: 5000.0 }];

    s.outcomes.observed_change = narrative(90);
    s.outcomes.metrics = vec![MetricRow {
      metric: "households with filtered water".into(),
      baseline: "12".into(),
      endline: "64".into(),
      unit: "households".into(),
    }];

    s.resources.used_resources = YesNo::Yes;
    s.resources.rows =
      vec![ResourceRow { item: "water filters".into(), quantity: 30.0, source: "donated".into() }];

    s.partnerships.has_partners = YesNo::Yes;
    s.partnerships.rows = vec![PartnerRow {
      organization: "Al-Khidmat Foundation".into(),
      contact_person: "Mr. Farooq".into(),
      contribution: "Distribution logistics".into(),
    }];

    s.evidence.evidence_types = vec!["photos".into(), "attendance_sheets".into()];
    s.evidence.description = narrative(60);
    s.evidence.consent_obtained = true;
    s.evidence.no_harm_verified = true;
    s.evidence.data_accurate = true;

    s.reflection.personal_reflection = narrative(80);
    s.reflection.challenges_faced = "Coordinating volunteers across two campuses.".into();
    s.reflection.skills_gained = "Community outreach and budgeting.".into();

    s.sustainability.continuation_status = ContinuationStatus::Continuing;
    s.sustainability.mechanisms = vec!["student_society".into()];
    s.sustainability.sustainability_plan = narrative(50);

    s.declaration.information_accurate = true;
    s.declaration.consent_to_publish = true;

    doc
  }

  #[test]
  fn valid_fixture_passes_every_registered_section() {
    let doc = valid_document();
    let limits = Limits::default();
    for section in REGISTERED_SECTIONS {
      let result = validate_section(&doc, section, &limits);
      assert!(
        result.is_valid,
        "section {section} failed: {:?}",
        result.errors
      );
      assert!(result.errors.is_empty());
    }
  }

  #[test]
  fn sections_without_a_validator_always_pass() {
    let doc = ReportDocument::empty("p-1");
    let limits = Limits::default();
    assert!(validate_section(&doc, 11, &limits).is_valid);
  }

  #[test]
  fn cnic_accepts_only_plain_13_digits_or_dashed_5_7_1() {
    assert!(is_valid_cnic("3520212345671"));
    assert!(is_valid_cnic("35202-1234567-1"));
    assert!(is_valid_cnic(" 35202-1234567-1 "));

    assert!(!is_valid_cnic("352021234567")); // 12 digits
    assert!(!is_valid_cnic("35202123456712")); // 14 digits
    assert!(!is_valid_cnic("35202-123456-71")); // wrong grouping
    assert!(!is_valid_cnic("3520-21234567-1")); // wrong grouping
    assert!(!is_valid_cnic("35202-1234567-")); // truncated
    assert!(!is_valid_cnic("35202x1234567y1"));
    assert!(!is_valid_cnic(""));
  }

  #[test]
  fn mobile_requires_11_digits_starting_03_after_dash_strip() {
    assert!(is_valid_mobile("03001234567"));
    assert!(is_valid_mobile("0300-1234567"));
    assert!(is_valid_mobile("0-3-0-0-1234567"));

    assert!(!is_valid_mobile("13001234567")); // wrong prefix
    assert!(!is_valid_mobile("0300123456")); // 10 digits
    assert!(!is_valid_mobile("030012345678")); // 12 digits
    assert!(!is_valid_mobile("0300 1234567")); // space is not a dash
  }

  #[test]
  fn email_needs_local_domain_and_tld() {
    assert!(is_valid_email("a@b.co"));
    assert!(is_valid_email("sara.iqbal@nust.edu.pk"));
    assert!(!is_valid_email("sara.iqbal"));
    assert!(!is_valid_email("sara@nust"));
    assert!(!is_valid_email("sara @nust.edu"));
  }

  #[test]
  fn member_missing_hours_yields_exactly_one_indexed_error() {
    let mut doc = valid_document();
    doc.sections.participation.team_members[1].hours = 0.0;

    let result = validate_section(&doc, 1, &Limits::default());
    assert!(!result.is_valid);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].field, "team_members.1.hours");
  }

  #[test]
  fn member_cnic_is_validated_only_when_present() {
    let mut doc = valid_document();
    doc.sections.participation.team_members[0].cnic = String::new();
    assert!(validate_section(&doc, 1, &Limits::default()).is_valid);

    doc.sections.participation.team_members[0].cnic = "1234".into();
    let result = validate_section(&doc, 1, &Limits::default());
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].field, "team_members.0.cnic");
  }

  #[test]
  fn team_size_is_capped() {
    let mut doc = valid_document();
    doc.sections.participation.team_members =
      (0..20).map(|i| member(&format!("Member Number {i}"), 5.0)).collect();

    let result = validate_section(&doc, 1, &Limits::default());
    assert!(result.errors.iter().any(|e| e.field == "team_members"));
  }

  #[test]
  fn gate_no_with_leftover_rows_is_a_collection_error_only() {
    let mut doc = valid_document();
    doc.sections.resources.used_resources = YesNo::No;
    // Rows left over from earlier state: one collection-level error, nothing row-level.
    let result = validate_section(&doc, 6, &Limits::default());
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].field, "rows");

    // The calling UI clears the collection when the gate flips; then it passes.
    doc.sections.resources.rows.clear();
    assert!(validate_section(&doc, 6, &Limits::default()).is_valid);
  }

  #[test]
  fn gate_yes_requires_at_least_one_row() {
    let mut doc = valid_document();
    doc.sections.partnerships.rows.clear();
    let result = validate_section(&doc, 7, &Limits::default());
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].field, "rows");
  }

  #[test]
  fn narrative_too_short_and_too_long_both_block() {
    let mut doc = valid_document();
    let limits = Limits::default();

    doc.sections.project_context.problem_statement = narrative(10);
    let short = validate_section(&doc, 2, &limits);
    assert!(short.errors.iter().any(|e| e.field == "problem_statement" && e.message.contains("too short")));

    doc.sections.project_context.problem_statement = narrative(400);
    let long = validate_section(&doc, 2, &limits);
    assert!(long.errors.iter().any(|e| e.field == "problem_statement" && e.message.contains("too long")));
  }

  #[test]
  fn ethical_attestations_report_one_aggregate_error() {
    let mut doc = valid_document();
    doc.sections.evidence.no_harm_verified = false;
    let result = validate_section(&doc, 8, &Limits::default());
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].field, "ethical_compliance");
  }

  #[test]
  fn declaration_needs_both_confirmations() {
    let mut doc = valid_document();
    doc.sections.declaration.consent_to_publish = false;
    let result = validate_section(&doc, 12, &Limits::default());
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].field, "declaration");
  }

  #[test]
  fn concluded_projects_must_not_claim_mechanisms() {
    let mut doc = valid_document();
    doc.sections.sustainability.continuation_status = ContinuationStatus::Concluded;
    let result = validate_section(&doc, 10, &Limits::default());
    assert!(result.errors.iter().any(|e| e.field == "mechanisms"));

    doc.sections.sustainability.mechanisms.clear();
    assert!(validate_section(&doc, 10, &Limits::default()).is_valid);
  }

  #[test]
  fn message_for_matches_exact_path_or_last_segment() {
    let errors = vec![
      ValidationError { field: "team_lead.cnic".into(), message: "bad cnic".into() },
      ValidationError { field: "privacy_consent".into(), message: "consent".into() },
    ];

    assert_eq!(message_for(&errors, "team_lead.cnic"), Some("bad cnic"));
    assert_eq!(message_for(&errors, "cnic"), Some("bad cnic"));
    assert_eq!(message_for(&errors, "privacy_consent"), Some("consent"));
    assert_eq!(message_for(&errors, "mobile"), None);
  }
}
