//! PII detection and masking (C3). Initial policy covers phone numbers only (spec §4.1).

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;

const MASK: &str = "***-***-****";

static PHONE_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\b\d{3}[-.\s]?\d{3}[-.\s]?\d{4}\b").expect("valid regex"));

const URGENT_WORDS: &[&str] = &["urgent", "emergency", "alert", "critical"];
const CONTACT_WORDS: &[&str] = &["contact", "call", "reach", "notify"];
const REMINDER_WORDS: &[&str] = &["reminder", "remind"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PiiKind {
  Phone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PiiPurpose {
  Urgent,
  Contact,
  Reminder,
}

impl PiiPurpose {
  const fn as_str(self) -> &'static str {
    match self {
      Self::Urgent => "urgent",
      Self::Contact => "contact",
      Self::Reminder => "reminder",
    }
  }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PiiMatch {
  pub original: String,
  pub masked: String,
  pub kind: PiiKind,
  pub purpose: Option<PiiPurpose>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PiiDetection {
  pub matches: Vec<PiiMatch>,
  pub masked_text: String,
}

fn nearby_purpose(text_lower: &str) -> Option<PiiPurpose> {
  if URGENT_WORDS.iter().any(|w| text_lower.contains(w)) {
    Some(PiiPurpose::Urgent)
  } else if CONTACT_WORDS.iter().any(|w| text_lower.contains(w)) {
    Some(PiiPurpose::Contact)
  } else if REMINDER_WORDS.iter().any(|w| text_lower.contains(w)) {
    Some(PiiPurpose::Reminder)
  } else {
    None
  }
}

/// Detect and mask PII in `text`. Never fails — absence of a match is a valid outcome.
#[tracing::instrument(skip(text))]
pub fn detect(text: &str) -> PiiDetection {
  let text_lower = text.to_lowercase();
  let purpose = nearby_purpose(&text_lower);

  let mut matches = Vec::new();
  for m in PHONE_RE.find_iter(text) {
    matches.push(PiiMatch {
      original: m.as_str().to_owned(),
      masked: MASK.to_owned(),
      kind: PiiKind::Phone,
      purpose,
    });
  }

  let masked_text = PHONE_RE.replace_all(text, MASK).into_owned();

  PiiDetection { matches, masked_text }
}

/// Append `(for <purpose>)` to masked text when a purpose was detected, as spec §4.1 requires
/// for memories persisted from PII-bearing text.
#[must_use]
pub fn annotate_with_purpose(masked_text: &str, purpose: Option<PiiPurpose>) -> String {
  match purpose {
    Some(p) => format!("{masked_text} (for {})", p.as_str()),
    None => masked_text.to_owned(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn masks_common_phone_formats() {
    for input in ["555-123-4567", "555.123.4567", "555 123 4567", "5551234567"] {
      let result = detect(input);
      assert_eq!(result.masked_text, MASK);
      assert_eq!(result.matches.len(), 1);
    }
  }

  #[test]
  fn leaves_text_without_phones_untouched() {
    let result = detect("Kai Media wants a status update");
    assert!(result.matches.is_empty());
    assert_eq!(result.masked_text, "Kai Media wants a status update");
  }

  #[test]
  fn tags_urgent_purpose() {
    let result = detect("This is urgent, call 555-123-4567 now");
    assert_eq!(result.matches[0].purpose, Some(PiiPurpose::Urgent));
  }

  #[test]
  fn tags_contact_purpose_over_reminder_when_both_absent() {
    let result = detect("Please contact me at 555-123-4567");
    assert_eq!(result.matches[0].purpose, Some(PiiPurpose::Contact));
  }

  #[test]
  fn never_leaks_raw_digits_in_masked_output() {
    let re = Regex::new(r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b").unwrap();
    let result = detect("reach me at 555-867-5309 about the order");
    assert!(!re.is_match(&result.masked_text));
  }
}
