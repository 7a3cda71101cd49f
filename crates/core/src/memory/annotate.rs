//! Status annotations appended to retrieved memory text for UI hints (spec §4.7). These are
//! a pure derivation over the text shown in a prompt/response — never persisted (§9).

use chrono::{DateTime, Utc};

const NINETY_DAYS: i64 = 90;

fn mentions_preference(text_lower: &str) -> bool {
  ["prefer", "like", "always", "never"].iter().any(|w| text_lower.contains(w))
}

fn mentions_sla_risk(text_lower: &str) -> bool {
  ["sla", "breach", "risk"].iter().any(|w| text_lower.contains(w))
}

fn mentions_completed(text_lower: &str) -> bool {
  ["done", "complete", "finished"].iter().any(|w| text_lower.contains(w))
}

fn mentions_invoice_reminder(text_lower: &str) -> bool {
  text_lower.contains("invoice") && (text_lower.contains("due") || text_lower.contains("remind"))
}

/// Append bracketed `[Note: ...]` hints to `text` based on its content and age.
#[must_use]
pub fn annotate(text: &str, now: DateTime<Utc>, created_at: DateTime<Utc>) -> String {
  let text_lower = text.to_lowercase();
  let mut notes = Vec::new();

  let days_old = (now - created_at).num_days();
  if days_old > NINETY_DAYS && mentions_preference(&text_lower) {
    notes.push(format!("[Note: this preference is {days_old} days old]"));
  }
  if mentions_sla_risk(&text_lower) {
    notes.push("[Note: This involves SLA risk]".to_owned());
  }
  if mentions_completed(&text_lower) {
    notes.push("[Note: This task is completed]".to_owned());
  }
  if mentions_invoice_reminder(&text_lower) {
    notes.push("[Note: This involves invoice reminders]".to_owned());
  }

  if notes.is_empty() {
    text.to_owned()
  } else {
    format!("{text} {}", notes.join(" "))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn flags_stale_preference() {
    let now = Utc::now();
    let old = now - chrono::Duration::days(120);
    let annotated = annotate("Kai Media prefers Friday delivery", now, old);
    assert!(annotated.contains("120 days old"));
  }

  #[test]
  fn does_not_flag_recent_preference() {
    let now = Utc::now();
    let recent = now - chrono::Duration::days(5);
    let annotated = annotate("Kai Media prefers Friday delivery", now, recent);
    assert!(!annotated.contains("[Note:"));
  }

  #[test]
  fn flags_sla_risk_and_invoice_reminder_independently() {
    let now = Utc::now();
    let annotated = annotate("SLA breach risk on invoice due tomorrow", now, now);
    assert!(annotated.contains("SLA risk"));
    assert!(annotated.contains("invoice reminders"));
  }

  #[test]
  fn flags_task_completion() {
    let now = Utc::now();
    let annotated = annotate("Pick-pack work order is done", now, now);
    assert!(annotated.contains("task is completed"));
  }
}
