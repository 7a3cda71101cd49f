//! DB-vs-memory status inconsistency detection (spec §4.8 step 7).

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;

use crate::memory::Memory;

static STATUS_QUESTION_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)status|complete|done|finished|fulfilled").expect("valid regex"));
static IDENTIFIER_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)\b(SO|INV|WO)-\d+\b").expect("valid regex"));

const STATUS_CLAIM_TOKENS: &[&str] = &["fulfilled", "complete", "done", "finished", "paid"];

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DbMemoryInconsistency {
  pub identifier: String,
  pub db_status: String,
  pub conflicting_memory: String,
  pub recommendation: &'static str,
}

/// DB status value -> set of memory-claimed tokens it conflicts with (spec §4.8 step 7).
fn conflicting_tokens(db_status: &str) -> &'static [&'static str] {
  match db_status {
    "in_fulfillment" | "draft" => &["fulfilled", "complete", "done", "finished"],
    "open" => &["paid", "complete", "done", "finished"],
    "queued" => &["done", "complete", "finished"],
    _ => &[],
  }
}

/// Only runs when the query both asks about status and references an identifier.
#[must_use]
pub fn is_status_query(query: &str) -> bool {
  STATUS_QUESTION_RE.is_match(query) && IDENTIFIER_RE.is_match(query)
}

/// Compare `db_status` for `identifier` against memories that claim a conflicting status.
#[must_use]
pub fn detect_inconsistencies(
  query: &str,
  identifier: &str,
  db_status: &str,
  memories: &[Memory],
) -> Vec<DbMemoryInconsistency> {
  if !is_status_query(query) {
    return vec![];
  }
  let tokens = conflicting_tokens(db_status);
  if tokens.is_empty() {
    return vec![];
  }

  memories
    .iter()
    .filter(|m| {
      let text_lower = m.text.to_lowercase();
      text_lower.contains(&identifier.to_lowercase())
        && STATUS_CLAIM_TOKENS
          .iter()
          .any(|claim| tokens.contains(claim) && text_lower.contains(claim))
    })
    .map(|m| DbMemoryInconsistency {
      identifier: identifier.to_owned(),
      db_status: db_status.to_owned(),
      conflicting_memory: m.text.clone(),
      recommendation: "prefer_db_mark_memory_for_decay",
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;
  use plastmem_entities::memory::MemoryKind;
  use uuid::Uuid;

  fn memory(text: &str) -> Memory {
    Memory {
      id: 1,
      session_id: Uuid::new_v4(),
      kind: MemoryKind::Semantic,
      text: text.to_owned(),
      embedding: None,
      importance: 0.8,
      ttl_days: None,
      external_ref: None,
      created_at: Utc::now(),
    }
  }

  #[test]
  fn status_query_requires_both_keyword_and_identifier() {
    assert!(is_status_query("Is SO-1001 complete?"));
    assert!(!is_status_query("Is it complete?"));
    assert!(!is_status_query("What is SO-1001's title?"));
  }

  #[test]
  fn in_fulfillment_conflicts_with_fulfilled_claim() {
    let memories = vec![memory("SO-1001 fulfilled per customer.")];
    let result = detect_inconsistencies("Is SO-1001 complete?", "SO-1001", "in_fulfillment", &memories);
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].recommendation, "prefer_db_mark_memory_for_decay");
  }

  #[test]
  fn no_conflict_when_status_not_in_mapping() {
    let memories = vec![memory("SO-1001 fulfilled per customer.")];
    let result = detect_inconsistencies("Is SO-1001 complete?", "SO-1001", "approved", &memories);
    assert!(result.is_empty());
  }
}
