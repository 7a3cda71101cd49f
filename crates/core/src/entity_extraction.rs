//! C5: candidate business-entity extraction from free text (spec §4.3).

use std::collections::HashSet;
use std::sync::LazyLock;

use plastmem_entities::app::entity::EntityKind;
use regex::Regex;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::alias::AliasStore;
use crate::error::CoreError;
use crate::repository::DomainRepository;

static SO_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bSO-\d+\b").expect("valid regex"));
static INV_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bINV-\d+\b").expect("valid regex"));

const WORK_ORDER_PATTERNS: &[&str] = &["pick-pack", "work order", "album fulfillment"];
const TASK_KEYWORDS: &[&str] = &["task", "todo", "issue", "problem", "support"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchConfidence {
  Exact,
  Fuzzy,
  Other,
}

impl MatchConfidence {
  /// Scoring weight used by C6 disambiguation (spec §4.4).
  #[must_use]
  pub const fn score(self) -> f32 {
    match self {
      Self::Exact => 1.0,
      Self::Fuzzy => 0.8,
      Self::Other => 0.5,
    }
  }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CandidateEntity {
  pub name: String,
  pub kind: EntityKind,
  pub confidence: MatchConfidence,
  pub table: &'static str,
  pub id: Uuid,
}

impl CandidateEntity {
  #[must_use]
  pub fn external_ref(&self) -> serde_json::Value {
    json!({ "table": self.table, "id": self.id, "confidence": format!("{:?}", self.confidence).to_lowercase() })
  }
}

/// `NameWords`/`TextWords` fuzzy rule (spec §4.3 step 3): subset containment or ≥0.8
/// Jaccard-like overlap against the customer's own name-word count.
fn fuzzy_customer_match(name_words: &HashSet<&str>, text_words: &HashSet<&str>) -> bool {
  let intersection = name_words.intersection(text_words).count();
  if intersection == 0 {
    return false;
  }
  let subset_rule = text_words.is_subset(name_words) && intersection >= 1;
  let ratio_rule = (intersection as f32 / name_words.len() as f32) >= 0.8;
  subset_rule || ratio_rule
}

fn words(text: &str) -> HashSet<&str> {
  text.split_whitespace().collect()
}

async fn extract_customers(
  db: &DatabaseConnection,
  text: &str,
) -> Result<Vec<CandidateEntity>, CoreError> {
  let text_lower = text.to_lowercase();
  let text_words = words(&text_lower);
  let customers = DomainRepository::all_customers(db).await?;

  // Shortform override: a token that is a strict prefix of multiple customer names must
  // surface all of them (spec §4.3 step 4).
  let mut shortform_hits: Vec<&plastmem_entities::customer::Model> = Vec::new();
  for token in &text_words {
    if token.len() < 2 {
      continue;
    }
    let matches: Vec<_> = customers
      .iter()
      .filter(|c| c.name.to_lowercase().starts_with(token.as_ref() as &str) && c.name.to_lowercase() != *token)
      .collect();
    if matches.len() > 1 {
      shortform_hits.extend(matches);
    }
  }
  if !shortform_hits.is_empty() {
    let mut seen = HashSet::new();
    return Ok(
      shortform_hits
        .into_iter()
        .filter(|c| seen.insert(c.customer_id))
        .map(|c| CandidateEntity {
          name: c.name.clone(),
          kind: EntityKind::Customer,
          confidence: MatchConfidence::Other,
          table: "customers",
          id: c.customer_id,
        })
        .collect(),
    );
  }

  let mut out = Vec::new();
  for customer in &customers {
    let name_lower = customer.name.to_lowercase();
    if text_lower.contains(&name_lower) {
      out.push(CandidateEntity {
        name: customer.name.clone(),
        kind: EntityKind::Customer,
        confidence: MatchConfidence::Exact,
        table: "customers",
        id: customer.customer_id,
      });
      continue;
    }
    let name_words = words(&name_lower);
    if fuzzy_customer_match(&name_words, &text_words) {
      out.push(CandidateEntity {
        name: customer.name.clone(),
        kind: EntityKind::Customer,
        confidence: MatchConfidence::Fuzzy,
        table: "customers",
        id: customer.customer_id,
      });
    }
  }
  Ok(out)
}

async fn extract_orders(db: &DatabaseConnection, text: &str) -> Result<Vec<CandidateEntity>, CoreError> {
  let mut out = Vec::new();
  for m in SO_RE.find_iter(text) {
    if let Some(so) = DomainRepository::sales_order_by_number(db, &m.as_str().to_uppercase()).await? {
      out.push(CandidateEntity {
        name: so.so_number.clone(),
        kind: EntityKind::Order,
        confidence: MatchConfidence::Exact,
        table: "sales_orders",
        id: so.so_id,
      });
    }
  }
  Ok(out)
}

async fn extract_invoices(db: &DatabaseConnection, text: &str) -> Result<Vec<CandidateEntity>, CoreError> {
  let mut out = Vec::new();
  for m in INV_RE.find_iter(text) {
    if let Some(inv) = DomainRepository::invoice_by_number(db, &m.as_str().to_uppercase()).await? {
      out.push(CandidateEntity {
        name: inv.invoice_number.clone(),
        kind: EntityKind::Invoice,
        confidence: MatchConfidence::Exact,
        table: "invoices",
        id: inv.invoice_id,
      });
    }
  }
  Ok(out)
}

async fn extract_work_orders(
  db: &DatabaseConnection,
  text: &str,
) -> Result<Vec<CandidateEntity>, CoreError> {
  let text_lower = text.to_lowercase();
  if !WORK_ORDER_PATTERNS.iter().any(|p| text_lower.contains(p)) {
    return Ok(vec![]);
  }
  let mut out = Vec::new();
  for pattern in WORK_ORDER_PATTERNS {
    if !text_lower.contains(pattern) {
      continue;
    }
    for wo in DomainRepository::work_orders_matching_text(db, pattern).await? {
      out.push(CandidateEntity {
        name: wo.description.clone().unwrap_or_else(|| "work order".to_owned()),
        kind: EntityKind::WorkOrder,
        confidence: MatchConfidence::Exact,
        table: "work_orders",
        id: wo.wo_id,
      });
    }
  }
  Ok(out)
}

async fn extract_tasks(db: &DatabaseConnection, text: &str) -> Result<Vec<CandidateEntity>, CoreError> {
  let text_lower = text.to_lowercase();
  if !TASK_KEYWORDS.iter().any(|k| text_lower.contains(k)) {
    return Ok(vec![]);
  }
  let mut out = Vec::new();
  for keyword in TASK_KEYWORDS {
    for task in DomainRepository::tasks_matching_text(db, keyword).await? {
      out.push(CandidateEntity {
        name: task.title.clone(),
        kind: EntityKind::Task,
        confidence: MatchConfidence::Fuzzy,
        table: "tasks",
        id: task.task_id,
      });
    }
  }
  out.dedup_by_key(|c| c.id);
  Ok(out)
}

/// `(text, session_id, user_id) -> Vec<CandidateEntity>` (spec §4.3).
#[tracing::instrument(skip(db, text))]
pub async fn extract_entities(
  db: &DatabaseConnection,
  user_id: &str,
  text: &str,
) -> Result<Vec<CandidateEntity>, CoreError> {
  if let Some(alias) = AliasStore::exact_match(db, user_id, text).await? {
    return Ok(vec![CandidateEntity {
      name: alias.entity_name,
      kind: EntityKind::Customer,
      confidence: MatchConfidence::Exact,
      table: "customers",
      id: alias.entity_id,
    }]);
  }

  let translated = AliasStore::translate(db, user_id, text).await?;
  let translated_text = if translated == text { text.to_owned() } else { format!("{text} {translated}") };

  let mut out = Vec::new();
  out.extend(extract_customers(db, &translated_text).await?);
  out.extend(extract_orders(db, text).await?);
  out.extend(extract_invoices(db, text).await?);
  out.extend(extract_work_orders(db, text).await?);
  out.extend(extract_tasks(db, text).await?);
  Ok(out)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fuzzy_subset_rule_matches_partial_name() {
    let name_words = words("kai media europe");
    let text_words = words("kai media");
    assert!(fuzzy_customer_match(&name_words, &text_words));
  }

  #[test]
  fn fuzzy_rule_rejects_unrelated_text() {
    let name_words = words("kai media europe");
    let text_words = words("tc boiler");
    assert!(!fuzzy_customer_match(&name_words, &text_words));
  }

  #[test]
  fn ratio_rule_matches_high_overlap_without_subset() {
    let name_words = words("kai media group");
    let text_words = words("kai media group llc");
    assert!(fuzzy_customer_match(&name_words, &text_words));
  }

  #[test]
  fn confidence_scores_match_spec_gap_formula() {
    assert!((MatchConfidence::Exact.score() - 1.0).abs() < f32::EPSILON);
    assert!((MatchConfidence::Fuzzy.score() - 0.8).abs() < f32::EPSILON);
    assert!((MatchConfidence::Other.score() - 0.5).abs() < f32::EPSILON);
  }
}
