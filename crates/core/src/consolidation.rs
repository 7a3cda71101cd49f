//! C10: consolidation trigger rules and the summarization/promotion action that runs when
//! one fires (spec §4.9).

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use plastmem_ai::embed;
use regex::Regex;

use crate::error::CoreError;
use crate::memory::{CreateMemory, Memory, MemoryKind, MemoryStore, word_jaccard};
use crate::retrieval::summary::upsert_summary;

const STALE_PREFERENCE_AGE_DAYS: i64 = 90;
const STALE_PREFERENCE_IMPORTANCE: f32 = 0.7;
const CUSTOMER_FREQUENCY_THRESHOLD: usize = 3;
const CUSTOMER_FREQUENCY_WINDOW_DAYS: i64 = 30;
const SELECTION_WINDOW_DAYS: i64 = 30;
const CONSOLIDATION_SESSION_WINDOW: i32 = 3;

const FORCE_TRIGGER_TOKENS: &[&str] = &["tc boiler", "kai media", "net15"];
const PREFERENCE_WORDS: &[&str] = &["prefer", "like", "always", "never"];
const COMPLETION_WORDS: &[&str] = &["done", "complete", "completed", "finished"];

static NET_TERM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)net\s?(\d+)").expect("valid regex"));
static SO_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bSO-\d+\b").expect("valid regex"));
static DOLLAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\s?\d[\d,]*(?:/\s?month)?").expect("valid regex"));
const DELIVERY_DAYS: &[&str] = &["monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
  StalePreference,
  CustomerFrequency,
  TaskCompletion,
  ForceToken,
}

fn mentions_preference(text_lower: &str) -> bool {
  PREFERENCE_WORDS.iter().any(|w| text_lower.contains(w))
}

fn is_stale_preference(memory: &Memory, now: DateTime<Utc>) -> bool {
  let text_lower = memory.text.to_lowercase();
  if !mentions_preference(&text_lower) {
    return false;
  }
  let age_days = (now - memory.created_at).num_days();
  age_days > STALE_PREFERENCE_AGE_DAYS || memory.importance < STALE_PREFERENCE_IMPORTANCE
}

fn denotes_task_completion(memory: &Memory) -> bool {
  let text_lower = memory.text.to_lowercase();
  COMPLETION_WORDS.iter().any(|w| text_lower.contains(w))
}

fn mentions_force_token(message_lower: &str) -> bool {
  FORCE_TRIGGER_TOKENS.iter().any(|t| message_lower.contains(t))
}

/// Decide whether consolidation should run (spec §4.9: "any one" of the four rules).
/// `recent_customer_memories` should already be scoped to the customer named in the
/// current message, if any, and to the last 30 days.
#[must_use]
pub fn should_trigger(
  message_text: &str,
  recent_customer_memories: &[Memory],
  now: DateTime<Utc>,
) -> Option<TriggerReason> {
  if recent_customer_memories.iter().any(|m| is_stale_preference(m, now)) {
    return Some(TriggerReason::StalePreference);
  }
  let window_count = recent_customer_memories
    .iter()
    .filter(|m| (now - m.created_at).num_days() <= CUSTOMER_FREQUENCY_WINDOW_DAYS)
    .count();
  if window_count >= CUSTOMER_FREQUENCY_THRESHOLD {
    return Some(TriggerReason::CustomerFrequency);
  }
  if recent_customer_memories.iter().any(denotes_task_completion) {
    return Some(TriggerReason::TaskCompletion);
  }
  if mentions_force_token(&message_text.to_lowercase()) {
    return Some(TriggerReason::ForceToken);
  }
  None
}

fn title_case(s: &str) -> String {
  s.split_whitespace()
    .map(|word| {
      let mut chars = word.chars();
      match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
      }
    })
    .collect::<Vec<_>>()
    .join(" ")
}

fn extract_terms(texts: &[&str]) -> Vec<String> {
  texts
    .iter()
    .filter_map(|t| NET_TERM_RE.captures(t).map(|c| format!("NET{}", &c[1])))
    .collect::<std::collections::BTreeSet<_>>()
    .into_iter()
    .collect()
}

fn extract_orders(texts: &[&str]) -> Vec<String> {
  let mut out: Vec<String> = texts.iter().flat_map(|t| SO_RE.find_iter(t)).map(|m| m.as_str().to_uppercase()).collect();
  if texts.iter().any(|t| t.to_lowercase().contains("rush") && t.to_lowercase().contains("work order")) {
    out.push("rush WO".to_owned());
  }
  out.sort();
  out.dedup();
  out
}

fn extract_payments(texts: &[&str]) -> Vec<String> {
  let mut out: Vec<String> = texts.iter().flat_map(|t| DOLLAR_RE.find_iter(t)).map(|m| m.as_str().to_owned()).collect();
  out.sort();
  out.dedup();
  out
}

fn extract_preferences(texts: &[&str]) -> Vec<String> {
  let mut out = Vec::new();
  for t in texts {
    let lower = t.to_lowercase();
    for day in DELIVERY_DAYS {
      if lower.contains(day) {
        out.push(title_case(day));
      }
    }
    if lower.contains("ach") {
      out.push("ACH".to_owned());
    }
  }
  out.sort();
  out.dedup();
  out
}

fn customer_key_info(customer_name: &str, memories: &[&Memory]) -> String {
  let texts: Vec<&str> = memories.iter().map(|m| m.text.as_str()).collect();
  let mut buckets = Vec::new();
  let terms = extract_terms(&texts);
  if !terms.is_empty() {
    buckets.push(format!("Terms: {}", terms.join(", ")));
  }
  let orders = extract_orders(&texts);
  if !orders.is_empty() {
    buckets.push(format!("Orders: {}", orders.join(", ")));
  }
  let payments = extract_payments(&texts);
  if !payments.is_empty() {
    buckets.push(format!("Payments: {}", payments.join(", ")));
  }
  let preferences = extract_preferences(&texts);
  if !preferences.is_empty() {
    buckets.push(format!("Preferences: {}", preferences.join(", ")));
  }
  format!("{}: {}", title_case(customer_name), buckets.join("; "))
}

#[derive(Debug, Clone)]
pub struct ConsolidationResult {
  pub summary_id: i64,
  pub summary_text: String,
  pub promoted: usize,
}

/// Bucketed per-customer key info, joined across customers (pure, spec §4.9 "Action").
#[must_use]
fn build_summary_text(customer_names: &[String], recent: &[&Memory]) -> String {
  let mut by_customer: HashMap<&str, Vec<&Memory>> = HashMap::new();
  for memory in recent {
    let text_lower = memory.text.to_lowercase();
    for name in customer_names {
      if text_lower.contains(&name.to_lowercase()) {
        by_customer.entry(name.as_str()).or_default().push(memory);
      }
    }
  }

  let mut names_sorted: Vec<&str> = by_customer.keys().copied().collect();
  names_sorted.sort_unstable();
  names_sorted.into_iter().map(|name| customer_key_info(name, &by_customer[name])).collect::<Vec<_>>().join(" | ")
}

/// Run the consolidation action: select the last 30 days of memories, group by recognized
/// customer, extract bucketed key info, upsert the rolling summary, and promote recurring
/// episodic patterns into durable semantic memories.
#[tracing::instrument(skip(db, memories))]
pub async fn consolidate(
  db: &sea_orm::DatabaseConnection,
  user_id: &str,
  customer_names: &[String],
  memories: &[Memory],
) -> Result<ConsolidationResult, CoreError> {
  let now = Utc::now();
  let recent: Vec<&Memory> =
    memories.iter().filter(|m| (now - m.created_at).num_days() <= SELECTION_WINDOW_DAYS).collect();

  let summary_text = build_summary_text(customer_names, &recent);
  let embedding: Vec<f32> = embed(&summary_text).await.as_slice().to_vec();

  let summary_id =
    upsert_summary(db, user_id, CONSOLIDATION_SESSION_WINDOW, &summary_text, Some(embedding)).await?;

  let promoted = promote_recurring_patterns(db, &recent).await?;

  Ok(ConsolidationResult { summary_id, summary_text, promoted })
}

/// Promote recurring episodic patterns ("prefers","likes","always","never") into durable
/// semantic memories when `>= 2` similar episodic rows exist (spec §4.9).
async fn promote_recurring_patterns(
  db: &sea_orm::DatabaseConnection,
  recent: &[&Memory],
) -> Result<usize, CoreError> {
  let candidates: Vec<&&Memory> = recent
    .iter()
    .filter(|m| m.kind == MemoryKind::Episodic && mentions_preference(&m.text.to_lowercase()))
    .collect();

  let mut promoted_groups: Vec<Vec<&&Memory>> = Vec::new();
  let mut used = vec![false; candidates.len()];

  for i in 0..candidates.len() {
    if used[i] {
      continue;
    }
    let mut group = vec![candidates[i]];
    used[i] = true;
    for j in (i + 1)..candidates.len() {
      if used[j] {
        continue;
      }
      if word_jaccard(&candidates[i].text, &candidates[j].text) > 0.5 {
        group.push(candidates[j]);
        used[j] = true;
      }
    }
    if group.len() >= 2 {
      promoted_groups.push(group);
    }
  }

  let mut promoted = 0;
  for group in promoted_groups {
    let representative = group[0];
    let embedding: Vec<f32> = embed(&representative.text).await.as_slice().to_vec();
    MemoryStore::create(db, CreateMemory {
      session_id: representative.session_id,
      kind: MemoryKind::Semantic,
      text: &representative.text,
      embedding: Some(embedding),
      importance: 0.8,
      ttl_days: None,
      external_ref: None,
    })
    .await?;
    promoted += 1;
  }
  Ok(promoted)
}

#[cfg(test)]
mod tests {
  use super::*;
  use uuid::Uuid;

  fn memory(text: &str, kind: MemoryKind, days_ago: i64, importance: f32) -> Memory {
    Memory {
      id: 1,
      session_id: Uuid::new_v4(),
      kind,
      text: text.to_owned(),
      embedding: None,
      importance,
      ttl_days: None,
      external_ref: None,
      created_at: Utc::now() - chrono::Duration::days(days_ago),
    }
  }

  #[test]
  fn stale_preference_triggers_on_age() {
    let now = Utc::now();
    let memories = vec![memory("Kai Media prefers Friday", MemoryKind::Semantic, 95, 0.9)];
    assert_eq!(should_trigger("hi", &memories, now), Some(TriggerReason::StalePreference));
  }

  #[test]
  fn customer_frequency_triggers_at_threshold() {
    let now = Utc::now();
    let memories = vec![
      memory("note one", MemoryKind::Episodic, 1, 0.5),
      memory("note two", MemoryKind::Episodic, 2, 0.5),
      memory("note three", MemoryKind::Episodic, 3, 0.5),
    ];
    assert_eq!(should_trigger("hi", &memories, now), Some(TriggerReason::CustomerFrequency));
  }

  #[test]
  fn force_token_triggers_even_with_no_memories() {
    let now = Utc::now();
    assert_eq!(should_trigger("TC Boiler called", &[], now), Some(TriggerReason::ForceToken));
  }

  #[test]
  fn no_trigger_when_nothing_matches() {
    let now = Utc::now();
    let memories = vec![memory("ordinary note", MemoryKind::Episodic, 1, 0.9)];
    assert_eq!(should_trigger("hello", &memories, now), None);
  }

  #[test]
  fn title_case_capitalizes_each_word() {
    assert_eq!(title_case("tc boiler"), "Tc Boiler");
  }

  #[test]
  fn key_info_orders_buckets_terms_orders_payments_preferences() {
    let memories = vec![memory("TC Boiler is NET15, SO-1001 rush work order, $500/month, ACH Friday", MemoryKind::Semantic, 1, 0.9)];
    let refs: Vec<&Memory> = memories.iter().collect();
    let summary = customer_key_info("tc boiler", &refs);
    assert!(summary.starts_with("Tc Boiler:"));
    assert!(summary.contains("Terms: NET15"));
    assert!(summary.contains("Orders:"));
    assert!(summary.contains("Payments:"));
    assert!(summary.contains("Preferences:"));
  }
}
