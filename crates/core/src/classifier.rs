//! C8: classify a user utterance into episodic/semantic memory candidates (spec §4.6).

use plastmem_ai::{
  ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
  generate_object,
};
use plastmem_entities::memory::MemoryKind;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::memory::clamp_importance;

const FORCE_SEMANTIC_MARKERS: &[&str] =
  &["remember:", "prefer", "like", "always", "never", "is net", "payment terms", "ach"];

const ACTION_KEYWORDS: &[&str] =
  &["scheduled", "rescheduled", "shipped", "called", "sent", "completed", "paid", "updated"];
const KNOWLEDGE_KEYWORDS: &[&str] =
  &["prefers", "likes", "always", "never", "terms", "policy", "requires", "wants"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
  Action,
  Knowledge,
  Status,
  Preference,
}

#[derive(Debug, Clone)]
pub struct ClassifiedMemory {
  pub kind: MemoryKind,
  pub importance: f32,
  pub ttl_days: Option<i32>,
  pub text: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ClassifierOutput {
  pub category: ClassifierCategory,
  pub kind: ClassifierKind,
  pub importance: f32,
  pub ttl_days: Option<i32>,
  pub confidence: f32,
  pub reasoning: String,
}

#[derive(Debug, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassifierCategory {
  Action,
  Knowledge,
  Status,
  Preference,
}

#[derive(Debug, Deserialize, JsonSchema, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
  Episodic,
  Semantic,
}

impl From<ClassifierKind> for MemoryKind {
  fn from(value: ClassifierKind) -> Self {
    match value {
      ClassifierKind::Episodic => Self::Episodic,
      ClassifierKind::Semantic => Self::Semantic,
    }
  }
}

fn contains_customer_name(text_lower: &str, customer_names: &[String]) -> bool {
  customer_names.iter().any(|name| text_lower.contains(&name.to_lowercase()))
}

fn is_force_semantic(text_lower: &str, customer_names: &[String]) -> bool {
  if FORCE_SEMANTIC_MARKERS.iter().any(|m| text_lower.contains(m)) {
    return true;
  }
  // A customer name alone doesn't make a message durable knowledge — a reschedule or
  // status message naming a customer is still a one-off action (spec §4.6). Only force
  // semantic when the name co-occurs with actual preference/knowledge wording.
  contains_customer_name(text_lower, customer_names) && KNOWLEDGE_KEYWORDS.iter().any(|k| text_lower.contains(k))
}

const SYSTEM_PROMPT: &str = "\
Classify the user's message for a business-memory pipeline. Respond with:
- category: ACTION, KNOWLEDGE, STATUS, or PREFERENCE
- kind: episodic (time-bounded, default 30-day ttl) or semantic (durable, permanent)
- importance in [0,1]
- ttl_days (null for semantic)
- confidence in [0,1] and a short reasoning string";

/// Deterministic keyword fallback (spec §4.6, §9): used when the LLM call fails or
/// returns unparseable JSON, and exercised directly by tests so classification is
/// provider-independent.
#[must_use]
pub fn keyword_fallback(masked_text: &str) -> ClassifiedMemory {
  let text_lower = masked_text.to_lowercase();
  let action_count = ACTION_KEYWORDS.iter().filter(|k| text_lower.contains(**k)).count();
  let knowledge_count = KNOWLEDGE_KEYWORDS.iter().filter(|k| text_lower.contains(**k)).count();

  if knowledge_count > action_count {
    ClassifiedMemory {
      kind: MemoryKind::Semantic,
      importance: 0.6,
      ttl_days: None,
      text: masked_text.to_owned(),
    }
  } else {
    // Ties default to ACTION/episodic/30d (spec §4.6).
    ClassifiedMemory {
      kind: MemoryKind::Episodic,
      importance: 0.5,
      ttl_days: Some(crate::memory::EPISODIC_DEFAULT_TTL_DAYS),
      text: masked_text.to_owned(),
    }
  }
}

/// Implicit preference extraction (spec §4.6): synthesizes an additional semantic memory
/// when the message matches a known rule (reschedule+Friday+customer, NET payment terms).
#[must_use]
pub fn implicit_preferences(masked_text: &str, customer_names: &[String]) -> Vec<ClassifiedMemory> {
  let text_lower = masked_text.to_lowercase();
  let mut out = Vec::new();

  if text_lower.contains("reschedule") && text_lower.contains("friday") {
    if let Some(customer) = customer_names.iter().find(|n| text_lower.contains(&n.to_lowercase())) {
      out.push(ClassifiedMemory {
        kind: MemoryKind::Semantic,
        importance: 0.9,
        ttl_days: None,
        text: format!("{customer} prefers Friday; align WO scheduling accordingly."),
      });
    }
  }

  if text_lower.contains("net") {
    if let Some(customer) = customer_names.iter().find(|n| text_lower.contains(&n.to_lowercase())) {
      if let Some(term) = extract_net_term(&text_lower) {
        out.push(ClassifiedMemory {
          kind: MemoryKind::Semantic,
          importance: 0.9,
          ttl_days: None,
          text: format!("{customer} payment terms are {term}; apply to future invoices."),
        });
      }
    }
  }

  out
}

fn extract_net_term(text_lower: &str) -> Option<String> {
  let idx = text_lower.find("net")?;
  let rest = &text_lower[idx..];
  let digits: String = rest.chars().skip(3).take_while(|c| c.is_ascii_digit()).collect();
  if digits.is_empty() { None } else { Some(format!("NET{digits}")) }
}

/// Classify `masked_text` into zero or more memories. Force-semantic rules run first and
/// are deterministic; otherwise the LLM is consulted with a keyword fallback on failure.
#[tracing::instrument(skip(masked_text, customer_names))]
pub async fn classify(masked_text: &str, customer_names: &[String]) -> Vec<ClassifiedMemory> {
  let text_lower = masked_text.to_lowercase();
  let mut results = Vec::new();

  if is_force_semantic(&text_lower, customer_names) {
    results.push(ClassifiedMemory {
      kind: MemoryKind::Semantic,
      importance: 0.9,
      ttl_days: None,
      text: masked_text.to_owned(),
    });
  } else {
    let primary = match classify_with_llm(masked_text).await {
      Some(output) => ClassifiedMemory {
        kind: output.kind.into(),
        importance: clamp_importance(output.importance),
        ttl_days: output.ttl_days,
        text: masked_text.to_owned(),
      },
      None => keyword_fallback(masked_text),
    };
    results.push(primary);
  }

  results.extend(implicit_preferences(masked_text, customer_names));
  results
}

async fn classify_with_llm(masked_text: &str) -> Option<ClassifierOutput> {
  let system = ChatCompletionRequestSystemMessage::from(SYSTEM_PROMPT);
  let user = ChatCompletionRequestUserMessage::from(masked_text);
  generate_object::<ClassifierOutput>(
    vec![ChatCompletionRequestMessage::System(system), ChatCompletionRequestMessage::User(user)],
    "memory_classification".to_owned(),
    Some("Classify a chat message for memory storage".to_owned()),
  )
  .await
  .ok()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn remember_marker_forces_semantic() {
    assert!(is_force_semantic("remember: tc boiler is net15", &[]));
  }

  #[test]
  fn customer_name_forces_semantic() {
    assert!(is_force_semantic("kai media wants a status update", &["Kai Media".to_owned()]));
  }

  #[test]
  fn keyword_fallback_ties_default_to_episodic() {
    let result = keyword_fallback("the weather is nice today");
    assert_eq!(result.kind, MemoryKind::Episodic);
    assert_eq!(result.ttl_days, Some(30));
  }

  #[test]
  fn keyword_fallback_prefers_knowledge_when_outnumbering_action() {
    let result = keyword_fallback("customer always prefers policy compliance");
    assert_eq!(result.kind, MemoryKind::Semantic);
  }

  #[test]
  fn implicit_reschedule_friday_rule_emits_semantic_preference() {
    let out = implicit_preferences(
      "Please reschedule Kai Media's pick-pack work order to Friday; keep Alex.",
      &["Kai Media".to_owned()],
    );
    assert_eq!(out.len(), 1);
    assert!(out[0].text.contains("Kai Media prefers Friday"));
  }

  #[test]
  fn implicit_net_term_rule_extracts_digits() {
    let out = implicit_preferences(
      "TC Boiler is NET15 and agreed ACH.",
      &["TC Boiler".to_owned()],
    );
    assert!(out.iter().any(|m| m.text.contains("NET15")));
  }
}
