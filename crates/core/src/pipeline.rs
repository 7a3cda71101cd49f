//! C11: the chat pipeline orchestrator tying every other component together (spec §4.5),
//! plus the remaining public operations listed in §4.10.

use std::sync::LazyLock;

use plastmem_ai::embed;
use plastmem_entities::app::chat_event::ChatRole;
use plastmem_entities::app::entity::EntityKind;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::chat_history;
use crate::classifier::{self, ClassifiedMemory};
use crate::consolidation::{self, ConsolidationResult};
use crate::disambiguation::{self, Disambiguation};
use crate::entity_extraction::{self, CandidateEntity};
use crate::error::CoreError;
use crate::memory::{CreateMemory, MemoryStore};
use crate::pii;
use crate::repository::DomainRepository;
use crate::retrieval::{self, RetrievalResult};
use crate::session_entities;

const FULL_INTENT_KEYWORDS: &[&str] = &[
  "order", "invoice", "payment", "work order", "task", "prefer", "remember", "net", "ach", "draft", "reschedule",
  "schedule", "status", "so-", "inv-", "wo-",
];
const FORCE_FULL_TOKENS: &[&str] = &["net15", "payment terms", "remember:", "agreed"];

static CUSTOMER_NAME_CACHE: LazyLock<tokio::sync::RwLock<Vec<String>>> =
  LazyLock::new(|| tokio::sync::RwLock::new(Vec::new()));

async fn customer_names(db: &sea_orm::DatabaseConnection) -> Result<Vec<String>, CoreError> {
  {
    let cached = CUSTOMER_NAME_CACHE.read().await;
    if !cached.is_empty() {
      return Ok(cached.clone());
    }
  }
  let names: Vec<String> = DomainRepository::all_customers(db).await?.into_iter().map(|c| c.name).collect();
  *CUSTOMER_NAME_CACHE.write().await = names.clone();
  Ok(names)
}

/// Intent triage (spec §4.5 step 1): `full` iff the message contains a business keyword or
/// a force-full token; otherwise `simple`.
#[must_use]
pub fn is_full_intent(message: &str, customer_names: &[String]) -> bool {
  let lower = message.to_lowercase();
  if FORCE_FULL_TOKENS.iter().any(|t| lower.contains(t)) {
    return true;
  }
  if customer_names.iter().any(|name| lower.contains(&name.to_lowercase())) {
    return true;
  }
  FULL_INTENT_KEYWORDS.iter().any(|k| lower.contains(k))
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChatOutcome {
  pub reply: String,
  pub session_id: Uuid,
  pub used_memories: Vec<String>,
  pub used_domain_facts: Vec<retrieval::DomainFact>,
  pub disambiguation_needed: bool,
  pub candidate_entities: Vec<CandidateEntity>,
  /// Set when C10's trigger rules fired; the HTTP layer enqueues the consolidation job.
  pub should_consolidate: bool,
}

/// Run the full chat pipeline for one user turn (spec §4.5).
#[tracing::instrument(skip(db, raw_message), fields(%session_id))]
pub async fn chat(
  db: &sea_orm::DatabaseConnection,
  user_id: &str,
  session_id: Uuid,
  raw_message: &str,
) -> Result<ChatOutcome, CoreError> {
  MemoryStore::ensure_session_user(db, session_id, user_id).await?;
  let names = customer_names(db).await?;

  let full_intent = is_full_intent(raw_message, &names);
  tracing::debug!(full_intent, "intent triage");

  let pii_detection = pii::detect(raw_message);
  let masked_text = pii::annotate_with_purpose(&pii_detection.masked_text, pii_detection.matches.first().and_then(|m| m.purpose));

  let candidates = entity_extraction::extract_entities(db, user_id, raw_message).await?;
  session_entities::persist_candidates(db, session_id, &candidates).await?;

  let last_assistant = chat_history::last_assistant_message(db, session_id).await?;
  let previous_candidates = if last_assistant.as_deref().is_some_and(disambiguation::is_clarification_message) {
    session_entities::most_recent_candidates(db, session_id).await?
  } else {
    vec![]
  };

  let decision =
    disambiguation::disambiguate(db, user_id, raw_message, last_assistant.as_deref(), &previous_candidates, candidates)
      .await?;

  let resolved_candidates = match decision {
    Disambiguation::ClarificationNeeded { candidates, prompt } => {
      chat_history::append_event(db, session_id, ChatRole::User, raw_message).await?;
      chat_history::append_event(db, session_id, ChatRole::Assistant, &prompt).await?;
      return Ok(ChatOutcome {
        reply: prompt,
        session_id,
        used_memories: vec![],
        used_domain_facts: vec![],
        disambiguation_needed: true,
        candidate_entities: candidates,
        should_consolidate: false,
      });
    }
    Disambiguation::Selected(entity) => vec![entity],
    Disambiguation::NoneNeeded => vec![],
  };

  let query_vector = embed(&masked_text).await;
  let query_vec: Vec<f32> = query_vector.as_slice().to_vec();

  let retrieval = if full_intent {
    Some(retrieval::retrieve(db, user_id, raw_message, &query_vec).await?)
  } else {
    None
  };

  let history = chat_history::recent_events(db, session_id, 10).await?;
  let prompt = retrieval::assemble(retrieval.as_ref(), &history, raw_message);
  let reply = plastmem_ai::generate_text(prompt)
    .await
    .unwrap_or_else(|_| "Sorry, I couldn't process that right now.".to_owned());

  let classified = classifier::classify(&masked_text, &names).await;
  let should_consolidate = persist_classified_memories(db, session_id, user_id, raw_message, &classified, &names).await?;

  chat_history::append_event(db, session_id, ChatRole::User, raw_message).await?;
  chat_history::append_event(db, session_id, ChatRole::Assistant, &reply).await?;

  let (used_memories, used_domain_facts) = retrieval
    .map(|r| (r.used_memories.into_iter().map(|m| m.text).collect(), r.used_domain_facts))
    .unwrap_or_default();

  Ok(ChatOutcome {
    reply,
    session_id,
    used_memories,
    used_domain_facts,
    disambiguation_needed: false,
    candidate_entities: resolved_candidates,
    should_consolidate,
  })
}

async fn persist_classified_memories(
  db: &sea_orm::DatabaseConnection,
  session_id: Uuid,
  user_id: &str,
  raw_message: &str,
  classified: &[ClassifiedMemory],
  names: &[String],
) -> Result<bool, CoreError> {
  for memory in classified {
    let embedding: Vec<f32> = embed(&memory.text).await.as_slice().to_vec();
    MemoryStore::create(db, CreateMemory {
      session_id,
      kind: memory.kind,
      text: &memory.text,
      embedding: Some(embedding),
      importance: memory.importance,
      ttl_days: memory.ttl_days,
      external_ref: None,
    })
    .await?;
  }

  let message_lower = raw_message.to_lowercase();
  let Some(customer) = names.iter().find(|n| message_lower.contains(&n.to_lowercase())) else {
    let now = chrono::Utc::now();
    return Ok(consolidation::should_trigger(raw_message, &[], now).is_some());
  };

  let recent_customer_memories = MemoryStore::mentioning(db, user_id, customer).await?;
  let now = chrono::Utc::now();
  Ok(consolidation::should_trigger(raw_message, &recent_customer_memories, now).is_some())
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScoredMemory {
  pub text: String,
  pub score: f32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MemoryQueryResult {
  pub memories: Vec<ScoredMemory>,
  pub summaries: Vec<String>,
}

/// `GetMemories(user_id, query?)` — ranked retrieval without running the full pipeline,
/// plus the user's rolling consolidation summaries (spec §4.10/§6).
#[tracing::instrument(skip(db))]
pub async fn get_memories(
  db: &sea_orm::DatabaseConnection,
  user_id: &str,
  query: &str,
  limit: usize,
) -> Result<MemoryQueryResult, CoreError> {
  let query_vector = embed(query).await;
  let query_vec: Vec<f32> = query_vector.as_slice().to_vec();
  let scored = MemoryStore::retrieve(db, &query_vec, user_id, None, limit).await?;
  let memories = scored.into_iter().map(|(_, score, text)| ScoredMemory { text, score }).collect();
  let summaries = retrieval::summary::summaries_for_user(db, user_id).await?.into_iter().map(|s| s.summary).collect();
  Ok(MemoryQueryResult { memories, summaries })
}

/// `Consolidate(user_id)` — force-run C10 regardless of trigger rules (used by the worker
/// job and the manual `/consolidate/` endpoint).
#[tracing::instrument(skip(db))]
pub async fn run_consolidation(db: &sea_orm::DatabaseConnection, user_id: &str) -> Result<ConsolidationResult, CoreError> {
  let names = customer_names(db).await?;
  let memories = MemoryStore::all_for_user(db, user_id).await?;
  if memories.is_empty() {
    return Err(CoreError::NotFound(format!("no memories to consolidate for user {user_id}")));
  }
  consolidation::consolidate(db, user_id, &names, &memories).await
}

/// `GetEntities(session_id)` — thin wrapper over the persisted extraction log.
#[tracing::instrument(skip(db))]
pub async fn get_entities(
  db: &sea_orm::DatabaseConnection,
  session_id: Uuid,
  kind: Option<EntityKind>,
) -> Result<Vec<plastmem_entities::app::entity::Model>, CoreError> {
  session_entities::entities_for_session(db, session_id, kind, None, 50).await
}

/// `Explain(session_id)` — walk back the last retrieval's reasoning for debugging (§4.10):
/// re-runs C9 for the most recent user message in the session.
#[tracing::instrument(skip(db))]
pub async fn explain(db: &sea_orm::DatabaseConnection, user_id: &str, session_id: Uuid) -> Result<RetrievalResult, CoreError> {
  let history = chat_history::recent_events(db, session_id, 10).await?;
  let Some(last_user_message) = history.iter().rev().find(|e| matches!(e.role, ChatRole::User)) else {
    return Ok(RetrievalResult::default());
  };
  let query_vector = embed(&last_user_message.content).await;
  let query_vec: Vec<f32> = query_vector.as_slice().to_vec();
  retrieval::retrieve(db, user_id, &last_user_message.content, &query_vec).await
}

/// `HealthCheck()` — DB connectivity probe (§4.10, §6).
#[tracing::instrument(skip(db))]
pub async fn health_check(db: &sea_orm::DatabaseConnection) -> Result<(), CoreError> {
  DomainRepository::all_customers(db).await?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn greeting_is_simple_intent() {
    assert!(!is_full_intent("hello there, how are you?", &[]));
  }

  #[test]
  fn business_keyword_is_full_intent() {
    assert!(is_full_intent("Can you check the status of SO-1001?", &[]));
  }

  #[test]
  fn customer_name_forces_full_intent() {
    assert!(is_full_intent("Kai Media called this morning.", &["Kai Media".to_owned()]));
  }

  #[test]
  fn force_full_token_overrides_otherwise_simple_text() {
    assert!(is_full_intent("we agreed on NET15 terms", &[]));
  }
}
