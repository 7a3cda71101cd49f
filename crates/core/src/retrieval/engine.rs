//! C9: orchestrates summary-priority short-circuit, ranked retrieval, domain facts,
//! conflict detection, reasoning chains, and DB/memory inconsistency checks into one
//! result consumed by prompt assembly (spec §4.8).

use plastmem_entities::app::entity::EntityKind;
use serde::Serialize;
use utoipa::ToSchema;

use crate::entity_extraction::{self, CandidateEntity};
use crate::error::CoreError;
use crate::memory::{Memory, MemoryKind, MemoryStore};
use crate::repository::DomainRepository;
use crate::retrieval::conflicts::{self, MemoryConflict};
use crate::retrieval::facts::{self, DomainFact};
use crate::retrieval::inconsistency::{self, DbMemoryInconsistency};
use crate::retrieval::reasoning::{self, ReasoningChain};
use crate::retrieval::summary::{self, SUMMARY_PRIORITY_THRESHOLD};

const RETRIEVAL_LIMIT: usize = 10;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RetrievedMemory {
  pub text: String,
  pub score: f32,
}

#[derive(Debug, Clone, Serialize, ToSchema, Default)]
pub struct RetrievalResult {
  pub candidate_entities: Vec<CandidateEntity>,
  pub used_memories: Vec<RetrievedMemory>,
  pub used_domain_facts: Vec<DomainFact>,
  pub memory_conflicts: Vec<MemoryConflict>,
  pub reasoning_chains: Vec<ReasoningChain>,
  pub db_memory_inconsistencies: Vec<DbMemoryInconsistency>,
  pub summary_short_circuited: bool,
}

/// Run the full C9 pipeline for a `full`-mode query. `query_vec` is the already-embedded
/// user message (C1); entity extraction is re-run here (step 1) since the pipeline's own
/// extraction result may have changed after disambiguation resolved a clarification.
#[tracing::instrument(skip(db, query_vec))]
pub async fn retrieve(
  db: &sea_orm::DatabaseConnection,
  user_id: &str,
  query_text: &str,
  query_vec: &[f32],
) -> Result<RetrievalResult, CoreError> {
  let candidate_entities = entity_extraction::extract_entities(db, user_id, query_text).await?;

  let mut used_memories = Vec::new();
  let mut summary_short_circuited = false;
  let mut plain_memories: Vec<Memory> = Vec::new();

  if let Some((row, similarity)) = summary::best_summary_match(db, user_id, query_vec).await? {
    if similarity > SUMMARY_PRIORITY_THRESHOLD {
      summary_short_circuited = true;
      used_memories.push(RetrievedMemory { text: row.summary, score: similarity });
    }
  }

  if !summary_short_circuited {
    let scored = MemoryStore::retrieve(db, query_vec, user_id, None, RETRIEVAL_LIMIT).await?;
    for (memory, score, annotated_text) in scored {
      used_memories.push(RetrievedMemory { text: annotated_text, score });
      plain_memories.push(memory);
    }
  }

  let mut used_domain_facts = Vec::new();
  for candidate in &candidate_entities {
    used_domain_facts.extend(facts::facts_for_entity(db, candidate).await?);
  }

  let memory_conflicts = conflicts::detect_conflicts(&candidate_entities, &plain_memories);

  let mut reasoning_chains = Vec::new();
  for candidate in candidate_entities.iter().filter(|c| c.kind == EntityKind::Customer) {
    reasoning_chains.push(reasoning::reasoning_chain_for_customer(db, &candidate.name, candidate.id).await?);
  }

  let db_memory_inconsistencies = status_inconsistencies(db, query_text, &candidate_entities, &plain_memories).await?;

  Ok(RetrievalResult {
    candidate_entities,
    used_memories,
    used_domain_facts,
    memory_conflicts,
    reasoning_chains,
    db_memory_inconsistencies,
    summary_short_circuited,
  })
}

async fn status_inconsistencies(
  db: &sea_orm::DatabaseConnection,
  query_text: &str,
  candidates: &[CandidateEntity],
  memories: &[Memory],
) -> Result<Vec<DbMemoryInconsistency>, CoreError> {
  if !inconsistency::is_status_query(query_text) {
    return Ok(vec![]);
  }

  let mut out = Vec::new();
  for candidate in candidates {
    let db_status = match candidate.kind {
      EntityKind::Order => {
        DomainRepository::sales_order_by_number(db, &candidate.name).await?.map(|so| format!("{:?}", so.status))
      }
      EntityKind::Invoice => {
        DomainRepository::invoice_by_number(db, &candidate.name).await?.map(|inv| format!("{:?}", inv.status))
      }
      EntityKind::WorkOrder => {
        DomainRepository::work_order_by_id(db, candidate.id).await?.map(|wo| format!("{:?}", wo.status))
      }
      _ => None,
    };
    let Some(db_status) = db_status else { continue };
    let db_status_token = to_snake_token(&db_status);
    out.extend(inconsistency::detect_inconsistencies(query_text, &candidate.name, &db_status_token, memories));
  }
  Ok(out)
}

/// Convert a `{:?}`-formatted PascalCase enum variant (`InFulfillment`) to the spec's
/// lower_snake_case status tokens (`in_fulfillment`).
fn to_snake_token(pascal: &str) -> String {
  let mut out = String::new();
  for (i, c) in pascal.chars().enumerate() {
    if c.is_uppercase() {
      if i > 0 {
        out.push('_');
      }
      out.extend(c.to_lowercase());
    } else {
      out.push(c);
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn snake_token_conversion_matches_spec_tokens() {
    assert_eq!(to_snake_token("InFulfillment"), "in_fulfillment");
    assert_eq!(to_snake_token("Open"), "open");
    assert_eq!(to_snake_token("Queued"), "queued");
  }
}
