use axum::{Json, extract::{Query, State}};
use plastmem_core::CoreError;
use plastmem_core::pipeline;
use plastmem_shared::AppError;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::utils::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ExplainQuery {
  pub session_id: Uuid,
  pub user_id: String,
  pub memory_id: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExplainResponse {
  pub explanation: String,
  pub memory_sources: Vec<String>,
  pub domain_sources: Vec<String>,
}

/// Re-runs retrieval for the session's most recent user message and reports what fed the
/// reply: used memories, domain facts, conflicts, and DB-vs-memory inconsistencies (spec
/// §4.10, §6). `memory_id` narrows nothing today since retrieval always re-derives from the
/// last message; it is accepted for forward compatibility with per-memory explanations.
#[utoipa::path(
  get,
  path = "/explain/",
  params(ExplainQuery),
  responses((status = 200, description = "retrieval explanation", body = ExplainResponse))
)]
#[axum::debug_handler]
#[tracing::instrument(skip(state))]
pub async fn explain(
  State(state): State<AppState>,
  Query(params): Query<ExplainQuery>,
) -> Result<Json<ExplainResponse>, AppError> {
  let result = pipeline::explain(&state.db, &params.user_id, params.session_id).await.map_err(CoreError::into_app_error)?;

  let memory_sources = result.used_memories.iter().map(|m| m.text.clone()).collect();
  let domain_sources = result.used_domain_facts.iter().map(|f| f.detail.clone()).collect();

  let explanation = if result.summary_short_circuited {
    "Answered from a rolling consolidation summary.".to_owned()
  } else if result.used_memories.is_empty() && result.used_domain_facts.is_empty() {
    "No memories or domain facts were retrieved for the last message.".to_owned()
  } else {
    format!(
      "Used {} memor{}, {} domain fact{}, {} conflict{}, {} inconsistenc{}.",
      result.used_memories.len(),
      if result.used_memories.len() == 1 { "y" } else { "ies" },
      result.used_domain_facts.len(),
      if result.used_domain_facts.len() == 1 { "" } else { "s" },
      result.memory_conflicts.len(),
      if result.memory_conflicts.len() == 1 { "" } else { "s" },
      result.db_memory_inconsistencies.len(),
      if result.db_memory_inconsistencies.len() == 1 { "y" } else { "ies" },
    )
  };

  Ok(Json(ExplainResponse { explanation, memory_sources, domain_sources }))
}
