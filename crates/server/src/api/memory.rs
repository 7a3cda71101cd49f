use axum::{Json, extract::{Query, State}};
use plastmem_core::CoreError;
use plastmem_core::pipeline::{self, MemoryQueryResult};
use plastmem_shared::AppError;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::utils::AppState;

fn default_limit() -> usize {
  10
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct MemoryQuery {
  pub user_id: String,
  #[serde(default)]
  pub query: String,
  #[serde(default = "default_limit")]
  pub k: usize,
}

/// Ranked memory retrieval for a user plus their rolling consolidation summaries,
/// without running the full chat pipeline (spec §4.10, §6).
#[utoipa::path(
  get,
  path = "/memory/",
  params(MemoryQuery),
  responses(
    (status = 200, description = "memories and summaries for the user", body = MemoryQueryResult),
    (status = 422, description = "empty user_id")
  )
)]
#[axum::debug_handler]
#[tracing::instrument(skip(state))]
pub async fn get_memory(
  State(state): State<AppState>,
  Query(params): Query<MemoryQuery>,
) -> Result<Json<MemoryQueryResult>, AppError> {
  if params.user_id.trim().is_empty() {
    return Err(AppError::with_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY, anyhow::anyhow!("user_id cannot be empty")));
  }

  let result = pipeline::get_memories(&state.db, &params.user_id, &params.query, params.k)
    .await
    .map_err(CoreError::into_app_error)?;

  Ok(Json(result))
}
