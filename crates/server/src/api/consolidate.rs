use axum::{Json, extract::State, http::StatusCode};
use plastmem_core::CoreError;
use plastmem_core::pipeline;
use plastmem_shared::AppError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ConsolidateRequest {
  pub user_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConsolidateResponse {
  pub summary_id: i64,
  pub message: String,
}

/// Force-run consolidation for a user regardless of the trigger rules (spec §4.9/§4.10).
/// 404 when the user has no memories to consolidate.
#[utoipa::path(
  post,
  path = "/consolidate/",
  request_body = ConsolidateRequest,
  responses(
    (status = 200, description = "consolidation ran", body = ConsolidateResponse),
    (status = 404, description = "no memories to consolidate for this user"),
    (status = 422, description = "empty user_id")
  )
)]
#[axum::debug_handler]
#[tracing::instrument(skip(state), fields(user_id = %payload.user_id))]
pub async fn consolidate(
  State(state): State<AppState>,
  Json(payload): Json<ConsolidateRequest>,
) -> Result<Json<ConsolidateResponse>, AppError> {
  if payload.user_id.trim().is_empty() {
    return Err(AppError::with_status(StatusCode::UNPROCESSABLE_ENTITY, anyhow::anyhow!("user_id cannot be empty")));
  }

  let result = pipeline::run_consolidation(&state.db, &payload.user_id).await.map_err(CoreError::into_app_error)?;

  Ok(Json(ConsolidateResponse {
    summary_id: result.summary_id,
    message: format!("consolidated {} promoted memor{}", result.promoted, if result.promoted == 1 { "y" } else { "ies" }),
  }))
}
