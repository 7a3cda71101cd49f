use apalis::prelude::TaskSink;
use axum::{Json, extract::State, http::StatusCode};
use plastmem_core::CoreError;
use plastmem_core::pipeline::{self, ChatOutcome};
use plastmem_shared::AppError;
use plastmem_worker::ConsolidationJob;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::utils::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
  pub user_id: String,
  pub session_id: Option<Uuid>,
  pub message: String,
}

/// Run one turn of the conversational pipeline: intent triage, entity extraction and
/// disambiguation, retrieval, reply generation, memory classification, and (when a
/// consolidation trigger fired) enqueuing the background summarization job.
#[utoipa::path(
  post,
  path = "/chat/",
  request_body = ChatRequest,
  responses(
    (status = 200, description = "turn processed", body = ChatOutcome),
    (status = 422, description = "empty user_id or message")
  )
)]
#[axum::debug_handler]
#[tracing::instrument(skip(state), fields(user_id = %payload.user_id))]
pub async fn chat(State(state): State<AppState>, Json(payload): Json<ChatRequest>) -> Result<Json<ChatOutcome>, AppError> {
  if payload.user_id.trim().is_empty() {
    return Err(AppError::with_status(StatusCode::UNPROCESSABLE_ENTITY, anyhow::anyhow!("user_id cannot be empty")));
  }
  if payload.message.trim().is_empty() {
    return Err(AppError::with_status(StatusCode::UNPROCESSABLE_ENTITY, anyhow::anyhow!("message cannot be empty")));
  }

  let session_id = payload.session_id.unwrap_or_else(Uuid::new_v4);

  let outcome = pipeline::chat(&state.db, &payload.user_id, session_id, &payload.message)
    .await
    .map_err(CoreError::into_app_error)?;

  if outcome.should_consolidate {
    let mut job_storage = state.job_storage.clone();
    job_storage
      .push(ConsolidationJob { user_id: payload.user_id.clone() })
      .await?;
  }

  Ok(Json(outcome))
}
