use axum::{Json, extract::State};
use plastmem_core::pipeline;
use plastmem_shared::AppError;
use serde::Serialize;
use utoipa::ToSchema;

use crate::utils::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthCheckResponse {
  pub status: &'static str,
  pub service: &'static str,
}

/// Liveness probe: confirms the database is reachable (spec §4.10, §6).
#[utoipa::path(
  get,
  path = "/health-check/",
  responses(
    (status = 200, description = "service and database are reachable", body = HealthCheckResponse),
    (status = 500, description = "database unreachable")
  )
)]
#[axum::debug_handler]
#[tracing::instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthCheckResponse>, AppError> {
  pipeline::health_check(&state.db).await.map_err(plastmem_core::CoreError::into_app_error)?;
  Ok(Json(HealthCheckResponse { status: "ok", service: "ontomem" }))
}
