use axum::{Json, extract::{Query, State}};
use chrono::{DateTime, FixedOffset};
use plastmem_core::CoreError;
use plastmem_core::pipeline;
use plastmem_entities::app::entity::EntityKind;
use plastmem_shared::AppError;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::utils::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct EntitiesQuery {
  pub session_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EntityDto {
  pub entity_id: i64,
  pub name: String,
  pub kind: EntityKind,
  #[schema(value_type = String)]
  pub created_at: DateTime<FixedOffset>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EntitiesResponse {
  pub entities: Vec<EntityDto>,
}

/// Entities extracted from a session's messages so far, newest first (spec §4.10, §6).
#[utoipa::path(
  get,
  path = "/entities/",
  params(EntitiesQuery),
  responses((status = 200, description = "entities seen in the session", body = EntitiesResponse))
)]
#[axum::debug_handler]
#[tracing::instrument(skip(state))]
pub async fn get_entities(
  State(state): State<AppState>,
  Query(params): Query<EntitiesQuery>,
) -> Result<Json<EntitiesResponse>, AppError> {
  let rows = pipeline::get_entities(&state.db, params.session_id, None).await.map_err(CoreError::into_app_error)?;

  let entities = rows
    .into_iter()
    .map(|row| EntityDto { entity_id: row.entity_id, name: row.name, kind: row.r#type, created_at: row.created_at })
    .collect();

  Ok(Json(EntitiesResponse { entities }))
}
