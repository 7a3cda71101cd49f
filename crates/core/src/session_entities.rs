//! Persistence and lookup of extracted `app.entities` rows, shared by C5's caller, C6
//! (recovering the candidate list behind a clarification prompt), and the `GetEntities`
//! public operation (spec §4.10).

use chrono::Utc;
use plastmem_entities::app::entity::{self, EntityKind, EntitySource};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use uuid::Uuid;

use crate::entity_extraction::{CandidateEntity, MatchConfidence};
use crate::error::CoreError;
use crate::repository::with_retry;

/// Persist extracted candidates as `app.entities` rows (never edited after creation, §3).
pub async fn persist_candidates(
  db: &sea_orm::DatabaseConnection,
  session_id: Uuid,
  candidates: &[CandidateEntity],
) -> Result<(), CoreError> {
  let now = Utc::now();
  for candidate in candidates {
    let active = entity::ActiveModel {
      entity_id: sea_orm::NotSet,
      session_id: Set(session_id),
      name: Set(candidate.name.clone()),
      r#type: Set(candidate.kind),
      source: Set(EntitySource::Message),
      external_ref: Set(Some(candidate.external_ref())),
      created_at: Set(now.into()),
    };
    active.insert(db).await.map_err(CoreError::from)?;
  }
  Ok(())
}

/// Reconstruct the candidate list most recently persisted for a session (used to recover
/// the options a clarification prompt offered, since the reply itself names no entity).
pub async fn most_recent_candidates(
  db: &sea_orm::DatabaseConnection,
  session_id: Uuid,
) -> Result<Vec<CandidateEntity>, CoreError> {
  let rows = with_retry(|| {
    entity::Entity::find()
      .filter(entity::Column::SessionId.eq(session_id))
      .order_by_desc(entity::Column::CreatedAt)
      .order_by_asc(entity::Column::EntityId)
      .limit(10)
      .all(db)
  })
  .await?;

  if rows.is_empty() {
    return Ok(vec![]);
  }
  // persist_candidates stamps every candidate of one turn with the same `now`, so the
  // EntityId tiebreaker above is what keeps this order equal to insertion order.
  let latest_ts = rows[0].created_at;
  Ok(
    rows
      .into_iter()
      .filter(|r| r.created_at == latest_ts)
      .map(from_row)
      .collect(),
  )
}

fn from_row(row: entity::Model) -> CandidateEntity {
  let table: &'static str = match row.r#type {
    EntityKind::Customer => "customers",
    EntityKind::Order => "sales_orders",
    EntityKind::Invoice => "invoices",
    EntityKind::WorkOrder => "work_orders",
    EntityKind::Task => "tasks",
  };
  let id = row
    .external_ref
    .as_ref()
    .and_then(|v| v.get("id"))
    .and_then(|v| v.as_str())
    .and_then(|s| s.parse().ok())
    .unwrap_or(Uuid::nil());
  CandidateEntity { name: row.name, kind: row.r#type, confidence: MatchConfidence::Other, table, id }
}

pub async fn entities_for_session(
  db: &sea_orm::DatabaseConnection,
  session_id: Uuid,
  kind: Option<EntityKind>,
  source: Option<EntitySource>,
  limit: u64,
) -> Result<Vec<entity::Model>, CoreError> {
  let mut query = entity::Entity::find().filter(entity::Column::SessionId.eq(session_id));
  if let Some(kind) = kind {
    query = query.filter(entity::Column::Type.eq(kind));
  }
  if let Some(source) = source {
    query = query.filter(entity::Column::Source.eq(source));
  }
  Ok(
    with_retry(|| query.clone().order_by_desc(entity::Column::CreatedAt).limit(limit).all(db))
      .await?,
  )
}
