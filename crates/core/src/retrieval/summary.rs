//! `MemorySummary` read/write access, shared by C9 (summary-priority short-circuit) and
//! C10 (consolidation upsert).

use chrono::Utc;
use plastmem_ai::cosine_similarity;
use plastmem_entities::app::memory_summary;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::error::CoreError;
use crate::repository::with_retry;

/// Similarity above which a summary short-circuits normal memory retrieval (spec §4.8).
pub const SUMMARY_PRIORITY_THRESHOLD: f32 = 0.7;

pub async fn best_summary_match(
  db: &sea_orm::DatabaseConnection,
  user_id: &str,
  query_vec: &[f32],
) -> Result<Option<(memory_summary::Model, f32)>, CoreError> {
  let rows = with_retry(|| {
    memory_summary::Entity::find()
      .filter(memory_summary::Column::UserId.eq(user_id))
      .all(db)
  })
  .await?;

  let best = rows
    .into_iter()
    .filter_map(|row| {
      let embedding = row.embedding.clone()?;
      let similarity = cosine_similarity(query_vec, embedding.as_slice());
      Some((row, similarity))
    })
    .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

  Ok(best)
}

/// All rolling summaries for a user, most recent session window first (`GetMemories`,
/// spec §4.10/§6).
pub async fn summaries_for_user(
  db: &sea_orm::DatabaseConnection,
  user_id: &str,
) -> Result<Vec<memory_summary::Model>, CoreError> {
  Ok(
    with_retry(|| {
      memory_summary::Entity::find()
        .filter(memory_summary::Column::UserId.eq(user_id))
        .order_by_desc(memory_summary::Column::SessionWindow)
        .all(db)
    })
    .await?,
  )
}

/// Upsert a summary for `(user_id, session_window)` (spec §3: "upserted per (user_id,
/// session_window)").
pub async fn upsert_summary(
  db: &sea_orm::DatabaseConnection,
  user_id: &str,
  session_window: i32,
  summary_text: &str,
  embedding: Option<Vec<f32>>,
) -> Result<i64, CoreError> {
  let existing = with_retry(|| {
    memory_summary::Entity::find()
      .filter(memory_summary::Column::UserId.eq(user_id))
      .filter(memory_summary::Column::SessionWindow.eq(session_window))
      .one(db)
  })
  .await?;

  let pg_embedding = embedding.map(sea_orm::prelude::PgVector::from);

  if let Some(existing) = existing {
    let id = existing.summary_id;
    let mut active: memory_summary::ActiveModel = existing.into();
    active.summary = Set(summary_text.to_owned());
    active.embedding = Set(pg_embedding);
    active.created_at = Set(Utc::now().into());
    active.update(db).await.map_err(CoreError::from)?;
    Ok(id)
  } else {
    let active = memory_summary::ActiveModel {
      summary_id: sea_orm::NotSet,
      user_id: Set(user_id.to_owned()),
      session_window: Set(session_window),
      summary: Set(summary_text.to_owned()),
      embedding: Set(pg_embedding),
      created_at: Set(Utc::now().into()),
    };
    let model = active.insert(db).await.map_err(CoreError::from)?;
    Ok(model.summary_id)
  }
}
