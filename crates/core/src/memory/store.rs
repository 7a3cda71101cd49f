//! C7: CRUD for typed memories, deduplication, and importance × recency ranked retrieval.

use chrono::Utc;
use plastmem_ai::cosine_similarity;
use plastmem_entities::{app::session_user, memory};
use sea_orm::{
  ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde_json::Value as Json;

use crate::error::CoreError;
use crate::memory::annotate::annotate;
use crate::memory::dedup::is_semantic_duplicate;
use crate::memory::model::{Memory, MemoryKind, clamp_importance, recency_weight};
use crate::repository::with_retry;

pub struct MemoryStore;

pub struct CreateMemory<'a> {
  pub session_id: uuid::Uuid,
  pub kind: MemoryKind,
  pub text: &'a str,
  pub embedding: Option<Vec<f32>>,
  pub importance: f32,
  pub ttl_days: Option<i32>,
  pub external_ref: Option<Json>,
}

impl MemoryStore {
  /// Resolve (or create) the `user_id` for a `session_id`, per the open-question decision
  /// in `DESIGN.md`: the source schema only carries `session_id` on memories, so an explicit
  /// `session_users` mapping table bridges to `user_id`.
  pub async fn ensure_session_user(
    db: &DatabaseConnection,
    session_id: uuid::Uuid,
    user_id: &str,
  ) -> Result<(), CoreError> {
    let existing =
      with_retry(|| session_user::Entity::find_by_id(session_id).one(db)).await?;
    if existing.is_some() {
      return Ok(());
    }
    let active = session_user::ActiveModel {
      session_id: Set(session_id),
      user_id: Set(user_id.to_owned()),
      created_at: Set(Utc::now().into()),
    };
    // Idempotent: a concurrent insert for the same session racing this one is fine, the
    // loser's row is simply dropped by the primary key conflict.
    let _ = active.insert(db).await;
    Ok(())
  }

  pub async fn user_id_for_session(
    db: &DatabaseConnection,
    session_id: uuid::Uuid,
  ) -> Result<Option<String>, CoreError> {
    Ok(
      with_retry(|| session_user::Entity::find_by_id(session_id).one(db))
        .await?
        .map(|m| m.user_id),
    )
  }

  async fn sessions_for_user(
    db: &DatabaseConnection,
    user_id: &str,
  ) -> Result<Vec<uuid::Uuid>, CoreError> {
    Ok(
      with_retry(|| {
        session_user::Entity::find()
          .filter(session_user::Column::UserId.eq(user_id))
          .all(db)
      })
      .await?
      .into_iter()
      .map(|m| m.session_id)
      .collect(),
    )
  }

  /// Create a memory, applying the dedup rules of spec §4.7. PII masking must already have
  /// been applied to `text` by the caller.
  #[tracing::instrument(skip(db, input), fields(kind = ?input.kind))]
  pub async fn create(db: &DatabaseConnection, input: CreateMemory<'_>) -> Result<Memory, CoreError> {
    let importance = clamp_importance(input.importance);
    let ttl_days = match input.kind {
      MemoryKind::Semantic => None,
      MemoryKind::Episodic if input.ttl_days.is_none() => {
        Some(crate::memory::model::EPISODIC_DEFAULT_TTL_DAYS)
      }
      _ => input.ttl_days,
    };

    // Exact-text dedup within the session.
    let session_rows = with_retry(|| {
      memory::Entity::find()
        .filter(memory::Column::SessionId.eq(input.session_id))
        .all(db)
    })
    .await?;

    if let Some(existing) = session_rows.iter().find(|m| m.text == input.text) {
      return Self::bump_importance(db, existing.clone(), importance).await;
    }

    // Semantic memories additionally dedup globally by similarity.
    if matches!(input.kind, MemoryKind::Semantic) {
      let all_semantic = with_retry(|| {
        memory::Entity::find()
          .filter(memory::Column::Kind.eq(memory::MemoryKind::Semantic))
          .all(db)
      })
      .await?;

      if let Some(existing) =
        all_semantic.into_iter().find(|m| is_semantic_duplicate(&m.text, input.text))
      {
        return Self::bump_importance(db, existing, importance).await;
      }
    }

    let active = memory::ActiveModel {
      memory_id: sea_orm::NotSet,
      session_id: Set(input.session_id),
      kind: Set(input.kind),
      text: Set(input.text.to_owned()),
      embedding: Set(input.embedding.map(sea_orm::prelude::PgVector::from)),
      importance: Set(importance),
      ttl_days: Set(ttl_days),
      external_ref: Set(input.external_ref),
      created_at: Set(Utc::now().into()),
    };
    let model = active.insert(db).await.map_err(CoreError::from)?;
    Ok(Memory::from_model(model))
  }

  async fn bump_importance(
    db: &DatabaseConnection,
    existing: memory::Model,
    new_importance: f32,
  ) -> Result<Memory, CoreError> {
    let merged = existing.importance.max(new_importance);
    if (merged - existing.importance).abs() < f32::EPSILON {
      return Ok(Memory::from_model(existing));
    }
    let mut active: memory::ActiveModel = existing.into();
    active.importance = Set(merged);
    let model = active.update(db).await.map_err(CoreError::from)?;
    Ok(Memory::from_model(model))
  }

  /// Cross-session retrieval ranked by `similarity * importance * recency_weight` (§4.7).
  /// Expired memories are excluded.
  #[tracing::instrument(skip(db, query_vec))]
  pub async fn retrieve(
    db: &DatabaseConnection,
    query_vec: &[f32],
    user_id: &str,
    kind: Option<MemoryKind>,
    limit: usize,
  ) -> Result<Vec<(Memory, f32, String)>, CoreError> {
    let session_ids = Self::sessions_for_user(db, user_id).await?;
    if session_ids.is_empty() {
      return Ok(vec![]);
    }

    let mut query = memory::Entity::find()
      .filter(memory::Column::SessionId.is_in(session_ids.clone()));
    if let Some(kind) = kind {
      query = query.filter(memory::Column::Kind.eq(kind));
    }
    let rows = with_retry(|| query.clone().all(db)).await?;

    let now = Utc::now();
    let mut scored: Vec<(Memory, f32, String)> = rows
      .into_iter()
      .map(Memory::from_model)
      .filter(|m| !m.is_expired(now))
      .filter_map(|m| {
        let embedding = m.embedding.as_deref()?;
        let similarity = cosine_similarity(query_vec, embedding);
        let score = similarity * m.importance * recency_weight(m.created_at, now);
        let annotated_text = annotate(&m.text, now, m.created_at);
        Some((m, score, annotated_text))
      })
      .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);
    Ok(scored)
  }

  /// All non-expired memories for `user_id` across every session, unranked. Used by C10
  /// consolidation, which groups by customer itself rather than ranking by a query vector.
  pub async fn all_for_user(db: &DatabaseConnection, user_id: &str) -> Result<Vec<Memory>, CoreError> {
    let session_ids = Self::sessions_for_user(db, user_id).await?;
    if session_ids.is_empty() {
      return Ok(vec![]);
    }
    let rows = with_retry(|| {
      memory::Entity::find().filter(memory::Column::SessionId.is_in(session_ids.clone())).all(db)
    })
    .await?;
    let now = Utc::now();
    Ok(rows.into_iter().map(Memory::from_model).filter(|m| !m.is_expired(now)).collect())
  }

  /// All non-expired memories for `user_id` that mention `needle` (case-insensitive), used
  /// by C10 to scope the customer-frequency trigger rule to the customer named in the
  /// current message rather than the user's entire memory set.
  pub async fn mentioning(
    db: &DatabaseConnection,
    user_id: &str,
    needle: &str,
  ) -> Result<Vec<Memory>, CoreError> {
    let session_ids = Self::sessions_for_user(db, user_id).await?;
    if session_ids.is_empty() {
      return Ok(vec![]);
    }
    let rows = with_retry(|| {
      memory::Entity::find().filter(memory::Column::SessionId.is_in(session_ids.clone())).all(db)
    })
    .await?;

    let now = Utc::now();
    let needle_lower = needle.to_lowercase();
    Ok(
      rows
        .into_iter()
        .map(Memory::from_model)
        .filter(|m| !m.is_expired(now))
        .filter(|m| m.text.to_lowercase().contains(&needle_lower))
        .collect(),
    )
  }

  /// Alias-store lookup helper (C4): semantic memories whose `external_ref` matches the
  /// given predicate, scoped to `user_id`. Alias rows are stored on a deterministic
  /// per-user session id (see [`crate::alias`]) rather than a real chat session.
  pub async fn semantic_by_external_ref(
    db: &DatabaseConnection,
    session_id: uuid::Uuid,
  ) -> Result<Vec<memory::Model>, CoreError> {
    Ok(
      with_retry(|| {
        memory::Entity::find()
          .filter(memory::Column::SessionId.eq(session_id))
          .filter(memory::Column::Kind.eq(memory::MemoryKind::Semantic))
          .filter(memory::Column::ExternalRef.is_not_null())
          .all(db)
      })
      .await?,
    )
  }
}
