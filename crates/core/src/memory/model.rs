use chrono::{DateTime, Utc};
use plastmem_entities::memory;
pub use plastmem_entities::memory::MemoryKind;
use sea_orm::prelude::PgVector;
use serde::Serialize;
use serde_json::Value as Json;
use utoipa::ToSchema;
use uuid::Uuid;

/// Episodic memories default to a 30-day TTL (spec §3); semantic memories are permanent.
pub const EPISODIC_DEFAULT_TTL_DAYS: i32 = 30;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Memory {
  pub id: i64,
  pub session_id: Uuid,
  pub kind: MemoryKind,
  pub text: String,
  #[serde(skip)]
  pub embedding: Option<Vec<f32>>,
  pub importance: f32,
  pub ttl_days: Option<i32>,
  #[serde(skip)]
  pub external_ref: Option<Json>,
  pub created_at: DateTime<Utc>,
}

impl Memory {
  pub fn from_model(model: memory::Model) -> Self {
    Self {
      id: model.memory_id,
      session_id: model.session_id,
      kind: model.kind,
      text: model.text,
      embedding: model.embedding.map(|v| v.as_slice().to_vec()),
      importance: model.importance,
      ttl_days: model.ttl_days,
      external_ref: model.external_ref,
      created_at: model.created_at.with_timezone(&Utc),
    }
  }

  #[must_use]
  pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
    match self.ttl_days {
      Some(days) => self.created_at + chrono::Duration::days(i64::from(days)) < now,
      None => false,
    }
  }

  #[must_use]
  pub fn embedding_vector(&self) -> Option<PgVector> {
    self.embedding.clone().map(PgVector::from)
  }
}

/// Clamp classifier/caller-supplied importance into `[0, 1]` (spec §3 invariant).
#[must_use]
pub fn clamp_importance(value: f32) -> f32 {
  value.clamp(0.0, 1.0)
}

/// `max(0.1, 1 - days_old/365)` (spec §4.7).
#[must_use]
pub fn recency_weight(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f32 {
  let days_old = (now - created_at).num_days().max(0) as f32;
  (1.0 - days_old / 365.0).max(0.1)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn importance_clamps_to_unit_interval() {
    assert_eq!(clamp_importance(1.5), 1.0);
    assert_eq!(clamp_importance(-0.2), 0.0);
    assert_eq!(clamp_importance(0.4), 0.4);
  }

  #[test]
  fn recency_weight_floors_at_point_one() {
    let now = Utc::now();
    let ancient = now - chrono::Duration::days(3650);
    assert_eq!(recency_weight(ancient, now), 0.1);
    assert_eq!(recency_weight(now, now), 1.0);
  }

  #[test]
  fn recency_weight_is_monotonic_in_age() {
    let now = Utc::now();
    let recent = now - chrono::Duration::days(10);
    let older = now - chrono::Duration::days(100);
    assert!(recency_weight(recent, now) >= recency_weight(older, now));
  }
}
