//! C4: user-scoped alias mappings (exact-text and multilingual), persisted as semantic
//! memories with a structured `external_ref` (spec §3, §4.2). Alias rows live on a
//! deterministic per-user pseudo-session id rather than a real chat session, since the
//! exact-match lookup must work across every session the user has ever had.

use plastmem_ai::embed;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::CoreError;
use crate::memory::{CreateMemory, MemoryKind, MemoryStore};

/// Namespace used to derive a stable per-user alias session id via UUIDv5.
const ALIAS_NAMESPACE: Uuid = Uuid::from_bytes([
  0xa1, 0x1a, 0x5e, 0x55, 0x4d, 0x61, 0x5a, 0x11, 0xa5, 0x11, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01,
]);

fn alias_session_id(user_id: &str) -> Uuid {
  Uuid::new_v5(&ALIAS_NAMESPACE, user_id.as_bytes())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasMatch {
  pub entity_name: String,
  pub entity_id: Uuid,
  pub confidence: &'static str,
}

pub struct AliasStore;

impl AliasStore {
  /// `StoreAlias(user_id, alias_text, entity_name, entity_id)`.
  #[tracing::instrument(skip(db))]
  pub async fn store_alias(
    db: &DatabaseConnection,
    user_id: &str,
    alias_text: &str,
    entity_name: &str,
    entity_id: Uuid,
  ) -> Result<(), CoreError> {
    let session_id = alias_session_id(user_id);
    MemoryStore::ensure_session_user(db, session_id, user_id).await?;

    let external_ref = json!({
      "type": "alias_mapping",
      "user_id": user_id,
      "alias_text": alias_text.to_lowercase(),
      "entity_name": entity_name,
      "entity_id": entity_id,
    });

    let text = format!("alias: \"{alias_text}\" -> {entity_name}");
    let embedding: Vec<f32> = embed(&text).await.as_slice().to_vec();
    MemoryStore::create(db, CreateMemory {
      session_id,
      kind: MemoryKind::Semantic,
      text: &text,
      embedding: Some(embedding),
      importance: 0.9,
      ttl_days: None,
      external_ref: Some(external_ref),
    })
    .await?;
    Ok(())
  }

  /// `ExactMatch(user_id, text)`.
  #[tracing::instrument(skip(db))]
  pub async fn exact_match(
    db: &DatabaseConnection,
    user_id: &str,
    text: &str,
  ) -> Result<Option<AliasMatch>, CoreError> {
    let session_id = alias_session_id(user_id);
    let needle = text.to_lowercase();
    let rows = MemoryStore::semantic_by_external_ref(db, session_id).await?;

    for row in rows {
      let Some(external_ref) = &row.external_ref else { continue };
      if external_ref.get("type").and_then(|v| v.as_str()) != Some("alias_mapping") {
        continue;
      }
      let Some(alias_text) = external_ref.get("alias_text").and_then(|v| v.as_str()) else {
        continue;
      };
      if alias_text == needle {
        let entity_name = external_ref
          .get("entity_name")
          .and_then(|v| v.as_str())
          .unwrap_or_default()
          .to_owned();
        let entity_id = external_ref
          .get("entity_id")
          .and_then(|v| v.as_str())
          .and_then(|s| s.parse().ok())
          .unwrap_or(Uuid::nil());
        return Ok(Some(AliasMatch { entity_name, entity_id, confidence: "exact" }));
      }
    }
    Ok(None)
  }

  /// `StoreMultilingual(user_id, foreign, english)`.
  pub async fn store_multilingual(
    db: &DatabaseConnection,
    user_id: &str,
    foreign: &str,
    english: &str,
  ) -> Result<(), CoreError> {
    let session_id = alias_session_id(user_id);
    MemoryStore::ensure_session_user(db, session_id, user_id).await?;

    let external_ref = json!({
      "type": "multilingual_mapping",
      "user_id": user_id,
      "foreign": foreign.to_lowercase(),
      "english": english,
    });

    let text = format!("translate: \"{foreign}\" -> {english}");
    let embedding: Vec<f32> = embed(&text).await.as_slice().to_vec();
    MemoryStore::create(db, CreateMemory {
      session_id,
      kind: MemoryKind::Semantic,
      text: &text,
      embedding: Some(embedding),
      importance: 0.7,
      ttl_days: None,
      external_ref: Some(external_ref),
    })
    .await?;
    Ok(())
  }

  /// `Translate(user_id, foreign) -> english|foreign`.
  #[tracing::instrument(skip(db))]
  pub async fn translate(db: &DatabaseConnection, user_id: &str, foreign: &str) -> Result<String, CoreError> {
    let session_id = alias_session_id(user_id);
    let needle = foreign.to_lowercase();
    let rows = MemoryStore::semantic_by_external_ref(db, session_id).await?;

    for row in rows {
      let Some(external_ref) = &row.external_ref else { continue };
      if external_ref.get("type").and_then(|v| v.as_str()) != Some("multilingual_mapping") {
        continue;
      }
      if external_ref.get("foreign").and_then(|v| v.as_str()) == Some(needle.as_str()) {
        if let Some(english) = external_ref.get("english").and_then(|v| v.as_str()) {
          return Ok(english.to_owned());
        }
      }
    }
    Ok(foreign.to_owned())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn alias_session_id_is_deterministic_per_user() {
    assert_eq!(alias_session_id("u1"), alias_session_id("u1"));
    assert_ne!(alias_session_id("u1"), alias_session_id("u2"));
  }
}
