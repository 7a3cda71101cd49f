//! Chat event persistence and history loading, shared by C6/C9/C11.

use chrono::Utc;
use plastmem_entities::app::chat_event::{self, ChatRole};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use uuid::Uuid;

use crate::error::CoreError;
use crate::repository::with_retry;

/// Newest `N=10` chat events for the session, in chronological order (spec §4.4/§4.5).
pub async fn recent_events(
  db: &sea_orm::DatabaseConnection,
  session_id: Uuid,
  n: u64,
) -> Result<Vec<chat_event::Model>, CoreError> {
  let mut rows = with_retry(|| {
    chat_event::Entity::find()
      .filter(chat_event::Column::SessionId.eq(session_id))
      .order_by_desc(chat_event::Column::CreatedAt)
      .limit(n)
      .all(db)
  })
  .await?;
  rows.reverse();
  Ok(rows)
}

pub async fn last_assistant_message(
  db: &sea_orm::DatabaseConnection,
  session_id: Uuid,
) -> Result<Option<String>, CoreError> {
  let events = recent_events(db, session_id, 10).await?;
  Ok(
    events
      .into_iter()
      .rev()
      .find(|e| matches!(e.role, ChatRole::Assistant))
      .map(|e| e.content),
  )
}

pub async fn append_event(
  db: &sea_orm::DatabaseConnection,
  session_id: Uuid,
  role: ChatRole,
  content: &str,
) -> Result<(), CoreError> {
  let active = chat_event::ActiveModel {
    event_id: sea_orm::NotSet,
    session_id: Set(session_id),
    role: Set(role),
    content: Set(content.to_owned()),
    created_at: Set(Utc::now().into()),
  };
  active.insert(db).await.map_err(CoreError::from)?;
  Ok(())
}
