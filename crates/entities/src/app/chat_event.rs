use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum ChatRole {
  #[sea_orm(string_value = "user")]
  User,
  #[sea_orm(string_value = "assistant")]
  Assistant,
  #[sea_orm(string_value = "system")]
  System,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(schema_name = "app", table_name = "chat_events")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub event_id: i64,
  pub session_id: Uuid,
  pub role: ChatRole,
  #[sea_orm(column_type = "Text")]
  pub content: String,
  pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
