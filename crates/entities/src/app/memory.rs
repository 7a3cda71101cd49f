use sea_orm::entity::prelude::*;
use sea_orm::prelude::PgVector;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum MemoryKind {
  #[sea_orm(string_value = "episodic")]
  Episodic,
  #[sea_orm(string_value = "semantic")]
  Semantic,
  #[sea_orm(string_value = "profile")]
  Profile,
  #[sea_orm(string_value = "commitment")]
  Commitment,
  #[sea_orm(string_value = "todo")]
  Todo,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(schema_name = "app", table_name = "memories")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub memory_id: i64,
  pub session_id: Uuid,
  pub kind: MemoryKind,
  #[sea_orm(column_type = "Text")]
  pub text: String,
  #[sea_orm(column_type = "Custom(\"vector(1536)\".to_owned())", nullable)]
  pub embedding: Option<PgVector>,
  pub importance: f32,
  pub ttl_days: Option<i32>,
  /// Structured reference for alias-store rows (spec §3/§4.2): `{type, user_id, alias_text,
  /// entity_name, entity_id}` with `type` in `alias_mapping`/`multilingual_mapping`. Null for
  /// ordinary memories.
  pub external_ref: Option<Json>,
  pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
