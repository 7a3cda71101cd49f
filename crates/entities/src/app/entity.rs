use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum EntityKind {
  #[sea_orm(string_value = "customer")]
  Customer,
  #[sea_orm(string_value = "order")]
  Order,
  #[sea_orm(string_value = "invoice")]
  Invoice,
  #[sea_orm(string_value = "work_order")]
  WorkOrder,
  #[sea_orm(string_value = "task")]
  Task,
}

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum EntitySource {
  #[sea_orm(string_value = "message")]
  Message,
  #[sea_orm(string_value = "db")]
  Db,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(schema_name = "app", table_name = "entities")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub entity_id: i64,
  pub session_id: Uuid,
  pub name: String,
  #[sea_orm(column_name = "type")]
  pub r#type: EntityKind,
  pub source: EntitySource,
  pub external_ref: Option<Json>,
  pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
