use sea_orm::entity::prelude::*;
use sea_orm::prelude::PgVector;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(schema_name = "app", table_name = "memory_summaries")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub summary_id: i64,
  pub user_id: String,
  pub session_window: i32,
  #[sea_orm(column_type = "Text")]
  pub summary: String,
  #[sea_orm(column_type = "Custom(\"vector(1536)\".to_owned())", nullable)]
  pub embedding: Option<PgVector>,
  pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
