use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum TaskStatus {
  #[sea_orm(string_value = "todo")]
  Todo,
  #[sea_orm(string_value = "doing")]
  Doing,
  #[sea_orm(string_value = "done")]
  Done,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(schema_name = "domain", table_name = "tasks")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub task_id: Uuid,
  pub customer_id: Option<Uuid>,
  pub title: String,
  pub body: Option<String>,
  pub status: TaskStatus,
  pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::customer::Entity",
    from = "Column::CustomerId",
    to = "super::customer::Column::CustomerId"
  )]
  Customer,
}

impl Related<super::customer::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Customer.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
