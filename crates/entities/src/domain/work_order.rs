use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum WorkOrderStatus {
  #[sea_orm(string_value = "queued")]
  Queued,
  #[sea_orm(string_value = "in_progress")]
  InProgress,
  #[sea_orm(string_value = "blocked")]
  Blocked,
  #[sea_orm(string_value = "done")]
  Done,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(schema_name = "domain", table_name = "work_orders")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub wo_id: Uuid,
  pub so_id: Uuid,
  pub description: Option<String>,
  pub status: WorkOrderStatus,
  pub technician: Option<String>,
  pub scheduled_for: Option<Date>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::sales_order::Entity",
    from = "Column::SoId",
    to = "super::sales_order::Column::SoId"
  )]
  SalesOrder,
}

impl Related<super::sales_order::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::SalesOrder.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
