use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum SalesOrderStatus {
  #[sea_orm(string_value = "draft")]
  Draft,
  #[sea_orm(string_value = "approved")]
  Approved,
  #[sea_orm(string_value = "in_fulfillment")]
  InFulfillment,
  #[sea_orm(string_value = "fulfilled")]
  Fulfilled,
  #[sea_orm(string_value = "cancelled")]
  Cancelled,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(schema_name = "domain", table_name = "sales_orders")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub so_id: Uuid,
  pub customer_id: Uuid,
  #[sea_orm(unique)]
  pub so_number: String,
  pub title: String,
  pub status: SalesOrderStatus,
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
  #[sea_orm(has_many = "super::work_order::Entity")]
  WorkOrder,
  #[sea_orm(has_many = "super::invoice::Entity")]
  Invoice,
}

impl Related<super::customer::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Customer.def()
  }
}

impl Related<super::work_order::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::WorkOrder.def()
  }
}

impl Related<super::invoice::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Invoice.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
