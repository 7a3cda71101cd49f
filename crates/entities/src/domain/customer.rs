use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(schema_name = "domain", table_name = "customers")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub customer_id: Uuid,
  pub name: String,
  pub industry: Option<String>,
  pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "super::sales_order::Entity")]
  SalesOrder,
  #[sea_orm(has_many = "super::task::Entity")]
  Task,
}

impl Related<super::sales_order::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::SalesOrder.def()
  }
}

impl Related<super::task::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Task.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
