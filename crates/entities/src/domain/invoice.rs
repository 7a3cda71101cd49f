use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum InvoiceStatus {
  #[sea_orm(string_value = "open")]
  Open,
  #[sea_orm(string_value = "paid")]
  Paid,
  #[sea_orm(string_value = "void")]
  Void,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(schema_name = "domain", table_name = "invoices")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub invoice_id: Uuid,
  pub so_id: Uuid,
  #[sea_orm(unique)]
  pub invoice_number: String,
  #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
  pub amount: Decimal,
  pub due_date: Date,
  pub status: InvoiceStatus,
  pub issued_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::sales_order::Entity",
    from = "Column::SoId",
    to = "super::sales_order::Column::SoId"
  )]
  SalesOrder,
  #[sea_orm(has_many = "super::payment::Entity")]
  Payment,
}

impl Related<super::sales_order::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::SalesOrder.def()
  }
}

impl Related<super::payment::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Payment.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
