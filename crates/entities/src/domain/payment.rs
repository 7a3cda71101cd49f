use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(schema_name = "domain", table_name = "payments")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub payment_id: Uuid,
  pub invoice_id: Uuid,
  #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
  pub amount: Decimal,
  pub method: Option<String>,
  pub paid_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::invoice::Entity",
    from = "Column::InvoiceId",
    to = "super::invoice::Column::InvoiceId"
  )]
  Invoice,
}

impl Related<super::invoice::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Invoice.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
