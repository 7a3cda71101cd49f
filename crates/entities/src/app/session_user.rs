use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Resolves the `user_id` <-> `session_id` relationship the source schema leaves
/// implicit (see DESIGN.md open question). Upserted the first time a session is seen.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(schema_name = "app", table_name = "session_users")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub session_id: Uuid,
  pub user_id: String,
  pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
