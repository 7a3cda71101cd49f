pub use sea_orm_migration::*;

mod m20260301_01_create_schemas;
mod m20260301_02_create_domain_schema;
mod m20260301_03_create_app_schema;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20260301_01_create_schemas::Migration),
      Box::new(m20260301_02_create_domain_schema::Migration),
      Box::new(m20260301_03_create_app_schema::Migration),
    ]
  }
}
