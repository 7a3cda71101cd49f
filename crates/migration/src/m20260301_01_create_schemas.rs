use sea_orm_migration::{prelude::*, sea_orm::Statement};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    let db = manager.get_connection();
    db.execute_raw(Statement::from_string(
      manager.get_database_backend(),
      "CREATE SCHEMA IF NOT EXISTS domain;",
    ))
    .await?;
    db.execute_raw(Statement::from_string(
      manager.get_database_backend(),
      "CREATE SCHEMA IF NOT EXISTS app;",
    ))
    .await?;
    db.execute_raw(Statement::from_string(
      manager.get_database_backend(),
      "CREATE EXTENSION IF NOT EXISTS vector;",
    ))
    .await?;
    Ok(())
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    let db = manager.get_connection();
    db.execute_raw(Statement::from_string(
      manager.get_database_backend(),
      "DROP SCHEMA IF EXISTS app CASCADE;",
    ))
    .await?;
    db.execute_raw(Statement::from_string(
      manager.get_database_backend(),
      "DROP SCHEMA IF EXISTS domain CASCADE;",
    ))
    .await?;
    Ok(())
  }
}
