use sea_orm_migration::{
  prelude::*,
  schema::{custom, float, integer, integer_null, pk_bigint_auto, string, text, text_null, timestamp_with_time_zone, uuid},
  sea_orm::Statement,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

const APP: &str = "app";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table((Alias::new(APP), ChatEvent::Table))
          .if_not_exists()
          .col(pk_bigint_auto(ChatEvent::EventId))
          .col(uuid(ChatEvent::SessionId))
          .col(string(ChatEvent::Role))
          .col(text(ChatEvent::Content))
          .col(timestamp_with_time_zone(ChatEvent::CreatedAt))
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_chat_events_session")
          .table((Alias::new(APP), ChatEvent::Table))
          .col(ChatEvent::SessionId)
          .col(ChatEvent::CreatedAt)
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table((Alias::new(APP), EntityTable::Table))
          .if_not_exists()
          .col(pk_bigint_auto(EntityTable::EntityId))
          .col(uuid(EntityTable::SessionId))
          .col(string(EntityTable::Name))
          .col(string(EntityTable::Type))
          .col(string(EntityTable::Source))
          .col(custom(EntityTable::ExternalRef, "jsonb").null())
          .col(timestamp_with_time_zone(EntityTable::CreatedAt))
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_entities_session")
          .table((Alias::new(APP), EntityTable::Table))
          .col(EntityTable::SessionId)
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table((Alias::new(APP), Memory::Table))
          .if_not_exists()
          .col(pk_bigint_auto(Memory::MemoryId))
          .col(uuid(Memory::SessionId))
          .col(string(Memory::Kind))
          .col(text(Memory::Text))
          .col(custom(Memory::Embedding, "vector(1536)").null())
          .col(float(Memory::Importance))
          .col(integer_null(Memory::TtlDays))
          .col(custom(Memory::ExternalRef, "jsonb").null())
          .col(timestamp_with_time_zone(Memory::CreatedAt))
          .to_owned(),
      )
      .await?;

    manager
      .get_connection()
      .execute_raw(Statement::from_string(
        manager.get_database_backend(),
        "CREATE INDEX memories_embedding_cosine_idx ON app.memories USING hnsw (embedding vector_cosine_ops);",
      ))
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_memories_session")
          .table((Alias::new(APP), Memory::Table))
          .col(Memory::SessionId)
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table((Alias::new(APP), MemorySummary::Table))
          .if_not_exists()
          .col(pk_bigint_auto(MemorySummary::SummaryId))
          .col(string(MemorySummary::UserId))
          .col(integer(MemorySummary::SessionWindow))
          .col(text(MemorySummary::Summary))
          .col(custom(MemorySummary::Embedding, "vector(1536)").null())
          .col(timestamp_with_time_zone(MemorySummary::CreatedAt))
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_memory_summaries_user_window")
          .table((Alias::new(APP), MemorySummary::Table))
          .col(MemorySummary::UserId)
          .col(MemorySummary::SessionWindow)
          .unique()
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table((Alias::new(APP), SessionUser::Table))
          .if_not_exists()
          .col(uuid(SessionUser::SessionId).primary_key())
          .col(string(SessionUser::UserId))
          .col(timestamp_with_time_zone(SessionUser::CreatedAt))
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_session_users_user")
          .table((Alias::new(APP), SessionUser::Table))
          .col(SessionUser::UserId)
          .to_owned(),
      )
      .await?;

    let db = manager.get_connection();
    let backend = manager.get_database_backend();
    for (table, column, values) in [
      ("app.chat_events", "role", "user,assistant,system"),
      (
        "app.entities",
        "type",
        "customer,order,invoice,work_order,task",
      ),
      ("app.entities", "source", "message,db"),
      (
        "app.memories",
        "kind",
        "episodic,semantic,profile,commitment,todo",
      ),
    ] {
      let list = values
        .split(',')
        .map(|v| format!("'{v}'"))
        .collect::<Vec<_>>()
        .join(", ");
      let constraint = format!("{}_{}_check", table.replace('.', "_"), column);
      db.execute_raw(Statement::from_string(
        backend,
        format!("ALTER TABLE {table} ADD CONSTRAINT {constraint} CHECK ({column} IN ({list}));"),
      ))
      .await?;
    }

    db.execute_raw(Statement::from_string(
      backend,
      "ALTER TABLE app.memories ADD CONSTRAINT app_memories_importance_check CHECK (importance >= 0.0 AND importance <= 1.0);",
    ))
    .await?;
    db.execute_raw(Statement::from_string(
      backend,
      "ALTER TABLE app.memories ADD CONSTRAINT app_memories_ttl_days_check CHECK (ttl_days IS NULL OR ttl_days >= 0);",
    ))
    .await?;

    Ok(())
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    for table in [
      SessionUser::Table,
      MemorySummary::Table,
      Memory::Table,
      EntityTable::Table,
      ChatEvent::Table,
    ] {
      manager
        .drop_table(Table::drop().table((Alias::new(APP), table)).if_exists().to_owned())
        .await?;
    }
    Ok(())
  }
}

#[derive(Iden)]
pub enum ChatEvent {
  Table,
  EventId,
  SessionId,
  Role,
  Content,
  CreatedAt,
}

#[derive(Iden)]
#[iden = "entities"]
pub enum EntityTable {
  Table,
  EntityId,
  SessionId,
  Name,
  #[iden = "type"]
  Type,
  Source,
  ExternalRef,
  CreatedAt,
}

#[derive(Iden)]
pub enum Memory {
  Table,
  MemoryId,
  SessionId,
  Kind,
  Text,
  Embedding,
  Importance,
  TtlDays,
  ExternalRef,
  CreatedAt,
}

#[derive(Iden)]
pub enum MemorySummary {
  Table,
  SummaryId,
  UserId,
  SessionWindow,
  Summary,
  Embedding,
  CreatedAt,
}

#[derive(Iden)]
pub enum SessionUser {
  Table,
  SessionId,
  UserId,
  CreatedAt,
}
