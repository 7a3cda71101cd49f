use sea_orm_migration::{
  prelude::*,
  schema::{date, date_null, decimal_len, string, string_null, timestamp_with_time_zone, uuid},
  sea_orm::Statement,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

const DOMAIN: &str = "domain";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table((Alias::new(DOMAIN), Customers::Table))
          .if_not_exists()
          .col(uuid(Customers::CustomerId).primary_key())
          .col(string(Customers::Name))
          .col(string_null(Customers::Industry))
          .col(string_null(Customers::Notes))
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table((Alias::new(DOMAIN), SalesOrders::Table))
          .if_not_exists()
          .col(uuid(SalesOrders::SoId).primary_key())
          .col(uuid(SalesOrders::CustomerId))
          .col(string(SalesOrders::SoNumber).unique_key())
          .col(string(SalesOrders::Title))
          .col(string(SalesOrders::Status))
          .col(timestamp_with_time_zone(SalesOrders::CreatedAt))
          .foreign_key(
            ForeignKey::create()
              .from((Alias::new(DOMAIN), SalesOrders::Table), SalesOrders::CustomerId)
              .to((Alias::new(DOMAIN), Customers::Table), Customers::CustomerId),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table((Alias::new(DOMAIN), WorkOrders::Table))
          .if_not_exists()
          .col(uuid(WorkOrders::WoId).primary_key())
          .col(uuid(WorkOrders::SoId))
          .col(string_null(WorkOrders::Description))
          .col(string(WorkOrders::Status))
          .col(string_null(WorkOrders::Technician))
          .col(date_null(WorkOrders::ScheduledFor))
          .foreign_key(
            ForeignKey::create()
              .from((Alias::new(DOMAIN), WorkOrders::Table), WorkOrders::SoId)
              .to((Alias::new(DOMAIN), SalesOrders::Table), SalesOrders::SoId),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table((Alias::new(DOMAIN), Invoices::Table))
          .if_not_exists()
          .col(uuid(Invoices::InvoiceId).primary_key())
          .col(uuid(Invoices::SoId))
          .col(string(Invoices::InvoiceNumber).unique_key())
          .col(decimal_len(Invoices::Amount, 12, 2))
          .col(date(Invoices::DueDate))
          .col(string(Invoices::Status))
          .col(timestamp_with_time_zone(Invoices::IssuedAt))
          .foreign_key(
            ForeignKey::create()
              .from((Alias::new(DOMAIN), Invoices::Table), Invoices::SoId)
              .to((Alias::new(DOMAIN), SalesOrders::Table), SalesOrders::SoId),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table((Alias::new(DOMAIN), Payments::Table))
          .if_not_exists()
          .col(uuid(Payments::PaymentId).primary_key())
          .col(uuid(Payments::InvoiceId))
          .col(decimal_len(Payments::Amount, 12, 2))
          .col(string_null(Payments::Method))
          .col(timestamp_with_time_zone(Payments::PaidAt))
          .foreign_key(
            ForeignKey::create()
              .from((Alias::new(DOMAIN), Payments::Table), Payments::InvoiceId)
              .to((Alias::new(DOMAIN), Invoices::Table), Invoices::InvoiceId),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table((Alias::new(DOMAIN), Tasks::Table))
          .if_not_exists()
          .col(uuid(Tasks::TaskId).primary_key())
          .col(ColumnDef::new(Tasks::CustomerId).uuid().null())
          .col(string(Tasks::Title))
          .col(string_null(Tasks::Body))
          .col(string(Tasks::Status))
          .col(timestamp_with_time_zone(Tasks::CreatedAt))
          .foreign_key(
            ForeignKey::create()
              .from((Alias::new(DOMAIN), Tasks::Table), Tasks::CustomerId)
              .to((Alias::new(DOMAIN), Customers::Table), Customers::CustomerId),
          )
          .to_owned(),
      )
      .await?;

    let db = manager.get_connection();
    let backend = manager.get_database_backend();
    for (table, column, values) in [
      (
        "domain.sales_orders",
        "status",
        "draft,approved,in_fulfillment,fulfilled,cancelled",
      ),
      ("domain.work_orders", "status", "queued,in_progress,blocked,done"),
      ("domain.invoices", "status", "open,paid,void"),
      ("domain.tasks", "status", "todo,doing,done"),
    ] {
      let list = values
        .split(',')
        .map(|v| format!("'{v}'"))
        .collect::<Vec<_>>()
        .join(", ");
      let constraint = format!("{}_{}_check", table.replace('.', "_"), column);
      db.execute_raw(Statement::from_string(
        backend,
        format!(
          "ALTER TABLE {table} ADD CONSTRAINT {constraint} CHECK ({column} IN ({list}));"
        ),
      ))
      .await?;
    }

    Ok(())
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    for table in [
      Tasks::Table.into_iden(),
      Payments::Table.into_iden(),
      Invoices::Table.into_iden(),
      WorkOrders::Table.into_iden(),
      SalesOrders::Table.into_iden(),
      Customers::Table.into_iden(),
    ] {
      manager
        .drop_table(Table::drop().table((Alias::new(DOMAIN), table)).if_exists().to_owned())
        .await?;
    }
    Ok(())
  }
}

#[derive(Iden)]
pub enum Customers {
  Table,
  CustomerId,
  Name,
  Industry,
  Notes,
}

#[derive(Iden)]
pub enum SalesOrders {
  Table,
  SoId,
  CustomerId,
  SoNumber,
  Title,
  Status,
  CreatedAt,
}

#[derive(Iden)]
pub enum WorkOrders {
  Table,
  WoId,
  SoId,
  Description,
  Status,
  Technician,
  ScheduledFor,
}

#[derive(Iden)]
pub enum Invoices {
  Table,
  InvoiceId,
  SoId,
  InvoiceNumber,
  Amount,
  DueDate,
  Status,
  IssuedAt,
}

#[derive(Iden)]
pub enum Payments {
  Table,
  PaymentId,
  InvoiceId,
  Amount,
  Method,
  PaidAt,
}

#[derive(Iden)]
pub enum Tasks {
  Table,
  TaskId,
  CustomerId,
  Title,
  Body,
  Status,
  CreatedAt,
}
