//! C12: typed read access to the `domain` business schema (§3), used by C5 entity
//! extraction and C9 domain-fact retrieval. Repository errors are retried once with a
//! short backoff before surfacing, per spec §7.

use std::time::Duration;

use plastmem_entities::{customer, invoice, payment, sales_order, task, work_order};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::error::CoreError;

/// Retry a single fallible repository call once after a short backoff (spec §7).
pub(crate) async fn with_retry<T, F, Fut>(f: F) -> Result<T, DbErr>
where
  F: Fn() -> Fut,
  Fut: std::future::Future<Output = Result<T, DbErr>>,
{
  match f().await {
    Ok(value) => Ok(value),
    Err(first_err) => {
      tracing::debug!(error = %first_err, "repository call failed, retrying once");
      tokio::time::sleep(Duration::from_millis(50)).await;
      f().await
    }
  }
}

pub struct DomainRepository;

impl DomainRepository {
  pub async fn all_customers(db: &DatabaseConnection) -> Result<Vec<customer::Model>, CoreError> {
    Ok(with_retry(|| customer::Entity::find().all(db)).await?)
  }

  pub async fn customer_by_id(
    db: &DatabaseConnection,
    id: Uuid,
  ) -> Result<Option<customer::Model>, CoreError> {
    Ok(with_retry(|| customer::Entity::find_by_id(id).one(db)).await?)
  }

  pub async fn sales_order_by_number(
    db: &DatabaseConnection,
    so_number: &str,
  ) -> Result<Option<sales_order::Model>, CoreError> {
    Ok(
      with_retry(|| {
        sales_order::Entity::find()
          .filter(sales_order::Column::SoNumber.eq(so_number))
          .one(db)
      })
      .await?,
    )
  }

  pub async fn invoice_by_number(
    db: &DatabaseConnection,
    invoice_number: &str,
  ) -> Result<Option<invoice::Model>, CoreError> {
    Ok(
      with_retry(|| {
        invoice::Entity::find()
          .filter(invoice::Column::InvoiceNumber.eq(invoice_number))
          .one(db)
      })
      .await?,
    )
  }

  pub async fn sales_orders_for_customer(
    db: &DatabaseConnection,
    customer_id: Uuid,
  ) -> Result<Vec<sales_order::Model>, CoreError> {
    Ok(
      with_retry(|| {
        sales_order::Entity::find()
          .filter(sales_order::Column::CustomerId.eq(customer_id))
          .all(db)
      })
      .await?,
    )
  }

  pub async fn work_orders_for_sales_order(
    db: &DatabaseConnection,
    so_id: Uuid,
  ) -> Result<Vec<work_order::Model>, CoreError> {
    Ok(
      with_retry(|| {
        work_order::Entity::find()
          .filter(work_order::Column::SoId.eq(so_id))
          .all(db)
      })
      .await?,
    )
  }

  pub async fn invoices_for_sales_order(
    db: &DatabaseConnection,
    so_id: Uuid,
  ) -> Result<Vec<invoice::Model>, CoreError> {
    Ok(
      with_retry(|| {
        invoice::Entity::find()
          .filter(invoice::Column::SoId.eq(so_id))
          .all(db)
      })
      .await?,
    )
  }

  pub async fn open_invoices_for_customer(
    db: &DatabaseConnection,
    customer_id: Uuid,
  ) -> Result<Vec<invoice::Model>, CoreError> {
    let sos = Self::sales_orders_for_customer(db, customer_id).await?;
    let mut out = Vec::new();
    for so in sos {
      let invoices = Self::invoices_for_sales_order(db, so.so_id).await?;
      out.extend(
        invoices
          .into_iter()
          .filter(|inv| matches!(inv.status, invoice::InvoiceStatus::Open)),
      );
    }
    Ok(out)
  }

  pub async fn payments_for_invoice(
    db: &DatabaseConnection,
    invoice_id: Uuid,
  ) -> Result<Vec<payment::Model>, CoreError> {
    Ok(
      with_retry(|| {
        payment::Entity::find()
          .filter(payment::Column::InvoiceId.eq(invoice_id))
          .all(db)
      })
      .await?,
    )
  }

  pub async fn tasks_matching_text(
    db: &DatabaseConnection,
    query: &str,
  ) -> Result<Vec<task::Model>, CoreError> {
    let all = with_retry(|| task::Entity::find().all(db)).await?;
    let needle = query.to_lowercase();
    Ok(
      all
        .into_iter()
        .filter(|t| {
          t.title.to_lowercase().contains(&needle)
            || t.body.as_deref().is_some_and(|b| b.to_lowercase().contains(&needle))
        })
        .collect(),
    )
  }

  pub async fn work_orders_matching_text(
    db: &DatabaseConnection,
    query: &str,
  ) -> Result<Vec<work_order::Model>, CoreError> {
    let all = with_retry(|| work_order::Entity::find().all(db)).await?;
    let needle = query.to_lowercase();
    Ok(
      all
        .into_iter()
        .filter(|w| w.description.as_deref().is_some_and(|d| d.to_lowercase().contains(&needle)))
        .collect(),
    )
  }

  pub async fn work_order_by_id(
    db: &DatabaseConnection,
    id: Uuid,
  ) -> Result<Option<work_order::Model>, CoreError> {
    Ok(with_retry(|| work_order::Entity::find_by_id(id).one(db)).await?)
  }

  pub async fn task_by_id(
    db: &DatabaseConnection,
    id: Uuid,
  ) -> Result<Option<task::Model>, CoreError> {
    Ok(with_retry(|| task::Entity::find_by_id(id).one(db)).await?)
  }
}

/// Aggregated payment info for an invoice, used by C9 domain-fact assembly (§4.8).
pub struct PaymentSummary {
  pub total_paid: rust_decimal::Decimal,
  pub remaining_balance: rust_decimal::Decimal,
  pub payment_count: usize,
}

pub async fn payment_summary(
  db: &DatabaseConnection,
  inv: &invoice::Model,
) -> Result<PaymentSummary, CoreError> {
  let payments = DomainRepository::payments_for_invoice(db, inv.invoice_id).await?;
  let total_paid = payments.iter().map(|p| p.amount).sum();
  Ok(PaymentSummary {
    total_paid,
    remaining_balance: inv.amount - total_paid,
    payment_count: payments.len(),
  })
}
