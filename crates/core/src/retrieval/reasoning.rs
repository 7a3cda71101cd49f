//! Per-customer reasoning chains across sales orders (spec §4.8 step 6).

use plastmem_entities::{invoice, sales_order, work_order};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::CoreError;
use crate::repository::DomainRepository;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SalesOrderChain {
  pub so_number: String,
  pub work_orders: Vec<String>,
  pub invoices: Vec<String>,
  pub can_invoice: bool,
  pub should_send_invoice: bool,
  pub blocked_work_orders: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReasoningChain {
  pub customer_name: String,
  pub sales_orders: Vec<SalesOrderChain>,
}

/// `can_invoice = exists(done WO) ∧ ¬exists(invoice)`, `should_send_invoice =
/// exists(open invoice)`, plus the list of blocked work orders for the SO.
#[tracing::instrument(skip(db))]
pub async fn reasoning_chain_for_customer(
  db: &sea_orm::DatabaseConnection,
  customer_name: &str,
  customer_id: Uuid,
) -> Result<ReasoningChain, CoreError> {
  let sos = DomainRepository::sales_orders_for_customer(db, customer_id).await?;
  let mut sales_orders = Vec::with_capacity(sos.len());

  for so in sos {
    let work_orders = DomainRepository::work_orders_for_sales_order(db, so.so_id).await?;
    let invoices = DomainRepository::invoices_for_sales_order(db, so.so_id).await?;

    let has_done_wo = work_orders.iter().any(|w| w.status == work_order::WorkOrderStatus::Done);
    let has_invoice = !invoices.is_empty();
    let has_open_invoice = invoices.iter().any(|i| i.status == invoice::InvoiceStatus::Open);
    let blocked_work_orders = work_orders
      .iter()
      .filter(|w| w.status == work_order::WorkOrderStatus::Blocked)
      .map(|w| w.description.clone().unwrap_or_else(|| w.wo_id.to_string()))
      .collect();

    sales_orders.push(SalesOrderChain {
      so_number: so.so_number.clone(),
      work_orders: work_orders.iter().map(|w| w.description.clone().unwrap_or_else(|| w.wo_id.to_string())).collect(),
      invoices: invoices.iter().map(|i| i.invoice_number.clone()).collect(),
      can_invoice: has_done_wo && !has_invoice,
      should_send_invoice: has_open_invoice,
      blocked_work_orders,
    });
  }

  Ok(ReasoningChain { customer_name: customer_name.to_owned(), sales_orders })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_chain_has_no_sales_orders() {
    let chain = ReasoningChain { customer_name: "Kai Media".to_owned(), sales_orders: vec![] };
    assert!(chain.sales_orders.is_empty());
  }

  #[test]
  fn can_invoice_requires_done_wo_and_no_invoice() {
    let so = SalesOrderChain {
      so_number: "SO-1001".to_owned(),
      work_orders: vec!["pick-pack".to_owned()],
      invoices: vec![],
      can_invoice: true,
      should_send_invoice: false,
      blocked_work_orders: vec![],
    };
    assert!(so.can_invoice);
    assert!(so.invoices.is_empty());
  }
}
