//! Domain-fact assembly for a set of extracted entities (spec §4.8 step 4).

use plastmem_entities::app::entity::EntityKind;
use serde::Serialize;
use utoipa::ToSchema;

use crate::entity_extraction::CandidateEntity;
use crate::error::CoreError;
use crate::repository::{DomainRepository, payment_summary};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DomainFact {
  pub label: String,
  pub detail: String,
  pub relevance: f32,
}

const NEIGHBOR_RELEVANCE: f32 = 0.85;

/// Fetch domain facts for one candidate entity: the row itself plus its immediate
/// neighbors (customer -> sales orders + open invoices; sales order -> work orders;
/// invoice -> payment aggregate; task/work order -> themselves).
#[tracing::instrument(skip(db))]
pub async fn facts_for_entity(
  db: &sea_orm::DatabaseConnection,
  candidate: &CandidateEntity,
) -> Result<Vec<DomainFact>, CoreError> {
  let mut facts = Vec::new();

  match candidate.kind {
    EntityKind::Customer => {
      let Some(customer) = DomainRepository::customer_by_id(db, candidate.id).await? else {
        return Ok(facts);
      };
      facts.push(DomainFact {
        label: format!("customer:{}", customer.name),
        detail: format!(
          "Customer {} (industry: {})",
          customer.name,
          customer.industry.as_deref().unwrap_or("unknown")
        ),
        relevance: 1.0,
      });

      let sos = DomainRepository::sales_orders_for_customer(db, customer.customer_id).await?;
      for so in &sos {
        facts.push(DomainFact {
          label: format!("sales_order:{}", so.so_number),
          detail: format!("{} \"{}\" status={:?}", so.so_number, so.title, so.status),
          relevance: NEIGHBOR_RELEVANCE,
        });
      }

      let open_invoices = DomainRepository::open_invoices_for_customer(db, customer.customer_id).await?;
      for inv in &open_invoices {
        facts.push(DomainFact {
          label: format!("invoice:{}", inv.invoice_number),
          detail: format!("Open invoice {} amount={} due={}", inv.invoice_number, inv.amount, inv.due_date),
          relevance: 0.9,
        });
      }
    }
    EntityKind::Order => {
      if let Some(so) = find_so(db, candidate.id).await? {
        facts.push(DomainFact {
          label: format!("sales_order:{}", so.so_number),
          detail: format!("{} \"{}\" status={:?}", so.so_number, so.title, so.status),
          relevance: 1.0,
        });
        let wos = DomainRepository::work_orders_for_sales_order(db, so.so_id).await?;
        for wo in &wos {
          facts.push(DomainFact {
            label: format!("work_order:{}", wo.wo_id),
            detail: format!(
              "WO for {}: {} status={:?}",
              so.so_number,
              wo.description.as_deref().unwrap_or(""),
              wo.status
            ),
            relevance: NEIGHBOR_RELEVANCE,
          });
        }
      }
    }
    EntityKind::Invoice => {
      if let Some(inv) = DomainRepository::invoice_by_number(db, &candidate.name).await? {
        let summary = payment_summary(db, &inv).await?;
        facts.push(DomainFact {
          label: format!("invoice:{}", inv.invoice_number),
          detail: format!(
            "{} amount={} status={:?} total_paid={} remaining={} payments={}",
            inv.invoice_number,
            inv.amount,
            inv.status,
            summary.total_paid,
            summary.remaining_balance,
            summary.payment_count
          ),
          relevance: 1.0,
        });
      }
    }
    EntityKind::WorkOrder => {
      if let Some(wo) = DomainRepository::work_order_by_id(db, candidate.id).await? {
        facts.push(DomainFact {
          label: format!("work_order:{}", wo.wo_id),
          detail: format!(
            "{} status={:?} technician={}",
            wo.description.as_deref().unwrap_or("work order"),
            wo.status,
            wo.technician.as_deref().unwrap_or("unassigned")
          ),
          relevance: 1.0,
        });
      }
    }
    EntityKind::Task => {
      if let Some(task) = DomainRepository::task_by_id(db, candidate.id).await? {
        facts.push(DomainFact {
          label: format!("task:{}", task.title),
          detail: format!("Task \"{}\" status={:?}", task.title, task.status),
          relevance: 1.0,
        });
      }
    }
  }

  Ok(facts)
}

async fn find_so(
  db: &sea_orm::DatabaseConnection,
  so_id: uuid::Uuid,
) -> Result<Option<plastmem_entities::sales_order::Model>, CoreError> {
  use sea_orm::EntityTrait;
  Ok(plastmem_entities::sales_order::Entity::find_by_id(so_id).one(db).await?)
}
