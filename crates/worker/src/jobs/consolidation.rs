use plastmem_core::pipeline;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

use crate::jobs::WorkerError;

/// Fired when the pipeline's consolidation trigger rules match for a turn (spec §4.9).
/// Re-runs the full consolidation action unconditionally — the trigger decision already
/// happened in-process; the job just does the (potentially slow, embedding-calling) work
/// off the request path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationJob {
  pub user_id: String,
}

pub async fn process_consolidation(
  job: ConsolidationJob,
  db: apalis::prelude::Data<DatabaseConnection>,
) -> Result<(), WorkerError> {
  let db = &*db;

  tracing::info!(user_id = %job.user_id, "running consolidation job");
  let result = pipeline::run_consolidation(db, &job.user_id).await?;
  tracing::debug!(
    summary_id = result.summary_id,
    promoted = result.promoted,
    "consolidation complete"
  );

  Ok(())
}
