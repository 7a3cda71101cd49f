use std::time::Duration;

use apalis::prelude::{Monitor, WorkerBuilder, WorkerFactoryFn};
use apalis_postgres::PostgresStorage;
use plastmem_shared::AppError;
use sea_orm::DatabaseConnection;

mod jobs;
pub use jobs::{ConsolidationJob, WorkerError, process_consolidation};

/// Run the single background job type the pipeline needs: asynchronous consolidation,
/// enqueued by the server whenever `ChatOutcome::should_consolidate` is true (spec §4.9).
pub async fn worker(
  db: &DatabaseConnection,
  backend: PostgresStorage<ConsolidationJob>,
) -> Result<(), AppError> {
  let db = db.clone();

  Monitor::new()
    .register(
      WorkerBuilder::new("ontomem-consolidation")
        .data(db)
        .backend(backend)
        .build_fn(process_consolidation),
    )
    .shutdown_timeout(Duration::from_secs(5))
    .run_with_signal(tokio::signal::ctrl_c())
    .await
    .map_err(|err| AppError::new(anyhow::Error::new(err)))?;

  Ok(())
}
