use apalis_postgres::PostgresStorage;
use sea_orm::DatabaseConnection;

use plastmem_worker::ConsolidationJob;

#[derive(Clone)]
pub struct AppState {
  pub db: DatabaseConnection,
  pub job_storage: PostgresStorage<ConsolidationJob>,
}

impl AppState {
  #[must_use]
  pub const fn new(db: DatabaseConnection, job_storage: PostgresStorage<ConsolidationJob>) -> Self {
    Self { db, job_storage }
  }
}
