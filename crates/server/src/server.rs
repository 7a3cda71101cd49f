use apalis_postgres::PostgresStorage;
use axum::{Router, response::Html, routing::get};
use plastmem_shared::AppError;
use plastmem_worker::ConsolidationJob;
use sea_orm::DatabaseConnection;
use tokio::net::TcpListener;

use crate::{
  api,
  utils::{AppState, shutdown_signal},
};

#[axum::debug_handler]
async fn handler() -> Html<&'static str> {
  Html("<h1>Ontomem</h1>")
}

pub async fn server(db: DatabaseConnection, job_storage: PostgresStorage<ConsolidationJob>) -> Result<(), AppError> {
  let app_state = AppState::new(db, job_storage);

  let app = Router::new()
    .route("/", get(handler))
    .nest("/api/v1", api::app())
    .with_state(app_state);

  let listener = TcpListener::bind("0.0.0.0:3000").await?;

  tracing::info!("server started at http://0.0.0.0:3000");

  axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

  Ok(())
}
