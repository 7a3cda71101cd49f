use plastmem_shared::AppError;

/// Typed error taxonomy for the pipeline (spec §7). Only these cross component
/// boundaries — raw `sea_orm::DbErr`/provider errors are caught and mapped here.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
  #[error("validation: {0}")]
  Validation(String),
  #[error("not found: {0}")]
  NotFound(String),
  #[error("repository error: {0}")]
  Repository(#[from] sea_orm::DbErr),
}

impl CoreError {
  /// Map to the HTTP-facing error at the server boundary. Not a `From` impl: `AppError`
  /// already has a blanket `From<E: Into<anyhow::Error>>`, which would conflict with a
  /// status-code-aware conversion here.
  #[must_use]
  pub fn into_app_error(self) -> AppError {
    use axum::http::StatusCode;
    match &self {
      Self::Validation(_) => AppError::with_status(StatusCode::UNPROCESSABLE_ENTITY, self),
      Self::NotFound(_) => AppError::with_status(StatusCode::NOT_FOUND, self),
      Self::Repository(_) => AppError::new(self),
    }
  }
}

pub type CoreResult<T> = Result<T, CoreError>;
