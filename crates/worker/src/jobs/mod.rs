mod consolidation;
pub use consolidation::{ConsolidationJob, process_consolidation};

use plastmem_shared::AppError;

/// Error type for the apalis job boundary. Jobs internally use `AppError`; this wrapper
/// converts at the worker boundary (teacher's convention).
#[derive(Debug)]
pub struct WorkerError(pub AppError);

impl std::fmt::Display for WorkerError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    self.0.fmt(f)
  }
}

impl std::error::Error for WorkerError {}

impl From<AppError> for WorkerError {
  fn from(err: AppError) -> Self {
    Self(err)
  }
}

impl From<plastmem_core::CoreError> for WorkerError {
  fn from(err: plastmem_core::CoreError) -> Self {
    Self(err.into_app_error())
  }
}
