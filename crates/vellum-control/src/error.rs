use vellum_config::ValidationError;
use vellum_engine::LifecycleError;
use vellum_store::StoreError;

/// Errors returned by [`crate::DocumentControl`].
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
  #[error("document not found: {0}")]
  DocumentNotFound(String),

  #[error("workflow not found: {0}")]
  WorkflowNotFound(String),

  #[error("document type not found: {0}")]
  DocumentTypeNotFound(String),

  #[error(transparent)]
  Invalid(#[from] ValidationError),

  #[error(transparent)]
  Lifecycle(#[from] LifecycleError),

  /// The change was applied in memory but could not be saved.
  #[error("storage error: {0}")]
  Store(#[from] StoreError),
}
