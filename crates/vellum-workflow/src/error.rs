use thiserror::Error;
use vellum_config::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
  /// A required field of the definition or one of its steps was blank.
  #[error(transparent)]
  Invalid(#[from] ValidationError),

  #[error("duplicate step id: {step_id}")]
  DuplicateStepId { step_id: String },

  #[error("duplicate workflow id: {workflow_id}")]
  DuplicateWorkflowId { workflow_id: String },
}
