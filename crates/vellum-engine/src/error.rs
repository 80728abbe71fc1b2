//! Lifecycle errors.

use std::fmt;

use vellum_config::{LifecycleState, ValidationError};
use vellum_document::DocumentError;
use vellum_workflow::WorkflowError;

/// A lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
  SubmitForReview,
  ApplySignature,
  ReleaseEffective,
}

impl fmt::Display for Transition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Transition::SubmitForReview => "submit for review",
      Transition::ApplySignature => "apply signature",
      Transition::ReleaseEffective => "release as effective",
    };
    f.write_str(name)
  }
}

/// Coarse classification of a [`LifecycleError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Missing or malformed input; correct it and retry.
  Validation,
  /// The document is not in a state that allows the operation.
  InvalidTransition,
  /// The referenced step is not part of the assigned workflow.
  UnknownStep,
}

/// Errors returned by the lifecycle engine. The input document is never
/// modified when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("cannot {transition}: document is {actual}, expected {expected}")]
  InvalidTransition {
    transition: Transition,
    expected: LifecycleState,
    actual: LifecycleState,
  },

  #[error("cannot {transition}: document '{document_id}' has no workflow assigned")]
  NoWorkflowAssigned {
    transition: Transition,
    document_id: String,
  },

  #[error("workflow '{provided}' is not the workflow assigned to the document ('{assigned}')")]
  WorkflowMismatch { assigned: String, provided: String },

  #[error("step '{step_id}' has already been signed on version '{version_id}'")]
  StepAlreadySigned { version_id: String, step_id: String },

  #[error("step '{step_id}' is not part of workflow '{workflow_id}'")]
  UnknownStep {
    workflow_id: String,
    step_id: String,
  },

  #[error(transparent)]
  Workflow(#[from] WorkflowError),

  #[error(transparent)]
  Document(#[from] DocumentError),
}

impl LifecycleError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      LifecycleError::Validation(_) | LifecycleError::Workflow(_) => ErrorKind::Validation,
      LifecycleError::UnknownStep { .. } => ErrorKind::UnknownStep,
      LifecycleError::InvalidTransition { .. }
      | LifecycleError::NoWorkflowAssigned { .. }
      | LifecycleError::WorkflowMismatch { .. }
      | LifecycleError::StepAlreadySigned { .. }
      | LifecycleError::Document(_) => ErrorKind::InvalidTransition,
    }
  }
}
