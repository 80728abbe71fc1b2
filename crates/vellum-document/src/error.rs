use thiserror::Error;
use vellum_config::LifecycleState;

/// A document value would break one of its structural invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
  #[error("document has no versions")]
  EmptyVersionChain,

  #[error("lifecycle state {recorded} does not match latest version status {latest}")]
  StateMismatch {
    recorded: LifecycleState,
    latest: LifecycleState,
  },

  #[error("current version label '{recorded}' does not match latest version '{latest}'")]
  LabelMismatch { recorded: String, latest: String },

  #[error("step '{step_id}' already has a signature on version '{version_id}'")]
  DuplicateApproval { version_id: String, step_id: String },
}
