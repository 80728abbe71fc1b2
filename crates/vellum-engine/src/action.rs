use vellum_config::LifecycleState;
use vellum_document::DocumentRecord;
use vellum_workflow::{WorkflowDefinition, WorkflowStep};

/// The next operation a reviewer would be offered for a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextAction<'a> {
  SubmitForReview,
  Sign { step: &'a WorkflowStep },
  ReleaseEffective,
}

/// Advisory only; the engine still enforces every guard itself.
///
/// `Sign` points at the first step in workflow order that the latest version
/// has not signed yet. Steps further down the list remain signable too.
pub fn next_action<'a>(
  document: &DocumentRecord,
  workflow: Option<&'a WorkflowDefinition>,
) -> Option<NextAction<'a>> {
  let workflow = workflow.filter(|w| document.workflow_id() == Some(w.id()));
  match document.lifecycle_state() {
    LifecycleState::Draft => workflow.map(|_| NextAction::SubmitForReview),
    LifecycleState::UnderReview => {
      let completed = document.latest_version().completed_step_ids();
      workflow
        .and_then(|w| w.next_pending_step(&completed))
        .map(|step| NextAction::Sign { step })
    }
    LifecycleState::Approved => Some(NextAction::ReleaseEffective),
    LifecycleState::PendingApproval | LifecycleState::Effective | LifecycleState::Obsolete => None,
  }
}
