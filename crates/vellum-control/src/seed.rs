use vellum_config::{DocumentTypeDraft, StepDraft, WorkflowDraft};
use vellum_engine::{LifecycleEngine, LifecycleError, LifecycleNotifier};
use vellum_identity::Identity;
use vellum_store::DmsState;
use vellum_workflow::WorkflowCatalog;

use crate::error::ControlError;

const DOCUMENT_TYPES: [(&str, &str); 4] = [
  ("SOP", "Standard Operating Procedure"),
  ("Work Instruction", "Step-by-step task instructions for a single operation"),
  ("Policy", "High-level quality or compliance policy"),
  ("Form", "Controlled template for recording data"),
];

fn default_workflow() -> WorkflowDraft {
  WorkflowDraft {
    name: "Standard GMP Review".to_string(),
    description: "Author review, QA review and QA approval before release".to_string(),
    steps: vec![
      StepDraft::new(
        "Author Review",
        "Document Owner",
        "Confirm the content is accurate and complete.",
      ),
      StepDraft::new(
        "QA Review",
        "QA Specialist",
        "Review for GMP compliance and consistency with related documents.",
      ),
      StepDraft::new(
        "QA Approval",
        "QA Manager",
        "Approve the document for release.",
      ),
    ],
    is_default: true,
  }
}

/// State for a store that has never been written: the stock document types
/// and the default review workflow, no documents.
pub(crate) fn default_state<I: Identity, N: LifecycleNotifier>(
  engine: &LifecycleEngine<I, N>,
) -> Result<DmsState, ControlError> {
  let mut document_types = Vec::with_capacity(DOCUMENT_TYPES.len());
  for (name, description) in DOCUMENT_TYPES {
    let draft = DocumentTypeDraft {
      name: name.to_string(),
      description: description.to_string(),
    };
    document_types.push(draft.into_document_type(engine.identity().generate_id()));
  }

  let mut workflows = WorkflowCatalog::new();
  workflows
    .insert(engine.create_workflow(default_workflow())?)
    .map_err(LifecycleError::from)?;

  Ok(DmsState {
    document_types,
    workflows,
    documents: Vec::new(),
  })
}
