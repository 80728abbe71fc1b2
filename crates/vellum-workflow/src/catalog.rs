use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;
use crate::workflow::WorkflowDefinition;

/// Named, reusable workflow definitions in creation order.
///
/// Definitions can be added and looked up, never edited or removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<WorkflowDefinition>", into = "Vec<WorkflowDefinition>")]
pub struct WorkflowCatalog {
  workflows: Vec<WorkflowDefinition>,
}

impl WorkflowCatalog {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a definition. Fails if a definition with the same id exists.
  pub fn insert(&mut self, workflow: WorkflowDefinition) -> Result<&WorkflowDefinition, WorkflowError> {
    if self.get(workflow.id()).is_some() {
      return Err(WorkflowError::DuplicateWorkflowId {
        workflow_id: workflow.id().to_string(),
      });
    }
    self.workflows.push(workflow);
    Ok(&self.workflows[self.workflows.len() - 1])
  }

  /// Get a definition by id.
  pub fn get(&self, workflow_id: &str) -> Option<&WorkflowDefinition> {
    self.workflows.iter().find(|w| w.id() == workflow_id)
  }

  /// The workflow to pre-select for new documents: the first one flagged as
  /// default, otherwise the first one in the catalog.
  pub fn default_workflow(&self) -> Option<&WorkflowDefinition> {
    self
      .workflows
      .iter()
      .find(|w| w.is_default())
      .or_else(|| self.workflows.first())
  }

  pub fn iter(&self) -> impl Iterator<Item = &WorkflowDefinition> {
    self.workflows.iter()
  }

  pub fn len(&self) -> usize {
    self.workflows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.workflows.is_empty()
  }
}

impl TryFrom<Vec<WorkflowDefinition>> for WorkflowCatalog {
  type Error = WorkflowError;

  fn try_from(workflows: Vec<WorkflowDefinition>) -> Result<Self, Self::Error> {
    let mut catalog = WorkflowCatalog::new();
    for workflow in workflows {
      catalog.insert(workflow)?;
    }
    Ok(catalog)
  }
}

impl From<WorkflowCatalog> for Vec<WorkflowDefinition> {
  fn from(catalog: WorkflowCatalog) -> Self {
    catalog.workflows
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use vellum_config::{StepDraft, WorkflowDraft};
  use vellum_identity::SequentialIdentity;

  fn workflow(identity: &SequentialIdentity, name: &str, is_default: bool) -> WorkflowDefinition {
    WorkflowDefinition::from_draft(
      WorkflowDraft {
        name: name.to_string(),
        description: format!("{} workflow", name),
        steps: vec![StepDraft::new("Review", "QA", "Review the document")],
        is_default,
      },
      identity,
    )
    .unwrap()
  }

  #[test]
  fn test_default_workflow_prefers_flagged_definition() {
    let identity = SequentialIdentity::default();
    let mut catalog = WorkflowCatalog::new();
    catalog.insert(workflow(&identity, "First", false)).unwrap();
    catalog.insert(workflow(&identity, "Flagged", true)).unwrap();

    assert_eq!(catalog.default_workflow().unwrap().name(), "Flagged");
  }

  #[test]
  fn test_default_workflow_falls_back_to_first() {
    let identity = SequentialIdentity::default();
    let mut catalog = WorkflowCatalog::new();
    assert!(catalog.default_workflow().is_none());

    catalog.insert(workflow(&identity, "First", false)).unwrap();
    catalog.insert(workflow(&identity, "Second", false)).unwrap();
    assert_eq!(catalog.default_workflow().unwrap().name(), "First");
  }

  #[test]
  fn test_insert_rejects_duplicate_id() {
    let identity = SequentialIdentity::default();
    let mut catalog = WorkflowCatalog::new();
    let wf = workflow(&identity, "First", false);
    catalog.insert(wf.clone()).unwrap();

    let err = catalog.insert(wf).unwrap_err();
    assert!(matches!(err, WorkflowError::DuplicateWorkflowId { .. }));
    assert_eq!(catalog.len(), 1);
  }

  #[test]
  fn test_catalog_survives_serialization_in_order() {
    let identity = SequentialIdentity::default();
    let mut catalog = WorkflowCatalog::new();
    catalog.insert(workflow(&identity, "First", false)).unwrap();
    catalog.insert(workflow(&identity, "Second", true)).unwrap();

    let json = serde_json::to_string(&catalog).unwrap();
    let restored: WorkflowCatalog = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, catalog);
    let names: Vec<&str> = restored.iter().map(|w| w.name()).collect();
    assert_eq!(names, vec!["First", "Second"]);
  }
}
