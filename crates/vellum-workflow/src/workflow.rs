use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use vellum_config::{ValidationError, Validator, WorkflowDraft};
use vellum_identity::Identity;

use crate::error::WorkflowError;

/// One approval step. Order within the definition is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStep {
  pub id: String,
  pub name: String,
  pub responsible_role: String,
  pub instructions: String,
  pub requires_signature: bool,
}

/// A validated approval workflow.
///
/// There is no way to change a definition once built: documents refer to it by
/// id and signature records copy the step name and role at signing time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredWorkflow")]
pub struct WorkflowDefinition {
  id: String,
  name: String,
  description: String,
  steps: Vec<WorkflowStep>,
  is_default: bool,
}

/// Wire form, checked on the way in.
#[derive(Deserialize)]
struct StoredWorkflow {
  id: String,
  name: String,
  description: String,
  steps: Vec<WorkflowStep>,
  #[serde(default)]
  is_default: bool,
}

impl TryFrom<StoredWorkflow> for WorkflowDefinition {
  type Error = WorkflowError;

  fn try_from(stored: StoredWorkflow) -> Result<Self, Self::Error> {
    let steps = stored
      .steps
      .iter()
      .map(|s| validate_step(Some(&s.id), &s.name, &s.responsible_role, &s.instructions))
      .collect();
    validate_definition(&stored.name, &stored.description, steps)?;
    check_step_ids(&stored.steps)?;
    Ok(Self {
      id: stored.id,
      name: stored.name,
      description: stored.description,
      steps: stored.steps,
      is_default: stored.is_default,
    })
  }
}

fn check_step_ids(steps: &[WorkflowStep]) -> Result<(), WorkflowError> {
  let mut seen = HashSet::new();
  for step in steps {
    if !seen.insert(step.id.as_str()) {
      return Err(WorkflowError::DuplicateStepId {
        step_id: step.id.clone(),
      });
    }
  }
  Ok(())
}

/// Checks shared by drafts and stored definitions. `steps` holds the result
/// of `validate_step` for each step, in order.
fn validate_definition(
  name: &str,
  description: &str,
  steps: Vec<Result<(), ValidationError>>,
) -> Result<(), ValidationError> {
  let mut validator = Validator::new();
  validator
    .non_empty("name", name)
    .non_empty("description", description)
    .check("steps", !steps.is_empty(), "must contain at least one step");
  for (index, result) in steps.into_iter().enumerate() {
    validator.nested(&format!("steps[{}]", index), result);
  }
  validator.finish()
}

fn validate_step(
  id: Option<&str>,
  name: &str,
  responsible_role: &str,
  instructions: &str,
) -> Result<(), ValidationError> {
  let mut validator = Validator::new();
  if let Some(id) = id {
    validator.non_empty("id", id);
  }
  validator
    .non_empty("name", name)
    .non_empty("responsible_role", responsible_role)
    .non_empty("instructions", instructions)
    .finish()
}

impl WorkflowDefinition {
  /// Validate a draft and build a definition, generating ids for the
  /// definition and for any step submitted without one.
  pub fn from_draft(draft: WorkflowDraft, identity: &impl Identity) -> Result<Self, WorkflowError> {
    let steps = draft
      .steps
      .iter()
      .map(|s| validate_step(s.id.as_deref(), &s.name, &s.responsible_role, &s.instructions))
      .collect();
    validate_definition(&draft.name, &draft.description, steps)?;

    let steps: Vec<WorkflowStep> = draft
      .steps
      .into_iter()
      .map(|step| WorkflowStep {
        id: step.id.unwrap_or_else(|| identity.generate_id()),
        name: step.name,
        responsible_role: step.responsible_role,
        instructions: step.instructions,
        requires_signature: step.requires_signature,
      })
      .collect();
    check_step_ids(&steps)?;

    Ok(Self {
      id: identity.generate_id(),
      name: draft.name,
      description: draft.description,
      steps,
      is_default: draft.is_default,
    })
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn description(&self) -> &str {
    &self.description
  }

  /// Steps in approval order. Never empty.
  pub fn steps(&self) -> &[WorkflowStep] {
    &self.steps
  }

  pub fn is_default(&self) -> bool {
    self.is_default
  }

  /// Get a step by id.
  pub fn step(&self, step_id: &str) -> Option<&WorkflowStep> {
    self.steps.iter().find(|s| s.id == step_id)
  }

  pub fn step_count(&self) -> usize {
    self.steps.len()
  }

  /// First step, in workflow order, whose id is not in `completed`.
  ///
  /// Advisory only: signing does not have to follow this order.
  pub fn next_pending_step(&self, completed: &HashSet<&str>) -> Option<&WorkflowStep> {
    self
      .steps
      .iter()
      .find(|s| !completed.contains(s.id.as_str()))
  }
}
