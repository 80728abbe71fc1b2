use serde::{Deserialize, Serialize};

/// A workflow definition as submitted for creation.
///
/// ```json
/// {
///   "name": "Standard GMP Review",
///   "description": "Author, QA review and QA approval",
///   "steps": [
///     { "name": "Author Review", "responsible_role": "Document Owner",
///       "instructions": "Review content for accuracy." }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDraft {
  pub name: String,
  pub description: String,
  pub steps: Vec<StepDraft>,
  #[serde(default)]
  pub is_default: bool,
}

/// A single approval step as submitted. The id is generated when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDraft {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  pub name: String,
  pub responsible_role: String,
  pub instructions: String,
  #[serde(default = "default_requires_signature")]
  pub requires_signature: bool,
}

fn default_requires_signature() -> bool {
  true
}

impl StepDraft {
  /// A step without an explicit id that requires an electronic signature.
  pub fn new(
    name: impl Into<String>,
    responsible_role: impl Into<String>,
    instructions: impl Into<String>,
  ) -> Self {
    Self {
      id: None,
      name: name.into(),
      responsible_role: responsible_role.into(),
      instructions: instructions.into(),
      requires_signature: true,
    }
  }

  pub fn with_id(mut self, id: impl Into<String>) -> Self {
    self.id = Some(id.into());
    self
  }
}
