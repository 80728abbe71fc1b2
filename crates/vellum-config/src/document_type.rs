use serde::{Deserialize, Serialize};

use crate::validate::{ValidationError, Validator};

/// A category of controlled document (SOP, Policy, ...). Immutable reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentType {
  pub id: String,
  pub name: String,
  pub description: String,
}

/// A document type as submitted, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTypeDraft {
  pub name: String,
  #[serde(default)]
  pub description: String,
}

impl DocumentTypeDraft {
  pub fn validate(&self) -> Result<(), ValidationError> {
    Validator::new().non_empty("name", &self.name).finish()
  }

  pub fn into_document_type(self, id: String) -> DocumentType {
    DocumentType {
      id,
      name: self.name,
      description: self.description,
    }
  }
}
