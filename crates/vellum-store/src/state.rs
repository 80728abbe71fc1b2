use serde::{Deserialize, Serialize};
use vellum_config::DocumentType;
use vellum_document::DocumentRecord;
use vellum_workflow::WorkflowCatalog;

/// Everything the document control system persists, saved and loaded as one
/// snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DmsState {
  #[serde(default)]
  pub document_types: Vec<DocumentType>,
  #[serde(default)]
  pub workflows: WorkflowCatalog,
  #[serde(default)]
  pub documents: Vec<DocumentRecord>,
}

impl DmsState {
  pub fn document(&self, document_id: &str) -> Option<&DocumentRecord> {
    self.documents.iter().find(|d| d.id() == document_id)
  }

  pub fn document_type(&self, type_id: &str) -> Option<&DocumentType> {
    self.document_types.iter().find(|t| t.id == type_id)
  }
}
