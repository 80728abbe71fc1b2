use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};
use vellum_config::{DocumentType, DocumentTypeDraft, WorkflowDraft};
use vellum_document::{DocumentMetadata, DocumentRecord, SignaturePayload, VersionDraft};
use vellum_engine::{
  LifecycleEngine, LifecycleError, LifecycleNotifier, NextAction, NoopNotifier, Transition, next_action,
};
use vellum_identity::Identity;
use vellum_store::{DmsState, Store};
use vellum_workflow::WorkflowDefinition;

use crate::error::ControlError;
use crate::query::{DashboardSummary, DocumentQuery};
use crate::seed;

/// The single owner of the document control state.
///
/// Every change goes through one of the methods below: the engine produces
/// the new value, it replaces the held copy, then the whole state is saved.
/// If the save fails the change stays in memory and `ControlError::Store` is
/// returned; nothing is rolled back or retried.
pub struct DocumentControl<S: Store, I: Identity, N: LifecycleNotifier = NoopNotifier> {
  store: S,
  engine: LifecycleEngine<I, N>,
  state: DmsState,
}

impl<S: Store, I: Identity> DocumentControl<S, I, NoopNotifier> {
  /// Load the saved state, seeding the defaults when the store is empty.
  pub async fn open(store: S, identity: I) -> Result<Self, ControlError> {
    Self::open_with_notifier(store, identity, NoopNotifier).await
  }
}

impl<S: Store, I: Identity, N: LifecycleNotifier> DocumentControl<S, I, N> {
  #[instrument(skip_all)]
  pub async fn open_with_notifier(store: S, identity: I, notifier: N) -> Result<Self, ControlError> {
    let engine = LifecycleEngine::with_notifier(identity, notifier);
    let state = match store.load().await? {
      Some(state) => {
        info!(
          documents = state.documents.len(),
          workflows = state.workflows.len(),
          "loaded document control state"
        );
        state
      }
      None => {
        let state = seed::default_state(&engine)?;
        store.save(&state).await?;
        info!(
          document_types = state.document_types.len(),
          workflows = state.workflows.len(),
          "seeded default document control state"
        );
        state
      }
    };
    Ok(Self { store, engine, state })
  }

  pub fn state(&self) -> &DmsState {
    &self.state
  }

  pub fn store(&self) -> &S {
    &self.store
  }

  // Lookups

  pub fn document(&self, document_id: &str) -> Result<&DocumentRecord, ControlError> {
    self
      .state
      .document(document_id)
      .ok_or_else(|| ControlError::DocumentNotFound(document_id.to_string()))
  }

  pub fn documents(&self) -> &[DocumentRecord] {
    &self.state.documents
  }

  pub fn workflow(&self, workflow_id: &str) -> Result<&WorkflowDefinition, ControlError> {
    self
      .state
      .workflows
      .get(workflow_id)
      .ok_or_else(|| ControlError::WorkflowNotFound(workflow_id.to_string()))
  }

  pub fn workflows(&self) -> impl Iterator<Item = &WorkflowDefinition> {
    self.state.workflows.iter()
  }

  pub fn default_workflow(&self) -> Option<&WorkflowDefinition> {
    self.state.workflows.default_workflow()
  }

  pub fn document_types(&self) -> &[DocumentType] {
    &self.state.document_types
  }

  pub fn document_type(&self, type_id: &str) -> Result<&DocumentType, ControlError> {
    self
      .state
      .document_type(type_id)
      .ok_or_else(|| ControlError::DocumentTypeNotFound(type_id.to_string()))
  }

  /// What the reviewer would be offered next for the document.
  pub fn next_action(&self, document_id: &str) -> Result<Option<NextAction<'_>>, ControlError> {
    let document = self.document(document_id)?;
    let workflow = document.workflow_id().and_then(|id| self.state.workflows.get(id));
    Ok(next_action(document, workflow))
  }

  /// Documents matching `query`, in register order.
  pub fn search(&self, query: &DocumentQuery) -> Vec<&DocumentRecord> {
    self
      .state
      .documents
      .iter()
      .filter(|d| query.matches(d, &self.state.document_types))
      .collect()
  }

  pub fn summary(&self, now: DateTime<Utc>) -> DashboardSummary<'_> {
    DashboardSummary::build(&self.state.documents, now)
  }

  // Changes

  /// Register a document. The document type and, when given, the workflow
  /// must exist.
  pub async fn create_document(
    &mut self,
    metadata: DocumentMetadata,
    initial: VersionDraft,
  ) -> Result<DocumentRecord, ControlError> {
    self.document_type(&metadata.type_id)?;
    if let Some(workflow_id) = &metadata.workflow_id {
      self.workflow(workflow_id)?;
    }

    let document = self.engine.create_document(metadata, initial)?;
    self.state.documents.push(document.clone());
    self.persist().await?;
    Ok(document)
  }

  pub async fn submit_for_review(&mut self, document_id: &str) -> Result<DocumentRecord, ControlError> {
    let index = self.document_index(document_id)?;
    let updated = self.engine.submit_for_review(&self.state.documents[index])?;
    self.replace(index, updated).await
  }

  /// Sign `step_id` of the document's assigned workflow.
  pub async fn apply_signature(
    &mut self,
    document_id: &str,
    step_id: &str,
    payload: SignaturePayload,
  ) -> Result<DocumentRecord, ControlError> {
    let index = self.document_index(document_id)?;
    let document = &self.state.documents[index];
    let Some(workflow_id) = document.workflow_id() else {
      return Err(
        LifecycleError::NoWorkflowAssigned {
          transition: Transition::ApplySignature,
          document_id: document_id.to_string(),
        }
        .into(),
      );
    };
    let workflow = self.workflow(workflow_id)?;
    let updated = self.engine.apply_signature(document, workflow, step_id, payload)?;
    self.replace(index, updated).await
  }

  pub async fn release_effective(&mut self, document_id: &str) -> Result<DocumentRecord, ControlError> {
    let index = self.document_index(document_id)?;
    let updated = self.engine.release_effective(&self.state.documents[index])?;
    self.replace(index, updated).await
  }

  pub async fn draft_new_version(
    &mut self,
    document_id: &str,
    draft: VersionDraft,
  ) -> Result<DocumentRecord, ControlError> {
    let index = self.document_index(document_id)?;
    let updated = self.engine.draft_new_version(&self.state.documents[index], draft)?;
    self.replace(index, updated).await
  }

  pub async fn create_workflow(&mut self, draft: WorkflowDraft) -> Result<WorkflowDefinition, ControlError> {
    let workflow = self.engine.create_workflow(draft)?;
    self
      .state
      .workflows
      .insert(workflow.clone())
      .map_err(LifecycleError::from)?;
    self.persist().await?;
    Ok(workflow)
  }

  pub async fn add_document_type(&mut self, draft: DocumentTypeDraft) -> Result<DocumentType, ControlError> {
    draft.validate()?;
    let document_type = draft.into_document_type(self.engine.identity().generate_id());
    info!(type_id = %document_type.id, name = %document_type.name, "document_type_added");
    self.state.document_types.push(document_type.clone());
    self.persist().await?;
    Ok(document_type)
  }

  fn document_index(&self, document_id: &str) -> Result<usize, ControlError> {
    self
      .state
      .documents
      .iter()
      .position(|d| d.id() == document_id)
      .ok_or_else(|| ControlError::DocumentNotFound(document_id.to_string()))
  }

  async fn replace(&mut self, index: usize, document: DocumentRecord) -> Result<DocumentRecord, ControlError> {
    self.state.documents[index] = document.clone();
    self.persist().await?;
    Ok(document)
  }

  async fn persist(&self) -> Result<(), ControlError> {
    if let Err(e) = self.store.save(&self.state).await {
      warn!(error = %e, "failed to save document control state");
      return Err(e.into());
    }
    Ok(())
  }
}
