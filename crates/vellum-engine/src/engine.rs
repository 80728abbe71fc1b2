//! Document lifecycle engine.
//!
//! The `LifecycleEngine` validates transitions, derives workflow completion
//! from recorded signatures, and writes the audit trail. Every operation takes
//! a document by reference and returns a new document value; on error nothing
//! is returned but the error, and the caller still holds the unchanged input.

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};
use vellum_config::{LifecycleState, Validator, WorkflowDraft};
use vellum_document::{
  AuditEntry, DocumentMetadata, DocumentRecord, DocumentVersion, SignaturePayload,
  SignatureRecord, VersionDraft, actions,
};
use vellum_identity::Identity;
use vellum_workflow::WorkflowDefinition;

use crate::error::{LifecycleError, Transition};
use crate::events::{LifecycleEvent, LifecycleNotifier, NoopNotifier};

/// Actor recorded when a document is released for use.
pub const QUALITY_UNIT: &str = "Quality Unit";

/// The document lifecycle state machine.
///
/// Generic over `N: LifecycleNotifier` in the same way the identity provider
/// is pluggable. Use `LifecycleEngine::new()` to discard events, or
/// `LifecycleEngine::with_notifier()` to observe them.
pub struct LifecycleEngine<I: Identity, N: LifecycleNotifier = NoopNotifier> {
  identity: I,
  notifier: N,
}

impl<I: Identity> LifecycleEngine<I, NoopNotifier> {
  pub fn new(identity: I) -> Self {
    Self::with_notifier(identity, NoopNotifier)
  }
}

impl<I: Identity, N: LifecycleNotifier> LifecycleEngine<I, N> {
  pub fn with_notifier(identity: I, notifier: N) -> Self {
    Self { identity, notifier }
  }

  pub fn identity(&self) -> &I {
    &self.identity
  }

  /// Register a new document with a single Draft version and an empty audit trail.
  #[instrument(skip_all, fields(document_number = %metadata.document_number))]
  pub fn create_document(
    &self,
    metadata: DocumentMetadata,
    initial: VersionDraft,
  ) -> Result<DocumentRecord, LifecycleError> {
    let mut validator = Validator::new();
    validator
      .nested("metadata", metadata.validate())
      .non_empty("version.version_label", &initial.version_label)
      .min_chars("version.change_summary", &initial.change_summary, 5);
    validator.finish()?;

    let now = self.identity.now();
    let created_by = metadata.created_by.clone();
    let version = DocumentVersion::draft(self.identity.generate_id(), initial, created_by, now);
    let document = DocumentRecord::new(self.identity.generate_id(), metadata, version);

    info!(
      document_id = %document.id(),
      version_id = %document.latest_version().id,
      "document_created"
    );
    self.notifier.notify(LifecycleEvent::DocumentCreated {
      document_id: document.id().to_string(),
      version_id: document.latest_version().id.clone(),
    });

    Ok(document)
  }

  /// Draft → Under Review. Requires an assigned workflow.
  #[instrument(skip_all, fields(document_id = %document.id()))]
  pub fn submit_for_review(&self, document: &DocumentRecord) -> Result<DocumentRecord, LifecycleError> {
    let transition = Transition::SubmitForReview;
    if document.workflow_id().is_none() {
      return Err(reject(LifecycleError::NoWorkflowAssigned {
        transition,
        document_id: document.id().to_string(),
      }));
    }
    require_state(document, LifecycleState::Draft, transition)?;

    let entry = self.audit_entry(
      document,
      self.identity.now(),
      &document.metadata().created_by,
      actions::LIFECYCLE_STATUS_UPDATE,
      "Document progressed to Under Review".to_string(),
    );
    let updated = document.with_latest_status(LifecycleState::UnderReview, entry);
    self.status_changed(document, &updated);
    Ok(updated)
  }

  /// Sign one step of the assigned workflow on the latest version.
  ///
  /// Steps may be signed in any order; the only ordering rule is that a step
  /// cannot be signed twice on the same version. When every step of the
  /// workflow is signed the version becomes Approved.
  #[instrument(skip_all, fields(document_id = %document.id(), step_id = %step_id))]
  pub fn apply_signature(
    &self,
    document: &DocumentRecord,
    workflow: &WorkflowDefinition,
    step_id: &str,
    payload: SignaturePayload,
  ) -> Result<DocumentRecord, LifecycleError> {
    let transition = Transition::ApplySignature;
    let Some(assigned) = document.workflow_id() else {
      return Err(reject(LifecycleError::NoWorkflowAssigned {
        transition,
        document_id: document.id().to_string(),
      }));
    };
    if assigned != workflow.id() {
      return Err(reject(LifecycleError::WorkflowMismatch {
        assigned: assigned.to_string(),
        provided: workflow.id().to_string(),
      }));
    }
    require_state(document, LifecycleState::UnderReview, transition)?;

    let Some(step) = workflow.step(step_id) else {
      return Err(reject(LifecycleError::UnknownStep {
        workflow_id: workflow.id().to_string(),
        step_id: step_id.to_string(),
      }));
    };
    let version = document.latest_version();
    if version.is_step_signed(step_id) {
      return Err(reject(LifecycleError::StepAlreadySigned {
        version_id: version.id.clone(),
        step_id: step_id.to_string(),
      }));
    }
    payload.validate().map_err(|e| reject(e.into()))?;

    let now = self.identity.now();
    let completed_steps = version.approvals().len() + 1;
    let total_steps = workflow.step_count();
    let status = if completed_steps == total_steps {
      LifecycleState::Approved
    } else {
      LifecycleState::UnderReview
    };

    let entry = self.audit_entry(
      document,
      now,
      &payload.signer_name,
      &actions::electronic_signature(&step.name),
      format!(
        "{} signed by {} ({})",
        step.name, payload.signer_name, payload.signer_identifier
      ),
    );
    let approval = SignatureRecord {
      id: self.identity.generate_id(),
      step_id: step.id.clone(),
      step_name: step.name.clone(),
      role: step.responsible_role.clone(),
      signer_name: payload.signer_name,
      signer_title: payload.signer_title,
      signer_identifier: payload.signer_identifier,
      reason: payload.reason,
      credential_token: payload.credential,
      issued_at: now,
    };
    let updated = document.with_latest_signature(approval, status, entry)?;

    info!(
      document_id = %document.id(),
      version_id = %version.id,
      step_id = %step.id,
      completed_steps,
      total_steps,
      "signature_applied"
    );
    self.notifier.notify(LifecycleEvent::SignatureApplied {
      document_id: document.id().to_string(),
      version_id: version.id.clone(),
      step_id: step.id.clone(),
      completed_steps,
      total_steps,
    });
    if status != document.lifecycle_state() {
      self.status_changed(document, &updated);
    }

    Ok(updated)
  }

  /// Approved → Effective.
  #[instrument(skip_all, fields(document_id = %document.id()))]
  pub fn release_effective(&self, document: &DocumentRecord) -> Result<DocumentRecord, LifecycleError> {
    require_state(document, LifecycleState::Approved, Transition::ReleaseEffective)?;

    let entry = self.audit_entry(
      document,
      self.identity.now(),
      QUALITY_UNIT,
      actions::LIFECYCLE_STATUS_UPDATE,
      "Document marked as Effective and released for GMP use".to_string(),
    );
    let updated = document.with_latest_status(LifecycleState::Effective, entry);
    self.status_changed(document, &updated);
    Ok(updated)
  }

  /// Append a new Draft revision. Allowed from any state; prior versions are
  /// kept exactly as they were.
  #[instrument(skip_all, fields(document_id = %document.id()))]
  pub fn draft_new_version(
    &self,
    document: &DocumentRecord,
    draft: VersionDraft,
  ) -> Result<DocumentRecord, LifecycleError> {
    draft.validate().map_err(|e| reject(e.into()))?;

    let now = self.identity.now();
    let version = DocumentVersion::draft(
      self.identity.generate_id(),
      draft,
      document.metadata().created_by.clone(),
      now,
    );
    let entry = AuditEntry {
      id: self.identity.generate_id(),
      timestamp: now,
      actor: document.metadata().created_by.clone(),
      action: actions::NEW_VERSION_DRAFTED.to_string(),
      details: format!(
        "Version {} created with summary: {}",
        version.version_label, version.change_summary
      ),
      related_document_id: document.id().to_string(),
      related_version_id: version.id.clone(),
    };

    let version_id = version.id.clone();
    let version_label = version.version_label.clone();
    let updated = document.append_version(version, [entry]);

    info!(
      document_id = %document.id(),
      version_id = %version_id,
      version_label = %version_label,
      "version_drafted"
    );
    self.notifier.notify(LifecycleEvent::VersionDrafted {
      document_id: document.id().to_string(),
      version_id,
      version_label,
    });

    Ok(updated)
  }

  /// Validate a workflow draft and build an immutable definition.
  pub fn create_workflow(&self, draft: WorkflowDraft) -> Result<WorkflowDefinition, LifecycleError> {
    let workflow = WorkflowDefinition::from_draft(draft, &self.identity)?;
    info!(
      workflow_id = %workflow.id(),
      steps = workflow.step_count(),
      "workflow_created"
    );
    Ok(workflow)
  }

  fn audit_entry(
    &self,
    document: &DocumentRecord,
    timestamp: DateTime<Utc>,
    actor: &str,
    action: &str,
    details: String,
  ) -> AuditEntry {
    AuditEntry {
      id: self.identity.generate_id(),
      timestamp,
      actor: actor.to_string(),
      action: action.to_string(),
      details,
      related_document_id: document.id().to_string(),
      related_version_id: document.latest_version().id.clone(),
    }
  }

  fn status_changed(&self, before: &DocumentRecord, after: &DocumentRecord) {
    info!(
      document_id = %after.id(),
      version_id = %after.latest_version().id,
      from = %before.lifecycle_state(),
      to = %after.lifecycle_state(),
      "status_changed"
    );
    self.notifier.notify(LifecycleEvent::StatusChanged {
      document_id: after.id().to_string(),
      version_id: after.latest_version().id.clone(),
      from: before.lifecycle_state(),
      to: after.lifecycle_state(),
    });
  }
}

fn require_state(
  document: &DocumentRecord,
  expected: LifecycleState,
  transition: Transition,
) -> Result<(), LifecycleError> {
  if document.lifecycle_state() == expected {
    Ok(())
  } else {
    Err(reject(LifecycleError::InvalidTransition {
      transition,
      expected,
      actual: document.lifecycle_state(),
    }))
  }
}

fn reject(err: LifecycleError) -> LifecycleError {
  debug!(error = %err, "transition rejected");
  err
}
