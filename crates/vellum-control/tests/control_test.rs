//! Integration tests for the document control state container.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use vellum_config::{DocumentTypeDraft, LifecycleState, SecurityLevel, StepDraft, WorkflowDraft};
use vellum_document::{CredentialToken, DocumentMetadata, SignaturePayload, VersionDraft};
use vellum_engine::{LifecycleError, NextAction};
use vellum_identity::SequentialIdentity;
use vellum_store::{DmsState, MemoryStore, Store, StoreError};

use vellum_control::{ControlError, DocumentControl, DocumentQuery};

/// Memory store that can be switched to fail every save.
#[derive(Default)]
struct FlakyStore {
  inner: MemoryStore,
  fail_saves: AtomicBool,
}

#[async_trait]
impl Store for FlakyStore {
  async fn load(&self) -> Result<Option<DmsState>, StoreError> {
    self.inner.load().await
  }

  async fn save(&self, state: &DmsState) -> Result<(), StoreError> {
    if self.fail_saves.load(Ordering::SeqCst) {
      return Err(StoreError::Io(std::io::Error::other("disk full")));
    }
    self.inner.save(state).await
  }
}

fn epoch() -> DateTime<Utc> {
  DateTime::<Utc>::UNIX_EPOCH
}

async fn control() -> DocumentControl<MemoryStore, SequentialIdentity> {
  DocumentControl::open(MemoryStore::new(), SequentialIdentity::default())
    .await
    .unwrap()
}

fn metadata<S: Store>(
  control: &DocumentControl<S, SequentialIdentity>,
  title: &str,
  number: &str,
  type_name: &str,
) -> DocumentMetadata {
  let type_id = control
    .document_types()
    .iter()
    .find(|t| t.name == type_name)
    .map(|t| t.id.clone())
    .unwrap();
  DocumentMetadata {
    title: title.to_string(),
    document_number: number.to_string(),
    date_created: epoch(),
    created_by: "Alex Kim".to_string(),
    date_of_issue: epoch(),
    issued_by: "Alex Kim".to_string(),
    issuer_role: "Document Owner".to_string(),
    effective_from: epoch(),
    next_issue_date: epoch() + Duration::days(365),
    category: "Manufacturing".to_string(),
    security_level: SecurityLevel::Internal,
    type_id,
    workflow_id: control.default_workflow().map(|w| w.id().to_string()),
  }
}

fn initial_version() -> VersionDraft {
  VersionDraft {
    version_label: "1.0".to_string(),
    change_summary: "Initial release".to_string(),
    effective_from: epoch(),
    next_review_on: epoch() + Duration::days(180),
  }
}

fn payload(signer: &str) -> SignaturePayload {
  SignaturePayload {
    signer_name: signer.to_string(),
    signer_title: "Reviewer".to_string(),
    signer_identifier: signer.to_lowercase(),
    reason: "Approved".to_string(),
    credential: CredentialToken::new("token"),
  }
}

#[tokio::test]
async fn test_open_seeds_defaults_and_saves_them() {
  let control = control().await;

  let names: Vec<_> = control.document_types().iter().map(|t| t.name.as_str()).collect();
  assert_eq!(names, vec!["SOP", "Work Instruction", "Policy", "Form"]);

  let workflow = control.default_workflow().unwrap();
  assert_eq!(workflow.name(), "Standard GMP Review");
  let steps: Vec<_> = workflow.steps().iter().map(|s| s.name.as_str()).collect();
  assert_eq!(steps, vec!["Author Review", "QA Review", "QA Approval"]);
  assert!(workflow.steps().iter().all(|s| s.requires_signature));

  assert_eq!(control.store().load().await.unwrap().as_ref(), Some(control.state()));
}

#[tokio::test]
async fn test_open_keeps_existing_state() {
  let store = MemoryStore::with_state(DmsState::default());
  let control = DocumentControl::open(store, SequentialIdentity::default())
    .await
    .unwrap();
  assert!(control.document_types().is_empty());
  assert!(control.default_workflow().is_none());
}

#[tokio::test]
async fn test_full_lifecycle_is_persisted() {
  let mut control = control().await;
  let doc = control
    .create_document(metadata(&control, "Cleaning Procedure", "SOP-001", "SOP"), initial_version())
    .await
    .unwrap();
  assert!(doc.audit_trail().is_empty());

  let id = doc.id().to_string();
  control.submit_for_review(&id).await.unwrap();

  let step_ids: Vec<String> = control
    .workflow(doc.workflow_id().unwrap())
    .unwrap()
    .steps()
    .iter()
    .map(|s| s.id.clone())
    .collect();
  for step_id in step_ids.iter().rev() {
    control.apply_signature(&id, step_id, payload("Quinn")).await.unwrap();
  }
  assert_eq!(control.document(&id).unwrap().lifecycle_state(), LifecycleState::Approved);

  let released = control.release_effective(&id).await.unwrap();
  assert_eq!(released.lifecycle_state(), LifecycleState::Effective);

  let saved = control.store().load().await.unwrap().unwrap();
  let saved_doc = saved.document(&id).unwrap();
  assert_eq!(saved_doc, &released);
  // submitted, three signatures, released
  assert_eq!(saved_doc.audit_trail().len(), 5);
}

#[tokio::test]
async fn test_registered_document_has_empty_trail() {
  let mut control = control().await;
  let doc = control
    .create_document(metadata(&control, "Cleaning Procedure", "SOP-001", "SOP"), initial_version())
    .await
    .unwrap();

  assert!(doc.audit_trail().is_empty());
  assert_eq!(doc.versions().len(), 1);
  let saved = control.store().load().await.unwrap().unwrap();
  assert!(saved.document(doc.id()).unwrap().audit_trail().is_empty());
}

#[tokio::test]
async fn test_create_document_requires_known_type_and_workflow() {
  let mut control = control().await;
  let mut m = metadata(&control, "Cleaning Procedure", "SOP-001", "SOP");
  m.type_id = "missing".to_string();
  let err = control.create_document(m, initial_version()).await.unwrap_err();
  assert!(matches!(err, ControlError::DocumentTypeNotFound(_)));

  let mut m = metadata(&control, "Cleaning Procedure", "SOP-001", "SOP");
  m.workflow_id = Some("missing".to_string());
  let err = control.create_document(m, initial_version()).await.unwrap_err();
  assert!(matches!(err, ControlError::WorkflowNotFound(_)));

  assert!(control.documents().is_empty());
}

#[tokio::test]
async fn test_unknown_document_is_not_found() {
  let mut control = control().await;
  let err = control.submit_for_review("nope").await.unwrap_err();
  assert!(matches!(err, ControlError::DocumentNotFound(id) if id == "nope"));
}

#[tokio::test]
async fn test_rejected_transition_leaves_state_unchanged() {
  let mut control = control().await;
  let doc = control
    .create_document(metadata(&control, "Cleaning Procedure", "SOP-001", "SOP"), initial_version())
    .await
    .unwrap();

  let err = control.release_effective(doc.id()).await.unwrap_err();
  assert!(matches!(
    err,
    ControlError::Lifecycle(LifecycleError::InvalidTransition { .. })
  ));
  assert_eq!(control.document(doc.id()).unwrap(), &doc);
}

#[tokio::test]
async fn test_sign_without_workflow_is_rejected() {
  let mut control = control().await;
  let mut m = metadata(&control, "Cleaning Procedure", "SOP-001", "SOP");
  m.workflow_id = None;
  let doc = control.create_document(m, initial_version()).await.unwrap();

  let err = control.apply_signature(doc.id(), "any", payload("Quinn")).await.unwrap_err();
  assert!(matches!(
    err,
    ControlError::Lifecycle(LifecycleError::NoWorkflowAssigned { .. })
  ));
}

#[tokio::test]
async fn test_failed_save_keeps_change_in_memory() {
  let store = FlakyStore::default();
  let mut control = DocumentControl::open(store, SequentialIdentity::default())
    .await
    .unwrap();
  let doc = control
    .create_document(metadata(&control, "Cleaning Procedure", "SOP-001", "SOP"), initial_version())
    .await
    .unwrap();

  control.store().fail_saves.store(true, Ordering::SeqCst);
  let err = control.submit_for_review(doc.id()).await.unwrap_err();

  assert!(matches!(err, ControlError::Store(_)));
  assert_eq!(
    control.document(doc.id()).unwrap().lifecycle_state(),
    LifecycleState::UnderReview
  );
  let saved = control.store().load().await.unwrap().unwrap();
  assert_eq!(saved.document(doc.id()).unwrap().lifecycle_state(), LifecycleState::Draft);
}

#[tokio::test]
async fn test_search_matches_fields_and_type_filter() {
  let mut control = control().await;
  let sop = control
    .create_document(metadata(&control, "Cleaning Procedure", "SOP-001", "SOP"), initial_version())
    .await
    .unwrap();
  let mut m = metadata(&control, "Quality Manual", "POL-010", "Policy");
  m.category = "Quality Assurance".to_string();
  let policy = control.create_document(m, initial_version()).await.unwrap();

  let ids = |docs: Vec<&vellum_document::DocumentRecord>| -> Vec<String> {
    docs.into_iter().map(|d| d.id().to_string()).collect()
  };

  assert_eq!(ids(control.search(&DocumentQuery::text("cleaning"))), vec![sop.id().to_string()]);
  assert_eq!(ids(control.search(&DocumentQuery::text("pol-0"))), vec![policy.id().to_string()]);
  assert_eq!(ids(control.search(&DocumentQuery::text("policy"))), vec![policy.id().to_string()]);
  assert_eq!(ids(control.search(&DocumentQuery::text("assurance"))), vec![policy.id().to_string()]);
  assert_eq!(control.search(&DocumentQuery::default()).len(), 2);
  assert!(
    control
      .search(&DocumentQuery::text("cleaning").with_type(policy.metadata().type_id.clone()))
      .is_empty()
  );
}

#[tokio::test]
async fn test_summary_counts() {
  let mut control = control().await;
  let now = epoch() + Duration::days(100);

  for i in 0..7 {
    let mut m = metadata(&control, &format!("Procedure {}", i), &format!("SOP-00{}", i), "SOP");
    m.date_of_issue = epoch() + Duration::days(i);
    m.security_level = if i % 2 == 0 {
      SecurityLevel::Public
    } else {
      SecurityLevel::Confidential
    };
    m.next_issue_date = if i < 2 {
      now + Duration::days(10)
    } else {
      now + Duration::days(60)
    };
    control.create_document(m, initial_version()).await.unwrap();
  }

  let summary = control.summary(now);
  assert_eq!(summary.total, 7);
  assert_eq!(summary.effective, 0);
  assert_eq!(summary.restricted, 3);
  assert_eq!(summary.upcoming_reviews, 2);
  let recent: Vec<_> = summary
    .recent
    .iter()
    .map(|d| d.metadata().document_number.as_str())
    .collect();
  assert_eq!(recent, vec!["SOP-006", "SOP-005", "SOP-004", "SOP-003", "SOP-002"]);
}

#[tokio::test]
async fn test_next_action_by_document_id() {
  let mut control = control().await;
  let doc = control
    .create_document(metadata(&control, "Cleaning Procedure", "SOP-001", "SOP"), initial_version())
    .await
    .unwrap();
  assert_eq!(control.next_action(doc.id()).unwrap(), Some(NextAction::SubmitForReview));

  control.submit_for_review(doc.id()).await.unwrap();
  assert!(matches!(
    control.next_action(doc.id()).unwrap(),
    Some(NextAction::Sign { step }) if step.name == "Author Review"
  ));
}

#[tokio::test]
async fn test_new_workflow_and_type_are_saved() {
  let mut control = control().await;
  let workflow = control
    .create_workflow(WorkflowDraft {
      name: "Fast Track".to_string(),
      description: "QA approval only".to_string(),
      steps: vec![StepDraft::new("QA Approval", "QA Manager", "Approve")],
      is_default: false,
    })
    .await
    .unwrap();
  let document_type = control
    .add_document_type(DocumentTypeDraft {
      name: "Specification".to_string(),
      description: String::new(),
    })
    .await
    .unwrap();

  let saved = control.store().load().await.unwrap().unwrap();
  assert_eq!(saved.workflows.get(workflow.id()), Some(&workflow));
  assert_eq!(saved.document_type(&document_type.id), Some(&document_type));
  assert_eq!(control.default_workflow().unwrap().name(), "Standard GMP Review");

  let err = control
    .add_document_type(DocumentTypeDraft {
      name: " ".to_string(),
      description: String::new(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, ControlError::Invalid(_)));
}

#[tokio::test]
async fn test_draft_new_version_through_control() {
  let mut control = control().await;
  let doc = control
    .create_document(metadata(&control, "Cleaning Procedure", "SOP-001", "SOP"), initial_version())
    .await
    .unwrap();

  let revised = control
    .draft_new_version(
      doc.id(),
      VersionDraft {
        version_label: "1.1".to_string(),
        change_summary: "Added safety section".to_string(),
        effective_from: epoch(),
        next_review_on: epoch(),
      },
    )
    .await
    .unwrap();

  assert_eq!(revised.versions().len(), 2);
  assert_eq!(control.document(doc.id()).unwrap().current_version_label(), "1.1");
}
