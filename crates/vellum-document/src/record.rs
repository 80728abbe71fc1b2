use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vellum_config::{LifecycleState, SecurityLevel, ValidationError, Validator};

use crate::audit::{AuditEntry, AuditTrail};
use crate::error::DocumentError;
use crate::signature::SignatureRecord;
use crate::version::{DocumentVersion, VersionChain};

/// Descriptive metadata captured when a document is registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
  pub title: String,
  pub document_number: String,
  pub date_created: DateTime<Utc>,
  pub created_by: String,
  pub date_of_issue: DateTime<Utc>,
  pub issued_by: String,
  pub issuer_role: String,
  pub effective_from: DateTime<Utc>,
  pub next_issue_date: DateTime<Utc>,
  pub category: String,
  #[serde(default)]
  pub security_level: SecurityLevel,
  pub type_id: String,
  /// Approval workflow; without one the document cannot be submitted for review.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub workflow_id: Option<String>,
}

impl DocumentMetadata {
  pub fn validate(&self) -> Result<(), ValidationError> {
    let mut validator = Validator::new();
    validator
      .min_chars("title", &self.title, 3)
      .min_chars("document_number", &self.document_number, 3)
      .min_chars("created_by", &self.created_by, 2)
      .min_chars("issued_by", &self.issued_by, 2)
      .min_chars("issuer_role", &self.issuer_role, 2)
      .min_chars("category", &self.category, 2)
      .non_empty("type_id", &self.type_id);
    if let Some(workflow_id) = &self.workflow_id {
      validator.non_empty("workflow_id", workflow_id);
    }
    validator.finish()
  }
}

/// A controlled document: metadata, version chain and audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredDocument")]
pub struct DocumentRecord {
  id: String,
  #[serde(flatten)]
  metadata: DocumentMetadata,
  current_version_label: String,
  lifecycle_state: LifecycleState,
  versions: VersionChain,
  audit_trail: AuditTrail,
}

#[derive(Deserialize)]
struct StoredDocument {
  id: String,
  #[serde(flatten)]
  metadata: DocumentMetadata,
  current_version_label: String,
  lifecycle_state: LifecycleState,
  versions: VersionChain,
  #[serde(default)]
  audit_trail: AuditTrail,
}

impl TryFrom<StoredDocument> for DocumentRecord {
  type Error = DocumentError;

  fn try_from(stored: StoredDocument) -> Result<Self, Self::Error> {
    let latest = stored.versions.latest();
    if stored.lifecycle_state != latest.status() {
      return Err(DocumentError::StateMismatch {
        recorded: stored.lifecycle_state,
        latest: latest.status(),
      });
    }
    if stored.current_version_label != latest.version_label {
      return Err(DocumentError::LabelMismatch {
        recorded: stored.current_version_label,
        latest: latest.version_label.clone(),
      });
    }
    Ok(Self {
      id: stored.id,
      metadata: stored.metadata,
      current_version_label: stored.current_version_label,
      lifecycle_state: stored.lifecycle_state,
      versions: stored.versions,
      audit_trail: stored.audit_trail,
    })
  }
}

impl DocumentRecord {
  /// A new record holding exactly one version and an empty audit trail.
  pub fn new(id: String, metadata: DocumentMetadata, initial: DocumentVersion) -> Self {
    Self {
      id,
      metadata,
      current_version_label: initial.version_label.clone(),
      lifecycle_state: initial.status(),
      versions: VersionChain::new(initial),
      audit_trail: AuditTrail::new(),
    }
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn metadata(&self) -> &DocumentMetadata {
    &self.metadata
  }

  pub fn workflow_id(&self) -> Option<&str> {
    self.metadata.workflow_id.as_deref()
  }

  pub fn current_version_label(&self) -> &str {
    &self.current_version_label
  }

  pub fn lifecycle_state(&self) -> LifecycleState {
    self.lifecycle_state
  }

  pub fn versions(&self) -> &VersionChain {
    &self.versions
  }

  pub fn latest_version(&self) -> &DocumentVersion {
    self.versions.latest()
  }

  pub fn audit_trail(&self) -> &AuditTrail {
    &self.audit_trail
  }

  /// Append a new version, which becomes the latest, together with its audit
  /// entries. The lifecycle state follows the new version's status.
  pub fn append_version<I>(&self, version: DocumentVersion, audit_entries: I) -> Self
  where
    I: IntoIterator<Item = AuditEntry>,
  {
    Self {
      id: self.id.clone(),
      metadata: self.metadata.clone(),
      current_version_label: version.version_label.clone(),
      lifecycle_state: version.status(),
      versions: self.versions.appended(version),
      audit_trail: self.audit_trail.appended(audit_entries),
    }
  }

  /// Move the latest version (and the document) to `status`.
  pub fn with_latest_status(&self, status: LifecycleState, audit_entry: AuditEntry) -> Self {
    let latest = self.versions.latest().with_status(status);
    self.replace_latest(latest, audit_entry)
  }

  /// Record a signature on the latest version and move it to `status`.
  pub fn with_latest_signature(
    &self,
    approval: SignatureRecord,
    status: LifecycleState,
    audit_entry: AuditEntry,
  ) -> Result<Self, DocumentError> {
    let latest = self.versions.latest().with_approval(approval, status)?;
    Ok(self.replace_latest(latest, audit_entry))
  }

  /// Append an audit entry without touching the versions.
  pub fn with_audit_entry(&self, audit_entry: AuditEntry) -> Self {
    Self {
      audit_trail: self.audit_trail.appended([audit_entry]),
      ..self.clone()
    }
  }

  fn replace_latest(&self, latest: DocumentVersion, audit_entry: AuditEntry) -> Self {
    Self {
      id: self.id.clone(),
      metadata: self.metadata.clone(),
      current_version_label: self.current_version_label.clone(),
      lifecycle_state: latest.status(),
      versions: self.versions.with_latest(latest),
      audit_trail: self.audit_trail.appended([audit_entry]),
    }
  }
}
