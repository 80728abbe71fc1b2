use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vellum_config::{LifecycleState, ValidationError, Validator};

use crate::error::DocumentError;
use crate::signature::SignatureRecord;

/// Caller-supplied content of a new version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDraft {
  pub version_label: String,
  pub change_summary: String,
  pub effective_from: DateTime<Utc>,
  pub next_review_on: DateTime<Utc>,
}

impl VersionDraft {
  pub fn validate(&self) -> Result<(), ValidationError> {
    Validator::new()
      .non_empty("version_label", &self.version_label)
      .non_empty("change_summary", &self.change_summary)
      .finish()
  }
}

/// One revision of a document, with its own status and signatures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredVersion")]
pub struct DocumentVersion {
  pub id: String,
  pub version_label: String,
  pub change_summary: String,
  pub created_by: String,
  pub created_on: DateTime<Utc>,
  pub effective_from: DateTime<Utc>,
  pub next_review_on: DateTime<Utc>,
  status: LifecycleState,
  approvals: Vec<SignatureRecord>,
}

#[derive(Deserialize)]
struct StoredVersion {
  id: String,
  version_label: String,
  change_summary: String,
  created_by: String,
  created_on: DateTime<Utc>,
  effective_from: DateTime<Utc>,
  next_review_on: DateTime<Utc>,
  status: LifecycleState,
  #[serde(default)]
  approvals: Vec<SignatureRecord>,
}

impl TryFrom<StoredVersion> for DocumentVersion {
  type Error = DocumentError;

  fn try_from(stored: StoredVersion) -> Result<Self, Self::Error> {
    let mut seen = HashSet::new();
    for approval in &stored.approvals {
      if !seen.insert(approval.step_id.as_str()) {
        return Err(DocumentError::DuplicateApproval {
          version_id: stored.id.clone(),
          step_id: approval.step_id.clone(),
        });
      }
    }
    Ok(Self {
      id: stored.id,
      version_label: stored.version_label,
      change_summary: stored.change_summary,
      created_by: stored.created_by,
      created_on: stored.created_on,
      effective_from: stored.effective_from,
      next_review_on: stored.next_review_on,
      status: stored.status,
      approvals: stored.approvals,
    })
  }
}

impl DocumentVersion {
  /// A fresh Draft version with no signatures.
  pub fn draft(
    id: String,
    draft: VersionDraft,
    created_by: impl Into<String>,
    created_on: DateTime<Utc>,
  ) -> Self {
    Self {
      id,
      version_label: draft.version_label,
      change_summary: draft.change_summary,
      created_by: created_by.into(),
      created_on,
      effective_from: draft.effective_from,
      next_review_on: draft.next_review_on,
      status: LifecycleState::Draft,
      approvals: Vec::new(),
    }
  }

  pub fn status(&self) -> LifecycleState {
    self.status
  }

  /// Signatures in the order they were applied.
  pub fn approvals(&self) -> &[SignatureRecord] {
    &self.approvals
  }

  /// Ids of the workflow steps signed on this version.
  pub fn completed_step_ids(&self) -> HashSet<&str> {
    self.approvals.iter().map(|a| a.step_id.as_str()).collect()
  }

  pub fn is_step_signed(&self, step_id: &str) -> bool {
    self.approvals.iter().any(|a| a.step_id == step_id)
  }

  pub(crate) fn with_status(&self, status: LifecycleState) -> Self {
    Self {
      status,
      ..self.clone()
    }
  }

  pub(crate) fn with_approval(
    &self,
    approval: SignatureRecord,
    status: LifecycleState,
  ) -> Result<Self, DocumentError> {
    if self.is_step_signed(&approval.step_id) {
      return Err(DocumentError::DuplicateApproval {
        version_id: self.id.clone(),
        step_id: approval.step_id,
      });
    }
    let mut approvals = self.approvals.clone();
    approvals.push(approval);
    Ok(Self {
      status,
      approvals,
      ..self.clone()
    })
  }
}

/// The ordered, append-only sequence of versions of a document.
///
/// The latest version is held separately from its predecessors so the chain
/// can never be empty and [`VersionChain::latest`] cannot fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DocumentVersion>", into = "Vec<DocumentVersion>")]
pub struct VersionChain {
  previous: Vec<DocumentVersion>,
  latest: DocumentVersion,
}

impl VersionChain {
  pub fn new(initial: DocumentVersion) -> Self {
    Self {
      previous: Vec::new(),
      latest: initial,
    }
  }

  /// The version every lifecycle transition operates on.
  pub fn latest(&self) -> &DocumentVersion {
    &self.latest
  }

  /// Versions oldest first, ending with the latest.
  pub fn iter(&self) -> impl DoubleEndedIterator<Item = &DocumentVersion> {
    self.previous.iter().chain(std::iter::once(&self.latest))
  }

  /// Get a version by id.
  pub fn get(&self, version_id: &str) -> Option<&DocumentVersion> {
    self.iter().find(|v| v.id == version_id)
  }

  pub fn len(&self) -> usize {
    self.previous.len() + 1
  }

  pub fn is_empty(&self) -> bool {
    false
  }

  pub(crate) fn appended(&self, version: DocumentVersion) -> Self {
    let mut previous = self.previous.clone();
    previous.push(self.latest.clone());
    Self {
      previous,
      latest: version,
    }
  }

  pub(crate) fn with_latest(&self, latest: DocumentVersion) -> Self {
    Self {
      previous: self.previous.clone(),
      latest,
    }
  }
}

impl TryFrom<Vec<DocumentVersion>> for VersionChain {
  type Error = DocumentError;

  fn try_from(mut versions: Vec<DocumentVersion>) -> Result<Self, Self::Error> {
    let latest = versions.pop().ok_or(DocumentError::EmptyVersionChain)?;
    Ok(Self {
      previous: versions,
      latest,
    })
  }
}

impl From<VersionChain> for Vec<DocumentVersion> {
  fn from(chain: VersionChain) -> Self {
    let mut versions = chain.previous;
    versions.push(chain.latest);
    versions
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::signature::CredentialToken;

  fn version(id: &str, label: &str) -> DocumentVersion {
    DocumentVersion::draft(
      id.to_string(),
      VersionDraft {
        version_label: label.to_string(),
        change_summary: "Initial release".to_string(),
        effective_from: DateTime::<Utc>::UNIX_EPOCH,
        next_review_on: DateTime::<Utc>::UNIX_EPOCH,
      },
      "Author",
      DateTime::<Utc>::UNIX_EPOCH,
    )
  }

  fn approval(step_id: &str) -> SignatureRecord {
    SignatureRecord {
      id: format!("sig-{}", step_id),
      step_id: step_id.to_string(),
      step_name: "Review".to_string(),
      role: "QA".to_string(),
      signer_name: "Signer".to_string(),
      signer_title: "Title".to_string(),
      signer_identifier: "S-1".to_string(),
      reason: "Reviewed".to_string(),
      credential_token: CredentialToken::new("token"),
      issued_at: DateTime::<Utc>::UNIX_EPOCH,
    }
  }

  #[test]
  fn test_appended_keeps_prior_versions_in_order() {
    let chain = VersionChain::new(version("v1", "1.0"));
    let chain = chain.appended(version("v2", "1.1"));
    let chain = chain.appended(version("v3", "2.0"));

    assert_eq!(chain.len(), 3);
    assert_eq!(chain.latest().id, "v3");
    let ids: Vec<&str> = chain.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["v1", "v2", "v3"]);
    assert_eq!(chain.get("v2").unwrap().version_label, "1.1");
  }

  #[test]
  fn test_empty_chain_is_rejected() {
    let err = VersionChain::try_from(Vec::new()).unwrap_err();
    assert_eq!(err, DocumentError::EmptyVersionChain);
  }

  #[test]
  fn test_with_approval_rejects_second_signature_for_step() {
    let v = version("v1", "1.0")
      .with_approval(approval("a"), LifecycleState::UnderReview)
      .unwrap();
    assert_eq!(v.approvals().len(), 1);
    assert!(v.is_step_signed("a"));

    let err = v
      .with_approval(approval("a"), LifecycleState::UnderReview)
      .unwrap_err();
    assert!(matches!(err, DocumentError::DuplicateApproval { .. }));
  }

  #[test]
  fn test_stored_version_with_duplicate_approvals_is_rejected() {
    let v = version("v1", "1.0")
      .with_approval(approval("a"), LifecycleState::UnderReview)
      .unwrap();
    let mut json = serde_json::to_value(&v).unwrap();
    let first = json["approvals"][0].clone();
    json["approvals"].as_array_mut().unwrap().push(first);

    assert!(serde_json::from_value::<DocumentVersion>(json).is_err());
  }
}
