//! Append-only audit ledger scoped to one document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Action labels recorded in the audit trail.
pub mod actions {
  pub const LIFECYCLE_STATUS_UPDATE: &str = "Lifecycle Status Update";
  pub const NEW_VERSION_DRAFTED: &str = "New Version Drafted";

  /// Label for a signature event on the named step.
  pub fn electronic_signature(step_name: &str) -> String {
    format!("Electronic Signature - {}", step_name)
  }
}

/// One recorded event. Never edited once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
  pub id: String,
  pub timestamp: DateTime<Utc>,
  pub actor: String,
  pub action: String,
  pub details: String,
  pub related_document_id: String,
  pub related_version_id: String,
}

/// Chronological audit entries for a document.
///
/// Canonical order is insertion order. [`AuditTrail::newest_first`] gives the
/// review order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditTrail {
  entries: Vec<AuditEntry>,
}

impl AuditTrail {
  pub fn new() -> Self {
    Self::default()
  }

  pub(crate) fn appended<I>(&self, entries: I) -> Self
  where
    I: IntoIterator<Item = AuditEntry>,
  {
    let mut next = self.entries.clone();
    next.extend(entries);
    Self { entries: next }
  }

  /// Entries in the order they were recorded.
  pub fn iter(&self) -> impl DoubleEndedIterator<Item = &AuditEntry> {
    self.entries.iter()
  }

  /// Entries most recent first.
  pub fn newest_first(&self) -> impl Iterator<Item = &AuditEntry> {
    self.entries.iter().rev()
  }

  /// Entries about one version, in recorded order.
  pub fn for_version<'a>(&'a self, version_id: &'a str) -> impl Iterator<Item = &'a AuditEntry> {
    self
      .entries
      .iter()
      .filter(move |e| e.related_version_id == version_id)
  }

  pub fn last(&self) -> Option<&AuditEntry> {
    self.entries.last()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}
