use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a document version (and, by mirroring, of the document).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
  Draft,
  UnderReview,
  /// Reserved. No transition produces this state.
  PendingApproval,
  Approved,
  Effective,
  /// Terminal. No transition leads here or out of here.
  Obsolete,
}

impl LifecycleState {
  /// Human-readable label, as shown on status badges.
  pub fn label(&self) -> &'static str {
    match self {
      LifecycleState::Draft => "Draft",
      LifecycleState::UnderReview => "Under Review",
      LifecycleState::PendingApproval => "Pending Approval",
      LifecycleState::Approved => "Approved",
      LifecycleState::Effective => "Effective",
      LifecycleState::Obsolete => "Obsolete",
    }
  }

  pub fn is_terminal(&self) -> bool {
    matches!(self, LifecycleState::Obsolete)
  }
}

impl fmt::Display for LifecycleState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_labels_match_badges() {
    assert_eq!(LifecycleState::UnderReview.to_string(), "Under Review");
    assert_eq!(LifecycleState::PendingApproval.to_string(), "Pending Approval");
    assert_eq!(LifecycleState::Effective.label(), "Effective");
  }

  #[test]
  fn test_serializes_snake_case() {
    let json = serde_json::to_string(&LifecycleState::UnderReview).unwrap();
    assert_eq!(json, "\"under_review\"");

    let state: LifecycleState = serde_json::from_str("\"pending_approval\"").unwrap();
    assert_eq!(state, LifecycleState::PendingApproval);
  }

  #[test]
  fn test_only_obsolete_is_terminal() {
    assert!(LifecycleState::Obsolete.is_terminal());
    assert!(!LifecycleState::Effective.is_terminal());
  }
}
