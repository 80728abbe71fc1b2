use chrono::{DateTime, Duration, Utc};
use vellum_config::{DocumentType, LifecycleState};
use vellum_document::DocumentRecord;

/// Days ahead of `now` in which a next issue date counts as an upcoming review.
pub const REVIEW_WINDOW_DAYS: i64 = 30;

/// Number of documents listed as recent on the dashboard.
pub const RECENT_LIMIT: usize = 5;

/// Filter for [`crate::DocumentControl::search`].
///
/// The text matches (case-insensitively) anywhere in the title, document
/// number, document type name or category. An empty text matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentQuery {
  pub text: String,
  pub type_id: Option<String>,
}

impl DocumentQuery {
  pub fn text(text: impl Into<String>) -> Self {
    Self {
      text: text.into(),
      type_id: None,
    }
  }

  pub fn with_type(mut self, type_id: impl Into<String>) -> Self {
    self.type_id = Some(type_id.into());
    self
  }

  pub(crate) fn matches(&self, document: &DocumentRecord, types: &[DocumentType]) -> bool {
    let metadata = document.metadata();
    if let Some(type_id) = &self.type_id
      && metadata.type_id != *type_id
    {
      return false;
    }

    let needle = self.text.trim().to_lowercase();
    if needle.is_empty() {
      return true;
    }
    let type_name = types
      .iter()
      .find(|t| t.id == metadata.type_id)
      .map(|t| t.name.as_str())
      .unwrap_or_default();
    [
      metadata.title.as_str(),
      metadata.document_number.as_str(),
      type_name,
      metadata.category.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&needle))
  }
}

/// Headline figures for the document register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary<'a> {
  pub total: usize,
  pub effective: usize,
  /// Documents with any security level other than Public.
  pub restricted: usize,
  /// Documents whose next issue date falls before `now` plus the review
  /// window. Overdue documents are included.
  pub upcoming_reviews: usize,
  /// Most recently issued first.
  pub recent: Vec<&'a DocumentRecord>,
}

impl<'a> DashboardSummary<'a> {
  pub(crate) fn build(documents: &'a [DocumentRecord], now: DateTime<Utc>) -> Self {
    let review_cutoff = now + Duration::days(REVIEW_WINDOW_DAYS);

    let mut recent: Vec<&DocumentRecord> = documents.iter().collect();
    recent.sort_by(|a, b| b.metadata().date_of_issue.cmp(&a.metadata().date_of_issue));
    recent.truncate(RECENT_LIMIT);

    Self {
      total: documents.len(),
      effective: documents
        .iter()
        .filter(|d| d.lifecycle_state() == LifecycleState::Effective)
        .count(),
      restricted: documents
        .iter()
        .filter(|d| d.metadata().security_level.is_restricted())
        .count(),
      upcoming_reviews: documents
        .iter()
        .filter(|d| d.metadata().next_issue_date < review_cutoff)
        .count(),
      recent,
    }
  }
}
