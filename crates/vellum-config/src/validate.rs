//! Field validation shared by every creation path.
//!
//! A [`Validator`] collects every problem with an input before failing, so a
//! caller can surface all field errors at once instead of one per attempt.

/// A single problem with a single input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
  pub field: String,
  pub message: String,
}

/// One or more required fields were missing or malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", summarize(.issues))]
pub struct ValidationError {
  issues: Vec<FieldIssue>,
}

impl ValidationError {
  /// Create an error for a single field.
  pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      issues: vec![FieldIssue {
        field: field.into(),
        message: message.into(),
      }],
    }
  }

  pub fn issues(&self) -> &[FieldIssue] {
    &self.issues
  }

  /// Whether any issue was reported against `field`.
  pub fn has_issue(&self, field: &str) -> bool {
    self.issues.iter().any(|issue| issue.field == field)
  }
}

fn summarize(issues: &[FieldIssue]) -> String {
  issues
    .iter()
    .map(|issue| format!("{} {}", issue.field, issue.message))
    .collect::<Vec<_>>()
    .join("; ")
}

/// Accumulates field issues.
#[derive(Debug, Default)]
pub struct Validator {
  issues: Vec<FieldIssue>,
}

impl Validator {
  pub fn new() -> Self {
    Self::default()
  }

  /// Require a value that is not blank.
  pub fn non_empty(&mut self, field: &str, value: &str) -> &mut Self {
    if value.trim().is_empty() {
      self.push(field, "is required");
    }
    self
  }

  /// Require a value of at least `min` characters, ignoring surrounding whitespace.
  pub fn min_chars(&mut self, field: &str, value: &str, min: usize) -> &mut Self {
    let len = value.trim().chars().count();
    if len == 0 {
      self.push(field, "is required");
    } else if len < min {
      self.push(field, &format!("must be at least {} characters", min));
    }
    self
  }

  /// Record `message` against `field` unless `ok` holds.
  pub fn check(&mut self, field: &str, ok: bool, message: &str) -> &mut Self {
    if !ok {
      self.push(field, message);
    }
    self
  }

  /// Merge issues found by a nested validation, prefixing their field names.
  pub fn nested(&mut self, prefix: &str, result: Result<(), ValidationError>) -> &mut Self {
    if let Err(err) = result {
      for issue in err.issues {
        self.issues.push(FieldIssue {
          field: format!("{}.{}", prefix, issue.field),
          message: issue.message,
        });
      }
    }
    self
  }

  pub fn finish(&mut self) -> Result<(), ValidationError> {
    if self.issues.is_empty() {
      Ok(())
    } else {
      Err(ValidationError {
        issues: std::mem::take(&mut self.issues),
      })
    }
  }

  fn push(&mut self, field: &str, message: &str) {
    self.issues.push(FieldIssue {
      field: field.to_string(),
      message: message.to_string(),
    });
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_collects_every_issue() {
    let err = Validator::new()
      .non_empty("name", "  ")
      .min_chars("title", "ab", 3)
      .min_chars("category", "QA", 2)
      .finish()
      .unwrap_err();

    assert_eq!(err.issues().len(), 2);
    assert!(err.has_issue("name"));
    assert!(err.has_issue("title"));
    assert!(!err.has_issue("category"));
    assert_eq!(
      err.to_string(),
      "validation failed: name is required; title must be at least 3 characters"
    );
  }

  #[test]
  fn test_nested_issues_are_prefixed() {
    let inner = Validator::new().non_empty("role", "").finish();
    let err = Validator::new().nested("steps[1]", inner).finish().unwrap_err();
    assert!(err.has_issue("steps[1].role"));
  }

  #[test]
  fn test_clean_input_passes() {
    assert!(Validator::new().non_empty("name", "QA").check("steps", true, "x").finish().is_ok());
  }
}
