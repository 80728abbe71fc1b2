use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vellum_config::{ValidationError, Validator};

/// Credential material supplied with a signature.
///
/// Stored as given and never verified. `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialToken(String);

impl CredentialToken {
  pub fn new(token: impl Into<String>) -> Self {
    Self(token.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Debug for CredentialToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("CredentialToken(***)")
  }
}

/// What a signer submits to complete a workflow step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignaturePayload {
  pub signer_name: String,
  pub signer_title: String,
  pub signer_identifier: String,
  pub reason: String,
  pub credential: CredentialToken,
}

impl SignaturePayload {
  /// Every signature field is mandatory.
  pub fn validate(&self) -> Result<(), ValidationError> {
    Validator::new()
      .non_empty("signer_name", &self.signer_name)
      .non_empty("signer_title", &self.signer_title)
      .non_empty("signer_identifier", &self.signer_identifier)
      .non_empty("reason", &self.reason)
      .non_empty("credential", self.credential.as_str())
      .finish()
  }
}

/// A recorded electronic signature for one workflow step on one version.
///
/// `step_name` and `role` are copies of the step as it was at signing time and
/// are never refreshed from the workflow catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRecord {
  pub id: String,
  pub step_id: String,
  pub step_name: String,
  pub role: String,
  pub signer_name: String,
  pub signer_title: String,
  pub signer_identifier: String,
  pub reason: String,
  pub credential_token: CredentialToken,
  pub issued_at: DateTime<Utc>,
}
