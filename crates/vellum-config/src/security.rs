use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Distribution control applied to a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityLevel {
  Confidential,
  #[default]
  Internal,
  Restricted,
  Public,
}

impl SecurityLevel {
  pub fn label(&self) -> &'static str {
    match self {
      SecurityLevel::Confidential => "Confidential",
      SecurityLevel::Internal => "Internal",
      SecurityLevel::Restricted => "Restricted",
      SecurityLevel::Public => "Public",
    }
  }

  /// Anything other than public requires controlled distribution.
  pub fn is_restricted(&self) -> bool {
    !matches!(self, SecurityLevel::Public)
  }
}

impl fmt::Display for SecurityLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

impl FromStr for SecurityLevel {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "confidential" => Ok(SecurityLevel::Confidential),
      "internal" => Ok(SecurityLevel::Internal),
      "restricted" => Ok(SecurityLevel::Restricted),
      "public" => Ok(SecurityLevel::Public),
      other => Err(format!("unknown security level: {}", other)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_is_case_insensitive() {
    assert_eq!("Restricted".parse::<SecurityLevel>(), Ok(SecurityLevel::Restricted));
    assert!("secret".parse::<SecurityLevel>().is_err());
  }

  #[test]
  fn test_public_is_not_restricted() {
    assert!(!SecurityLevel::Public.is_restricted());
    assert!(SecurityLevel::Internal.is_restricted());
  }
}
