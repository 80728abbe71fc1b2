//! Vellum Identity
//!
//! The lifecycle core never reads the wall clock or invents identifiers on its
//! own. Both come from an [`Identity`] provider so that the production binary
//! can use random UUIDs and the system clock while tests get reproducible ids
//! and strictly increasing timestamps.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};

/// Source of unique identifiers and current timestamps.
pub trait Identity: Send + Sync {
  /// Produce a new identifier, unique within this provider.
  fn generate_id(&self) -> String;

  /// The current time.
  fn now(&self) -> DateTime<Utc>;
}

impl<T: Identity + ?Sized> Identity for &T {
  fn generate_id(&self) -> String {
    (**self).generate_id()
  }

  fn now(&self) -> DateTime<Utc> {
    (**self).now()
  }
}

/// Random v4 UUIDs and the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemIdentity;

impl Identity for SystemIdentity {
  fn generate_id(&self) -> String {
    uuid::Uuid::new_v4().to_string()
  }

  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// Deterministic provider: ids are `{prefix}-1`, `{prefix}-2`, ... and every
/// call to `now` advances the clock by one second from a fixed start.
#[derive(Debug)]
pub struct SequentialIdentity {
  prefix: String,
  start: DateTime<Utc>,
  next_id: AtomicU64,
  ticks: AtomicU64,
}

impl SequentialIdentity {
  pub fn new(prefix: impl Into<String>, start: DateTime<Utc>) -> Self {
    Self {
      prefix: prefix.into(),
      start,
      next_id: AtomicU64::new(1),
      ticks: AtomicU64::new(0),
    }
  }

  /// Ids with the given prefix, clock starting at the Unix epoch.
  pub fn with_prefix(prefix: impl Into<String>) -> Self {
    Self::new(prefix, DateTime::<Utc>::UNIX_EPOCH)
  }
}

impl Default for SequentialIdentity {
  fn default() -> Self {
    Self::with_prefix("id")
  }
}

impl Identity for SequentialIdentity {
  fn generate_id(&self) -> String {
    let n = self.next_id.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}", self.prefix, n)
  }

  fn now(&self) -> DateTime<Utc> {
    let tick = self.ticks.fetch_add(1, Ordering::Relaxed);
    self.start + Duration::seconds(tick as i64)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_sequential_ids_are_unique_and_ordered() {
    let identity = SequentialIdentity::new("doc", DateTime::<Utc>::UNIX_EPOCH);
    assert_eq!(identity.generate_id(), "doc-1");
    assert_eq!(identity.generate_id(), "doc-2");
  }

  #[test]
  fn test_sequential_clock_strictly_increases() {
    let identity = SequentialIdentity::default();
    let first = identity.now();
    let second = identity.now();
    assert_eq!(second - first, Duration::seconds(1));
  }

  #[test]
  fn test_system_ids_do_not_repeat() {
    let identity = SystemIdentity;
    assert_ne!(identity.generate_id(), identity.generate_id());
  }
}
