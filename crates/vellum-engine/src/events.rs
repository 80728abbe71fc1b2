//! Lifecycle events and notifiers for observability.
//!
//! Events are emitted after each successful lifecycle operation so that
//! consumers can react (refresh a view, forward to a message bus, etc.)
//! without reading the audit trail back.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use vellum_config::LifecycleState;

/// Events emitted by the lifecycle engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleEvent {
  /// A document was registered with its first version.
  DocumentCreated {
    document_id: String,
    version_id: String,
  },

  /// The latest version changed status (submitted, approved, released).
  StatusChanged {
    document_id: String,
    version_id: String,
    from: LifecycleState,
    to: LifecycleState,
  },

  /// A workflow step was signed.
  SignatureApplied {
    document_id: String,
    version_id: String,
    step_id: String,
    completed_steps: usize,
    total_steps: usize,
  },

  /// A new draft revision was appended.
  VersionDrafted {
    document_id: String,
    version_id: String,
    version_label: String,
  },
}

/// Trait for receiving lifecycle events.
pub trait LifecycleNotifier: Send + Sync {
  /// Called once per emitted event.
  fn notify(&self, event: LifecycleEvent);
}

/// A notifier that discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl LifecycleNotifier for NoopNotifier {
  fn notify(&self, _event: LifecycleEvent) {}
}

/// A notifier that forwards events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<LifecycleEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<LifecycleEvent>) -> Self {
    Self { sender }
  }
}

impl LifecycleNotifier for ChannelNotifier {
  fn notify(&self, event: LifecycleEvent) {
    // Receiver may have been dropped.
    let _ = self.sender.send(event);
  }
}
