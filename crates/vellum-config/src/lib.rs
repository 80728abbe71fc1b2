//! Vellum Config
//!
//! This crate contains the serializable reference data and definition types
//! shared by every other Vellum crate. Definitions here are *unvalidated*: a
//! [`WorkflowDraft`] is what a user submits, and `vellum-workflow` turns it into
//! an immutable, checked workflow definition.
//!
//! Definitions can be loaded from:
//! - JSON files (via the CLI with `vellum workflow create workflow.json`)
//! - A persisted state snapshot

mod document_type;
mod security;
mod state;
mod validate;
mod workflow;

pub use document_type::{DocumentType, DocumentTypeDraft};
pub use security::SecurityLevel;
pub use state::LifecycleState;
pub use validate::{FieldIssue, ValidationError, Validator};
pub use workflow::{StepDraft, WorkflowDraft};
