//! Vellum Workflow
//!
//! This crate provides the validated workflow representation for Vellum.
//! A [`WorkflowDefinition`] is the checked, immutable form of a
//! [`vellum_config::WorkflowDraft`] that documents can be routed through.
//!
//! Key differences from the draft:
//! - Every step has an id, and ids are unique within the definition
//! - There is at least one step
//! - Steps can be read but never edited; documents reference a definition by
//!   id, and signatures snapshot step text, so history stays stable

mod catalog;
mod error;
mod workflow;

pub use catalog::WorkflowCatalog;
pub use error::WorkflowError;
pub use workflow::{WorkflowDefinition, WorkflowStep};
