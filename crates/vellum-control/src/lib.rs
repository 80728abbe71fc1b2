//! Vellum Control
//!
//! [`DocumentControl`] is the state container for the document register.
//! It owns the document types, the workflow catalog and every document
//! record, routes each change through the lifecycle engine, and saves the
//! full snapshot to a [`vellum_store::Store`] after every change.
//!
//! Mutating methods take `&mut self`, so there is exactly one writer at a
//! time. Read access (lookups, search, the dashboard summary) borrows the
//! held state directly.

mod control;
mod error;
mod query;
mod seed;

pub use control::DocumentControl;
pub use error::ControlError;
pub use query::{DashboardSummary, DocumentQuery, RECENT_LIMIT, REVIEW_WINDOW_DAYS};
