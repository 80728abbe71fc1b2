//! Vellum Document
//!
//! Value types for controlled documents. A [`DocumentRecord`] exclusively owns
//! its [`VersionChain`] and its [`AuditTrail`]; both are append-only. Records
//! are never changed in place: every method that "changes" a record returns a
//! new value, and the caller replaces the stored copy.
//!
//! Invariants upheld by construction (and re-checked when a record is read
//! back from storage):
//! - the version chain is never empty
//! - the document lifecycle state equals the status of the latest version
//! - a version holds at most one signature per workflow step

mod audit;
mod error;
mod record;
mod signature;
mod version;

pub use audit::{AuditEntry, AuditTrail, actions};
pub use error::DocumentError;
pub use record::{DocumentMetadata, DocumentRecord};
pub use signature::{CredentialToken, SignaturePayload, SignatureRecord};
pub use version::{DocumentVersion, VersionChain, VersionDraft};
