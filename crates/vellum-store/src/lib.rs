//! Vellum Store
//!
//! This crate provides the storage trait and implementations for the
//! document control state. The whole [`DmsState`] is persisted as one
//! snapshot, so a save is all-or-nothing from the caller's point of view.
//!
//! Implementations:
//! - [`MemoryStore`] keeps the snapshot in process (tests, dry runs)
//! - [`JsonFileStore`] writes a JSON file next to the user's data
//! - [`SqliteStore`] keeps the snapshot in a single-row SQLite table

mod error;
mod json;
mod memory;
mod sqlite;
mod state;

pub use error::StoreError;
pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use state::DmsState;

use async_trait::async_trait;

/// Storage trait for the document control snapshot.
#[async_trait]
pub trait Store: Send + Sync {
  /// Load the last saved state, or `None` if nothing was ever saved.
  async fn load(&self) -> Result<Option<DmsState>, StoreError>;

  /// Replace the saved state.
  async fn save(&self, state: &DmsState) -> Result<(), StoreError>;
}

#[async_trait]
impl<S: Store + ?Sized> Store for Box<S> {
  async fn load(&self) -> Result<Option<DmsState>, StoreError> {
    (**self).load().await
  }

  async fn save(&self, state: &DmsState) -> Result<(), StoreError> {
    (**self).save(state).await
  }
}
