use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{DmsState, Store, StoreError};

/// In-process store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
  state: RwLock<Option<DmsState>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// A store that already holds `state`.
  pub fn with_state(state: DmsState) -> Self {
    Self {
      state: RwLock::new(Some(state)),
    }
  }
}

#[async_trait]
impl Store for MemoryStore {
  async fn load(&self) -> Result<Option<DmsState>, StoreError> {
    Ok(self.state.read().await.clone())
  }

  async fn save(&self, state: &DmsState) -> Result<(), StoreError> {
    *self.state.write().await = Some(state.clone());
    Ok(())
  }
}
