use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::{DmsState, Store, StoreError};

/// File-based store.
///
/// The state lives in one pretty-printed JSON file. Saves write a sibling
/// `.tmp` file first and rename it over the target, so a crash mid-save
/// leaves the previous snapshot intact.
pub struct JsonFileStore {
  path: PathBuf,
}

impl JsonFileStore {
  /// Create a store backed by the file at `path`. The file is created on first save.
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  fn temp_path(&self) -> PathBuf {
    let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    self.path.with_file_name(name)
  }
}

#[async_trait]
impl Store for JsonFileStore {
  async fn load(&self) -> Result<Option<DmsState>, StoreError> {
    let content = match fs::read_to_string(&self.path).await {
      Ok(content) => content,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(e.into()),
    };
    let state: DmsState = serde_json::from_str(&content)?;
    debug!(path = %self.path.display(), documents = state.documents.len(), "loaded state");
    Ok(Some(state))
  }

  async fn save(&self, state: &DmsState) -> Result<(), StoreError> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      fs::create_dir_all(parent).await?;
    }

    let content = serde_json::to_string_pretty(state)?;
    let temp = self.temp_path();
    fs::write(&temp, content).await?;
    fs::rename(&temp, &self.path).await?;

    debug!(path = %self.path.display(), documents = state.documents.len(), "saved state");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use vellum_config::DocumentType;

  fn state() -> DmsState {
    DmsState {
      document_types: vec![DocumentType {
        id: "sop".to_string(),
        name: "SOP".to_string(),
        description: "Standard Operating Procedure".to_string(),
      }],
      ..DmsState::default()
    }
  }

  #[tokio::test]
  async fn test_missing_file_loads_nothing() {
    let temp_dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(temp_dir.path().join("state.json"));
    assert!(store.load().await.unwrap().is_none());
  }

  #[tokio::test]
  async fn test_save_creates_parent_dirs_and_reads_back() {
    let temp_dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(temp_dir.path().join("nested/dir/state.json"));

    store.save(&state()).await.unwrap();

    assert_eq!(store.load().await.unwrap(), Some(state()));
    assert!(!store.temp_path().exists());
  }

  #[tokio::test]
  async fn test_corrupt_file_is_a_serialization_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("state.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = JsonFileStore::new(path).load().await.unwrap_err();
    assert!(matches!(err, StoreError::Serialization(_)));
  }
}
