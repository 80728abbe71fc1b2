use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::debug;

use crate::{DmsState, Store, StoreError};

/// SQLite-based store implementation.
///
/// The state is kept as a JSON snapshot in the single row of `dms_snapshots`.
pub struct SqliteStore {
  pool: SqlitePool,
}

impl SqliteStore {
  /// Create a new SQLite store with the given connection pool.
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }

  /// Open (creating if needed) the database file at `path` and run migrations.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
    let options = SqliteConnectOptions::new()
      .filename(path.as_ref())
      .create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    let store = Self::new(pool);
    store.migrate().await?;
    Ok(store)
  }

  /// Run database migrations.
  pub async fn migrate(&self) -> Result<(), StoreError> {
    sqlx::migrate!("../../migrations").run(&self.pool).await?;
    Ok(())
  }
}

#[async_trait]
impl Store for SqliteStore {
  async fn load(&self) -> Result<Option<DmsState>, StoreError> {
    let row: Option<(String,)> = sqlx::query_as(
      r#"
      SELECT state
      FROM dms_snapshots
      WHERE id = 1
      "#,
    )
    .fetch_optional(&self.pool)
    .await?;

    match row {
      Some((content,)) => Ok(Some(serde_json::from_str(&content)?)),
      None => Ok(None),
    }
  }

  async fn save(&self, state: &DmsState) -> Result<(), StoreError> {
    let content = serde_json::to_string(state)?;
    sqlx::query(
      r#"
      INSERT INTO dms_snapshots (id, state, saved_at)
      VALUES (1, ?, ?)
      ON CONFLICT (id) DO UPDATE SET state = excluded.state, saved_at = excluded.saved_at
      "#,
    )
    .bind(&content)
    .bind(Utc::now())
    .execute(&self.pool)
    .await?;

    debug!(documents = state.documents.len(), "saved state snapshot");
    Ok(())
  }
}
