//! SQLite-backed storage.
//!
//! Everything lives in one table:
//!
//! ```sql
//! CREATE TABLE kv_store (
//!     key        TEXT PRIMARY KEY,
//!     value      TEXT NOT NULL,
//!     updated_at TEXT NOT NULL
//! )
//! ```

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use tasklist_core::storage::{KeyValueStorage, StorageError, StorageFuture};

/// Key-value storage in a SQLite database
///
/// # Example
///
/// ```no_run
/// use tasklist_storage::{KeyValueStorage, SqliteStorage};
///
/// # async fn example() -> Result<(), tasklist_storage::StorageError> {
/// let storage = SqliteStorage::connect("sqlite://todos.db").await?;
/// storage.set("@todolist_todos", "[]".to_string()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Open (creating if missing) the database at `url` and ensure the table exists
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if the URL is invalid, the file
    /// cannot be opened, or the table cannot be created.
    pub async fn connect(url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StorageError::Unavailable(format!("invalid database url {url}: {e}")))?
            .create_if_missing(true);

        // An in-memory database lives and dies with its single connection
        let pool_options = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(4)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        let storage = Self::new(pool);
        storage.migrate().await?;
        Ok(storage)
    }

    /// Wrap an existing pool. Call [`SqliteStorage::migrate`] before use.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the `kv_store` table if it does not exist
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if the statement fails.
    pub async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS kv_store (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        Ok(())
    }
}

fn map_error(err: sqlx::Error, wrap: fn(String) -> StorageError) -> StorageError {
    match err {
        sqlx::Error::PoolClosed => StorageError::Closed,
        other => wrap(other.to_string()),
    }
}

impl KeyValueStorage for SqliteStorage {
    fn get<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Option<String>> {
        Box::pin(async move {
            let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| map_error(e, StorageError::ReadFailed))?;

            metrics::counter!("storage.reads.total", "backend" => "sqlite").increment(1);

            row.map(|row| row.try_get::<String, _>("value"))
                .transpose()
                .map_err(|e| StorageError::ReadFailed(e.to_string()))
        })
    }

    fn set<'a>(&'a self, key: &'a str, value: String) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            sqlx::query(
                r"
                INSERT INTO kv_store (key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                ",
            )
            .bind(key)
            .bind(value)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| map_error(e, StorageError::WriteFailed))?;

            metrics::counter!("storage.writes.total", "backend" => "sqlite").increment(1);
            tracing::debug!(key, "Stored value");
            Ok(())
        })
    }

    fn remove<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            sqlx::query("DELETE FROM kv_store WHERE key = ?1")
                .bind(key)
                .execute(&self.pool)
                .await
                .map_err(|e| map_error(e, StorageError::WriteFailed))?;

            tracing::debug!(key, "Removed value");
            Ok(())
        })
    }

    fn close(&self) -> StorageFuture<'_, ()> {
        Box::pin(async move {
            self.pool.close().await;
            Ok(())
        })
    }
}
