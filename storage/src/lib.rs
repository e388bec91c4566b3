//! # Tasklist Storage
//!
//! [`KeyValueStorage`] backends for the todo store.
//!
//! - [`InMemoryStorage`]: process-local map, lost on exit
//! - [`SqliteStorage`]: one-table SQLite database, durable across restarts
//!
//! [`StorageBackend`] picks one from configuration.

use std::sync::Arc;
pub use tasklist_core::storage::{KeyValueStorage, StorageError, StorageFuture};

mod memory;
mod sqlite;

pub use memory::InMemoryStorage;
pub use sqlite::SqliteStorage;

/// Which storage backend to open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Non-durable in-process map
    Memory,
    /// SQLite database at the given sqlx URL, e.g. `sqlite://todos.db`
    Sqlite {
        /// Connection URL
        url: String,
    },
}

impl StorageBackend {
    /// Open the backend
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if the database cannot be opened
    /// or its table cannot be created.
    pub async fn open(&self) -> Result<Arc<dyn KeyValueStorage>, StorageError> {
        match self {
            Self::Memory => {
                tracing::info!("Using in-memory storage; todos will not survive a restart");
                Ok(Arc::new(InMemoryStorage::new()))
            },
            Self::Sqlite { url } => {
                let storage = SqliteStorage::connect(url).await?;
                tracing::info!(url = %url, "Opened SQLite storage");
                Ok(Arc::new(storage))
            },
        }
    }

    /// Short name for logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Sqlite { .. } => "sqlite",
        }
    }
}
