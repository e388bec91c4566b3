//! Local key-value storage abstraction.
//!
//! The todo store keeps its whole list under one key as a JSON string. Backends
//! only need string get/set/remove by key.
//!
//! # Implementations
//!
//! - `InMemoryStorage` (in `tasklist-storage`): process-local, for tests and
//!   constrained environments
//! - `SqliteStorage` (in `tasklist-storage`): durable embedded database
//!
//! # Dyn Compatibility
//!
//! Methods return `Pin<Box<dyn Future>>` instead of using `async fn` so the
//! trait can be held as `Arc<dyn KeyValueStorage>` and captured by effects.

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by storage operations
pub type StorageFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

/// Errors that can occur during storage operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backend could not be opened or reached
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Reading a key failed
    #[error("Storage read failed: {0}")]
    ReadFailed(String),

    /// Writing or removing a key failed
    #[error("Storage write failed: {0}")]
    WriteFailed(String),

    /// The backend was closed
    #[error("Storage is closed")]
    Closed,
}

/// Async string key-value store
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`, `None` if absent
    fn get<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set<'a>(&'a self, key: &'a str, value: String) -> StorageFuture<'a, ()>;

    /// Delete `key`; removing an absent key succeeds
    fn remove<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()>;

    /// Release backend resources. Later calls may fail with [`StorageError::Closed`].
    fn close(&self) -> StorageFuture<'_, ()> {
        Box::pin(async { Ok(()) })
    }
}
