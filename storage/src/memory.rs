//! In-memory storage.

use std::collections::HashMap;
use std::sync::Arc;
use tasklist_core::storage::{KeyValueStorage, StorageError, StorageFuture};
use tokio::sync::RwLock;

/// Process-local key-value map
///
/// Clones share the same map. After [`KeyValueStorage::close`] every call
/// fails with [`StorageError::Closed`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, String>,
    closed: bool,
}

impl InMemoryStorage {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `entries`
    #[must_use]
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            inner: Arc::new(RwLock::new(Inner {
                entries,
                closed: false,
            })),
        }
    }

    /// Number of stored keys
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    /// Whether no keys are stored
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl KeyValueStorage for InMemoryStorage {
    fn get<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Option<String>> {
        Box::pin(async move {
            let inner = self.inner.read().await;
            if inner.closed {
                return Err(StorageError::Closed);
            }
            Ok(inner.entries.get(key).cloned())
        })
    }

    fn set<'a>(&'a self, key: &'a str, value: String) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            let mut inner = self.inner.write().await;
            if inner.closed {
                return Err(StorageError::Closed);
            }
            inner.entries.insert(key.to_string(), value);
            Ok(())
        })
    }

    fn remove<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            let mut inner = self.inner.write().await;
            if inner.closed {
                return Err(StorageError::Closed);
            }
            inner.entries.remove(key);
            Ok(())
        })
    }

    fn close(&self) -> StorageFuture<'_, ()> {
        Box::pin(async move {
            self.inner.write().await.closed = true;
            Ok(())
        })
    }
}
