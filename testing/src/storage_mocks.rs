//! Storage double for store tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tasklist_core::storage::{KeyValueStorage, StorageError, StorageFuture};
use tasklist_storage::InMemoryStorage;

/// In-memory storage that counts calls, records every written value and
/// fails on demand
///
/// Clones share everything, so a test can keep one clone for inspection and
/// hand [`RecordingStorage::shared`] to the store.
#[derive(Debug, Clone, Default)]
pub struct RecordingStorage {
    inner: InMemoryStorage,
    state: Arc<Recorder>,
}

#[derive(Debug, Default)]
struct Recorder {
    gets: AtomicUsize,
    sets: AtomicUsize,
    removes: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_removes: AtomicBool,
    closed: AtomicBool,
    written: Mutex<Vec<String>>,
    write_delay: Mutex<Option<Duration>>,
}

impl RecordingStorage {
    /// Empty storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage with `value` already stored under `key`
    #[must_use]
    pub fn with_value(key: &str, value: impl Into<String>) -> Self {
        Self {
            inner: InMemoryStorage::with_entries([(key.to_string(), value.into())]),
            state: Arc::default(),
        }
    }

    /// This storage as the trait object the store expects
    #[must_use]
    pub fn shared(&self) -> Arc<dyn KeyValueStorage> {
        Arc::new(self.clone())
    }

    /// Make `get` fail with [`StorageError::ReadFailed`]
    pub fn fail_reads(&self, fail: bool) {
        self.state.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make `set` fail with [`StorageError::WriteFailed`]
    pub fn fail_writes(&self, fail: bool) {
        self.state.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make `remove` fail with [`StorageError::WriteFailed`]
    pub fn fail_removes(&self, fail: bool) {
        self.state.fail_removes.store(fail, Ordering::SeqCst);
    }

    /// Sleep this long inside every `set`
    pub fn set_write_delay(&self, delay: Option<Duration>) {
        *self
            .state
            .write_delay
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = delay;
    }

    /// Number of `get` calls so far
    #[must_use]
    pub fn get_count(&self) -> usize {
        self.state.gets.load(Ordering::SeqCst)
    }

    /// Number of `set` calls so far, failed ones included
    #[must_use]
    pub fn set_count(&self) -> usize {
        self.state.sets.load(Ordering::SeqCst)
    }

    /// Number of `remove` calls so far, failed ones included
    #[must_use]
    pub fn remove_count(&self) -> usize {
        self.state.removes.load(Ordering::SeqCst)
    }

    /// Every value successfully written, oldest first
    #[must_use]
    pub fn written_values(&self) -> Vec<String> {
        self.state
            .written
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether [`KeyValueStorage::close`] was called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::SeqCst)
    }

    /// Current value under `key`, bypassing counters, failure toggles and close
    pub async fn peek(&self, key: &str) -> Option<String> {
        self.inner.get(key).await.ok().flatten()
    }

    fn write_delay(&self) -> Option<Duration> {
        *self
            .state
            .write_delay
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStorage for RecordingStorage {
    fn get<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Option<String>> {
        self.state.gets.fetch_add(1, Ordering::SeqCst);
        if self.is_closed() {
            return Box::pin(async { Err(StorageError::Closed) });
        }
        if self.state.fail_reads.load(Ordering::SeqCst) {
            return Box::pin(async { Err(StorageError::ReadFailed("injected read failure".into())) });
        }
        self.inner.get(key)
    }

    fn set<'a>(&'a self, key: &'a str, value: String) -> StorageFuture<'a, ()> {
        self.state.sets.fetch_add(1, Ordering::SeqCst);
        let delay = self.write_delay();
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if self.is_closed() {
                return Err(StorageError::Closed);
            }
            if self.state.fail_writes.load(Ordering::SeqCst) {
                return Err(StorageError::WriteFailed("injected write failure".into()));
            }
            self.inner.set(key, value.clone()).await?;
            self.state
                .written
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(value);
            Ok(())
        })
    }

    fn remove<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()> {
        self.state.removes.fetch_add(1, Ordering::SeqCst);
        if self.is_closed() {
            return Box::pin(async { Err(StorageError::Closed) });
        }
        if self.state.fail_removes.load(Ordering::SeqCst) {
            return Box::pin(async {
                Err(StorageError::WriteFailed("injected remove failure".into()))
            });
        }
        self.inner.remove(key)
    }

    fn close(&self) -> StorageFuture<'_, ()> {
        self.state.closed.store(true, Ordering::SeqCst);
        Box::pin(async { Ok(()) })
    }
}
