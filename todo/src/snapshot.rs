//! Ordered snapshot writes.
//!
//! Every change to the list spawns its own persistence task, so two writes
//! can reach storage in either order. [`SnapshotWriter`] serializes them and
//! drops any write older than the last one applied, which keeps the stored
//! value at the newest snapshot no matter how the tasks interleave.

use tasklist_core::storage::{KeyValueStorage, StorageError};
use tokio::sync::Mutex;

/// What happened to a gated write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The storage call was made and succeeded
    Applied,
    /// A newer revision was already applied; storage was not touched
    Stale,
}

/// Revision gate in front of a storage key
#[derive(Debug, Default)]
pub struct SnapshotWriter {
    last_applied: Mutex<u64>,
}

impl SnapshotWriter {
    /// Creates a writer that has applied nothing
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `snapshot` under `key` unless a newer revision was applied
    ///
    /// # Errors
    ///
    /// Returns the storage error if the write fails. A failed write does not
    /// advance the gate.
    pub async fn write(
        &self,
        storage: &dyn KeyValueStorage,
        key: &str,
        revision: u64,
        snapshot: String,
    ) -> Result<WriteOutcome, StorageError> {
        let mut last = self.last_applied.lock().await;
        if revision <= *last {
            tracing::debug!(revision, last_applied = *last, "Skipping stale snapshot");
            return Ok(WriteOutcome::Stale);
        }

        storage.set(key, snapshot).await?;
        *last = revision;
        Ok(WriteOutcome::Applied)
    }

    /// Remove `key` unless a newer revision was applied
    ///
    /// # Errors
    ///
    /// Returns the storage error if the removal fails.
    pub async fn remove(
        &self,
        storage: &dyn KeyValueStorage,
        key: &str,
        revision: u64,
    ) -> Result<WriteOutcome, StorageError> {
        let mut last = self.last_applied.lock().await;
        if revision <= *last {
            return Ok(WriteOutcome::Stale);
        }

        storage.remove(key).await?;
        *last = revision;
        Ok(WriteOutcome::Applied)
    }

    /// Highest revision applied so far
    pub async fn last_applied(&self) -> u64 {
        *self.last_applied.lock().await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use tasklist_testing::RecordingStorage;

    #[tokio::test]
    async fn older_revisions_are_dropped() {
        let storage = RecordingStorage::new();
        let writer = SnapshotWriter::new();

        let outcome = writer.write(&storage, "k", 2, "two".into()).await.unwrap();
        assert_eq!(outcome, WriteOutcome::Applied);

        let outcome = writer.write(&storage, "k", 1, "one".into()).await.unwrap();
        assert_eq!(outcome, WriteOutcome::Stale);

        assert_eq!(storage.peek("k").await.as_deref(), Some("two"));
        assert_eq!(storage.set_count(), 1);
        assert_eq!(writer.last_applied().await, 2);
    }

    #[tokio::test]
    async fn failed_write_does_not_advance() {
        let storage = RecordingStorage::new();
        let writer = SnapshotWriter::new();

        storage.fail_writes(true);
        assert!(writer.write(&storage, "k", 1, "one".into()).await.is_err());
        assert_eq!(writer.last_applied().await, 0);

        storage.fail_writes(false);
        let outcome = writer.write(&storage, "k", 1, "one".into()).await.unwrap();
        assert_eq!(outcome, WriteOutcome::Applied);
    }

    #[tokio::test]
    async fn remove_is_gated_too() {
        let storage = RecordingStorage::with_value("k", "[]");
        let writer = SnapshotWriter::new();

        writer.write(&storage, "k", 3, "three".into()).await.unwrap();
        assert_eq!(writer.remove(&storage, "k", 2).await.unwrap(), WriteOutcome::Stale);
        assert_eq!(writer.remove(&storage, "k", 4).await.unwrap(), WriteOutcome::Applied);
        assert_eq!(storage.peek("k").await, None);
    }
}
