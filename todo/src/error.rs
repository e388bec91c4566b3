//! Errors surfaced by the todo store.

use tasklist_core::{RemoteError, StorageError};
use tasklist_runtime::StoreError;
use thiserror::Error;

/// Everything that can go wrong in the todo store
///
/// `Load` and `Fetch` during initialization put the store into the error
/// state. `Persist` never does; it is recorded as a warning.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TodoError {
    /// Reading or decoding the persisted list failed
    #[error("Could not load saved todos: {0}")]
    Load(String),

    /// The remote source failed
    #[error("Could not fetch todos: {0}")]
    Fetch(#[source] RemoteError),

    /// Rejected input
    #[error("{0}")]
    Validation(String),

    /// Writing or removing the persisted list failed
    #[error("Could not save todos: {0}")]
    Persist(#[source] StorageError),

    /// A mutation arrived while the list was not loaded
    #[error("Todo list is not ready (currently {0})")]
    NotReady(&'static str),

    /// The store runtime refused the action
    #[error(transparent)]
    Runtime(#[from] StoreError),
}

impl TodoError {
    /// Whether the user can reasonably try the same thing again
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Load(_) | Self::Fetch(_) | Self::Persist(_))
    }
}

impl From<StorageError> for TodoError {
    fn from(err: StorageError) -> Self {
        Self::Persist(err)
    }
}

impl From<RemoteError> for TodoError {
    fn from(err: RemoteError) -> Self {
        Self::Fetch(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_keep_the_cause() {
        let err = TodoError::from(RemoteError::Status {
            status: 503,
            message: "down".into(),
        });
        assert_eq!(
            err.to_string(),
            "Could not fetch todos: Remote returned status 503: down"
        );

        let err = TodoError::from(StorageError::WriteFailed("disk full".into()));
        assert_eq!(err.to_string(), "Could not save todos: Storage write failed: disk full");
    }

    #[test]
    fn validation_and_readiness_are_not_retryable() {
        assert!(!TodoError::Validation("empty".into()).is_retryable());
        assert!(!TodoError::NotReady("loading").is_retryable());
        assert!(TodoError::Load("bad json".into()).is_retryable());
    }
}
