//! Domain types for the todo store.

use crate::error::TodoError;
use tasklist_core::{TodoId, TodoItem};

/// Most warnings kept before the oldest are dropped
pub const MAX_WARNINGS: usize = 20;

/// Externally visible lifecycle of the store
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum StoreStatus {
    /// Initial load (or a retry) is in progress
    #[default]
    Loading,
    /// The list is usable
    Ready,
    /// Initial load failed; [`TodoAction::Retry`] goes back to `Loading`
    Error(TodoError),
}

impl StoreStatus {
    /// Lowercase name for messages and logs
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Error(_) => "error",
        }
    }

    /// Whether mutations are accepted
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Why a remote fetch was started
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchReason {
    /// Storage was empty during load
    Initial,
    /// The user asked to replace the list with the remote one
    Reload,
}

/// State of the todo store
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoState {
    /// Lifecycle status
    pub status: StoreStatus,
    /// The list, newest first
    pub todos: Vec<TodoItem>,
    /// Bumped on every change to `todos`
    pub revision: u64,
    /// Outcome of the most recent command, `None` if it succeeded
    pub last_error: Option<TodoError>,
    /// Id assigned by the most recent successful add
    pub last_added: Option<TodoId>,
    /// Persistence failures not yet dismissed, oldest first
    pub warnings: Vec<TodoError>,
    /// Loads started so far, retries included
    pub load_attempts: u32,
    /// Whether a load is running
    pub load_in_flight: bool,
}

impl TodoState {
    /// Creates an empty state in `Loading`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a `Ready` state holding `todos`
    #[must_use]
    pub fn ready(todos: Vec<TodoItem>) -> Self {
        Self {
            status: StoreStatus::Ready,
            todos,
            ..Self::default()
        }
    }

    /// Returns the number of todos
    #[must_use]
    pub fn count(&self) -> usize {
        self.todos.len()
    }

    /// Returns the number of completed todos
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|t| t.completed).count()
    }

    /// Returns a todo by ID
    #[must_use]
    pub fn get(&self, id: TodoId) -> Option<&TodoItem> {
        self.todos.iter().find(|t| t.id == id)
    }

    /// Checks if a todo exists
    #[must_use]
    pub fn exists(&self, id: TodoId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn replace_list(&mut self, todos: Vec<TodoItem>) {
        self.todos = todos;
        self.revision += 1;
    }

    pub(crate) fn push_warning(&mut self, warning: TodoError) {
        if self.warnings.len() == MAX_WARNINGS {
            self.warnings.remove(0);
        }
        self.warnings.push(warning);
    }
}

/// Commands from the presentation layer and the results of I/O
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TodoAction {
    // ========== Commands ==========
    /// Command: load the persisted list, falling back to the remote source
    Load,

    /// Command: leave the error state and load again
    Retry,

    /// Command: prepend a new item
    Add {
        /// Item text, trimmed before use
        text: String,
    },

    /// Command: flip an item's completed flag
    Toggle {
        /// Item to toggle
        id: TodoId,
    },

    /// Command: remove an item
    Delete {
        /// Item to remove
        id: TodoId,
    },

    /// Command: empty the list and erase the persisted value
    ClearAll,

    /// Command: replace the list with the remote one
    ReloadFromRemote,

    /// Command: forget recorded persistence warnings
    DismissWarnings,

    // ========== Events ==========
    /// Event: a persisted list was found and decoded
    StoredListLoaded {
        /// The decoded list
        todos: Vec<TodoItem>,
    },

    /// Event: the storage key is absent
    NothingStored,

    /// Event: reading or decoding the persisted list failed
    LoadFailed {
        /// Cause
        error: TodoError,
    },

    /// Event: the remote source returned a list
    RemoteListFetched {
        /// The fetched list
        todos: Vec<TodoItem>,
        /// Why the fetch ran
        reason: FetchReason,
    },

    /// Event: the remote source failed after retries
    FetchFailed {
        /// Cause
        error: TodoError,
        /// Why the fetch ran
        reason: FetchReason,
    },

    /// Event: the snapshot at `revision` was written
    Persisted {
        /// Revision written
        revision: u64,
    },

    /// Event: a newer snapshot was already written, this one was dropped
    PersistSkipped {
        /// Revision dropped
        revision: u64,
    },

    /// Event: writing the snapshot at `revision` failed
    PersistFailed {
        /// Revision that failed
        revision: u64,
        /// Cause
        error: TodoError,
    },

    /// Event: the storage key was removed
    StorageCleared {
        /// Revision of the clear
        revision: u64,
    },

    /// Event: removing the storage key failed
    ClearFailed {
        /// Revision of the clear
        revision: u64,
        /// Cause
        error: TodoError,
    },
}

impl TodoAction {
    /// Whether this action comes from the presentation layer rather than I/O
    #[must_use]
    pub const fn is_command(&self) -> bool {
        matches!(
            self,
            Self::Load
                | Self::Retry
                | Self::Add { .. }
                | Self::Toggle { .. }
                | Self::Delete { .. }
                | Self::ClearAll
                | Self::ReloadFromRemote
                | Self::DismissWarnings
        )
    }

    /// Whether this action reports the result of I/O
    #[must_use]
    pub const fn is_event(&self) -> bool {
        !self.is_command()
    }

    /// The warning carried by this action, if it reports a persistence failure
    #[must_use]
    pub const fn warning(&self) -> Option<&TodoError> {
        match self {
            Self::PersistFailed { error, .. } | Self::ClearFailed { error, .. } => Some(error),
            _ => None,
        }
    }
}
