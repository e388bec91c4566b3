//! `TodoStore`: the handle the presentation layer holds.
//!
//! Wraps the runtime [`Store`] and turns the reducer's recorded outcomes back
//! into `Result`s. Commands from this handle are serialized, so the outcome
//! read after a command always belongs to that command.

use crate::error::TodoError;
use crate::reducer::{TodoEnvironment, TodoReducer};
use crate::types::{StoreStatus, TodoAction, TodoState};
use std::time::Duration;
use tasklist_core::{TodoId, TodoItem};
use tasklist_runtime::{EffectHandle, Store};
use tokio::sync::{broadcast, Mutex};

type Runtime = Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;

/// Owned todo store instance
///
/// Create one with [`TodoStore::new`], call [`TodoStore::init`], and
/// [`TodoStore::close`] it when done. There is no global instance.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tasklist::{TodoEnvironment, TodoStore};
/// use tasklist_core::environment::SystemClock;
/// # async fn example(
/// #     storage: Arc<dyn tasklist_core::KeyValueStorage>,
/// #     source: Arc<dyn tasklist_core::TodoSource>,
/// # ) -> Result<(), tasklist::TodoError> {
/// let store = TodoStore::new(TodoEnvironment::new(storage, source, Arc::new(SystemClock)));
/// store.init().await?;
///
/// let id = store.add("Walk the dog").await?;
/// store.toggle(id).await?;
/// store.close(std::time::Duration::from_secs(5)).await?;
/// # Ok(())
/// # }
/// ```
pub struct TodoStore {
    runtime: Runtime,
    commands: Mutex<()>,
    in_flight: Mutex<Vec<EffectHandle>>,
}

impl TodoStore {
    /// Creates a store in `Loading`; nothing is read until [`TodoStore::init`]
    #[must_use]
    pub fn new(env: TodoEnvironment) -> Self {
        Self {
            runtime: Store::new(TodoState::new(), TodoReducer::new(), env),
            commands: Mutex::new(()),
            in_flight: Mutex::new(Vec::new()),
        }
    }

    /// Load the list: persisted value first, remote source if nothing is stored
    ///
    /// Returns once the store is `Ready` or in `Error`.
    ///
    /// # Errors
    ///
    /// Returns the [`TodoError::Load`] or [`TodoError::Fetch`] that put the
    /// store into the error state.
    #[tracing::instrument(skip(self))]
    pub async fn init(&self) -> Result<(), TodoError> {
        self.run_to_completion(TodoAction::Load).await?;
        self.status_result().await
    }

    /// Leave the error state and load again, once
    ///
    /// Does nothing unless the store is in `Error`.
    ///
    /// # Errors
    ///
    /// Same as [`TodoStore::init`].
    #[tracing::instrument(skip(self))]
    pub async fn retry(&self) -> Result<(), TodoError> {
        self.run_to_completion(TodoAction::Retry).await?;
        self.status_result().await
    }

    /// Prepend a new item and persist in the background
    ///
    /// # Errors
    ///
    /// [`TodoError::Validation`] for blank text, [`TodoError::NotReady`]
    /// before the list is loaded.
    #[tracing::instrument(skip(self, text))]
    pub async fn add(&self, text: &str) -> Result<TodoId, TodoError> {
        let _guard = self.commands.lock().await;
        self.dispatch(TodoAction::Add {
            text: text.to_string(),
        })
        .await?;

        let (error, added) = self
            .runtime
            .state(|s| (s.last_error.clone(), s.last_added))
            .await;
        match (error, added) {
            (Some(err), _) => Err(err),
            (None, Some(id)) => Ok(id),
            (None, None) => Err(TodoError::NotReady("loading")),
        }
    }

    /// Flip an item's completed flag; unknown ids are ignored
    ///
    /// # Errors
    ///
    /// [`TodoError::NotReady`] before the list is loaded.
    #[tracing::instrument(skip(self))]
    pub async fn toggle(&self, id: TodoId) -> Result<(), TodoError> {
        self.command(TodoAction::Toggle { id }).await
    }

    /// Remove an item; unknown ids are ignored
    ///
    /// # Errors
    ///
    /// [`TodoError::NotReady`] before the list is loaded.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: TodoId) -> Result<(), TodoError> {
        self.command(TodoAction::Delete { id }).await
    }

    /// Empty the list and erase the persisted value
    ///
    /// Destructive: callers confirm with the user first. A failure to erase is
    /// reported as a warning, not here.
    ///
    /// # Errors
    ///
    /// [`TodoError::NotReady`] before the list is loaded.
    #[tracing::instrument(skip(self))]
    pub async fn clear_all(&self) -> Result<(), TodoError> {
        self.command(TodoAction::ClearAll).await
    }

    /// Replace the list with the remote one and persist it
    ///
    /// Destructive: callers confirm with the user first. Waits for the fetch.
    ///
    /// # Errors
    ///
    /// [`TodoError::Fetch`] if the remote source failed (the list is kept),
    /// [`TodoError::NotReady`] before the list is loaded.
    #[tracing::instrument(skip(self))]
    pub async fn reload_from_remote(&self) -> Result<(), TodoError> {
        let _guard = self.commands.lock().await;
        let mut handle = self.runtime.send(TodoAction::ReloadFromRemote).await?;
        handle.wait().await;
        self.last_outcome().await
    }

    /// Forget recorded persistence warnings
    ///
    /// # Errors
    ///
    /// [`TodoError::Runtime`] once the store is closing.
    pub async fn dismiss_warnings(&self) -> Result<(), TodoError> {
        self.command(TodoAction::DismissWarnings).await
    }

    /// Current list, newest first
    pub async fn todos(&self) -> Vec<TodoItem> {
        self.runtime.state(|s| s.todos.clone()).await
    }

    /// Current lifecycle status
    pub async fn status(&self) -> StoreStatus {
        self.runtime.state(|s| s.status.clone()).await
    }

    /// `(total, completed)` counters
    pub async fn counts(&self) -> (usize, usize) {
        self.runtime
            .state(|s| (s.count(), s.completed_count()))
            .await
    }

    /// Persistence warnings not yet dismissed
    pub async fn warnings(&self) -> Vec<TodoError> {
        self.runtime.state(|s| s.warnings.clone()).await
    }

    /// Copy of the whole state
    pub async fn snapshot(&self) -> TodoState {
        self.runtime.state(TodoState::clone).await
    }

    /// Every event produced by I/O, including persistence failures
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TodoAction> {
        self.runtime.subscribe_actions()
    }

    /// Wait until every persistence write started so far has finished
    pub async fn settle(&self) {
        let handles: Vec<EffectHandle> = self.in_flight.lock().await.drain(..).collect();
        for mut handle in handles {
            handle.wait().await;
        }
    }

    /// Wait for in-flight writes, then close the storage backend
    ///
    /// Commands sent afterwards fail with [`TodoError::Runtime`]. If writes are
    /// still running when `timeout` expires the backend is left open so they
    /// can finish.
    ///
    /// # Errors
    ///
    /// [`TodoError::Runtime`] if writes are still running after `timeout`,
    /// [`TodoError::Persist`] if the backend fails to close.
    #[tracing::instrument(skip(self))]
    pub async fn close(&self, timeout: Duration) -> Result<(), TodoError> {
        let _guard = self.commands.lock().await;
        if let Err(err) = self.runtime.shutdown(timeout).await {
            tracing::warn!(error = %err, "Writes still running, storage left open");
            return Err(err.into());
        }

        self.runtime.environment().storage.close().await?;
        self.in_flight.lock().await.clear();
        tracing::info!("Todo store closed");
        Ok(())
    }

    async fn command(&self, action: TodoAction) -> Result<(), TodoError> {
        let _guard = self.commands.lock().await;
        self.dispatch(action).await?;
        self.last_outcome().await
    }

    async fn dispatch(&self, action: TodoAction) -> Result<(), TodoError> {
        let handle = self.runtime.send(action).await?;
        let mut in_flight = self.in_flight.lock().await;
        in_flight.retain(|h| h.pending() > 0);
        if handle.pending() > 0 {
            in_flight.push(handle);
        }
        Ok(())
    }

    async fn run_to_completion(&self, action: TodoAction) -> Result<(), TodoError> {
        let _guard = self.commands.lock().await;
        let mut handle = self.runtime.send(action).await?;
        handle.wait().await;
        Ok(())
    }

    async fn last_outcome(&self) -> Result<(), TodoError> {
        self.runtime
            .state(|s| s.last_error.clone())
            .await
            .map_or(Ok(()), Err)
    }

    async fn status_result(&self) -> Result<(), TodoError> {
        match self.status().await {
            StoreStatus::Error(err) => Err(err),
            StoreStatus::Ready | StoreStatus::Loading => Ok(()),
        }
    }
}

impl std::fmt::Debug for TodoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoStore")
            .field("pending_effects", &self.runtime.pending_effects())
            .finish_non_exhaustive()
    }
}
