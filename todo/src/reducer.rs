//! Reducer logic for the todo store.
//!
//! Commands are validated against the current status, applied to the
//! in-memory list immediately, and answered with effects that do the storage
//! and network I/O. Those effects report back as events.

use crate::error::TodoError;
use crate::snapshot::{SnapshotWriter, WriteOutcome};
use crate::types::{FetchReason, StoreStatus, TodoAction, TodoState};
use std::sync::Arc;
use tasklist_core::{
    decode_list, effect::Effect, encode_list, environment::Clock, reducer::Reducer, smallvec,
    KeyValueStorage, RemoteError, SmallVec, StorageError, TodoId, TodoItem, TodoSource,
};
use tasklist_runtime::retry::{retry_with_predicate, RetryPolicy};

/// Storage key used when none is configured
pub const DEFAULT_STORAGE_KEY: &str = "@todolist_todos";

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Where the list is persisted
    pub storage: Arc<dyn KeyValueStorage>,
    /// Where the list comes from when nothing is persisted
    pub source: Arc<dyn TodoSource>,
    /// Clock for generating ids
    pub clock: Arc<dyn Clock>,
    /// The single key holding the whole list
    pub storage_key: String,
    /// Backoff for transient remote failures
    pub fetch_retry: RetryPolicy,
    /// Orders concurrent persistence writes
    pub writer: Arc<SnapshotWriter>,
}

impl TodoEnvironment {
    /// Creates an environment with the default key and retry policy
    #[must_use]
    pub fn new(
        storage: Arc<dyn KeyValueStorage>,
        source: Arc<dyn TodoSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            source,
            clock,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            fetch_retry: RetryPolicy::default(),
            writer: Arc::new(SnapshotWriter::new()),
        }
    }

    /// Use `key` instead of the default storage key
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Use `policy` for remote fetches
    #[must_use]
    pub fn with_fetch_retry(mut self, policy: RetryPolicy) -> Self {
        self.fetch_retry = policy;
        self
    }
}

/// Trims `text` and rejects it if nothing is left
///
/// # Errors
///
/// Returns [`TodoError::Validation`] for empty or whitespace-only text.
pub fn validate_text(text: &str) -> Result<&str, TodoError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TodoError::Validation("Todo text cannot be empty".to_string()));
    }
    Ok(trimmed)
}

/// Client-side id: the clock in milliseconds, bumped until unused in `state`
fn fresh_id(state: &TodoState, clock: &dyn Clock) -> TodoId {
    let mut candidate = clock.now().timestamp_millis();
    while state.exists(TodoId::new(candidate)) {
        candidate = candidate.wrapping_add(1);
    }
    TodoId::new(candidate)
}

/// Reducer for the todo store
#[derive(Clone, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn require_ready(state: &mut TodoState) -> bool {
        if state.status.is_ready() {
            return true;
        }
        tracing::debug!(status = state.status.label(), "Rejecting mutation");
        state.last_error = Some(TodoError::NotReady(state.status.label()));
        false
    }

    fn start_load(state: &mut TodoState, env: &TodoEnvironment) -> SmallVec<[Effect<TodoAction>; 4]> {
        state.status = StoreStatus::Loading;
        state.load_in_flight = true;
        state.load_attempts += 1;
        tracing::info!(attempt = state.load_attempts, "Loading todos");
        smallvec![Self::read_stored(env)]
    }

    fn read_stored(env: &TodoEnvironment) -> Effect<TodoAction> {
        let storage = Arc::clone(&env.storage);
        let key = env.storage_key.clone();

        Effect::future(async move {
            let action = match storage.get(&key).await {
                Ok(Some(raw)) => match decode_list(&raw) {
                    Ok(todos) => TodoAction::StoredListLoaded { todos },
                    Err(err) => TodoAction::LoadFailed {
                        error: TodoError::Load(err.to_string()),
                    },
                },
                Ok(None) => TodoAction::NothingStored,
                Err(err) => TodoAction::LoadFailed {
                    error: TodoError::Load(err.to_string()),
                },
            };
            Some(action)
        })
    }

    fn fetch_remote(env: &TodoEnvironment, reason: FetchReason) -> Effect<TodoAction> {
        let source = Arc::clone(&env.source);
        let policy = env.fetch_retry.clone();

        Effect::future(async move {
            let result = retry_with_predicate(
                &policy,
                || source.fetch_initial_todos(),
                RemoteError::is_transient,
            )
            .await;

            Some(match result {
                Ok(todos) => TodoAction::RemoteListFetched { todos, reason },
                Err(err) => TodoAction::FetchFailed {
                    error: TodoError::Fetch(err),
                    reason,
                },
            })
        })
    }

    /// Persist the list as it is right now, tagged with the current revision
    fn persist(state: &TodoState, env: &TodoEnvironment) -> Effect<TodoAction> {
        let revision = state.revision;
        let snapshot = encode_list(&state.todos);
        let storage = Arc::clone(&env.storage);
        let writer = Arc::clone(&env.writer);
        let key = env.storage_key.clone();

        Effect::future(async move {
            let result = match snapshot {
                Ok(raw) => writer.write(storage.as_ref(), &key, revision, raw).await,
                Err(err) => Err(StorageError::WriteFailed(err.to_string())),
            };

            Some(match result {
                Ok(WriteOutcome::Applied) => TodoAction::Persisted { revision },
                Ok(WriteOutcome::Stale) => TodoAction::PersistSkipped { revision },
                Err(err) => TodoAction::PersistFailed {
                    revision,
                    error: TodoError::Persist(err),
                },
            })
        })
    }

    fn erase(state: &TodoState, env: &TodoEnvironment) -> Effect<TodoAction> {
        let revision = state.revision;
        let storage = Arc::clone(&env.storage);
        let writer = Arc::clone(&env.writer);
        let key = env.storage_key.clone();

        Effect::future(async move {
            Some(match writer.remove(storage.as_ref(), &key, revision).await {
                Ok(WriteOutcome::Applied) => TodoAction::StorageCleared { revision },
                Ok(WriteOutcome::Stale) => TodoAction::PersistSkipped { revision },
                Err(err) => TodoAction::ClearFailed {
                    revision,
                    error: TodoError::Persist(err),
                },
            })
        })
    }

    fn finish_load(state: &mut TodoState, todos: Vec<TodoItem>) {
        state.load_in_flight = false;
        state.status = StoreStatus::Ready;
        state.replace_list(todos);
        tracing::info!(count = state.count(), "Todos ready");
    }

    fn fail_load(state: &mut TodoState, error: TodoError) {
        tracing::warn!(error = %error, "Loading todos failed");
        state.load_in_flight = false;
        state.status = StoreStatus::Error(error);
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        if action.is_command() {
            state.last_error = None;
            state.last_added = None;
        }

        match action {
            // ========== Commands ==========
            TodoAction::Load => {
                if state.status != StoreStatus::Loading || state.load_in_flight {
                    tracing::debug!(status = state.status.label(), "Load ignored");
                    return SmallVec::new();
                }
                Self::start_load(state, env)
            },

            TodoAction::Retry => {
                if !matches!(state.status, StoreStatus::Error(_)) {
                    tracing::debug!(status = state.status.label(), "Retry ignored");
                    return SmallVec::new();
                }
                Self::start_load(state, env)
            },

            TodoAction::Add { text } => {
                if !Self::require_ready(state) {
                    return SmallVec::new();
                }
                let text = match validate_text(&text) {
                    Ok(text) => text.to_string(),
                    Err(err) => {
                        state.last_error = Some(err);
                        return SmallVec::new();
                    },
                };

                let id = fresh_id(state, env.clock.as_ref());
                state.todos.insert(0, TodoItem::new(id, text));
                state.revision += 1;
                state.last_added = Some(id);
                tracing::debug!(%id, "Todo added");

                smallvec![Self::persist(state, env)]
            },

            TodoAction::Toggle { id } => {
                if !Self::require_ready(state) {
                    return SmallVec::new();
                }
                let Some(item) = state.todos.iter_mut().find(|t| t.id == id) else {
                    tracing::debug!(%id, "Toggle of unknown id ignored");
                    return SmallVec::new();
                };

                item.toggle();
                state.revision += 1;
                smallvec![Self::persist(state, env)]
            },

            TodoAction::Delete { id } => {
                if !Self::require_ready(state) {
                    return SmallVec::new();
                }
                let before = state.todos.len();
                state.todos.retain(|t| t.id != id);
                if state.todos.len() == before {
                    tracing::debug!(%id, "Delete of unknown id ignored");
                    return SmallVec::new();
                }

                state.revision += 1;
                smallvec![Self::persist(state, env)]
            },

            TodoAction::ClearAll => {
                if !Self::require_ready(state) {
                    return SmallVec::new();
                }
                state.replace_list(Vec::new());
                tracing::info!("Clearing all todos");
                smallvec![Self::erase(state, env)]
            },

            TodoAction::ReloadFromRemote => {
                if !Self::require_ready(state) {
                    return SmallVec::new();
                }
                tracing::info!("Reloading todos from remote");
                smallvec![Self::fetch_remote(env, FetchReason::Reload)]
            },

            TodoAction::DismissWarnings => {
                state.warnings.clear();
                SmallVec::new()
            },

            // ========== Events ==========
            TodoAction::StoredListLoaded { todos } => {
                Self::finish_load(state, todos);
                SmallVec::new()
            },

            TodoAction::NothingStored => {
                tracing::info!("No saved todos, fetching from remote");
                smallvec![Self::fetch_remote(env, FetchReason::Initial)]
            },

            TodoAction::LoadFailed { error } => {
                Self::fail_load(state, error);
                SmallVec::new()
            },

            TodoAction::RemoteListFetched { todos, reason } => match reason {
                FetchReason::Initial => {
                    // Adopted as-is; written on the next mutation
                    Self::finish_load(state, todos);
                    SmallVec::new()
                },
                FetchReason::Reload => {
                    if !state.status.is_ready() {
                        return SmallVec::new();
                    }
                    state.replace_list(todos);
                    tracing::info!(count = state.count(), "Todos replaced from remote");
                    smallvec![Self::persist(state, env)]
                },
            },

            TodoAction::FetchFailed { error, reason } => {
                match reason {
                    FetchReason::Initial => Self::fail_load(state, error),
                    FetchReason::Reload => {
                        tracing::warn!(error = %error, "Reload failed, keeping current list");
                        state.last_error = Some(error);
                    },
                }
                SmallVec::new()
            },

            TodoAction::Persisted { revision } => {
                tracing::debug!(revision, "Todos saved");
                SmallVec::new()
            },

            TodoAction::PersistSkipped { revision } => {
                tracing::debug!(revision, "Superseded snapshot not written");
                SmallVec::new()
            },

            TodoAction::StorageCleared { revision } => {
                tracing::debug!(revision, "Saved todos erased");
                SmallVec::new()
            },

            TodoAction::PersistFailed { revision, error }
            | TodoAction::ClearFailed { revision, error } => {
                tracing::warn!(revision, error = %error, "Saving todos failed");
                state.push_warning(error);
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]

    use super::*;
    use tasklist_testing::{
        assertions::{assert_effects_count, assert_no_effects},
        run_effects, test_clock, test_epoch, RecordingStorage, ReducerTest, ScriptedTodoSource,
    };

    const KEY: &str = "@todolist_todos";

    fn item(id: i64, text: &str) -> TodoItem {
        TodoItem::new(TodoId::new(id), text.to_string())
    }

    fn env_with(storage: &RecordingStorage, source: &ScriptedTodoSource) -> TodoEnvironment {
        TodoEnvironment::new(storage.shared(), source.shared(), Arc::new(test_clock()))
            .with_fetch_retry(RetryPolicy::no_retry())
    }

    fn test_env() -> TodoEnvironment {
        env_with(&RecordingStorage::new(), &ScriptedTodoSource::default())
    }

    fn epoch_millis() -> i64 {
        test_epoch().timestamp_millis()
    }

    // ========== Validation ==========

    #[test]
    fn validate_text_trims() {
        assert_eq!(validate_text("  Walk the dog \n").unwrap(), "Walk the dog");
        assert!(matches!(validate_text(""), Err(TodoError::Validation(_))));
        assert!(matches!(validate_text(" \t "), Err(TodoError::Validation(_))));
    }

    #[test]
    fn fresh_id_skips_taken_ids() {
        let state = TodoState::ready(vec![item(epoch_millis(), "a"), item(epoch_millis() + 1, "b")]);
        assert_eq!(fresh_id(&state, &test_clock()), TodoId::new(epoch_millis() + 2));
    }

    // ========== Commands ==========

    #[test]
    fn add_prepends_and_persists() {
        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(TodoState::ready(vec![item(1, "Buy milk")]))
            .when_action(TodoAction::Add {
                text: "  Walk the dog  ".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.count(), 2);
                assert_eq!(state.todos[0].text, "Walk the dog");
                assert_eq!(state.todos[0].id, TodoId::new(epoch_millis()));
                assert!(!state.todos[0].completed);
                assert_eq!(state.todos[0].owner_tag, 1);
                assert_eq!(state.todos[1], item(1, "Buy milk"));
                assert_eq!(state.revision, 1);
                assert_eq!(state.last_added, Some(TodoId::new(epoch_millis())));
                assert_eq!(state.last_error, None);
            })
            .then_effects(|effects| assert_effects_count(effects, 1))
            .run();
    }

    #[test]
    fn blank_add_is_rejected_without_effects() {
        for text in ["", "   "] {
            ReducerTest::new(TodoReducer::new())
                .with_env(test_env())
                .given_state(TodoState::ready(vec![item(1, "Buy milk")]))
                .when_action(TodoAction::Add {
                    text: text.to_string(),
                })
                .then_state(|state| {
                    assert_eq!(state.todos, vec![item(1, "Buy milk")]);
                    assert_eq!(state.revision, 0);
                    assert!(matches!(state.last_error, Some(TodoError::Validation(_))));
                })
                .then_effects(|effects| assert_no_effects(effects))
                .run();
        }
    }

    #[test]
    fn toggle_flips_only_the_target() {
        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(TodoState::ready(vec![item(2, "Walk the dog"), item(1, "Buy milk")]))
            .when_action(TodoAction::Toggle { id: TodoId::new(1) })
            .then_state(|state| {
                assert!(state.todos[1].completed);
                assert!(!state.todos[0].completed);
                assert_eq!(state.todos[0].id, TodoId::new(2));
            })
            .then_effects(|effects| assert_effects_count(effects, 1))
            .run();
    }

    #[test]
    fn unknown_ids_change_nothing() {
        let initial = TodoState::ready(vec![item(1, "Buy milk")]);
        for action in [
            TodoAction::Toggle { id: TodoId::new(99) },
            TodoAction::Delete { id: TodoId::new(99) },
        ] {
            let expected = initial.clone();
            ReducerTest::new(TodoReducer::new())
                .with_env(test_env())
                .given_state(initial.clone())
                .when_action(action)
                .then_state(move |state| assert_eq!(state, &expected))
                .then_effects(|effects| assert_no_effects(effects))
                .run();
        }
    }

    #[test]
    fn delete_removes_item() {
        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(TodoState::ready(vec![item(2, "b"), item(1, "a")]))
            .when_action(TodoAction::Delete { id: TodoId::new(2) })
            .then_state(|state| {
                assert_eq!(state.todos, vec![item(1, "a")]);
                assert_eq!(state.revision, 1);
            })
            .then_effects(|effects| assert_effects_count(effects, 1))
            .run();
    }

    #[test]
    fn mutations_rejected_while_loading() {
        for action in [
            TodoAction::Add { text: "x".into() },
            TodoAction::Toggle { id: TodoId::new(1) },
            TodoAction::Delete { id: TodoId::new(1) },
            TodoAction::ClearAll,
            TodoAction::ReloadFromRemote,
        ] {
            ReducerTest::new(TodoReducer::new())
                .with_env(test_env())
                .given_state(TodoState::new())
                .when_action(action)
                .then_state(|state| {
                    assert!(state.todos.is_empty());
                    assert_eq!(state.last_error, Some(TodoError::NotReady("loading")));
                })
                .then_effects(|effects| assert_no_effects(effects))
                .run();
        }
    }

    #[test]
    fn retry_only_from_error() {
        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(TodoState::ready(vec![]))
            .when_action(TodoAction::Retry)
            .then_state(|state| assert_eq!(state.load_attempts, 0))
            .then_effects(|effects| assert_no_effects(effects))
            .run();

        let mut failed = TodoState::new();
        failed.status = StoreStatus::Error(TodoError::Load("boom".into()));
        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(failed)
            .when_action(TodoAction::Retry)
            .then_state(|state| {
                assert_eq!(state.status, StoreStatus::Loading);
                assert_eq!(state.load_attempts, 1);
            })
            .then_effects(|effects| assert_effects_count(effects, 1))
            .run();
    }

    #[test]
    fn duplicate_load_is_ignored() {
        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(TodoState::new())
            .given_actions([TodoAction::Load])
            .when_action(TodoAction::Load)
            .then_state(|state| assert_eq!(state.load_attempts, 1))
            .then_effects(|effects| assert_no_effects(effects))
            .run();
    }

    #[test]
    fn dismiss_clears_warnings() {
        let mut state = TodoState::ready(vec![]);
        state.push_warning(TodoError::Persist(StorageError::Closed));
        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(TodoAction::DismissWarnings)
            .then_state(|state| assert!(state.warnings.is_empty()))
            .run();
    }

    // ========== Events ==========

    #[test]
    fn initial_fetch_is_adopted_without_persisting() {
        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::RemoteListFetched {
                todos: vec![item(1, "Buy milk")],
                reason: FetchReason::Initial,
            })
            .then_state(|state| {
                assert_eq!(state.status, StoreStatus::Ready);
                assert_eq!(state.todos, vec![item(1, "Buy milk")]);
            })
            .then_effects(|effects| assert_no_effects(effects))
            .run();
    }

    #[test]
    fn reload_replaces_and_persists() {
        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(TodoState::ready(vec![item(5, "local edit")]))
            .when_action(TodoAction::RemoteListFetched {
                todos: vec![item(1, "Buy milk")],
                reason: FetchReason::Reload,
            })
            .then_state(|state| assert_eq!(state.todos, vec![item(1, "Buy milk")]))
            .then_effects(|effects| assert_effects_count(effects, 1))
            .run();
    }

    #[test]
    fn failed_reload_keeps_list_and_status() {
        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(TodoState::ready(vec![item(5, "local edit")]))
            .when_action(TodoAction::FetchFailed {
                error: TodoError::Fetch(RemoteError::Timeout),
                reason: FetchReason::Reload,
            })
            .then_state(|state| {
                assert_eq!(state.todos, vec![item(5, "local edit")]);
                assert_eq!(state.status, StoreStatus::Ready);
                assert_eq!(state.last_error, Some(TodoError::Fetch(RemoteError::Timeout)));
            })
            .run();
    }

    #[test]
    fn persist_failure_becomes_warning() {
        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(TodoState::ready(vec![item(1, "a")]))
            .when_action(TodoAction::PersistFailed {
                revision: 1,
                error: TodoError::Persist(StorageError::WriteFailed("disk full".into())),
            })
            .then_state(|state| {
                assert_eq!(state.todos, vec![item(1, "a")]);
                assert_eq!(state.warnings.len(), 1);
                assert!(state.status.is_ready());
            })
            .run();
    }

    // ========== Effects ==========

    #[tokio::test]
    async fn load_reads_the_key() {
        let storage = RecordingStorage::with_value(KEY, r#"[{"id":1,"todo":"Buy milk","completed":false,"userId":1}]"#);
        let env = env_with(&storage, &ScriptedTodoSource::default());

        let (_, effects) = ReducerTest::new(TodoReducer::new())
            .with_env(env)
            .given_state(TodoState::new())
            .when_action(TodoAction::Load)
            .run_and_return();

        assert_eq!(
            run_effects(effects).await,
            vec![TodoAction::StoredListLoaded {
                todos: vec![item(1, "Buy milk")]
            }]
        );
    }

    #[tokio::test]
    async fn load_reports_missing_key_and_bad_json() {
        let storage = RecordingStorage::new();
        let env = env_with(&storage, &ScriptedTodoSource::default());
        let effects = TodoReducer::new().reduce(&mut TodoState::new(), TodoAction::Load, &env);
        assert_eq!(run_effects(effects).await, vec![TodoAction::NothingStored]);

        let storage = RecordingStorage::with_value(KEY, "{not json");
        let env = env_with(&storage, &ScriptedTodoSource::default());
        let effects = TodoReducer::new().reduce(&mut TodoState::new(), TodoAction::Load, &env);
        let actions = run_effects(effects).await;
        assert!(matches!(
            actions.as_slice(),
            [TodoAction::LoadFailed { error: TodoError::Load(_) }]
        ));
    }

    #[tokio::test]
    async fn persist_effect_writes_snapshot() {
        let storage = RecordingStorage::new();
        let env = env_with(&storage, &ScriptedTodoSource::default());

        let (state, effects) = ReducerTest::new(TodoReducer::new())
            .with_env(env)
            .given_state(TodoState::ready(vec![item(1, "Buy milk")]))
            .when_action(TodoAction::Toggle { id: TodoId::new(1) })
            .run_and_return();

        assert_eq!(
            run_effects(effects).await,
            vec![TodoAction::Persisted { revision: 1 }]
        );
        let stored = decode_list(&storage.peek(KEY).await.unwrap()).unwrap();
        assert_eq!(stored, state.todos);
    }

    #[tokio::test]
    async fn clear_effect_removes_key() {
        let storage = RecordingStorage::with_value(KEY, "[]");
        let env = env_with(&storage, &ScriptedTodoSource::default());

        let (_, effects) = ReducerTest::new(TodoReducer::new())
            .with_env(env)
            .given_state(TodoState::ready(vec![item(1, "a")]))
            .when_action(TodoAction::ClearAll)
            .then_state(|state| assert!(state.todos.is_empty()))
            .run_and_return();

        assert_eq!(
            run_effects(effects).await,
            vec![TodoAction::StorageCleared { revision: 1 }]
        );
        assert_eq!(storage.peek(KEY).await, None);
        assert_eq!(storage.set_count(), 0);
    }

    #[tokio::test]
    async fn fetch_effect_reports_failure() {
        let source = ScriptedTodoSource::failing(RemoteError::Status {
            status: 404,
            message: "missing".into(),
        });
        let env = env_with(&RecordingStorage::new(), &source);

        let effects = TodoReducer::new().reduce(
            &mut TodoState::new(),
            TodoAction::NothingStored,
            &env,
        );
        let actions = run_effects(effects).await;

        assert!(matches!(
            actions.as_slice(),
            [TodoAction::FetchFailed {
                error: TodoError::Fetch(RemoteError::Status { status: 404, .. }),
                reason: FetchReason::Initial,
            }]
        ));
    }

    #[tokio::test]
    async fn transient_fetch_failures_are_retried() {
        let source = ScriptedTodoSource::new(vec![
            Err(RemoteError::Timeout),
            Err(RemoteError::Status {
                status: 503,
                message: String::new(),
            }),
            Ok(vec![item(1, "Buy milk")]),
        ]);
        let env = env_with(&RecordingStorage::new(), &source).with_fetch_retry(
            RetryPolicy::builder()
                .max_retries(2)
                .initial_delay(std::time::Duration::from_millis(1))
                .build(),
        );

        let effects =
            TodoReducer::new().reduce(&mut TodoState::ready(vec![]), TodoAction::ReloadFromRemote, &env);

        assert_eq!(
            run_effects(effects).await,
            vec![TodoAction::RemoteListFetched {
                todos: vec![item(1, "Buy milk")],
                reason: FetchReason::Reload,
            }]
        );
        assert_eq!(source.calls(), 3);
    }
}
