//! Scripted terminal sessions against in-memory doubles

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tasklist::{TodoEnvironment, TodoId, TodoItem, TodoStore, DEFAULT_STORAGE_KEY};
use tasklist_core::RemoteError;
use tasklist_runtime::RetryPolicy;
use tasklist_testing::{test_epoch, RecordingStorage, ScriptedTodoSource, SteppingClock};
use todo_app::Repl;
use tokio::io::{AsyncRead, AsyncReadExt, BufReader, ReadBuf};

/// Input that fails every read, like a terminal that went away
struct BrokenInput;

impl AsyncRead for BrokenInput {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::other("terminal closed")))
    }
}

fn store_with(storage: &RecordingStorage, source: &ScriptedTodoSource) -> TodoStore {
    let env = TodoEnvironment::new(
        storage.shared(),
        source.shared(),
        Arc::new(SteppingClock::new(test_epoch())),
    )
    .with_fetch_retry(RetryPolicy::no_retry());
    TodoStore::new(env)
}

fn seeded() -> (RecordingStorage, ScriptedTodoSource) {
    let storage = RecordingStorage::with_value(
        DEFAULT_STORAGE_KEY,
        r#"[{"id":1,"todo":"Buy milk","completed":false,"userId":1}]"#,
    );
    (storage, ScriptedTodoSource::ok(Vec::new()))
}

async fn session(store: &TodoStore, input: &str) -> String {
    let mut repl = Repl::new(input.as_bytes(), Vec::new());
    repl.start(store).await.unwrap();
    repl.run(store).await.unwrap();
    store.settle().await;
    String::from_utf8(repl.into_output()).unwrap()
}

#[tokio::test]
async fn shows_list_after_loading() {
    let (storage, source) = seeded();
    let store = store_with(&storage, &source);

    let out = session(&store, "").await;

    assert!(out.starts_with("Loading todos..."));
    assert!(out.contains("Buy milk"));
    assert!(out.contains("Total: 1 | Done: 0"));
}

#[tokio::test]
async fn add_and_toggle_update_the_list() {
    let (storage, source) = seeded();
    let store = store_with(&storage, &source);

    let out = session(&store, "add Walk dog\ntoggle 1\nquit\n").await;

    let todos = store.todos().await;
    assert_eq!(todos.len(), 2);
    assert_eq!(todos[0].text, "Walk dog");
    assert!(store.todos().await.iter().any(|t| t.id == TodoId::new(1) && t.completed));
    assert!(out.contains("Total: 2 | Done: 1"));
}

#[tokio::test]
async fn blank_add_asks_for_text() {
    let (storage, source) = seeded();
    let store = store_with(&storage, &source);

    let out = session(&store, "add   \n").await;

    assert!(out.contains("Please enter some text."));
    assert_eq!(store.todos().await.len(), 1);
}

#[tokio::test]
async fn declining_clear_keeps_the_list() {
    let (storage, source) = seeded();
    let store = store_with(&storage, &source);

    let out = session(&store, "clear\nn\n").await;

    assert!(out.contains("Cancelled."));
    assert_eq!(store.todos().await.len(), 1);
    assert_eq!(storage.remove_count(), 0);
}

#[tokio::test]
async fn end_of_input_at_confirmation_means_no() {
    let (storage, source) = seeded();
    let store = store_with(&storage, &source);

    session(&store, "clear\n").await;

    assert_eq!(store.todos().await.len(), 1);
}

#[tokio::test]
async fn accepting_clear_empties_storage() {
    let (storage, source) = seeded();
    let store = store_with(&storage, &source);

    let out = session(&store, "clear\ny\n").await;

    assert!(store.todos().await.is_empty());
    assert!(storage.peek(DEFAULT_STORAGE_KEY).await.is_none());
    assert!(out.contains("Total: 0 | Done: 0"));
}

#[tokio::test]
async fn confirmed_reload_replaces_the_list() {
    let (storage, source) = seeded();
    source.push(Ok(vec![TodoItem::new(TodoId::new(9), "From remote".to_string())]));
    let store = store_with(&storage, &source);

    let out = session(&store, "reload\nyes\n").await;

    assert!(out.contains("Fetching..."));
    assert!(out.contains("From remote"));
    assert_eq!(store.todos().await.len(), 1);
}

#[tokio::test]
async fn load_failure_offers_retry() {
    let storage = RecordingStorage::new();
    let source = ScriptedTodoSource::failing(RemoteError::Timeout);
    let store = store_with(&storage, &source);

    let out = session(&store, "add nope\n").await;

    assert!(out.contains("Type `retry` to try again"));
    assert!(out.contains("Error:"));
    assert!(store.todos().await.is_empty());
}

#[tokio::test]
async fn input_error_still_flushes_and_closes() {
    let (storage, source) = seeded();
    let store = store_with(&storage, &source);
    storage.set_write_delay(Some(Duration::from_millis(30)));

    let input = BufReader::new("add Walk dog\n".as_bytes().chain(BrokenInput));
    let mut repl = Repl::new(input, Vec::new());
    let err = repl
        .session(&store, Duration::from_secs(2))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("terminal closed"));
    assert!(storage.is_closed());
    let persisted = storage.peek(DEFAULT_STORAGE_KEY).await.unwrap();
    assert!(persisted.contains("Walk dog"));
}

#[tokio::test]
async fn session_closes_store_at_end_of_input() {
    let (storage, source) = seeded();
    let store = store_with(&storage, &source);

    let mut repl = Repl::new("toggle 1\nquit\n".as_bytes(), Vec::new());
    repl.session(&store, Duration::from_secs(2)).await.unwrap();

    assert!(storage.is_closed());
    assert!(store.add("late").await.is_err());
}
