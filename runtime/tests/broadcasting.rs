//! Integration tests for Store action broadcasting and effect tracking
//!
//! Observers (the CLI's warning listener, tests) subscribe to the actions
//! effects feed back into the store. These tests pin down what they see.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tasklist_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use tasklist_runtime::{Store, StoreError};

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum TestAction {
    /// Save a value; completes with `Saved` after a delay
    Save { value: u32 },
    /// Save finished
    Saved { value: u32 },
    /// Fire two saves at once
    SaveBoth { first: u32, second: u32 },
    /// Command with no effects
    Noop,
}

#[derive(Debug, Clone, Default)]
struct TestState {
    saved: Vec<u32>,
}

#[derive(Clone, Default)]
struct TestEnvironment {
    writes: Arc<AtomicUsize>,
}

#[derive(Clone)]
struct TestReducer;

impl Reducer for TestReducer {
    type State = TestState;
    type Action = TestAction;
    type Environment = TestEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TestAction::Save { value } => {
                let writes = Arc::clone(&env.writes);
                smallvec![Effect::Future(Box::pin(async move {
                    tokio::time::sleep(Duration::from_millis(u64::from(value))).await;
                    writes.fetch_add(1, Ordering::SeqCst);
                    Some(TestAction::Saved { value })
                }))]
            },
            TestAction::SaveBoth { first, second } => {
                let mut effects = Self.reduce(state, TestAction::Save { value: first }, env);
                effects.extend(Self.reduce(state, TestAction::Save { value: second }, env));
                effects
            },
            TestAction::Saved { value } => {
                state.saved.push(value);
                SmallVec::new()
            },
            TestAction::Noop => SmallVec::new(),
        }
    }
}

fn new_store() -> Store<TestState, TestAction, TestEnvironment, TestReducer> {
    Store::new(TestState::default(), TestReducer, TestEnvironment::default())
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn every_subscriber_sees_feedback_actions() {
    let store = new_store();
    let mut first = store.subscribe_actions();
    let mut second = store.subscribe_actions();

    let mut handle = store.send(TestAction::Save { value: 3 }).await.unwrap();
    handle.wait().await;

    assert_eq!(first.recv().await.unwrap(), TestAction::Saved { value: 3 });
    assert_eq!(second.recv().await.unwrap(), TestAction::Saved { value: 3 });
}

#[tokio::test]
async fn sent_commands_are_not_broadcast() {
    let store = new_store();
    let mut rx = store.subscribe_actions();

    let mut handle = store.send(TestAction::Noop).await.unwrap();
    handle.wait().await;

    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn sibling_effects_complete_in_their_own_order() {
    let store = new_store();

    let mut handle = store
        .send(TestAction::SaveBoth { first: 30, second: 1 })
        .await
        .unwrap();
    handle.wait().await;

    assert_eq!(store.state(|s| s.saved.clone()).await, vec![1, 30]);
    assert_eq!(store.environment().writes.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn handles_track_only_their_own_effects() {
    let store = new_store();

    let slow = store.send(TestAction::Save { value: 200 }).await.unwrap();
    let mut fast = store.send(TestAction::Save { value: 1 }).await.unwrap();
    fast.wait().await;

    assert_eq!(store.state(|s| s.saved.clone()).await, vec![1]);
    assert_eq!(slow.pending(), 1);
    assert_eq!(store.pending_effects(), 1);
}

#[tokio::test]
async fn clones_share_state_and_shutdown() {
    let store = new_store();
    let clone = store.clone();

    let mut handle = clone.send(TestAction::Save { value: 1 }).await.unwrap();
    handle.wait().await;
    assert_eq!(store.state(|s| s.saved.len()).await, 1);

    store.shutdown(Duration::from_secs(1)).await.unwrap();
    assert_eq!(
        clone.send(TestAction::Noop).await.unwrap_err(),
        StoreError::ShutdownInProgress
    );
}
