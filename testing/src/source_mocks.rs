//! Remote source double for store tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tasklist_core::source::{SourceFuture, TodoSource};
use tasklist_core::{RemoteError, TodoItem};

type Response = Result<Vec<TodoItem>, RemoteError>;

/// Todo source that replays queued responses
///
/// Each fetch pops the next queued response. Once the queue is empty every
/// fetch returns the fallback, which defaults to an empty list.
#[derive(Debug, Clone)]
pub struct ScriptedTodoSource {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    queue: Mutex<VecDeque<Response>>,
    fallback: Mutex<Response>,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
}

impl Default for ScriptedTodoSource {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ScriptedTodoSource {
    /// Replay `responses` in order
    #[must_use]
    pub fn new(responses: Vec<Response>) -> Self {
        Self {
            inner: Arc::new(Inner {
                queue: Mutex::new(responses.into()),
                fallback: Mutex::new(Ok(Vec::new())),
                delay: Mutex::new(None),
                calls: AtomicUsize::new(0),
            }),
        }
    }

    /// Always return `todos`
    #[must_use]
    pub fn ok(todos: Vec<TodoItem>) -> Self {
        let source = Self::default();
        source.set_fallback(Ok(todos));
        source
    }

    /// Always fail with `error`
    #[must_use]
    pub fn failing(error: RemoteError) -> Self {
        let source = Self::default();
        source.set_fallback(Err(error));
        source
    }

    /// This source as the trait object the store expects
    #[must_use]
    pub fn shared(&self) -> Arc<dyn TodoSource> {
        Arc::new(self.clone())
    }

    /// Queue one more response
    pub fn push(&self, response: Response) {
        self.inner
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
    }

    /// Replace the response used once the queue is empty
    pub fn set_fallback(&self, response: Response) {
        *self
            .inner
            .fallback
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = response;
    }

    /// Sleep this long before answering each fetch
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.inner.delay.lock().unwrap_or_else(PoisonError::into_inner) = delay;
    }

    /// Number of fetches so far
    #[must_use]
    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> Response {
        let queued = self
            .inner
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        queued.unwrap_or_else(|| {
            self.inner
                .fallback
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        })
    }
}

impl TodoSource for ScriptedTodoSource {
    fn fetch_initial_todos(&self) -> SourceFuture<'_> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        let response = self.next_response();
        let delay = *self.inner.delay.lock().unwrap_or_else(PoisonError::into_inner);
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            response
        })
    }
}
