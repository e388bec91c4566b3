//! # Tasklist Remote
//!
//! [`HttpTodoSource`] fetches the seed list from a dummyjson-style endpoint:
//!
//! ```text
//! GET https://dummyjson.com/todos
//! {"todos":[{"id":1,"todo":"...","completed":false,"userId":152}, ...], "total":254, ...}
//! ```
//!
//! Only `todos` is read. Errors are classified into
//! [`RemoteError`](tasklist_core::RemoteError) so callers can decide what to retry.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tasklist_core::item::ensure_unique_ids;
use tasklist_core::source::{SourceFuture, TodoSource};
use tasklist_core::{RemoteError, TodoItem};

/// Default endpoint
pub const DEFAULT_TODOS_URL: &str = "https://dummyjson.com/todos";

#[derive(Debug, Deserialize)]
struct TodosResponse {
    todos: Vec<TodoItem>,
}

/// Remote todo source over HTTP
#[derive(Debug, Clone)]
pub struct HttpTodoSource {
    client: Client,
    url: String,
}

impl HttpTodoSource {
    /// Create a source for `url` with a per-request `timeout`
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::RequestFailed`] if the HTTP client cannot be
    /// built (for example when no TLS backend is available).
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::RequestFailed(e.to_string()))?;

        Ok(Self::with_client(client, url))
    }

    /// Create a source around an existing client
    #[must_use]
    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// The endpoint this source reads
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and decode the list
    ///
    /// # Errors
    ///
    /// - [`RemoteError::Timeout`] if the request exceeded the timeout
    /// - [`RemoteError::RequestFailed`] for connection failures
    /// - [`RemoteError::Status`] for any non-2xx response
    /// - [`RemoteError::Decode`] if the body is not the expected shape or
    ///   repeats an id
    pub async fn fetch(&self) -> Result<Vec<TodoItem>, RemoteError> {
        tracing::debug!(url = %self.url, "Fetching remote todos");
        metrics::counter!("remote.requests.total").increment(1);

        let response = self
            .client
            .get(&self.url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        match response.status() {
            status if status.is_success() => {
                let body = response
                    .json::<TodosResponse>()
                    .await
                    .map_err(|e| {
                        if e.is_timeout() {
                            RemoteError::Timeout
                        } else {
                            RemoteError::Decode(e.to_string())
                        }
                    })?;

                ensure_unique_ids(&body.todos).map_err(|e| RemoteError::Decode(e.to_string()))?;

                tracing::info!(count = body.todos.len(), "Fetched remote todos");
                Ok(body.todos)
            },
            status => {
                metrics::counter!("remote.requests.failed", "status" => status.as_str().to_string())
                    .increment(1);
                let message = if status == StatusCode::TOO_MANY_REQUESTS {
                    "rate limited".to_string()
                } else {
                    response.text().await.unwrap_or_default()
                };
                Err(RemoteError::Status {
                    status: status.as_u16(),
                    message,
                })
            },
        }
    }
}

fn map_transport_error(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Timeout
    } else {
        RemoteError::RequestFailed(err.to_string())
    }
}

impl TodoSource for HttpTodoSource {
    fn fetch_initial_todos(&self) -> SourceFuture<'_> {
        Box::pin(self.fetch())
    }
}
