//! Remote todo source abstraction.
//!
//! Read-only: the store fetches an initial list from it when local storage is
//! empty, and again on an explicit reload. Nothing is ever written back.

use crate::item::TodoItem;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by [`TodoSource::fetch_initial_todos`]
pub type SourceFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<TodoItem>, RemoteError>> + Send + 'a>>;

/// Errors that can occur when fetching from the remote source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The request could not be sent or the connection failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The request did not complete in time
    #[error("Request timed out")]
    Timeout,

    /// The endpoint answered with a non-success status
    #[error("Remote returned status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// The response body did not have the expected shape
    #[error("Response parsing failed: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Whether retrying the same request may succeed
    ///
    /// Transport failures, timeouts, throttling and server errors are
    /// transient; client errors and undecodable bodies are not.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::RequestFailed(_) | Self::Timeout => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Decode(_) => false,
        }
    }
}

/// Read-only provider of an initial todo list
pub trait TodoSource: Send + Sync {
    /// Fetch the full list, in the order the source returns it
    fn fetch_initial_todos(&self) -> SourceFuture<'_>;
}
