//! Todo list store with a local-first persistence lifecycle.
//!
//! - On [`TodoStore::init`] the list is read from local storage under a single
//!   key. If the key is absent the list is fetched from a remote source
//!   instead.
//! - Every add, toggle and delete updates memory first and then writes the
//!   whole list back in the background. Write failures become warnings; the
//!   change in memory stays.
//! - Clear-all erases the key; reload replaces the list with the remote one.
//!
//! The store is a [`Reducer`](tasklist_core::reducer::Reducer) driven by the
//! `tasklist-runtime` [`Store`](tasklist_runtime::Store), so the whole
//! lifecycle can be tested with `ReducerTest` without any I/O.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use tasklist::{TodoEnvironment, TodoStore};
//! use tasklist_core::environment::SystemClock;
//! use tasklist_remote::HttpTodoSource;
//! use tasklist_storage::StorageBackend;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = StorageBackend::Memory.open().await?;
//! let source = Arc::new(HttpTodoSource::new(
//!     "https://dummyjson.com/todos",
//!     std::time::Duration::from_secs(30),
//! )?);
//! let store = TodoStore::new(TodoEnvironment::new(storage, source, Arc::new(SystemClock)));
//!
//! store.init().await?;
//! store.add("Walk the dog").await?;
//! let (total, done) = store.counts().await;
//! println!("Total: {total} | Done: {done}");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod reducer;
pub mod snapshot;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use error::TodoError;
pub use reducer::{validate_text, TodoEnvironment, TodoReducer, DEFAULT_STORAGE_KEY};
pub use snapshot::{SnapshotWriter, WriteOutcome};
pub use store::TodoStore;
pub use tasklist_core::{TodoId, TodoItem};
pub use types::{FetchReason, StoreStatus, TodoAction, TodoState};
