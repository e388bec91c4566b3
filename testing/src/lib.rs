//! # Tasklist Testing
//!
//! Testing utilities for tasklist reducers and stores.
//!
//! This crate provides:
//! - Deterministic clocks ([`FixedClock`], [`SteppingClock`])
//! - A storage double that records calls and injects failures ([`RecordingStorage`])
//! - A remote source double with scripted responses ([`ScriptedTodoSource`])
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tasklist::{TodoEnvironment, TodoId, TodoItem, TodoStore};
//! use tasklist_testing::{test_epoch, RecordingStorage, ScriptedTodoSource, SteppingClock};
//!
//! #[tokio::test]
//! async fn seeds_from_remote() {
//!     let storage = RecordingStorage::new();
//!     let source = ScriptedTodoSource::ok(vec![TodoItem::new(TodoId::new(1), "Buy milk".into())]);
//!     let env = TodoEnvironment::new(
//!         storage.shared(),
//!         source.shared(),
//!         Arc::new(SteppingClock::new(test_epoch())),
//!     );
//!     let store = TodoStore::new(env);
//!     store.init().await.unwrap();
//!     assert_eq!(store.todos().await.len(), 1);
//! }
//! ```

use chrono::{DateTime, Utc};
use tasklist_core::environment::Clock;

mod source_mocks;
mod storage_mocks;

pub use reducer_test::{assertions, run_effects, ReducerTest};
pub use source_mocks::ScriptedTodoSource;
pub use storage_mocks::RecordingStorage;

/// Mock clocks
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time.
    ///
    /// # Example
    ///
    /// ```
    /// use tasklist_testing::mocks::FixedClock;
    /// use tasklist_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that advances one millisecond on every read
    ///
    /// Consecutive client-generated ids differ without sleeping.
    #[derive(Debug)]
    pub struct SteppingClock {
        next_millis: AtomicI64,
    }

    impl SteppingClock {
        /// Start at `start`
        #[must_use]
        pub fn new(start: DateTime<Utc>) -> Self {
            Self {
                next_millis: AtomicI64::new(start.timestamp_millis()),
            }
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let millis = self.next_millis.fetch_add(1, Ordering::SeqCst);
            DateTime::from_timestamp_millis(millis).unwrap_or_default()
        }
    }

    /// The instant every test clock starts at: 2025-01-01 00:00:00 UTC
    #[must_use]
    pub fn test_epoch() -> DateTime<Utc> {
        DateTime::from_timestamp(1_735_689_600, 0).unwrap_or_default()
    }

    /// Create a fixed clock at [`test_epoch`]
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(test_epoch())
    }
}

pub use mocks::{test_clock, test_epoch, FixedClock, SteppingClock};

/// Install a `tracing` subscriber that writes through the test harness
///
/// Honors `RUST_LOG`. Safe to call from every test; only the first call
/// installs anything.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_test_writer()
        .try_init();
}
