//! # Tasklist Core
//!
//! Core traits and types shared by every tasklist crate.
//!
//! The todo store is built as a reducer: a pure function that takes the current
//! state and an action, mutates the state in place and returns descriptions of
//! the I/O it wants performed. The runtime executes those descriptions and feeds
//! their results back in as new actions.
//!
//! ## Core Concepts
//!
//! - **State**: the in-memory todo list plus its lifecycle status
//! - **Action**: user commands and the results of I/O
//! - **Reducer**: `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: a description of asynchronous work, not its execution
//! - **Environment**: injected collaborators ([`storage::KeyValueStorage`],
//!   [`source::TodoSource`], [`environment::Clock`])
//!
//! ## Example
//!
//! ```
//! use tasklist_core::{effect::Effect, reducer::Reducer, SmallVec};
//!
//! struct Counter;
//!
//! impl Reducer for Counter {
//!     type State = u32;
//!     type Action = ();
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut u32,
//!         _action: (),
//!         _env: &(),
//!     ) -> SmallVec<[Effect<()>; 4]> {
//!         *state += 1;
//!         SmallVec::new()
//!     }
//! }
//!
//! let mut count = 0;
//! let effects = Counter.reduce(&mut count, (), &());
//! assert_eq!(count, 1);
//! assert!(effects.is_empty());
//! ```

pub use smallvec::{smallvec, SmallVec};

pub mod item;
pub mod source;
pub mod storage;

pub use item::{decode_list, encode_list, DecodeError, TodoId, TodoItem, LOCAL_OWNER_TAG};
pub use source::{RemoteError, TodoSource};
pub use storage::{KeyValueStorage, StorageError};

/// Reducer module - the trait every feature's business logic implements
pub mod reducer {
    use super::{effect::Effect, SmallVec};

    /// The Reducer trait - core abstraction for business logic
    ///
    /// A reducer validates the action, updates state in place and returns the
    /// effects the runtime should execute. It must not perform I/O itself and
    /// must not panic.
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - side effect descriptions
///
/// Effects are values. Reducers return them, the runtime executes them.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Effect type - describes a side effect to be executed
    ///
    /// A reducer that has nothing to do returns no effects at all.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    impl<Action> Effect<Action> {
        /// Wrap an async block as an effect
        ///
        /// ```
        /// use tasklist_core::effect::Effect;
        ///
        /// let effect: Effect<u8> = Effect::future(async { Some(1) });
        /// assert!(matches!(effect, Effect::Future(_)));
        /// ```
        pub fn future<F>(fut: F) -> Self
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Self::Future(Box::pin(fut))
        }
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }
}

/// Environment module - dependency injection traits
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time for testability
    ///
    /// The todo store derives client-side ids from the clock, so tests swap
    /// in a fixed or stepping clock to get predictable ids.
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
