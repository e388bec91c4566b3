//! Terminal front-end for the tasklist todo store.
//!
//! Renders the loading and error-with-retry states, the list with its
//! counters, and asks for confirmation before destructive commands.

pub mod command;
pub mod config;
pub mod render;
pub mod repl;

pub use command::{Command, ParseError};
pub use config::{Config, ConfigError};
pub use repl::Repl;
