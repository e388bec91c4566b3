//! Configuration management for the todo app.
//!
//! Loads configuration from environment variables (and a `.env` file, if
//! present) with sensible defaults. Unlike unset variables, set-but-invalid
//! values are errors.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tasklist::DEFAULT_STORAGE_KEY;
use tasklist_remote::DEFAULT_TODOS_URL;
use tasklist_runtime::RetryPolicy;
use tasklist_storage::StorageBackend;
use thiserror::Error;

/// Errors reading configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed
    #[error("{name}={value:?} is invalid: expected {expected}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// Value found
        value: String,
        /// What would have been accepted
        expected: &'static str,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Local persistence
    pub storage: StorageConfig,
    /// Remote todo source
    pub remote: RemoteConfig,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_secs: u64,
}

/// Storage backend kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Process-local, lost on exit
    Memory,
    /// SQLite file
    Sqlite,
}

/// Local persistence configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Which backend to open
    pub backend: BackendKind,
    /// sqlx URL of the SQLite database (ignored for `memory`)
    pub database_url: String,
    /// The single key holding the list
    pub key: String,
}

/// Remote source configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Endpoint returning `{"todos": [...]}`
    pub url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Retries after a transient failure
    pub max_retries: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                backend: BackendKind::Sqlite,
                database_url: "sqlite://todos.db".to_string(),
                key: DEFAULT_STORAGE_KEY.to_string(),
            },
            remote: RemoteConfig {
                url: DEFAULT_TODOS_URL.to_string(),
                timeout_secs: 30,
                max_retries: 2,
            },
            shutdown_timeout_secs: 5,
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a set variable that does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value if set
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a set variable that does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let backend = match var("TODO_STORAGE_BACKEND") {
            None => defaults.storage.backend,
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "memory" => BackendKind::Memory,
                "sqlite" => BackendKind::Sqlite,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "TODO_STORAGE_BACKEND",
                        value,
                        expected: "memory or sqlite",
                    });
                },
            },
        };

        Ok(Self {
            storage: StorageConfig {
                backend,
                database_url: var("TODO_DATABASE_URL").unwrap_or(defaults.storage.database_url),
                key: var("TODO_STORAGE_KEY").unwrap_or(defaults.storage.key),
            },
            remote: RemoteConfig {
                url: var("TODO_REMOTE_URL").unwrap_or(defaults.remote.url),
                timeout_secs: parse_positive(
                    "TODO_REMOTE_TIMEOUT_SECS",
                    var("TODO_REMOTE_TIMEOUT_SECS"),
                    defaults.remote.timeout_secs,
                )?,
                max_retries: parse_number(
                    "TODO_REMOTE_MAX_RETRIES",
                    var("TODO_REMOTE_MAX_RETRIES"),
                    defaults.remote.max_retries,
                )?,
            },
            shutdown_timeout_secs: parse_number(
                "TODO_SHUTDOWN_TIMEOUT_SECS",
                var("TODO_SHUTDOWN_TIMEOUT_SECS"),
                defaults.shutdown_timeout_secs,
            )?,
        })
    }

    /// Shutdown timeout as a `Duration`
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl StorageConfig {
    /// The backend to open
    #[must_use]
    pub fn backend(&self) -> StorageBackend {
        match self.backend {
            BackendKind::Memory => StorageBackend::Memory,
            BackendKind::Sqlite => StorageBackend::Sqlite {
                url: self.database_url.clone(),
            },
        }
    }
}

impl RemoteConfig {
    /// Request timeout as a `Duration`
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Backoff for transient fetch failures
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::builder()
            .max_retries(self.max_retries)
            .jitter(true)
            .build()
    }
}

fn parse_number<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            value: raw,
            expected: "a non-negative integer",
        }),
    }
}

/// Like [`parse_number`], but zero is rejected too
fn parse_positive(
    name: &'static str,
    value: Option<String>,
    default: u64,
) -> Result<u64, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ConfigError::Invalid {
                name,
                value: raw,
                expected: "a positive integer",
            }),
        },
    }
}
