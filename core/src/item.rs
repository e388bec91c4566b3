//! The persisted todo entity and its JSON encoding.
//!
//! Field names on the wire are `id`, `todo`, `completed` and `userId`; both the
//! local storage blob and the remote endpoint use them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Owner tag written on items created on this device
pub const LOCAL_OWNER_TAG: i64 = 1;

/// Identifier of a todo item, unique within one list
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(i64);

impl TodoId {
    /// Creates a `TodoId` from its raw value
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw value
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TodoId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(Self)
    }
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Unique identifier
    pub id: TodoId,
    /// Task description
    #[serde(rename = "todo")]
    pub text: String,
    /// Whether the task is done
    #[serde(default)]
    pub completed: bool,
    /// Opaque owner tag carried over from the remote source
    #[serde(rename = "userId")]
    pub owner_tag: i64,
}

impl TodoItem {
    /// Creates an open item owned by this device
    #[must_use]
    pub const fn new(id: TodoId, text: String) -> Self {
        Self {
            id,
            text,
            completed: false,
            owner_tag: LOCAL_OWNER_TAG,
        }
    }

    /// Flips the completed flag
    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }
}

/// Errors decoding a persisted or fetched list
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Not valid JSON, or not the expected shape
    #[error("malformed todo list: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Two items share an id
    #[error("duplicate todo id {0}")]
    DuplicateId(TodoId),
}

/// Serializes a list to the storage representation
///
/// # Errors
///
/// Returns an error if serialization fails, which cannot happen for the
/// plain field types used here but is surfaced rather than unwrapped.
pub fn encode_list(items: &[TodoItem]) -> Result<String, serde_json::Error> {
    serde_json::to_string(items)
}

/// Parses the storage representation back into a list
///
/// # Errors
///
/// Returns [`DecodeError::Malformed`] for invalid JSON and
/// [`DecodeError::DuplicateId`] if the list breaks id uniqueness.
pub fn decode_list(raw: &str) -> Result<Vec<TodoItem>, DecodeError> {
    let items: Vec<TodoItem> = serde_json::from_str(raw)?;
    ensure_unique_ids(&items)?;
    Ok(items)
}

/// Checks that no two items share an id
///
/// # Errors
///
/// Returns [`DecodeError::DuplicateId`] naming the first repeated id.
pub fn ensure_unique_ids(items: &[TodoItem]) -> Result<(), DecodeError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.id) {
            return Err(DecodeError::DuplicateId(item.id));
        }
    }
    Ok(())
}
