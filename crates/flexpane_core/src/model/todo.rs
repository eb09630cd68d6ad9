//! Todo record.
//!
//! # Invariants
//! - `id` is assigned once at creation and never reused.
//! - List position is still the identity used by index-based toggles.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one todo item.
pub type TodoId = Uuid;

/// Maximum accepted message length, counted in characters.
pub const MAX_TODO_MESSAGE_CHARS: usize = 200;

/// One entry of the ordered todo list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub done: bool,
    pub message: String,
}

impl Todo {
    /// Creates an open todo with a generated id.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            done: false,
            message: message.into(),
        }
    }

    /// Flips completion state.
    pub fn toggle(&mut self) {
        self.done = !self.done;
    }
}

/// Validation failures for todo message input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoMessageError {
    Empty,
    TooLong { chars: usize },
}

/// Checks that `message` is non-blank and within the length cap.
pub fn validate_message(message: &str) -> Result<(), TodoMessageError> {
    if message.trim().is_empty() {
        return Err(TodoMessageError::Empty);
    }
    let chars = message.chars().count();
    if chars > MAX_TODO_MESSAGE_CHARS {
        return Err(TodoMessageError::TooLong { chars });
    }
    Ok(())
}
