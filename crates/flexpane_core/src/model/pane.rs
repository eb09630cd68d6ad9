//! Pane payloads and the per-request view model.
//!
//! # Responsibility
//! - Give every pane kind one concrete payload shape.
//! - Describe layout placement and the descriptor handed to renderers.
//!
//! # Invariants
//! - `count` always equals the length of the carried list.
//! - A descriptor with `data: None` means the pane failed to fetch for this
//!   request; it is still rendered.

use crate::model::feed::{Email, Event};
use crate::model::todo::Todo;
use serde::{Deserialize, Serialize};

/// Calendar pane payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CalendarData {
    pub events: Vec<Event>,
    pub count: usize,
}

impl CalendarData {
    pub fn new(events: Vec<Event>) -> Self {
        let count = events.len();
        Self { events, count }
    }
}

/// Todo pane payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TodoData {
    pub todos: Vec<Todo>,
    pub count: usize,
}

impl TodoData {
    pub fn new(todos: Vec<Todo>) -> Self {
        let count = todos.len();
        Self { todos, count }
    }
}

/// Email pane payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmailData {
    pub emails: Vec<Email>,
    pub count: usize,
}

impl EmailData {
    pub fn new(emails: Vec<Email>) -> Self {
        let count = emails.len();
        Self { emails, count }
    }
}

/// Payload of one pane, tagged by pane kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaneData {
    Calendar(CalendarData),
    Todos(TodoData),
    Email(EmailData),
}

impl PaneData {
    /// Number of items carried by the payload.
    pub fn count(&self) -> usize {
        match self {
            Self::Calendar(data) => data.count,
            Self::Todos(data) => data.count,
            Self::Email(data) => data.count,
        }
    }
}

/// CSS grid placement values, e.g. `row: "1"`, `column: "span 2"`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GridArea {
    #[serde(default)]
    pub row: String,
    #[serde(default)]
    pub column: String,
}

/// Per-pane layout configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaneLayout {
    #[serde(default)]
    pub grid_area: GridArea,
}

/// Renderable record for one enabled pane in one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaneDescriptor {
    pub id: String,
    pub title: String,
    pub grid_area: GridArea,
    pub data: Option<PaneData>,
    pub template: String,
}

#[cfg(test)]
mod tests {
    use super::{PaneData, TodoData};
    use crate::model::todo::Todo;

    #[test]
    fn payload_serializes_with_kind_tag() {
        let data = PaneData::Todos(TodoData::new(vec![Todo::new("a")]));
        let value = serde_json::to_value(&data).expect("payload should serialize");
        assert_eq!(value["kind"], "todos");
        assert_eq!(value["count"], 1);
        assert_eq!(value["todos"][0]["message"], "a");
    }

    #[test]
    fn count_matches_items() {
        let data = PaneData::Todos(TodoData::new(vec![Todo::new("a"), Todo::new("b")]));
        assert_eq!(data.count(), 2);
    }
}
