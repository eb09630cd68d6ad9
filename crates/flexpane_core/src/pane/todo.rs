//! Todo list pane with a CRUD request capability.
//!
//! # Responsibility
//! - Present the todo source as pane data.
//! - Translate list/add/toggle requests into todo source calls.
//!
//! # Invariants
//! - Input validation failures never reach the store.
//! - Out-of-range toggles follow whatever policy the store applies.

use super::{
    Pane, PaneDataError, PaneError, PaneMethod, PaneRequest, PaneResponse, PaneResult,
    RequestContext,
};
use crate::model::pane::{PaneData, TodoData};
use crate::model::todo::TodoId;
use crate::repo::todo_store::TodoSource;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

pub const TODO_PANE_ID: &str = "todos";
const TODO_TITLE: &str = "Todos";
const TODO_TEMPLATE: &str = "panes/todos.html";

#[derive(Debug, Deserialize)]
struct AddTodoBody {
    message: String,
}

pub struct TodoPane {
    id: String,
    title: String,
    todos: Arc<dyn TodoSource>,
}

impl TodoPane {
    pub fn new(todos: Arc<dyn TodoSource>) -> Self {
        Self {
            id: TODO_PANE_ID.to_string(),
            title: TODO_TITLE.to_string(),
            todos,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    fn list(&self) -> PaneResponse {
        let todos = self.todos.list();
        let count = todos.len();
        PaneResponse::ok(json!({ "Todos": todos, "Count": count }))
    }

    fn add(&self, body: &[u8]) -> PaneResult<PaneResponse> {
        let body: AddTodoBody = serde_json::from_slice(body)
            .map_err(|_| PaneError::InvalidInput("invalid request body".to_string()))?;
        let todo = self.todos.add(&body.message)?;
        Ok(PaneResponse::created(
            json!({ "status": "created", "id": todo.id }),
        ))
    }

    /// `?id=<uuid>` wins over `?index=N` when both are present.
    fn toggle(&self, request: &PaneRequest) -> PaneResult<PaneResponse> {
        if let Some(raw_id) = request.query.get("id") {
            let id = raw_id
                .trim()
                .parse::<TodoId>()
                .map_err(|_| PaneError::InvalidInput(format!("invalid todo id: {raw_id}")))?;
            let todo = self.todos.toggle_by_id(id)?;
            return Ok(PaneResponse::ok(
                json!({ "status": "updated", "done": todo.done }),
            ));
        }

        let raw_index = request
            .query
            .get("index")
            .ok_or_else(|| PaneError::InvalidInput("missing index parameter".to_string()))?;
        let index = raw_index
            .trim()
            .parse::<usize>()
            .map_err(|_| PaneError::InvalidInput(format!("invalid index: {raw_index}")))?;
        match self.todos.toggle(index)? {
            Some(todo) => Ok(PaneResponse::ok(
                json!({ "status": "updated", "done": todo.done }),
            )),
            None => Ok(PaneResponse::ok(json!({ "status": "ignored" }))),
        }
    }
}

#[async_trait]
impl Pane for TodoPane {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn template(&self) -> &str {
        TODO_TEMPLATE
    }

    async fn get_data(&self, _ctx: &RequestContext) -> Result<PaneData, PaneDataError> {
        Ok(PaneData::Todos(TodoData::new(self.todos.list())))
    }

    async fn handle_request(
        &self,
        _ctx: &RequestContext,
        request: PaneRequest,
    ) -> PaneResult<PaneResponse> {
        match request.method {
            PaneMethod::Get => Ok(self.list()),
            PaneMethod::Post => self.add(&request.body),
            PaneMethod::Patch => self.toggle(&request),
            PaneMethod::Other(method) => Err(PaneError::MethodNotAllowed(method)),
        }
    }
}
