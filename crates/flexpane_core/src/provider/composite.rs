//! Provider joining an independent calendar/email source with a todo source.

use super::{DataProvider, OAuthFlow, ProviderResult};
use crate::model::feed::{Email, Event};
use crate::model::todo::{Todo, TodoId};
use crate::repo::todo_store::{TodoSource, TodoStoreResult};
use async_trait::async_trait;
use std::sync::Arc;

/// Delegates calendar/email calls to one provider and todo calls to another.
#[derive(Clone)]
pub struct CompositeProvider {
    data: Arc<dyn DataProvider>,
    todos: Arc<dyn TodoSource>,
}

impl CompositeProvider {
    pub fn new(data: Arc<dyn DataProvider>, todos: Arc<dyn TodoSource>) -> Self {
        Self { data, todos }
    }
}

#[async_trait]
impl DataProvider for CompositeProvider {
    fn kind(&self) -> &'static str {
        "composite"
    }

    async fn calendar_events(&self) -> ProviderResult<Vec<Event>> {
        self.data.calendar_events().await
    }

    async fn emails(&self) -> ProviderResult<Vec<Email>> {
        self.data.emails().await
    }

    fn oauth(&self) -> Option<&dyn OAuthFlow> {
        self.data.oauth()
    }
}

impl TodoSource for CompositeProvider {
    fn list(&self) -> Vec<Todo> {
        self.todos.list()
    }

    fn add(&self, message: &str) -> TodoStoreResult<Todo> {
        self.todos.add(message)
    }

    fn toggle(&self, index: usize) -> TodoStoreResult<Option<Todo>> {
        self.todos.toggle(index)
    }

    fn toggle_by_id(&self, id: TodoId) -> TodoStoreResult<Todo> {
        self.todos.toggle_by_id(id)
    }
}
