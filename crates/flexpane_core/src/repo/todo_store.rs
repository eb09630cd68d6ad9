//! File-backed todo store.
//!
//! # Responsibility
//! - Own the ordered todo list and keep it mirrored in one JSON file.
//! - Serialize mutations so no concurrent update is lost.
//!
//! # Invariants
//! - Every successful mutation is followed by a successful full-snapshot
//!   write before the call returns.
//! - A failed write rolls the in-memory list back to its previous state.
//! - Reads never observe a half-applied mutation.
//!
//! # See also
//! - docs/architecture/todo-store.md

use crate::model::todo::{validate_message, Todo, TodoId, TodoMessageError};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

pub type TodoStoreResult<T> = Result<T, TodoStoreError>;

/// Todo store failures.
#[derive(Debug)]
pub enum TodoStoreError {
    EmptyMessage,
    MessageTooLong { chars: usize, max: usize },
    InvalidIndex { index: usize, len: usize },
    NotFound(TodoId),
    Io { path: PathBuf, source: io::Error },
    Serde { path: PathBuf, source: serde_json::Error },
}

impl TodoStoreError {
    /// Whether the failure was caused by caller input rather than storage.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyMessage
                | Self::MessageTooLong { .. }
                | Self::InvalidIndex { .. }
                | Self::NotFound(_)
        )
    }
}

impl Display for TodoStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "todo message cannot be empty"),
            Self::MessageTooLong { chars, max } => {
                write!(f, "todo message too long: {chars} characters (max {max})")
            }
            Self::InvalidIndex { index, len } => {
                write!(f, "invalid todo index: {index} (list has {len} items)")
            }
            Self::NotFound(id) => write!(f, "todo not found: {id}"),
            Self::Io { path, source } => {
                write!(f, "todo file I/O failed for `{}`: {source}", path.display())
            }
            Self::Serde { path, source } => {
                write!(f, "todo file `{}` is not valid: {source}", path.display())
            }
        }
    }
}

impl Error for TodoStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Serde { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<TodoMessageError> for TodoStoreError {
    fn from(value: TodoMessageError) -> Self {
        match value {
            TodoMessageError::Empty => Self::EmptyMessage,
            TodoMessageError::TooLong { chars } => Self::MessageTooLong {
                chars,
                max: crate::model::todo::MAX_TODO_MESSAGE_CHARS,
            },
        }
    }
}

/// What `toggle` does with an index outside `[0, len)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleIndexPolicy {
    /// Report `TodoStoreError::InvalidIndex`.
    #[default]
    Reject,
    /// Succeed without changing anything.
    Ignore,
}

/// Todo capability shared by panes and composite providers.
pub trait TodoSource: Send + Sync {
    /// Current snapshot in list order.
    fn list(&self) -> Vec<Todo>;
    /// Appends one open todo and returns it.
    fn add(&self, message: &str) -> TodoStoreResult<Todo>;
    /// Flips the todo at `index`; `Ok(None)` means the index was ignored.
    fn toggle(&self, index: usize) -> TodoStoreResult<Option<Todo>>;
    /// Flips the todo with the given stable id.
    fn toggle_by_id(&self, id: TodoId) -> TodoStoreResult<Todo>;
}

/// On-disk shape; `id` is optional so files written before ids existed load.
#[derive(Debug, Deserialize)]
struct StoredTodo {
    #[serde(default)]
    id: Option<TodoId>,
    #[serde(default)]
    done: bool,
    message: String,
}

/// JSON-file todo store guarded by one reader/writer lock.
#[derive(Debug)]
pub struct TodoStore {
    path: PathBuf,
    policy: ToggleIndexPolicy,
    todos: RwLock<Vec<Todo>>,
}

impl TodoStore {
    /// Opens the store at `path` with the default toggle policy.
    pub fn open(path: impl Into<PathBuf>) -> TodoStoreResult<Self> {
        Self::open_with_policy(path, ToggleIndexPolicy::default())
    }

    /// Opens the store, creating the parent directory and an empty file when
    /// nothing exists yet.
    ///
    /// # Errors
    /// - Directory creation, read or write failures.
    /// - A present file that does not parse as a todo array.
    pub fn open_with_policy(
        path: impl Into<PathBuf>,
        policy: ToggleIndexPolicy,
    ) -> TodoStoreResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| TodoStoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let (todos, needs_write) = match std::fs::read(&path) {
            Ok(bytes) => {
                let stored: Vec<StoredTodo> =
                    serde_json::from_slice(&bytes).map_err(|source| TodoStoreError::Serde {
                        path: path.clone(),
                        source,
                    })?;
                let missing_ids = stored.iter().any(|item| item.id.is_none());
                let todos = stored
                    .into_iter()
                    .map(|item| Todo {
                        id: item.id.unwrap_or_else(Uuid::new_v4),
                        done: item.done,
                        message: item.message,
                    })
                    .collect::<Vec<_>>();
                (todos, missing_ids)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => (Vec::new(), true),
            Err(source) => {
                return Err(TodoStoreError::Io {
                    path: path.clone(),
                    source,
                })
            }
        };

        if needs_write {
            write_snapshot(&path, &todos)?;
        }

        info!(
            "event=todo_store_open module=todo status=ok items={} path={}",
            todos.len(),
            path.display()
        );

        Ok(Self {
            path,
            policy,
            todos: RwLock::new(todos),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> ToggleIndexPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Todo>> {
        self.todos.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Todo>> {
        self.todos
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Applies `apply` under the write lock, persists, and restores the
    /// previous list if persisting fails.
    fn mutate<T>(
        &self,
        operation: &'static str,
        apply: impl FnOnce(&mut Vec<Todo>) -> TodoStoreResult<T>,
    ) -> TodoStoreResult<T> {
        let mut todos = self.write();
        let previous = todos.clone();
        let value = apply(&mut todos)?;
        if let Err(err) = write_snapshot(&self.path, &todos) {
            *todos = previous;
            error!(
                "event={operation} module=todo status=error error_code=persist_failed error={err}"
            );
            return Err(err);
        }
        info!(
            "event={operation} module=todo status=ok items={}",
            todos.len()
        );
        Ok(value)
    }
}

impl TodoSource for TodoStore {
    fn list(&self) -> Vec<Todo> {
        self.read().clone()
    }

    fn add(&self, message: &str) -> TodoStoreResult<Todo> {
        validate_message(message)?;
        self.mutate("todo_add", |todos| {
            let todo = Todo::new(message);
            todos.push(todo.clone());
            Ok(todo)
        })
    }

    fn toggle(&self, index: usize) -> TodoStoreResult<Option<Todo>> {
        let policy = self.policy;
        let mut todos = self.write();
        if index >= todos.len() {
            let len = todos.len();
            drop(todos);
            return match policy {
                ToggleIndexPolicy::Reject => Err(TodoStoreError::InvalidIndex { index, len }),
                ToggleIndexPolicy::Ignore => {
                    warn!(
                        "event=todo_toggle module=todo status=ignored index={index} items={len}"
                    );
                    Ok(None)
                }
            };
        }

        todos[index].toggle();
        if let Err(err) = write_snapshot(&self.path, &todos) {
            todos[index].toggle();
            error!(
                "event=todo_toggle module=todo status=error error_code=persist_failed error={err}"
            );
            return Err(err);
        }
        info!("event=todo_toggle module=todo status=ok index={index}");
        Ok(Some(todos[index].clone()))
    }

    fn toggle_by_id(&self, id: TodoId) -> TodoStoreResult<Todo> {
        self.mutate("todo_toggle_by_id", |todos| {
            let todo = todos
                .iter_mut()
                .find(|todo| todo.id == id)
                .ok_or(TodoStoreError::NotFound(id))?;
            todo.toggle();
            Ok(todo.clone())
        })
    }
}

/// Writes the full list pretty-printed to a sibling temp file, then renames
/// it over `path`.
fn write_snapshot(path: &Path, todos: &[Todo]) -> TodoStoreResult<()> {
    let json = serde_json::to_vec_pretty(todos).map_err(|source| TodoStoreError::Serde {
        path: path.to_path_buf(),
        source,
    })?;
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json).map_err(|source| TodoStoreError::Io {
        path: tmp_path.clone(),
        source,
    })?;
    std::fs::rename(&tmp_path, path).map_err(|source| TodoStoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
