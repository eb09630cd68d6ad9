//! Dashboard panes and their composition.
//!
//! # Responsibility
//! - Define the `Pane` contract: identity, template, per-request data fetch
//!   and an optional request capability.
//! - Provide the built-in calendar, todo and email panes.
//! - Build panes from configuration (`PaneFactory`) and resolve the enabled
//!   set into descriptors (`PaneRegistry`).
//!
//! # Invariants
//! - A failed data fetch still yields a well-formed empty payload.
//! - Panes without a request capability answer `PaneError::Unsupported`.

pub mod calendar;
pub mod email;
pub mod factory;
pub mod registry;
pub mod todo;

use crate::model::pane::PaneData;
use crate::provider::ProviderError;
use crate::repo::todo_store::TodoStoreError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub use calendar::CalendarPane;
pub use email::EmailPane;
pub use factory::{PaneArgs, PaneBuild, PaneConfig, PaneConstructor, PaneFactory};
pub use registry::PaneRegistry;
pub use todo::TodoPane;

pub type PaneResult<T> = Result<T, PaneError>;

/// Pane construction and request errors.
#[derive(Debug)]
pub enum PaneError {
    /// The pane has no request capability.
    Unsupported,
    /// The pane does not accept this method.
    MethodNotAllowed(String),
    /// Caller input was rejected.
    InvalidInput(String),
    /// The addressed item does not exist.
    NotFound(String),
    /// No constructor is registered for the pane type.
    UnknownType(String),
    /// The pane names a provider that was never registered.
    UnknownProvider(String),
    /// A provider-backed pane was requested but no provider exists.
    NoProviders,
    /// A todo pane was requested but no todo source was registered.
    NoTodoSource,
    /// A pane argument had the wrong shape.
    InvalidArg { arg: String, reason: String },
    Provider(ProviderError),
    Store(TodoStoreError),
}

impl PaneError {
    /// Stable machine-readable code for API envelopes and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unsupported => "unsupported",
            Self::MethodNotAllowed(_) => "method_not_allowed",
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound(_) => "not_found",
            Self::UnknownType(_) => "unknown_pane_type",
            Self::UnknownProvider(_) => "unknown_provider",
            Self::NoProviders => "no_providers",
            Self::NoTodoSource => "no_todo_source",
            Self::InvalidArg { .. } => "invalid_arg",
            Self::Provider(_) => "provider_error",
            Self::Store(_) => "store_error",
        }
    }
}

impl Display for PaneError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsupported => write!(f, "pane does not accept requests"),
            Self::MethodNotAllowed(method) => write!(f, "method not allowed: {method}"),
            Self::InvalidInput(reason) => write!(f, "invalid input: {reason}"),
            Self::NotFound(what) => write!(f, "not found: {what}"),
            Self::UnknownType(value) => write!(f, "unknown pane type: {value}"),
            Self::UnknownProvider(value) => write!(f, "unknown provider: {value}"),
            Self::NoProviders => write!(f, "no providers available"),
            Self::NoTodoSource => write!(f, "no todo source available"),
            Self::InvalidArg { arg, reason } => {
                write!(f, "pane argument `{arg}` is invalid: {reason}")
            }
            Self::Provider(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PaneError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Provider(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProviderError> for PaneError {
    fn from(value: ProviderError) -> Self {
        Self::Provider(value)
    }
}

/// Caller mistakes become input errors; storage failures stay `Store`.
impl From<TodoStoreError> for PaneError {
    fn from(value: TodoStoreError) -> Self {
        match value {
            TodoStoreError::NotFound(id) => Self::NotFound(format!("todo {id}")),
            err if err.is_user_error() => Self::InvalidInput(err.to_string()),
            err => Self::Store(err),
        }
    }
}

/// Failed data fetch: an empty payload of the right kind plus the cause.
#[derive(Debug)]
pub struct PaneDataError {
    pub fallback: PaneData,
    pub source: ProviderError,
}

impl PaneDataError {
    pub fn new(fallback: PaneData, source: ProviderError) -> Self {
        Self { fallback, source }
    }
}

impl Display for PaneDataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "pane data unavailable: {}", self.source)
    }
}

impl Error for PaneDataError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Per-request metadata threaded through every pane call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: Uuid,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Request verb, reduced to what panes distinguish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaneMethod {
    Get,
    Post,
    Patch,
    Other(String),
}

impl PaneMethod {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PATCH" => Self::Patch,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Other(value) => value.as_str(),
        }
    }
}

/// Transport-neutral request handed to a pane's request capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneRequest {
    pub method: PaneMethod,
    pub query: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl PaneRequest {
    pub fn new(method: PaneMethod) -> Self {
        Self {
            method,
            query: BTreeMap::new(),
            body: Vec::new(),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }
}

/// Success outcome of a pane request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneStatus {
    Ok,
    Created,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaneResponse {
    pub status: PaneStatus,
    pub body: serde_json::Value,
}

impl PaneResponse {
    pub fn ok(body: serde_json::Value) -> Self {
        Self {
            status: PaneStatus::Ok,
            body,
        }
    }

    pub fn created(body: serde_json::Value) -> Self {
        Self {
            status: PaneStatus::Created,
            body,
        }
    }
}

/// One dashboard pane.
#[async_trait]
pub trait Pane: Send + Sync {
    /// Unique id within a registry.
    fn id(&self) -> &str;

    fn title(&self) -> &str;

    /// Template reference handed to the renderer.
    fn template(&self) -> &str;

    /// Fetches this pane's payload for one request.
    async fn get_data(&self, ctx: &RequestContext) -> Result<PaneData, PaneDataError>;

    /// Mutating/query API; panes opt in by overriding.
    async fn handle_request(
        &self,
        _ctx: &RequestContext,
        _request: PaneRequest,
    ) -> PaneResult<PaneResponse> {
        Err(PaneError::Unsupported)
    }
}
