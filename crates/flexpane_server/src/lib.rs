//! HTTP surface for the Flexpane dashboard.
//!
//! # Responsibility
//! - Route HTTP requests to pane, provider and page operations.
//! - Keep all domain decisions inside `flexpane_core`.
//!
//! # Invariants
//! - Shared state is read-only after startup.
//! - Request bodies larger than `MAX_BODY_BYTES` are rejected with 413.

pub mod api_error;
pub mod handlers;
pub mod render;

use axum::extract::DefaultBodyLimit;
use axum::routing::{any, get};
use axum::Router;
use flexpane_core::{Dashboard, PaneRegistry, ProviderSet};
use std::sync::Arc;

pub const MAX_BODY_BYTES: usize = 1024;

/// Id of the pane served at `/api/todos`.
pub use flexpane_core::pane::todo::TODO_PANE_ID;

/// State shared by every handler.
pub struct AppState {
    pub registry: PaneRegistry,
    pub providers: ProviderSet,
}

impl AppState {
    pub fn new(registry: PaneRegistry, providers: ProviderSet) -> Self {
        Self {
            registry,
            providers,
        }
    }

    pub fn from_dashboard(dashboard: Dashboard) -> Self {
        let (registry, providers, _todos) = dashboard.into_parts();
        Self::new(registry, providers)
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/healthz", get(handlers::healthz))
        .route("/api/todos", any(handlers::todos_api))
        .route("/api/panes", get(handlers::list_panes))
        .route("/api/panes/:id", any(handlers::pane_api))
        .route(
            "/api/providers/:name/auth",
            get(handlers::auth_status).post(handlers::complete_auth),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
