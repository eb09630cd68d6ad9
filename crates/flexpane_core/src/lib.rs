//! Core domain logic for the Flexpane dashboard.
//! This crate is the single source of truth for pane, provider and todo
//! invariants; the server crate only translates HTTP.

pub mod config;
pub mod logging;
pub mod model;
pub mod pane;
pub mod provider;
pub mod repo;
pub mod service;

pub use config::{ConfigError, ConfigResult, DashboardConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::feed::{Email, Event};
pub use model::pane::{GridArea, PaneData, PaneDescriptor, PaneLayout};
pub use model::todo::{Todo, TodoId};
pub use pane::{
    Pane, PaneError, PaneFactory, PaneMethod, PaneRegistry, PaneRequest, PaneResponse,
    PaneResult, PaneStatus, RequestContext,
};
pub use provider::{DataProvider, OAuthFlow, ProviderError, ProviderFactory, ProviderSet};
pub use repo::todo_store::{
    TodoSource, TodoStore, TodoStoreError, TodoStoreResult, ToggleIndexPolicy,
};
pub use service::dashboard::{Dashboard, DashboardError, DashboardResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
