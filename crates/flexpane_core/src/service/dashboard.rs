//! Dashboard assembly from configuration.
//!
//! # Responsibility
//! - Open the todo store, build named providers and panes, and register them
//!   with the enabled order and layout.
//!
//! # Invariants
//! - Any construction error aborts the build; a half-built dashboard is never
//!   returned.
//! - Enabled ids without a configured pane are kept and later skipped by the
//!   registry.

use crate::config::{ConfigError, DashboardConfig};
use crate::pane::{PaneError, PaneFactory, PaneRegistry};
use crate::provider::{ProviderError, ProviderFactory, ProviderSet};
use crate::repo::todo_store::{TodoStore, TodoStoreError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type DashboardResult<T> = Result<T, DashboardError>;

/// Startup failures, one variant per stage.
#[derive(Debug)]
pub enum DashboardError {
    Config(ConfigError),
    Store(TodoStoreError),
    Provider(ProviderError),
    Pane(PaneError),
}

impl Display for DashboardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "todo store: {err}"),
            Self::Provider(err) => write!(f, "provider setup: {err}"),
            Self::Pane(err) => write!(f, "pane setup: {err}"),
        }
    }
}

impl Error for DashboardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Provider(err) => Some(err),
            Self::Pane(err) => Some(err),
        }
    }
}

impl From<ConfigError> for DashboardError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TodoStoreError> for DashboardError {
    fn from(value: TodoStoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ProviderError> for DashboardError {
    fn from(value: ProviderError) -> Self {
        Self::Provider(value)
    }
}

impl From<PaneError> for DashboardError {
    fn from(value: PaneError) -> Self {
        Self::Pane(value)
    }
}

/// Fully wired dashboard, read-only once built.
pub struct Dashboard {
    registry: PaneRegistry,
    providers: ProviderSet,
    todos: Arc<TodoStore>,
}

impl Dashboard {
    /// Builds with the built-in provider and pane types.
    pub fn build(config: &DashboardConfig) -> DashboardResult<Self> {
        Self::build_with(
            config,
            &ProviderFactory::with_builtin_types(),
            PaneFactory::with_builtin_types(),
        )
    }

    /// Builds with caller-supplied factories, e.g. ones carrying extra types.
    pub fn build_with(
        config: &DashboardConfig,
        provider_factory: &ProviderFactory,
        mut pane_factory: PaneFactory,
    ) -> DashboardResult<Self> {
        config.validate()?;

        let todos = Arc::new(TodoStore::open_with_policy(
            &config.todos.path,
            config.todos.toggle_out_of_range,
        )?);
        let providers = provider_factory.build_named(&config.providers)?;

        pane_factory.register_providers(&providers);
        pane_factory.set_todo_source(todos.clone());

        let mut registry = PaneRegistry::new();
        for instance in &config.panes.instances {
            registry.register(pane_factory.create(instance)?);
        }
        registry.set_enabled(&config.panes.enabled);
        registry.set_layout(config.panes.layout.clone());
        registry.set_fetch_timeout(config.fetch_timeout());

        info!(
            "event=dashboard_build module=service status=ok providers={} panes={} enabled={}",
            providers.len(),
            registry.len(),
            registry.enabled().len()
        );

        Ok(Self {
            registry,
            providers,
            todos,
        })
    }

    pub fn registry(&self) -> &PaneRegistry {
        &self.registry
    }

    pub fn providers(&self) -> &ProviderSet {
        &self.providers
    }

    pub fn todos(&self) -> &Arc<TodoStore> {
        &self.todos
    }

    pub fn into_parts(self) -> (PaneRegistry, ProviderSet, Arc<TodoStore>) {
        (self.registry, self.providers, self.todos)
    }
}
