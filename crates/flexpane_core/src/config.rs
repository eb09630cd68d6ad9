//! Dashboard configuration file.
//!
//! # Responsibility
//! - Describe todos, named providers, pane instances, enabled order and
//!   layout in one JSON document.
//! - Supply a working demo setup when no file exists.
//!
//! # Invariants
//! - A missing file is not an error; a malformed one is.
//! - `validate` rejects documents that cannot produce a dashboard.

use crate::model::pane::{GridArea, PaneLayout};
use crate::pane::PaneConfig;
use crate::provider::factory::{ProviderConfig, ProvidersConfig};
use crate::repo::todo_store::ToggleIndexPolicy;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_TODO_PATH: &str = "data/todos.json";
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_PROVIDER_NAME: &str = "demo";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "config `{}` is not valid: {source}", path.display())
            }
            Self::Invalid(reason) => write!(f, "invalid config: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodosConfig {
    #[serde(default = "default_todo_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub toggle_out_of_range: ToggleIndexPolicy,
}

impl Default for TodosConfig {
    fn default() -> Self {
        Self {
            path: default_todo_path(),
            toggle_out_of_range: ToggleIndexPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PanesConfig {
    #[serde(default)]
    pub instances: Vec<PaneConfig>,
    #[serde(default)]
    pub enabled: Vec<String>,
    #[serde(default)]
    pub layout: BTreeMap<String, PaneLayout>,
}

/// Root configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub todos: TodosConfig,
    #[serde(default = "default_providers")]
    pub providers: ProvidersConfig,
    #[serde(default = "default_panes")]
    pub panes: PanesConfig,
    /// Per-pane fetch bound; `0` disables it.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            todos: TodosConfig::default(),
            providers: default_providers(),
            panes: default_panes(),
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
        }
    }
}

impl DashboardConfig {
    /// Loads and validates `path`; a missing file yields the defaults.
    ///
    /// # Errors
    /// - Read failures other than not-found.
    /// - JSON that does not match the document shape.
    /// - Documents rejected by `validate`.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(
                    "event=config_load module=config status=default path={}",
                    path.display()
                );
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config = Self::from_json(&bytes).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        info!(
            "event=config_load module=config status=ok path={} providers={} panes={}",
            path.display(),
            config.providers.entries.len(),
            config.panes.instances.len()
        );
        Ok(config)
    }

    /// Parses and validates an in-memory document.
    pub fn from_json(bytes: &[u8]) -> ConfigResult<Self> {
        let config: Self = serde_json::from_slice(bytes).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Structural checks that do not need providers built.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.todos.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("todos.path cannot be empty".to_string()));
        }
        for (name, entry) in &self.providers.entries {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid("provider name cannot be empty".to_string()));
            }
            if entry.provider_type.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "provider `{name}` has no type"
                )));
            }
        }
        if let Some(default) = self.providers.default.as_deref() {
            if !self.providers.entries.contains_key(default.trim()) {
                return Err(ConfigError::Invalid(format!(
                    "default provider `{default}` is not configured"
                )));
            }
        }
        let mut seen = BTreeSet::new();
        for instance in &self.panes.instances {
            if instance.pane_type.trim().is_empty() {
                return Err(ConfigError::Invalid("pane instance has no type".to_string()));
            }
            let id = instance.instance_id();
            if !seen.insert(id.clone()) {
                return Err(ConfigError::Invalid(format!("duplicate pane id `{id}`")));
            }
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        (self.fetch_timeout_ms > 0).then(|| Duration::from_millis(self.fetch_timeout_ms))
    }
}

fn default_todo_path() -> PathBuf {
    PathBuf::from(DEFAULT_TODO_PATH)
}

fn default_fetch_timeout_ms() -> u64 {
    DEFAULT_FETCH_TIMEOUT_MS
}

fn default_providers() -> ProvidersConfig {
    let mut entries = BTreeMap::new();
    entries.insert(DEFAULT_PROVIDER_NAME.to_string(), ProviderConfig::new("mock"));
    ProvidersConfig {
        default: Some(DEFAULT_PROVIDER_NAME.to_string()),
        entries,
    }
}

fn default_panes() -> PanesConfig {
    let grid = |row: &str, column: &str| PaneLayout {
        grid_area: GridArea {
            row: row.to_string(),
            column: column.to_string(),
        },
    };
    let mut layout = BTreeMap::new();
    layout.insert("calendar".to_string(), grid("1", "1"));
    layout.insert("todos".to_string(), grid("1", "2"));
    layout.insert("email".to_string(), grid("2", "1 / span 2"));

    PanesConfig {
        instances: vec![
            PaneConfig::new("calendar"),
            PaneConfig::new("todos"),
            PaneConfig::new("email"),
        ],
        enabled: vec![
            "calendar".to_string(),
            "todos".to_string(),
            "email".to_string(),
        ],
        layout,
    }
}
