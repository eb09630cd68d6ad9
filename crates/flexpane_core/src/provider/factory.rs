//! Provider construction by type name and named-provider resolution.
//!
//! # Responsibility
//! - Map provider type names to constructors, extensible at runtime.
//! - Build every configured named provider once at startup.
//! - Resolve a provider by name with fallback to the configured default.
//!
//! # Invariants
//! - Each type name maps to exactly one constructor; re-registering replaces it.
//! - Unknown types and bad arguments are returned as errors, never panics.
//! - Names are trimmed before lookup.

use super::{
    DataProvider, DemoProvider, GmailProvider, JsonFileProvider, NullProvider, ProviderError,
    ProviderResult,
};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Free-form constructor arguments, straight from configuration.
pub type ProviderArgs = BTreeMap<String, serde_json::Value>;

/// Builds one provider instance from its arguments.
pub type ProviderConstructor =
    Arc<dyn Fn(&ProviderArgs) -> ProviderResult<Arc<dyn DataProvider>> + Send + Sync>;

/// One named provider entry: `{ "type": "...", "args": { ... } }`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(rename = "type")]
    pub provider_type: String,
    #[serde(default)]
    pub args: ProviderArgs,
}

impl ProviderConfig {
    pub fn new(provider_type: impl Into<String>) -> Self {
        Self {
            provider_type: provider_type.into(),
            args: ProviderArgs::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }
}

/// All named providers plus the fallback name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub entries: BTreeMap<String, ProviderConfig>,
}

/// Type-name to constructor table.
#[derive(Default, Clone)]
pub struct ProviderFactory {
    constructors: BTreeMap<String, ProviderConstructor>,
}

impl ProviderFactory {
    /// Empty factory; see `with_builtin_types` for the usual starting point.
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory preloaded with `null`, `mock`, `demo`, `file` and `gmail`.
    pub fn with_builtin_types() -> Self {
        let mut factory = Self::new();
        factory.register("null", |_| Ok(Arc::new(NullProvider::new())));
        factory.register("mock", |_| Ok(Arc::new(DemoProvider::new())));
        factory.register("demo", |_| Ok(Arc::new(DemoProvider::new())));
        factory.register("file", |args| {
            let path = match args.get("path") {
                Some(serde_json::Value::String(path)) if !path.trim().is_empty() => path.trim(),
                Some(_) => {
                    return Err(ProviderError::InvalidArg {
                        provider: "file",
                        arg: "path",
                        reason: "expected a non-empty string".to_string(),
                    })
                }
                None => {
                    return Err(ProviderError::MissingArg {
                        provider: "file",
                        arg: "path",
                    })
                }
            };
            Ok(Arc::new(JsonFileProvider::new(path)))
        });
        factory.register("gmail", |args| Ok(Arc::new(GmailProvider::from_args(args)?)));
        factory
    }

    /// Installs or replaces the constructor for `type_name`.
    pub fn register<F>(&mut self, type_name: &str, constructor: F)
    where
        F: Fn(&ProviderArgs) -> ProviderResult<Arc<dyn DataProvider>> + Send + Sync + 'static,
    {
        self.constructors
            .insert(type_name.trim().to_string(), Arc::new(constructor));
    }

    /// Builds one provider.
    ///
    /// # Errors
    /// - `UnknownType` when no constructor is registered.
    /// - Whatever the constructor reports for bad arguments.
    pub fn create(&self, config: &ProviderConfig) -> ProviderResult<Arc<dyn DataProvider>> {
        let type_name = config.provider_type.trim();
        let constructor = self
            .constructors
            .get(type_name)
            .ok_or_else(|| ProviderError::UnknownType(type_name.to_string()))?;
        constructor(&config.args)
    }

    /// Registered type names, sorted.
    pub fn available_types(&self) -> Vec<String> {
        self.constructors.keys().cloned().collect()
    }

    /// Builds every named provider in `config`.
    ///
    /// # Errors
    /// - The first entry that fails to construct.
    /// - `DefaultNotFound` when the default names no entry.
    pub fn build_named(&self, config: &ProvidersConfig) -> ProviderResult<ProviderSet> {
        let mut set = ProviderSet::new();
        for (name, entry) in &config.entries {
            let provider = self.create(entry)?;
            info!(
                "event=provider_build module=provider status=ok name={} type={}",
                name.trim(),
                provider.kind()
            );
            set.insert(name, provider);
        }
        if let Some(default) = config.default.as_deref() {
            set.set_default(default)?;
        }
        Ok(set)
    }
}

/// Constructed providers addressable by configured name.
#[derive(Default, Clone)]
pub struct ProviderSet {
    providers: BTreeMap<String, Arc<dyn DataProvider>>,
    default: Option<String>,
}

impl ProviderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the provider stored under `name`.
    pub fn insert(&mut self, name: &str, provider: Arc<dyn DataProvider>) {
        self.providers.insert(name.trim().to_string(), provider);
    }

    /// Sets the fallback provider name.
    ///
    /// # Errors
    /// - `DefaultNotFound` when `name` is not in the set.
    pub fn set_default(&mut self, name: &str) -> ProviderResult<()> {
        let name = name.trim();
        if !self.providers.contains_key(name) {
            return Err(ProviderError::DefaultNotFound(name.to_string()));
        }
        self.default = Some(name.to_string());
        Ok(())
    }

    pub fn default_name(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn DataProvider>> {
        self.providers.get(name.trim()).cloned()
    }

    /// Looks `name` up, falling back to the default provider.
    ///
    /// # Errors
    /// - `NotFound` when `name` is absent and no default is set.
    /// - `DefaultNotFound` when the default itself is absent.
    pub fn resolve(&self, name: &str) -> ProviderResult<Arc<dyn DataProvider>> {
        if let Some(provider) = self.get(name) {
            return Ok(provider);
        }
        let default = self
            .default
            .as_deref()
            .ok_or_else(|| ProviderError::NotFound(name.trim().to_string()))?;
        self.get(default)
            .ok_or_else(|| ProviderError::DefaultNotFound(default.to_string()))
    }

    /// Configured names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }

    /// `(name, provider)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn DataProvider>)> {
        self.providers
            .iter()
            .map(|(name, provider)| (name.as_str(), provider))
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
