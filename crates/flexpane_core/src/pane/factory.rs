//! Pane construction from `{type, provider, args}` entries.
//!
//! # Responsibility
//! - Map pane type names to constructors, extensible at runtime.
//! - Resolve the data provider or todo source a constructor asks for.
//!
//! # Invariants
//! - An explicit provider name that is not registered is an error; it never
//!   falls back silently.
//! - Without an explicit name, the default provider is used, then the first
//!   provider in name order.

use super::{CalendarPane, EmailPane, Pane, PaneError, PaneResult, TodoPane};
use crate::provider::{DataProvider, ProviderSet};
use crate::repo::todo_store::TodoSource;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

pub type PaneArgs = BTreeMap<String, serde_json::Value>;

/// Builds one pane from its build context.
pub type PaneConstructor = Arc<dyn Fn(&PaneBuild<'_>) -> PaneResult<Arc<dyn Pane>> + Send + Sync>;

/// One configured pane instance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PaneConfig {
    #[serde(rename = "type")]
    pub pane_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default)]
    pub args: PaneArgs,
}

impl PaneConfig {
    pub fn new(pane_type: impl Into<String>) -> Self {
        Self {
            pane_type: pane_type.into(),
            provider: None,
            args: PaneArgs::new(),
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    /// Id the built-in types register under: the `id` arg when it is a
    /// non-blank string, else the type name.
    pub fn instance_id(&self) -> String {
        self.args
            .get("id")
            .and_then(non_blank_string)
            .unwrap_or_else(|| self.pane_type.trim())
            .to_string()
    }
}

fn non_blank_string(value: &serde_json::Value) -> Option<&str> {
    value
        .as_str()
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

/// What a constructor sees: the entry plus lazy dependency lookup.
pub struct PaneBuild<'a> {
    factory: &'a PaneFactory,
    config: &'a PaneConfig,
}

impl PaneBuild<'_> {
    pub fn config(&self) -> &PaneConfig {
        self.config
    }

    pub fn args(&self) -> &PaneArgs {
        &self.config.args
    }

    /// String argument; absent and blank both read as `None`.
    pub fn string_arg(&self, key: &str) -> PaneResult<Option<String>> {
        match self.config.args.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value @ serde_json::Value::String(_)) => {
                Ok(non_blank_string(value).map(str::to_string))
            }
            Some(_) => Err(PaneError::InvalidArg {
                arg: key.to_string(),
                reason: "expected a string".to_string(),
            }),
        }
    }

    /// Provider named by the entry, else the factory default.
    pub fn provider(&self) -> PaneResult<Arc<dyn DataProvider>> {
        self.factory.resolve_provider(self.config.provider.as_deref())
    }

    pub fn todos(&self) -> PaneResult<Arc<dyn TodoSource>> {
        self.factory.todos.clone().ok_or(PaneError::NoTodoSource)
    }
}

/// Type-name to pane constructor table plus the dependencies panes draw on.
#[derive(Default, Clone)]
pub struct PaneFactory {
    constructors: BTreeMap<String, PaneConstructor>,
    providers: BTreeMap<String, Arc<dyn DataProvider>>,
    default_provider: Option<String>,
    todos: Option<Arc<dyn TodoSource>>,
}

impl PaneFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory preloaded with `calendar`, `todos` and `email`.
    pub fn with_builtin_types() -> Self {
        let mut factory = Self::new();
        factory.register_type("calendar", |build| {
            let mut pane = CalendarPane::new(build.provider()?);
            if let Some(id) = build.string_arg("id")? {
                pane = pane.with_id(id);
            }
            if let Some(title) = build.string_arg("title")? {
                pane = pane.with_title(title);
            }
            Ok(Arc::new(pane))
        });
        factory.register_type("todos", |build| {
            let mut pane = TodoPane::new(build.todos()?);
            if let Some(id) = build.string_arg("id")? {
                pane = pane.with_id(id);
            }
            if let Some(title) = build.string_arg("title")? {
                pane = pane.with_title(title);
            }
            Ok(Arc::new(pane))
        });
        factory.register_type("email", |build| {
            let mut pane = EmailPane::new(build.provider()?);
            if let Some(id) = build.string_arg("id")? {
                pane = pane.with_id(id);
            }
            if let Some(title) = build.string_arg("title")? {
                pane = pane.with_title(title);
            }
            Ok(Arc::new(pane))
        });
        factory
    }

    /// Installs or replaces the constructor for `pane_type`.
    pub fn register_type<F>(&mut self, pane_type: &str, constructor: F)
    where
        F: Fn(&PaneBuild<'_>) -> PaneResult<Arc<dyn Pane>> + Send + Sync + 'static,
    {
        self.constructors
            .insert(pane_type.trim().to_string(), Arc::new(constructor));
    }

    /// Makes `provider` available to panes under `name`.
    pub fn register_provider(&mut self, name: &str, provider: Arc<dyn DataProvider>) {
        self.providers.insert(name.trim().to_string(), provider);
    }

    /// Registers every provider in `set` and adopts its default.
    pub fn register_providers(&mut self, set: &ProviderSet) {
        for (name, provider) in set.iter() {
            self.register_provider(name, provider.clone());
        }
        if let Some(default) = set.default_name() {
            self.set_default_provider(default);
        }
    }

    /// Names the provider used when an entry names none.
    pub fn set_default_provider(&mut self, name: &str) {
        self.default_provider = Some(name.trim().to_string());
    }

    pub fn set_todo_source(&mut self, todos: Arc<dyn TodoSource>) {
        self.todos = Some(todos);
    }

    /// Builds one pane.
    ///
    /// # Errors
    /// - `UnknownType` when no constructor is registered.
    /// - `UnknownProvider` / `NoProviders` from provider resolution.
    /// - Whatever the constructor reports for bad arguments.
    pub fn create(&self, config: &PaneConfig) -> PaneResult<Arc<dyn Pane>> {
        let pane_type = config.pane_type.trim();
        let constructor = self
            .constructors
            .get(pane_type)
            .ok_or_else(|| PaneError::UnknownType(pane_type.to_string()))?;
        let pane = constructor(&PaneBuild {
            factory: self,
            config,
        })?;
        debug!(
            "event=pane_build module=pane status=ok type={} id={}",
            pane_type,
            pane.id()
        );
        Ok(pane)
    }

    /// Registered type names, sorted.
    pub fn available_types(&self) -> Vec<String> {
        self.constructors.keys().cloned().collect()
    }

    fn resolve_provider(&self, name: Option<&str>) -> PaneResult<Arc<dyn DataProvider>> {
        if let Some(name) = name.map(str::trim).filter(|name| !name.is_empty()) {
            return self
                .providers
                .get(name)
                .cloned()
                .ok_or_else(|| PaneError::UnknownProvider(name.to_string()));
        }
        if let Some(provider) = self
            .default_provider
            .as_deref()
            .and_then(|name| self.providers.get(name))
        {
            return Ok(provider.clone());
        }
        self.providers
            .values()
            .next()
            .cloned()
            .ok_or(PaneError::NoProviders)
    }
}

#[cfg(test)]
mod tests {
    use super::{PaneConfig, PaneFactory};
    use crate::pane::{PaneError, RequestContext};
    use crate::provider::{DemoProvider, NullProvider};
    use crate::repo::todo_store::TodoStore;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn factory_with_providers() -> PaneFactory {
        let mut factory = PaneFactory::with_builtin_types();
        factory.register_provider("demo", Arc::new(DemoProvider::new()));
        factory.register_provider("empty", Arc::new(NullProvider::new()));
        factory
    }

    #[test]
    fn builtin_types_are_sorted() {
        assert_eq!(
            PaneFactory::with_builtin_types().available_types(),
            vec!["calendar", "email", "todos"]
        );
    }

    #[test]
    fn unknown_type_and_provider_are_errors() {
        let factory = factory_with_providers();
        let err = factory
            .create(&PaneConfig::new("weather"))
            .err()
            .expect("unknown type");
        assert!(matches!(err, PaneError::UnknownType(name) if name == "weather"));

        let err = factory
            .create(&PaneConfig::new("calendar").with_provider("ghost"))
            .err()
            .expect("unknown provider");
        assert!(matches!(err, PaneError::UnknownProvider(name) if name == "ghost"));
    }

    #[test]
    fn provider_backed_pane_needs_a_provider() {
        let factory = PaneFactory::with_builtin_types();
        let err = factory
            .create(&PaneConfig::new("email"))
            .err()
            .expect("no providers");
        assert!(matches!(err, PaneError::NoProviders));
    }

    #[tokio::test]
    async fn default_provider_applies_when_unnamed() {
        let mut factory = factory_with_providers();
        factory.set_default_provider("empty");
        let pane = factory
            .create(&PaneConfig::new("calendar"))
            .expect("calendar pane");
        let data = pane
            .get_data(&RequestContext::new())
            .await
            .expect("null provider data");
        assert_eq!(data.count(), 0);

        let pane = factory
            .create(&PaneConfig::new("calendar").with_provider("demo"))
            .expect("calendar pane");
        let data = pane
            .get_data(&RequestContext::new())
            .await
            .expect("demo data");
        assert_eq!(data.count(), 3);
    }

    #[test]
    fn id_argument_overrides_pane_id() {
        let factory = factory_with_providers();
        let pane = factory
            .create(
                &PaneConfig::new("calendar")
                    .with_provider("demo")
                    .with_arg("id", "team-calendar")
                    .with_arg("title", "Team"),
            )
            .expect("calendar pane");
        assert_eq!(pane.id(), "team-calendar");
        assert_eq!(pane.title(), "Team");

        let err = factory
            .create(&PaneConfig::new("email").with_arg("id", 42))
            .err()
            .expect("non-string id");
        assert!(matches!(err, PaneError::InvalidArg { .. }));
    }

    #[test]
    fn blank_id_argument_keeps_type_id() {
        let factory = factory_with_providers();
        for config in [
            PaneConfig::new("calendar").with_arg("id", "   "),
            PaneConfig::new("calendar").with_arg("id", " team "),
        ] {
            let pane = factory.create(&config).expect("calendar pane");
            assert_eq!(pane.id(), config.instance_id());
        }
        assert_eq!(
            PaneConfig::new("calendar").with_arg("id", "").instance_id(),
            "calendar"
        );
    }

    #[test]
    fn todo_pane_requires_a_todo_source() {
        let mut factory = PaneFactory::with_builtin_types();
        let err = factory
            .create(&PaneConfig::new("todos"))
            .err()
            .expect("no todo source");
        assert!(matches!(err, PaneError::NoTodoSource));

        let dir = TempDir::new().expect("temp dir");
        let store = TodoStore::open(dir.path().join("todos.json")).expect("store");
        factory.set_todo_source(Arc::new(store));
        let pane = factory
            .create(&PaneConfig::new("todos"))
            .expect("todo pane");
        assert_eq!(pane.id(), "todos");
    }
}
