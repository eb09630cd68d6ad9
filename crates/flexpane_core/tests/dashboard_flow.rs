use async_trait::async_trait;
use flexpane_core::model::feed::{Email, Event};
use flexpane_core::pane::{CalendarPane, PaneConfig, TodoPane};
use flexpane_core::provider::factory::ProviderConfig;
use flexpane_core::provider::{DemoProvider, ProviderResult};
use flexpane_core::{
    Dashboard, DashboardConfig, DataProvider, Pane, PaneData, PaneError, PaneFactory,
    PaneMethod, PaneRegistry, PaneRequest, PaneStatus, ProviderError, ProviderFactory,
    RequestContext, TodoSource, TodoStore,
};
use std::sync::Arc;
use tempfile::TempDir;

struct BrokenProvider;

#[async_trait]
impl DataProvider for BrokenProvider {
    fn kind(&self) -> &'static str {
        "broken"
    }

    async fn calendar_events(&self) -> ProviderResult<Vec<Event>> {
        Err(ProviderError::Source("calendar offline".to_string()))
    }

    async fn emails(&self) -> ProviderResult<Vec<Email>> {
        Err(ProviderError::Source("mailbox offline".to_string()))
    }
}

#[tokio::test]
async fn demo_events_are_deterministic() {
    let provider = DemoProvider::new();
    let first = provider.calendar_events().await.unwrap();
    let second = provider.calendar_events().await.unwrap();
    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
    assert!(first.iter().all(|event| !event.title.is_empty()));
    assert!(first.iter().all(|event| event.start.timestamp() > 0));
}

#[tokio::test]
async fn enabled_order_wins_over_registration_order() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(TodoStore::open(dir.path().join("todos.json")).unwrap());

    let mut registry = PaneRegistry::new();
    registry.register(Arc::new(CalendarPane::new(Arc::new(DemoProvider::new()))));
    registry.register(Arc::new(TodoPane::new(store)));
    registry.set_enabled(["todos", "calendar"]);

    let descriptors = registry.resolve_enabled(&RequestContext::new()).await;
    let ids = descriptors.iter().map(|d| d.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["todos", "calendar"]);
    assert_eq!(descriptors[0].template, "panes/todos.html");
}

#[tokio::test]
async fn ghost_pane_yields_empty_page() {
    let mut registry = PaneRegistry::new();
    registry.set_enabled(["ghost"]);
    assert!(registry
        .resolve_enabled(&RequestContext::new())
        .await
        .is_empty());
}

#[tokio::test]
async fn failing_provider_gives_empty_calendar_and_error() {
    let pane = CalendarPane::new(Arc::new(BrokenProvider));
    let err = pane.get_data(&RequestContext::new()).await.unwrap_err();
    match &err.fallback {
        PaneData::Calendar(calendar) => {
            assert!(calendar.events.is_empty());
            assert_eq!(calendar.count, 0);
        }
        other => panic!("unexpected fallback: {other:?}"),
    }
    assert!(err.to_string().contains("calendar offline"));
}

#[test]
fn unregistered_types_error_without_panicking() {
    let providers = ProviderFactory::with_builtin_types();
    assert!(matches!(
        providers.create(&ProviderConfig::new("nonexistent-xyz")),
        Err(ProviderError::UnknownType(_))
    ));

    let panes = PaneFactory::with_builtin_types();
    assert!(matches!(
        panes.create(&PaneConfig::new("nonexistent-xyz")),
        Err(PaneError::UnknownType(_))
    ));
}

#[tokio::test]
async fn configured_dashboard_serves_todo_requests() {
    let dir = TempDir::new().unwrap();
    let mut config = DashboardConfig::default();
    config.todos.path = dir.path().join("todos.json");
    config
        .providers
        .entries
        .insert("quiet".to_string(), ProviderConfig::new("null"));
    config
        .panes
        .instances
        .push(PaneConfig::new("email").with_provider("quiet").with_arg("id", "quiet-mail"));
    config.panes.enabled.push("quiet-mail".to_string());

    let dashboard = Dashboard::build(&config).unwrap();
    let ctx = RequestContext::new();
    let todos = dashboard.registry().get_pane("todos").unwrap();

    let created = todos
        .handle_request(
            &ctx,
            PaneRequest::new(PaneMethod::Post).with_body(r#"{"message":"buy milk"}"#),
        )
        .await
        .unwrap();
    assert_eq!(created.status, PaneStatus::Created);
    assert_eq!(dashboard.todos().list()[0].message, "buy milk");

    let descriptors = dashboard.registry().resolve_enabled(&ctx).await;
    let counts = descriptors
        .iter()
        .map(|d| (d.id.as_str(), d.data.as_ref().map(PaneData::count)))
        .collect::<Vec<_>>();
    assert_eq!(
        counts,
        vec![
            ("calendar", Some(3)),
            ("todos", Some(1)),
            ("email", Some(3)),
            ("quiet-mail", Some(0)),
        ]
    );
    assert_eq!(descriptors[2].grid_area.column, "1 / span 2");
}
