use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use flexpane_core::provider::factory::ProviderConfig;
use flexpane_core::{Dashboard, DashboardConfig};
use flexpane_server::{build_router, AppState};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn test_app(dir: &TempDir) -> Router {
    let mut config = DashboardConfig::default();
    config.todos.path = dir.path().join("todos.json");
    config.providers.entries.insert(
        "gmail".to_string(),
        ProviderConfig::new("gmail")
            .with_arg("client_id", "client-123")
            .with_arg("client_secret", "secret")
            .with_arg("redirect_uri", "http://localhost:3000/oauth/callback"),
    );
    let dashboard = Dashboard::build(&config).expect("dashboard should build");
    build_router(Arc::new(AppState::from_dashboard(dashboard)))
}

fn request(method: &str, uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .expect("request should build")
}

async fn read_json(response: axum::response::Response) -> Result<Value> {
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok(serde_json::from_slice::<Value>(&bytes)?)
}

async fn read_text(response: axum::response::Response) -> Result<String> {
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok(String::from_utf8(bytes.to_vec())?)
}

#[tokio::test]
async fn healthz_reports_version() -> Result<()> {
    let dir = TempDir::new()?;
    let response = test_app(&dir)
        .oneshot(request("GET", "/healthz", Body::empty()))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await?;
    assert_eq!(body["status"], "ok");
    assert!(body["version"].as_str().is_some_and(|v| !v.is_empty()));
    Ok(())
}

#[tokio::test]
async fn home_renders_enabled_panes_in_order() -> Result<()> {
    let dir = TempDir::new()?;
    let response = test_app(&dir)
        .oneshot(request("GET", "/", Body::empty()))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let html = read_text(response).await?;
    let calendar = html.find("pane-calendar").expect("calendar section");
    let todos = html.find("pane-todos").expect("todos section");
    let email = html.find("pane-email").expect("email section");
    assert!(calendar < todos && todos < email);
    assert!(html.contains("Team Standup"));
    Ok(())
}

#[tokio::test]
async fn todo_api_create_list_toggle() -> Result<()> {
    let dir = TempDir::new()?;
    let app = test_app(&dir);

    let response = app
        .clone()
        .oneshot(request("POST", "/api/todos", r#"{"message":"buy milk"}"#))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = read_json(response).await?;
    assert_eq!(created["status"], "created");
    let id = created["id"].as_str().expect("id string").to_string();

    let response = app
        .clone()
        .oneshot(request("GET", "/api/todos", Body::empty()))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let listed = read_json(response).await?;
    assert_eq!(listed["Count"], 1);
    assert_eq!(listed["Todos"][0]["message"], "buy milk");

    let response = app
        .clone()
        .oneshot(request("PATCH", "/api/todos?index=0", Body::empty()))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await?["done"], true);

    let response = app
        .oneshot(request("PATCH", &format!("/api/todos?id={id}"), Body::empty()))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await?["done"], false);
    Ok(())
}

#[tokio::test]
async fn todo_api_rejects_bad_input() -> Result<()> {
    let dir = TempDir::new()?;
    let app = test_app(&dir);

    for (method, uri, body, status) in [
        ("POST", "/api/todos", r#"{"message":""}"#, StatusCode::BAD_REQUEST),
        ("POST", "/api/todos", "{broken", StatusCode::BAD_REQUEST),
        ("PATCH", "/api/todos", "", StatusCode::BAD_REQUEST),
        ("PATCH", "/api/todos?index=-1", "", StatusCode::BAD_REQUEST),
        ("PATCH", "/api/todos?index=7", "", StatusCode::BAD_REQUEST),
        (
            "PATCH",
            "/api/todos?id=00000000-0000-0000-0000-000000000000",
            "",
            StatusCode::NOT_FOUND,
        ),
        ("DELETE", "/api/todos", "", StatusCode::METHOD_NOT_ALLOWED),
    ] {
        let response = app.clone().oneshot(request(method, uri, body)).await?;
        assert_eq!(response.status(), status, "{method} {uri}");
        let envelope = read_json(response).await?;
        assert!(envelope["error"]["code"].is_string(), "{method} {uri}");
        assert!(envelope["error"]["message"].is_string(), "{method} {uri}");
    }
    Ok(())
}

#[tokio::test]
async fn oversized_body_is_rejected() -> Result<()> {
    let dir = TempDir::new()?;
    let body = format!(r#"{{"message":"{}"}}"#, "x".repeat(2048));
    let response = test_app(&dir)
        .oneshot(request("POST", "/api/todos", body))
        .await?;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let envelope = read_json(response).await?;
    assert_eq!(envelope["error"]["code"], "payload_too_large");
    assert!(envelope["error"]["message"].is_string());
    Ok(())
}

#[tokio::test]
async fn oversized_body_on_pane_and_auth_routes_uses_envelope() -> Result<()> {
    let dir = TempDir::new()?;
    let app = test_app(&dir);
    let body = format!(r#"{{"code":"{}"}}"#, "x".repeat(2048));
    for uri in ["/api/panes/todos", "/api/providers/gmail/auth"] {
        let response = app
            .clone()
            .oneshot(request("POST", uri, body.clone()))
            .await?;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE, "{uri}");
        assert_eq!(
            read_json(response).await?["error"]["code"],
            "payload_too_large",
            "{uri}"
        );
    }
    Ok(())
}

#[tokio::test]
async fn generic_pane_route_status_codes() -> Result<()> {
    let dir = TempDir::new()?;
    let app = test_app(&dir);

    let response = app
        .clone()
        .oneshot(request("GET", "/api/panes/todos", Body::empty()))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request("GET", "/api/panes/calendar", Body::empty()))
        .await?;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        read_json(response).await?["error"]["code"],
        "method_not_allowed"
    );

    let response = app
        .oneshot(request("GET", "/api/panes/ghost", Body::empty()))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn pane_listing_returns_descriptors() -> Result<()> {
    let dir = TempDir::new()?;
    let response = test_app(&dir)
        .oneshot(request("GET", "/api/panes", Body::empty()))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let panes = read_json(response).await?;
    let panes = panes.as_array().expect("descriptor array");
    assert_eq!(panes.len(), 3);
    assert_eq!(panes[0]["id"], "calendar");
    assert_eq!(panes[0]["data"]["kind"], "calendar");
    assert_eq!(panes[0]["data"]["count"], 3);
    assert_eq!(panes[2]["grid_area"]["column"], "1 / span 2");
    Ok(())
}

#[tokio::test]
async fn provider_auth_routes() -> Result<()> {
    let dir = TempDir::new()?;
    let app = test_app(&dir);

    let response = app
        .clone()
        .oneshot(request("GET", "/api/providers/gmail/auth", Body::empty()))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let status = read_json(response).await?;
    assert_eq!(status["authenticated"], false);
    assert!(status["authorization_url"]
        .as_str()
        .is_some_and(|url| url.contains("client_id=client-123")));

    let response = app
        .clone()
        .oneshot(request("POST", "/api/providers/gmail/auth", "{}"))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    for uri in ["/api/providers/demo/auth", "/api/providers/nope/auth"] {
        let response = app
            .clone()
            .oneshot(request("GET", uri, Body::empty()))
            .await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
    Ok(())
}
