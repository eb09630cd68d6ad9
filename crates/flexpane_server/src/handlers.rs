//! Axum handlers.
//!
//! # Responsibility
//! - Translate HTTP verbs, query strings and bodies into pane requests.
//! - Expose provider authorization status and completion.
//!
//! # Invariants
//! - Every request gets a fresh `RequestContext` whose id appears in logs.
//! - API failures use the `api_error` envelope.

use crate::api_error::{ApiError, ApiErrorCode};
use crate::render::render_dashboard;
use crate::{AppState, TODO_PANE_ID};
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use flexpane_core::provider::AccountInfo;
use flexpane_core::{PaneDescriptor, PaneMethod, PaneRequest, PaneStatus, RequestContext};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

pub async fn home(State(state): State<Arc<AppState>>) -> Html<String> {
    let ctx = RequestContext::new();
    let descriptors = state.registry.resolve_enabled(&ctx).await;
    info!(
        "event=page_render module=server status=ok request_id={} panes={}",
        ctx.request_id,
        descriptors.len()
    );
    Html(render_dashboard(&descriptors))
}

pub async fn healthz() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": flexpane_core::core_version(),
    }))
}

pub async fn list_panes(State(state): State<Arc<AppState>>) -> Json<Vec<PaneDescriptor>> {
    let ctx = RequestContext::new();
    Json(state.registry.resolve_enabled(&ctx).await)
}

pub async fn todos_api(
    State(state): State<Arc<AppState>>,
    method: Method,
    Query(query): Query<BTreeMap<String, String>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    match body {
        Ok(body) => dispatch(&state, TODO_PANE_ID, method, query, body).await,
        Err(rejection) => ApiError::from(rejection).into_response(),
    }
}

pub async fn pane_api(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    method: Method,
    Query(query): Query<BTreeMap<String, String>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    match body {
        Ok(body) => dispatch(&state, &id, method, query, body).await,
        Err(rejection) => ApiError::from(rejection).into_response(),
    }
}

async fn dispatch(
    state: &AppState,
    pane_id: &str,
    method: Method,
    query: BTreeMap<String, String>,
    body: Bytes,
) -> Response {
    let Some(pane) = state.registry.get_pane(pane_id) else {
        return ApiError::not_found(format!("pane not found: {pane_id}")).into_response();
    };

    let ctx = RequestContext::new();
    let request = PaneRequest {
        method: PaneMethod::parse(method.as_str()),
        query,
        body: body.to_vec(),
    };
    match pane.handle_request(&ctx, request).await {
        Ok(response) => {
            info!(
                "event=pane_request module=server status=ok request_id={} pane={} method={}",
                ctx.request_id, pane_id, method
            );
            let status = match response.status {
                PaneStatus::Ok => StatusCode::OK,
                PaneStatus::Created => StatusCode::CREATED,
            };
            (status, Json(response.body)).into_response()
        }
        Err(err) => {
            warn!(
                "event=pane_request module=server status=error request_id={} pane={} method={} error_code={}",
                ctx.request_id,
                pane_id,
                method,
                err.code()
            );
            ApiError::from(err).into_response()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthStatus {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AccountInfo>,
}

#[derive(Debug, Deserialize)]
struct AuthCodeBody {
    code: String,
}

pub async fn auth_status(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<AuthStatus>, ApiError> {
    let provider = state
        .providers
        .get(&name)
        .ok_or_else(|| ApiError::not_found(format!("provider not found: {name}")))?;
    let oauth = provider
        .oauth()
        .ok_or_else(|| ApiError::not_found(format!("provider has no authorization: {name}")))?;

    if !oauth.is_authenticated() {
        return Ok(Json(AuthStatus {
            authenticated: false,
            authorization_url: Some(oauth.authorization_url(&name)?),
            user: None,
        }));
    }

    let user = match oauth.user_info().await {
        Ok(user) => Some(user),
        Err(err) => {
            warn!(
                "event=provider_profile module=server status=error provider={} error={}",
                name, err
            );
            None
        }
    };
    Ok(Json(AuthStatus {
        authenticated: true,
        authorization_url: None,
        user,
    }))
}

pub async fn complete_auth(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let body = body?;
    let provider = state
        .providers
        .get(&name)
        .ok_or_else(|| ApiError::not_found(format!("provider not found: {name}")))?;
    let oauth = provider
        .oauth()
        .ok_or_else(|| ApiError::not_found(format!("provider has no authorization: {name}")))?;

    let body: AuthCodeBody = serde_json::from_slice(&body)
        .map_err(|_| ApiError::invalid_input("invalid request body"))?;
    if body.code.trim().is_empty() {
        return Err(ApiError::new(
            ApiErrorCode::InvalidInput,
            "authorization code cannot be empty",
        ));
    }

    oauth.complete_authorization(&body.code).await?;
    info!("event=provider_auth module=server status=ok provider={name}");
    Ok(Json(json!({ "authenticated": true })))
}
