//! JSON error envelope for API routes.
//!
//! # Invariants
//! - Bodies are always `{"error": {"code", "message"}}`.
//! - Storage and upstream details are logged, never returned.

use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use flexpane_core::{PaneError, ProviderError};
use log::{error, warn};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCode {
    InvalidInput,
    NotFound,
    MethodNotAllowed,
    PayloadTooLarge,
    AuthorizationFailed,
    UpstreamError,
    InternalError,
}

impl ApiErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::NotFound => "not_found",
            Self::MethodNotAllowed => "method_not_allowed",
            Self::PayloadTooLarge => "payload_too_large",
            Self::AuthorizationFailed => "authorization_failed",
            Self::UpstreamError => "upstream_error",
            Self::InternalError => "internal_error",
        }
    }

    pub const fn default_status(self) -> StatusCode {
        match self {
            Self::InvalidInput => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::AuthorizationFailed => StatusCode::BAD_REQUEST,
            Self::UpstreamError => StatusCode::BAD_GATEWAY,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Error returned by API handlers.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: ApiErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            status: code.default_status(),
            code,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::InvalidInput, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::NotFound, message)
    }

    pub fn internal() -> Self {
        Self::new(ApiErrorCode::InternalError, "internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ApiErrorResponse {
                error: ApiErrorDetail {
                    code: self.code.as_str(),
                    message: self.message,
                },
            }),
        )
            .into_response()
    }
}

impl From<PaneError> for ApiError {
    fn from(value: PaneError) -> Self {
        match value {
            PaneError::Unsupported => Self::new(
                ApiErrorCode::MethodNotAllowed,
                "pane does not accept requests",
            ),
            PaneError::MethodNotAllowed(method) => Self::new(
                ApiErrorCode::MethodNotAllowed,
                format!("method not allowed: {method}"),
            ),
            PaneError::InvalidInput(reason) => Self::invalid_input(reason),
            PaneError::NotFound(what) => Self::not_found(format!("not found: {what}")),
            PaneError::Provider(err) => err.into(),
            PaneError::Store(err) => {
                error!("event=api_error module=server status=error error_code=store error={err}");
                Self::new(ApiErrorCode::InternalError, "failed to save todos")
            }
            other => {
                error!(
                    "event=api_error module=server status=error error_code={} error={other}",
                    other.code()
                );
                Self::internal()
            }
        }
    }
}

/// Body buffering failures, mostly the `DefaultBodyLimit` cap.
impl From<BytesRejection> for ApiError {
    fn from(value: BytesRejection) -> Self {
        if value.status() == StatusCode::PAYLOAD_TOO_LARGE {
            warn!("event=api_error module=server status=error error_code=payload_too_large");
            return Self::new(ApiErrorCode::PayloadTooLarge, "request body too large");
        }
        warn!(
            "event=api_error module=server status=error error_code=body_read error={}",
            value.body_text()
        );
        Self::invalid_input("failed to read request body")
    }
}

impl From<ProviderError> for ApiError {
    fn from(value: ProviderError) -> Self {
        match value {
            ProviderError::NotAuthenticated => Self::new(
                ApiErrorCode::AuthorizationFailed,
                "provider is not authenticated",
            ),
            ProviderError::Authorization(_) => {
                warn!("event=api_error module=server status=error error_code=authorization error={value}");
                Self::new(ApiErrorCode::AuthorizationFailed, "authorization failed")
            }
            ProviderError::MissingArg { .. } | ProviderError::InvalidArg { .. } => {
                error!("event=api_error module=server status=error error_code=provider_config error={value}");
                Self::internal()
            }
            other => {
                warn!("event=api_error module=server status=error error_code=upstream error={other}");
                Self::new(ApiErrorCode::UpstreamError, "upstream provider failed")
            }
        }
    }
}
