//! Data provider contracts and built-in implementations.
//!
//! # Responsibility
//! - Define the calendar/email capability panes read from.
//! - Provide interchangeable backends: null, demo, JSON file, Gmail API and a
//!   composite joining a provider with a todo source.
//! - Build providers by configured type name through `ProviderFactory`.
//!
//! # Invariants
//! - An empty list is a successful result, never an error.
//! - Provider calls never touch the todo store lock.

pub mod composite;
pub mod demo;
pub mod factory;
pub mod file;
pub mod gmail;
pub mod null;

use crate::model::feed::{Email, Event};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use composite::CompositeProvider;
pub use demo::DemoProvider;
pub use factory::{
    ProviderArgs, ProviderConfig, ProviderConstructor, ProviderFactory, ProviderSet,
    ProvidersConfig,
};
pub use file::JsonFileProvider;
pub use gmail::{GmailConfig, GmailProvider};
pub use null::NullProvider;

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Provider construction and fetch errors.
#[derive(Debug)]
pub enum ProviderError {
    /// No constructor is registered for the configured type name.
    UnknownType(String),
    /// No provider is configured under this name and no default applies.
    NotFound(String),
    /// The configured default provider name does not exist.
    DefaultNotFound(String),
    /// A constructor required an argument that was not supplied.
    MissingArg { provider: &'static str, arg: &'static str },
    /// A constructor argument had the wrong shape.
    InvalidArg { provider: &'static str, arg: &'static str, reason: String },
    /// A data or profile call was made before authorization completed.
    NotAuthenticated,
    /// The authorization handshake failed.
    Authorization(String),
    /// Transport-level failure talking to a remote API.
    Http(String),
    /// Remote API answered with an unexpected status.
    UpstreamStatus { status: u16, body: String },
    /// Local source could not be read or parsed.
    Source(String),
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownType(value) => write!(f, "unknown provider type: {value}"),
            Self::NotFound(value) => {
                write!(f, "provider '{value}' not found and no default configured")
            }
            Self::DefaultNotFound(value) => write!(f, "default provider '{value}' not found"),
            Self::MissingArg { provider, arg } => {
                write!(f, "{provider} provider requires `{arg}`")
            }
            Self::InvalidArg {
                provider,
                arg,
                reason,
            } => write!(f, "{provider} provider argument `{arg}` is invalid: {reason}"),
            Self::NotAuthenticated => write!(f, "provider is not authenticated"),
            Self::Authorization(reason) => write!(f, "authorization failed: {reason}"),
            Self::Http(reason) => write!(f, "remote request failed: {reason}"),
            Self::UpstreamStatus { status, body } => {
                write!(f, "remote API returned status {status}: {body}")
            }
            Self::Source(reason) => write!(f, "provider source unavailable: {reason}"),
        }
    }
}

impl Error for ProviderError {}

impl From<reqwest::Error> for ProviderError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value.to_string())
    }
}

/// Calendar and email source used by panes.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Stable type name, matching the factory registration.
    fn kind(&self) -> &'static str;

    async fn calendar_events(&self) -> ProviderResult<Vec<Event>>;

    async fn emails(&self) -> ProviderResult<Vec<Email>>;

    /// Authorization handshake, for providers that need one.
    fn oauth(&self) -> Option<&dyn OAuthFlow> {
        None
    }
}

/// Signed-in account summary returned by remote providers.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AccountInfo {
    pub email: String,
    pub messages_total: Option<u64>,
}

/// OAuth2 authorization-code handshake exposed by remote providers.
#[async_trait]
pub trait OAuthFlow: Send + Sync {
    fn is_authenticated(&self) -> bool;

    /// Consent URL the user must visit; `state` is echoed back on redirect.
    fn authorization_url(&self, state: &str) -> ProviderResult<String>;

    /// Exchanges an authorization code for tokens.
    async fn complete_authorization(&self, code: &str) -> ProviderResult<()>;

    async fn user_info(&self) -> ProviderResult<AccountInfo>;
}
