//! Gmail-API-backed provider.
//!
//! # Responsibility
//! - Run the OAuth2 authorization-code handshake against Google endpoints.
//! - Fetch the most recent inbox messages and translate them into `Email`.
//!
//! # Invariants
//! - Data calls fail with `NotAuthenticated` until an access token exists.
//! - One malformed or unreachable message never aborts the whole fetch; it is
//!   logged and skipped.
//! - Token values are never logged.
//! - Concurrent 401s trigger at most one refresh per rejected token.

use super::factory::ProviderArgs;
use super::{AccountInfo, DataProvider, OAuthFlow, ProviderError, ProviderResult};
use crate::model::feed::{Email, Event};
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt::{Debug, Formatter};
use std::sync::RwLock;
use std::time::Duration;
use tokio::sync::Mutex;

const PROVIDER_NAME: &str = "gmail";
const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_API_BASE_URL: &str = "https://gmail.googleapis.com";
const GMAIL_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";
const DEFAULT_MAX_RESULTS: u32 = 10;
const MAX_RESULTS_CAP: u32 = 20;
const PREVIEW_MAX_CHARS: usize = 100;
const MAX_ERROR_BODY_CHARS: usize = 200;
const NO_PREVIEW: &str = "No preview available";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Construction parameters for `GmailProvider`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct GmailConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub auth_url: String,
    pub token_url: String,
    pub api_base_url: String,
    pub max_results: u32,
}

impl GmailConfig {
    /// Config with Google's public endpoints and the default page size.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: None,
            access_token: None,
            refresh_token: None,
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Reads the config from factory arguments.
    ///
    /// # Errors
    /// - `client_id` or `client_secret` missing or blank.
    /// - Any present argument with a non-string value (`max_results` must be
    ///   a positive integer).
    pub fn from_args(args: &ProviderArgs) -> ProviderResult<Self> {
        let client_id = required_string(args, "client_id")?;
        let client_secret = required_string(args, "client_secret")?;
        let mut config = Self::new(client_id, client_secret);
        config.redirect_uri = optional_string(args, "redirect_uri")?;
        config.access_token = optional_string(args, "access_token")?;
        config.refresh_token = optional_string(args, "refresh_token")?;
        if let Some(value) = optional_string(args, "auth_url")? {
            config.auth_url = value;
        }
        if let Some(value) = optional_string(args, "token_url")? {
            config.token_url = value;
        }
        if let Some(value) = optional_string(args, "api_base_url")? {
            config.api_base_url = value;
        }
        if let Some(value) = args.get("max_results") {
            let max = value
                .as_u64()
                .filter(|max| *max > 0)
                .ok_or_else(|| ProviderError::InvalidArg {
                    provider: PROVIDER_NAME,
                    arg: "max_results",
                    reason: "expected a positive integer".to_string(),
                })?;
            config.max_results = u32::try_from(max).unwrap_or(MAX_RESULTS_CAP);
        }
        Ok(config)
    }
}

impl Debug for GmailConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GmailConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(Some(&self.client_secret)))
            .field("redirect_uri", &self.redirect_uri)
            .field("access_token", &redact(self.access_token.as_ref()))
            .field("refresh_token", &redact(self.refresh_token.as_ref()))
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .field("api_base_url", &self.api_base_url)
            .field("max_results", &self.max_results)
            .finish()
    }
}

fn redact(secret: Option<&String>) -> Option<&'static str> {
    secret.map(|_| "<redacted>")
}

fn required_string(args: &ProviderArgs, arg: &'static str) -> ProviderResult<String> {
    optional_string(args, arg)?.ok_or(ProviderError::MissingArg {
        provider: PROVIDER_NAME,
        arg,
    })
}

fn optional_string(args: &ProviderArgs, arg: &'static str) -> ProviderResult<Option<String>> {
    match args.get(arg) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(value)) => {
            let trimmed = value.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Some(_) => Err(ProviderError::InvalidArg {
            provider: PROVIDER_NAME,
            arg,
            reason: "expected a string".to_string(),
        }),
    }
}

#[derive(Clone, Default)]
struct Tokens {
    access: Option<String>,
    refresh: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    #[serde(default)]
    messages: Vec<MessageRef>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailMessage {
    id: String,
    #[serde(default)]
    label_ids: Vec<String>,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    internal_date: Option<String>,
    #[serde(default)]
    payload: Option<MessagePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessagePart {
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    headers: Vec<Header>,
    #[serde(default)]
    body: Option<PartBody>,
    #[serde(default)]
    parts: Vec<MessagePart>,
}

#[derive(Debug, Deserialize)]
struct Header {
    name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct PartBody {
    #[serde(default)]
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Profile {
    email_address: String,
    #[serde(default)]
    messages_total: Option<u64>,
}

/// Read-only Gmail inbox provider.
pub struct GmailProvider {
    config: GmailConfig,
    client: reqwest::Client,
    tokens: RwLock<Tokens>,
    refresh_gate: Mutex<()>,
}

impl GmailProvider {
    /// Builds the provider; tokens from `config` make it authenticated
    /// immediately.
    pub fn new(config: GmailConfig) -> ProviderResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let tokens = Tokens {
            access: config.access_token.clone(),
            refresh: config.refresh_token.clone(),
        };
        Ok(Self {
            config,
            client,
            tokens: RwLock::new(tokens),
            refresh_gate: Mutex::new(()),
        })
    }

    pub fn from_args(args: &ProviderArgs) -> ProviderResult<Self> {
        Self::new(GmailConfig::from_args(args)?)
    }

    fn access_token(&self) -> ProviderResult<String> {
        self.tokens
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .access
            .clone()
            .ok_or(ProviderError::NotAuthenticated)
    }

    fn refresh_token(&self) -> Option<String> {
        self.tokens
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .refresh
            .clone()
    }

    fn store_tokens(&self, response: TokenResponse) {
        let mut tokens = self
            .tokens
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        tokens.access = Some(response.access_token);
        if response.refresh_token.is_some() {
            tokens.refresh = response.refresh_token;
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!(
            "{}/gmail/v1/users/me/{}",
            self.config.api_base_url.trim_end_matches('/'),
            path
        )
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> ProviderResult<TokenResponse> {
        let response = self
            .client
            .post(&self.config.token_url)
            .form(form)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Authorization(format!(
                "token endpoint returned status {}",
                status.as_u16()
            )));
        }
        Ok(response.json::<TokenResponse>().await?)
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> ProviderResult<()> {
        let response = self
            .request_token(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .await?;
        self.store_tokens(response);
        info!("event=oauth_refresh module=provider provider=gmail status=ok");
        Ok(())
    }

    /// Refreshes after `rejected` got a 401, unless another request already
    /// replaced it. Returns `false` when no refresh token is available.
    async fn refresh_after_rejection(&self, rejected: &str) -> ProviderResult<bool> {
        let _gate = self.refresh_gate.lock().await;
        if self.access_token().ok().as_deref() != Some(rejected) {
            return Ok(true);
        }
        let Some(refresh_token) = self.refresh_token() else {
            return Ok(false);
        };
        self.refresh_access_token(&refresh_token).await?;
        Ok(true)
    }

    /// GETs one API resource, refreshing the access token once on 401.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> ProviderResult<T> {
        let mut refreshed = false;
        loop {
            let token = self.access_token()?;
            let response = self
                .client
                .get(url)
                .query(query)
                .bearer_auth(&token)
                .send()
                .await?;
            let status = response.status();
            if status == StatusCode::UNAUTHORIZED
                && !refreshed
                && self.refresh_after_rejection(&token).await?
            {
                refreshed = true;
                continue;
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ProviderError::UpstreamStatus {
                    status: status.as_u16(),
                    body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
                });
            }
            return Ok(response.json::<T>().await?);
        }
    }

    async fn fetch_message(&self, id: &str) -> ProviderResult<GmailMessage> {
        self.get_json(
            &self.api_url(&format!("messages/{id}")),
            &[("format", "full".to_string())],
        )
        .await
    }

    fn page_size(&self) -> u32 {
        self.config.max_results.clamp(1, MAX_RESULTS_CAP)
    }
}

#[async_trait]
impl DataProvider for GmailProvider {
    fn kind(&self) -> &'static str {
        PROVIDER_NAME
    }

    /// Gmail carries no calendar data; authenticated callers get an empty list.
    async fn calendar_events(&self) -> ProviderResult<Vec<Event>> {
        self.access_token()?;
        Ok(Vec::new())
    }

    async fn emails(&self) -> ProviderResult<Vec<Email>> {
        let list: MessageList = self
            .get_json(
                &self.api_url("messages"),
                &[
                    ("q", "in:inbox".to_string()),
                    ("maxResults", self.page_size().to_string()),
                ],
            )
            .await?;

        let fetched = join_all(
            list.messages
                .iter()
                .map(|message| self.fetch_message(&message.id)),
        )
        .await;

        let mut emails = Vec::with_capacity(fetched.len());
        for (reference, result) in list.messages.iter().zip(fetched) {
            match result.and_then(|message| {
                translate_message(message).map_err(ProviderError::Source)
            }) {
                Ok(email) => emails.push(email),
                Err(err) => warn!(
                    "event=gmail_message module=provider provider=gmail status=skipped message_id={} error={}",
                    reference.id, err
                ),
            }
        }
        Ok(emails)
    }

    fn oauth(&self) -> Option<&dyn OAuthFlow> {
        Some(self)
    }
}

#[async_trait]
impl OAuthFlow for GmailProvider {
    fn is_authenticated(&self) -> bool {
        self.access_token().is_ok()
    }

    fn authorization_url(&self, state: &str) -> ProviderResult<String> {
        let redirect_uri =
            self.config
                .redirect_uri
                .as_deref()
                .ok_or(ProviderError::MissingArg {
                    provider: PROVIDER_NAME,
                    arg: "redirect_uri",
                })?;
        let url = Url::parse_with_params(
            &self.config.auth_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("response_type", "code"),
                ("scope", GMAIL_READONLY_SCOPE),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("state", state),
            ],
        )
        .map_err(|err| ProviderError::InvalidArg {
            provider: PROVIDER_NAME,
            arg: "auth_url",
            reason: err.to_string(),
        })?;
        Ok(url.to_string())
    }

    async fn complete_authorization(&self, code: &str) -> ProviderResult<()> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ProviderError::Authorization(
                "authorization code is empty".to_string(),
            ));
        }
        let redirect_uri = self.config.redirect_uri.as_deref().unwrap_or_default();
        let response = self
            .request_token(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .await?;
        self.store_tokens(response);
        info!("event=oauth_complete module=provider provider=gmail status=ok");
        Ok(())
    }

    async fn user_info(&self) -> ProviderResult<AccountInfo> {
        let profile: Profile = self.get_json(&self.api_url("profile"), &[]).await?;
        Ok(AccountInfo {
            email: profile.email_address,
            messages_total: profile.messages_total,
        })
    }
}

fn translate_message(message: GmailMessage) -> Result<Email, String> {
    let internal_date = message
        .internal_date
        .as_deref()
        .ok_or_else(|| "message has no internalDate".to_string())?;
    let millis = internal_date
        .parse::<i64>()
        .map_err(|_| format!("invalid internalDate `{internal_date}`"))?;
    let time = DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| format!("internalDate out of range `{internal_date}`"))?;
    let payload = message
        .payload
        .ok_or_else(|| "message has no payload".to_string())?;

    let mut subject = String::new();
    let mut from = String::new();
    for header in &payload.headers {
        if header.name.eq_ignore_ascii_case("subject") {
            subject = header.value.clone();
        } else if header.name.eq_ignore_ascii_case("from") {
            from = header.value.clone();
        }
    }

    let preview = plain_text_preview(&payload)
        .or_else(|| {
            let snippet = collapse_whitespace(&message.snippet);
            (!snippet.is_empty()).then(|| truncate_preview(&snippet))
        })
        .unwrap_or_else(|| NO_PREVIEW.to_string());

    Ok(Email {
        id: message.id,
        subject,
        from,
        preview,
        time,
        read: !message.label_ids.iter().any(|label| label == "UNREAD"),
    })
}

/// First decodable `text/plain` part, depth-first.
fn plain_text_preview(part: &MessagePart) -> Option<String> {
    if part.mime_type == "text/plain" {
        if let Some(data) = part.body.as_ref().and_then(|body| body.data.as_deref()) {
            if let Some(text) = decode_base64_url(data) {
                let text = collapse_whitespace(&text);
                if !text.is_empty() {
                    return Some(truncate_preview(&text));
                }
            }
        }
    }
    part.parts.iter().find_map(plain_text_preview)
}

fn decode_base64_url(data: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(data.trim_end_matches('=')).ok()?;
    String::from_utf8(bytes).ok()
}

fn collapse_whitespace(value: &str) -> String {
    WHITESPACE_RE.replace_all(value.trim(), " ").into_owned()
}

fn truncate_preview(value: &str) -> String {
    if value.chars().count() <= PREVIEW_MAX_CHARS {
        return value.to_string();
    }
    let mut truncated = value.chars().take(PREVIEW_MAX_CHARS).collect::<String>();
    truncated.push_str("...");
    truncated
}
