//! HTTP chokepoint for every API call.
//!
//! SYSTEM CONTEXT
//! ==============
//! All requests go through [`Interceptor::send`], which attaches the bearer
//! token on the way out and turns failures into user notices on the way
//! back. A 401 is the one response with side effects beyond a notice: it
//! clears the session and routes to Login, because the server no longer
//! recognizes the token.
//!
//! ERROR HANDLING
//! ==============
//! The server's `message` wins over the built-in notice text whenever the
//! error body carries one. Non-401 errors never touch the session.

use std::sync::Arc;
use std::time::Duration;

use models::ErrorBody;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::notify::Notifier;
use crate::router::{Navigator, Route};
use crate::session::SessionStore;

pub const API_PREFIX: &str = "/api";

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

pub const SESSION_EXPIRED: &str = "Session expired. Please log in again.";
pub const FORBIDDEN: &str = "You do not have permission to access this resource.";
pub const NOT_FOUND: &str = "The requested resource was not found.";
pub const SERVER_ERROR: &str = "Server error. Please try again later.";
pub const NETWORK_ERROR: &str = "Network error, Please check your connection.";
pub const UNEXPECTED_RESPONSE: &str = "Unexpected response from server.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server root; [`API_PREFIX`] is appended per request.
    pub base_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response arrived (connect failure, timeout, reset).
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
    #[error("{message}")]
    Status { status: u16, message: String, body: Option<ErrorBody> },
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("failed to build http client: {0}")]
    Build(#[source] reqwest::Error),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// First server message for `field`, if the error carried field errors.
    #[must_use]
    pub fn field_error(&self, field: &str) -> Option<&str> {
        match self {
            Self::Status { body: Some(body), .. } => body.field_error(field),
            _ => None,
        }
    }
}

/// Built-in notice text for an error status.
#[must_use]
pub fn default_notice(status: StatusCode) -> String {
    match status.as_u16() {
        401 => SESSION_EXPIRED.to_owned(),
        403 => FORBIDDEN.to_owned(),
        404 => NOT_FOUND.to_owned(),
        500 => SERVER_ERROR.to_owned(),
        other => format!("Error: {other}"),
    }
}

// =============================================================================
// INTERCEPTOR
// =============================================================================

#[derive(Clone)]
pub struct Interceptor {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
}

impl Interceptor {
    /// # Errors
    ///
    /// Returns [`ApiError::Build`] if the TLS backend cannot initialize.
    pub fn new(
        config: &ClientConfig,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(ApiError::Build)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            session,
            navigator,
            notifier,
        })
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.base_url)
    }

    /// Send one request and decode a 2xx JSON body into `T`.
    ///
    /// # Errors
    ///
    /// Every error has already been surfaced through the notifier.
    pub async fn send<T: DeserializeOwned>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T, ApiError> {
        let mut request = self.http.request(method.clone(), self.url(path));
        let sent_token = self.session.token();
        if let Some(token) = &sent_token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(%method, path, error = %e, "request failed without a response");
                self.notifier.notify(NETWORK_ERROR);
                return Err(ApiError::Network(e));
            }
        };

        let status = response.status();
        tracing::debug!(%method, path, status = status.as_u16(), "api response");
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(self.reject(status, &text, sent_token.as_deref()));
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(%method, path, error = %e, "response body cut off");
                self.notifier.notify(NETWORK_ERROR);
                return Err(ApiError::Network(e));
            }
        };
        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(%method, path, error = %e, "response body did not match the expected shape");
            self.notifier.notify(UNEXPECTED_RESPONSE);
            ApiError::Decode(e.to_string())
        })
    }

    /// Build the error for a non-2xx reply. A 401 only clears the session
    /// if it still holds the token the request went out with; a sign-in
    /// that landed in the meantime is left alone.
    fn reject(&self, status: StatusCode, text: &str, sent_token: Option<&str>) -> ApiError {
        let body = serde_json::from_str::<ErrorBody>(text).ok();
        let message = body
            .as_ref()
            .map(|b| b.message.trim())
            .filter(|m| !m.is_empty())
            .map_or_else(|| default_notice(status), str::to_owned);

        if status == StatusCode::UNAUTHORIZED && self.session.token().as_deref() == sent_token {
            self.session.clear_user();
            self.navigator.navigate(Route::Login);
        }
        self.notifier.notify(&message);

        ApiError::Status { status: status.as_u16(), message, body }
    }
}

impl std::fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interceptor")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
