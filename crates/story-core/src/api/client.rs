//! HTTP client wrapper for the Story API.
//!
//! Attaches the session's bearer token, normalizes every failure into an
//! [`ApiError`], and tears the session down when the server answers 401.
//! No retries happen here.

use std::time::Duration;

use reqwest::multipart::Form;
use reqwest::{Client, Method, Request, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::error::{ApiError, ApiResult};
use crate::auth::SessionStore;
use crate::config::Config;
use crate::signals::{Signal, SignalBus};

/// Standard User-Agent header for Story API requests.
pub const USER_AGENT: &str = concat!("story/", env!("CARGO_PKG_VERSION"));

/// Request payload.
#[derive(Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(Form),
}

/// Per-call options for [`ApiClient::request`].
#[derive(Debug, Default)]
pub struct RequestOptions {
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl RequestOptions {
    pub fn json(body: Value) -> Self {
        Self {
            query: Vec::new(),
            body: RequestBody::Json(body),
        }
    }

    pub fn multipart(form: Form) -> Self {
        Self {
            query: Vec::new(),
            body: RequestBody::Multipart(form),
        }
    }

    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }
}

/// Status envelope the Story API wraps around every response.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    error: bool,
}

pub struct ApiClient {
    http: Client,
    base_url: String,
    session: SessionStore,
    signals: SignalBus,
}

impl ApiClient {
    /// Builds a client for `base_url` with a fixed per-call timeout.
    ///
    /// # Errors
    /// Returns an error if the base URL is malformed or the HTTP client
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        session: SessionStore,
        signals: SignalBus,
    ) -> anyhow::Result<Self> {
        use anyhow::Context;

        let trimmed = base_url.trim().trim_end_matches('/');
        Url::parse(trimmed).with_context(|| format!("Invalid Story API base URL: {base_url}"))?;

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: trimmed.to_string(),
            session,
            signals,
        })
    }

    /// Builds a client using the resolved base URL and timeout from config.
    ///
    /// # Errors
    /// Returns an error if the resolved base URL is invalid.
    pub fn from_config(
        config: &Config,
        session: SessionStore,
        signals: SignalBus,
    ) -> anyhow::Result<Self> {
        let base_url = config.resolve_base_url()?;
        Self::new(&base_url, config.timeout(), session, signals)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn signals(&self) -> &SignalBus {
        &self.signals
    }

    /// Dispatches one request and returns the response body unchanged.
    ///
    /// # Errors
    /// Every failure is returned as an [`ApiError`]:
    /// - server status outside 2xx: `API_ERROR` with that status
    /// - no response (connect failure, timeout): `NETWORK_ERROR`, status 0
    /// - request not constructible: `UNKNOWN_ERROR`, status 0
    ///
    /// A 401 additionally clears the session and emits
    /// [`Signal::AuthFailed`] once.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> ApiResult<Value> {
        let (_, body) = self.dispatch(method, path, options).await?;
        Ok(body)
    }

    /// Like [`request`](Self::request), decoding the body into `T`.
    ///
    /// A 2xx body whose envelope reports `error: true` is rejected as
    /// `API_ERROR` with the envelope message.
    ///
    /// # Errors
    /// Returns an [`ApiError`] on any failure, including decode failures.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> ApiResult<T> {
        let (status, body) = self.dispatch(method, path, options).await?;

        if let Ok(envelope) = Envelope::deserialize(&body)
            && envelope.error
        {
            return Err(ApiError::server(status.as_u16(), Some(body)));
        }

        serde_json::from_value(body).map_err(|err| ApiError::decode(status.as_u16(), err))
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> ApiResult<(StatusCode, Value)> {
        let request = self.build_request(method, path, options)?;
        let method = request.method().clone();
        tracing::debug!(%method, path, "api request");

        let response = self.http.execute(request).await.map_err(|err| {
            tracing::warn!(%method, path, error = %err, "api request failed without response");
            transport_error(err)
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(ApiError::network)?;

        if status.is_success() {
            tracing::debug!(%method, path, status = status.as_u16(), "api response");
            if bytes.is_empty() {
                return Ok((status, Value::Null));
            }
            return serde_json::from_slice(&bytes)
                .map(|body| (status, body))
                .map_err(|err| ApiError::decode(status.as_u16(), err));
        }

        tracing::warn!(%method, path, status = status.as_u16(), "api error response");
        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized();
        }

        let data = serde_json::from_slice::<Value>(&bytes).ok();
        Err(ApiError::server(status.as_u16(), data))
    }

    fn build_request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> ApiResult<Request> {
        let url = self.endpoint(path)?;

        let mut builder = self
            .http
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        if let Some(token) = self.session.token() {
            builder = builder.bearer_auth(token);
        }
        builder = match options.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        builder
            .build()
            .map_err(|err| ApiError::unknown(err.to_string()).with_original(err))
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        let joined = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Url::parse(&joined).map_err(|err| ApiError::unknown(err.to_string()).with_original(err))
    }

    fn handle_unauthorized(&self) {
        tracing::warn!("Authentication failed. Please login again.");
        if let Err(err) = self.session.clear() {
            tracing::warn!(error = %err, "failed to clear persisted session");
        }
        self.signals.emit(Signal::auth_failed());
    }
}

fn transport_error(err: reqwest::Error) -> ApiError {
    if err.is_builder() {
        ApiError::unknown(err.to_string()).with_original(err)
    } else {
        ApiError::network(err)
    }
}
