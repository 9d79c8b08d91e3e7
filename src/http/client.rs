//! Authenticated HTTP transport for the Conversion Tools API.
//!
//! [`HttpTransport`] issues every API call: it attaches the bearer token and
//! User-Agent, applies the per-request timeout, retries transient failures
//! through [`RetryPolicy`], records quota headers and maps error responses to
//! [`ApiError`] variants.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderName, HeaderValue, USER_AGENT};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use super::constants::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use super::rate_limits::RateLimits;
use super::retry::RetryPolicy;
use crate::error::ApiError;
use crate::user_agent;

/// Settings for [`HttpTransport`].
#[derive(Clone)]
pub struct TransportConfig {
    /// Bearer token sent on every request.
    pub api_token: String,
    /// API root, e.g. `https://api.conversiontools.io/v1`.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retry behavior for failed requests.
    pub retry: RetryPolicy,
    /// User-Agent header value.
    pub user_agent: String,
}

impl fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportConfig")
            .field("api_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl TransportConfig {
    /// Creates a configuration with default endpoint, timeout and retry policy.
    #[must_use]
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            user_agent: user_agent::default_user_agent(),
        }
    }
}

/// An in-memory file to send as a multipart upload.
///
/// Kept as [`Bytes`] so every retry attempt can rebuild the form cheaply.
#[derive(Debug, Clone)]
pub struct UploadPayload {
    /// Multipart field name.
    pub field: &'static str,
    /// File name reported to the server.
    pub file_name: String,
    /// File content.
    pub data: Bytes,
}

/// Request body variants.
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// No body.
    Empty,
    /// JSON body (sent with `Content-Type: application/json`).
    Json(Value),
    /// Multipart form upload.
    Multipart(UploadPayload),
}

/// A single API call, relative to the transport's base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: RequestBody,
    headers: Vec<(HeaderName, HeaderValue)>,
    check_error_field: bool,
}

impl ApiRequest {
    /// Creates a request with no body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: RequestBody::Empty,
            headers: Vec::new(),
            check_error_field: true,
        }
    }

    /// Creates a `GET` request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Creates a `POST` request with a JSON body.
    #[must_use]
    pub fn post_json(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).body(RequestBody::Json(body))
    }

    /// Creates a `POST` request with a multipart upload body.
    #[must_use]
    pub fn post_multipart(path: impl Into<String>, payload: UploadPayload) -> Self {
        Self::new(Method::POST, path).body(RequestBody::Multipart(payload))
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Adds an extra header.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.push((name, value));
        self
    }

    /// Accepts a non-null `error` field in a 2xx JSON body as data.
    ///
    /// Task status responses use `error` for the task's own failure text,
    /// which is not a request failure.
    #[must_use]
    pub fn allow_error_field(mut self) -> Self {
        self.check_error_field = false;
        self
    }

    /// The request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }
}

/// HTTP transport shared by the files, tasks and config collaborators.
///
/// Cloning is cheap: clones share the connection pool and the last-known
/// rate limit snapshot.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: Arc<TransportConfig>,
    rate_limits: Arc<RwLock<Option<RateLimits>>>,
}

impl HttpTransport {
    /// Creates a transport.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] if the token is empty or the
    /// User-Agent is not a valid header value, and [`ApiError::Network`] if
    /// the underlying client cannot be built.
    pub fn new(config: TransportConfig) -> Result<Self, ApiError> {
        crate::validation::validate_api_token(&config.api_token)?;
        HeaderValue::from_str(&config.user_agent)
            .map_err(|_| ApiError::validation("User-Agent is not a valid header value"))?;

        let client = Client::builder()
            .gzip(true)
            .build()
            .map_err(ApiError::network)?;

        Ok(Self {
            client,
            config: Arc::new(config),
            rate_limits: Arc::new(RwLock::new(None)),
        })
    }

    /// Returns the transport configuration.
    #[must_use]
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Returns the most recent quota snapshot, if any response carried one.
    #[must_use]
    pub fn rate_limits(&self) -> Option<RateLimits> {
        self.rate_limits
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sends a request and returns the raw response (used for downloads).
    ///
    /// The timeout covers the wait for response headers only; reading the
    /// body is unbounded.
    ///
    /// # Errors
    ///
    /// Returns the mapped [`ApiError`] of the last attempt.
    #[instrument(skip(self, request, cancel), fields(method = %request.method, path = %request.path))]
    pub async fn send(
        &self,
        request: &ApiRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<Response, ApiError> {
        self.config
            .retry
            .run(cancel, move |attempt| {
                self.attempt(request, cancel, attempt, Deadline::Headers)
            })
            .await
    }

    /// Sends a request and deserializes its JSON body.
    ///
    /// # Errors
    ///
    /// Returns the mapped [`ApiError`] of the last attempt, including
    /// [`ApiError::Api`] with code `API_ERROR` for a 2xx body whose `error`
    /// field is set.
    #[instrument(skip(self, request, cancel), fields(method = %request.method, path = %request.path))]
    pub async fn json<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<T, ApiError> {
        self.config
            .retry
            .run(cancel, move |attempt| async move {
                let response = self
                    .attempt(request, cancel, attempt, Deadline::WholeResponse)
                    .await?;
                decode_json(response, request.check_error_field, self.config.timeout).await
            })
            .await
    }

    async fn attempt(
        &self,
        request: &ApiRequest,
        cancel: Option<&CancellationToken>,
        attempt: u32,
        deadline: Deadline,
    ) -> Result<Response, ApiError> {
        let url = format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            request.path
        );
        debug!(attempt, %url, "sending request");

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .bearer_auth(&self.config.api_token)
            .header(USER_AGENT, &self.config.user_agent);
        if deadline == Deadline::WholeResponse {
            builder = builder.timeout(self.config.timeout);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.clone(), value.clone());
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(payload) => {
                let length = payload.data.len() as u64;
                let part = Part::stream_with_length(Body::from(payload.data.clone()), length)
                    .file_name(payload.file_name.clone());
                builder.multipart(Form::new().part(payload.field, part))
            }
        };

        let timeout = self.config.timeout;
        let send = async move {
            match tokio::time::timeout(timeout, builder.send()).await {
                Ok(result) => result.map_err(|error| transfer_error(error, timeout)),
                Err(_) => Err(timeout_error(timeout)),
            }
        };
        let response = match cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => {
                        return Err(ApiError::timeout("request aborted", None));
                    }
                    result = send => result,
                }
            }
            None => send.await,
        }?;

        self.record_rate_limits(&response);

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        Err(self.error_from_response(status, response).await)
    }

    fn record_rate_limits(&self, response: &Response) {
        if let Some(limits) = RateLimits::from_headers(response.headers()) {
            debug!(?limits, "rate limits updated");
            *self
                .rate_limits
                .write()
                .unwrap_or_else(PoisonError::into_inner) = Some(limits);
        }
    }

    async fn error_from_response(&self, status: StatusCode, response: Response) -> ApiError {
        let reason = status.canonical_reason().unwrap_or("Unknown Status");
        let body = match response.bytes().await {
            Ok(bytes) => serde_json::from_slice::<Value>(&bytes).ok(),
            Err(error) => {
                warn!(%error, "failed to read error response body");
                None
            }
        };
        // An empty message lets from_status pick its own 429 default.
        let message = body.as_ref().and_then(error_field).unwrap_or_else(|| {
            if status == StatusCode::TOO_MANY_REQUESTS {
                String::new()
            } else {
                reason.to_string()
            }
        });

        debug!(status = status.as_u16(), %message, "request failed");
        ApiError::from_status(status.as_u16(), message, body, self.rate_limits())
    }
}

/// How much of an exchange the per-request timeout covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deadline {
    /// Until the response headers arrive.
    Headers,
    /// Until the body has been read as well.
    WholeResponse,
}

fn timeout_error(timeout: Duration) -> ApiError {
    ApiError::timeout(
        format!("request timed out after {}ms", timeout.as_millis()),
        Some(timeout),
    )
}

/// Maps a reqwest failure, recognizing an elapsed request timeout.
fn transfer_error(error: reqwest::Error, timeout: Duration) -> ApiError {
    if error.is_timeout() {
        timeout_error(timeout)
    } else {
        ApiError::network(error)
    }
}

async fn decode_json<T: DeserializeOwned>(
    response: Response,
    check_error_field: bool,
    timeout: Duration,
) -> Result<T, ApiError> {
    let status = response.status().as_u16();
    let bytes = response
        .bytes()
        .await
        .map_err(|error| transfer_error(error, timeout))?;
    let value: Value = serde_json::from_slice(&bytes).map_err(|e| ApiError::Api {
        message: format!("invalid JSON response: {e}"),
        code: "API_ERROR",
        status: Some(status),
        response: None,
    })?;

    if check_error_field && let Some(message) = error_field(&value) {
        return Err(ApiError::logical(message, status, Some(value)));
    }

    serde_json::from_value(value.clone()).map_err(|e| match error_field(&value) {
        Some(message) => ApiError::logical(message, status, Some(value)),
        None => ApiError::Api {
            message: format!("unexpected response shape: {e}"),
            code: "API_ERROR",
            status: Some(status),
            response: Some(value),
        },
    })
}

/// Extracts a non-null, non-empty `error` field as a message.
fn error_field(body: &Value) -> Option<String> {
    match body.get("error")? {
        Value::Null => None,
        Value::String(message) if message.is_empty() => None,
        Value::String(message) => Some(message.clone()),
        Value::Bool(false) => None,
        other => Some(other.to_string()),
    }
}
