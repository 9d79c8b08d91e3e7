//! Client configuration.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ApiError;
use crate::http::{
    DEFAULT_BASE_URL, DEFAULT_RETRIES, DEFAULT_RETRY_DELAY, DEFAULT_RETRYABLE_STATUSES,
    DEFAULT_TIMEOUT, RetryPolicy, RetryPredicate, TransportConfig,
};
use crate::polling::{
    DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_MAX_POLLING_INTERVAL, DEFAULT_POLLING_INTERVAL,
    PollOptions,
};
use crate::progress::{ConversionProgressCallback, ProgressCallback};
use crate::user_agent::default_user_agent;

/// Environment variable holding the API token.
pub const API_TOKEN_ENV: &str = "CONVERSIONTOOLS_API_TOKEN";

/// Environment variable overriding the API root.
pub const BASE_URL_ENV: &str = "CONVERSIONTOOLS_BASE_URL";

/// Settings for [`ConversionClient`](crate::ConversionClient).
///
/// Only `api_token` is required; [`ClientConfig::new`] fills in the rest.
#[derive(Clone)]
pub struct ClientConfig {
    /// Bearer token.
    pub api_token: String,
    /// API root.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retries after the initial attempt.
    pub retries: u32,
    /// Delay before the first retry; doubles for each further retry.
    pub retry_delay: Duration,
    /// Statuses that qualify for a retry.
    pub retryable_statuses: Vec<u16>,
    /// Custom retry predicate, consulted instead of the built-in rules.
    pub should_retry: Option<RetryPredicate>,
    /// Initial delay between task status checks.
    pub polling_interval: Duration,
    /// Upper bound on the delay between status checks.
    pub max_polling_interval: Duration,
    /// Growth factor for the status check delay.
    pub polling_backoff: f64,
    /// Default `callbackUrl` for created tasks.
    pub webhook_url: Option<String>,
    /// User-Agent header value.
    pub user_agent: String,
    /// Upload progress for [`convert`](crate::ConversionClient::convert).
    pub on_upload_progress: Option<ProgressCallback>,
    /// Download progress for [`convert`](crate::ConversionClient::convert).
    pub on_download_progress: Option<ProgressCallback>,
    /// Conversion progress for [`convert`](crate::ConversionClient::convert).
    pub on_conversion_progress: Option<ConversionProgressCallback>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("retries", &self.retries)
            .field("retry_delay", &self.retry_delay)
            .field("retryable_statuses", &self.retryable_statuses)
            .field("should_retry", &self.should_retry.is_some())
            .field("polling_interval", &self.polling_interval)
            .field("max_polling_interval", &self.max_polling_interval)
            .field("polling_backoff", &self.polling_backoff)
            .field("webhook_url", &self.webhook_url)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl ClientConfig {
    /// Default configuration for `api_token`.
    #[must_use]
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            retryable_statuses: DEFAULT_RETRYABLE_STATUSES.to_vec(),
            should_retry: None,
            polling_interval: DEFAULT_POLLING_INTERVAL,
            max_polling_interval: DEFAULT_MAX_POLLING_INTERVAL,
            polling_backoff: DEFAULT_BACKOFF_MULTIPLIER,
            webhook_url: None,
            user_agent: default_user_agent(),
            on_upload_progress: None,
            on_download_progress: None,
            on_conversion_progress: None,
        }
    }

    /// Reads `CONVERSIONTOOLS_API_TOKEN` and optionally `CONVERSIONTOOLS_BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] if the token variable is unset or empty.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let token = lookup(API_TOKEN_ENV)
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| ApiError::validation(format!("{API_TOKEN_ENV} is not set")))?;
        let mut config = Self::new(token);
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|url| !url.is_empty()) {
            config.base_url = base_url;
        }
        Ok(config)
    }

    pub(crate) fn retry_policy(&self) -> RetryPolicy {
        let policy = RetryPolicy::new(
            self.retries,
            self.retry_delay,
            self.retryable_statuses.clone(),
        );
        match &self.should_retry {
            Some(predicate) => policy.with_predicate(Arc::clone(predicate)),
            None => policy,
        }
    }

    pub(crate) fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            api_token: self.api_token.clone(),
            base_url: self.base_url.clone(),
            timeout: self.timeout,
            retry: self.retry_policy(),
            user_agent: self.user_agent.clone(),
        }
    }

    pub(crate) fn poll_options(&self) -> PollOptions {
        PollOptions {
            interval: self.polling_interval,
            max_interval: self.max_polling_interval,
            backoff_multiplier: self.polling_backoff,
            timeout: None,
        }
    }
}

/// Builder for [`ConversionClient`](crate::ConversionClient).
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    /// Starts from the default configuration.
    #[must_use]
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            config: ClientConfig::new(api_token),
        }
    }

    /// Starts from an existing configuration.
    #[must_use]
    pub fn from_config(config: ClientConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    #[must_use]
    pub fn retries(mut self, retries: u32) -> Self {
        self.config.retries = retries;
        self
    }

    #[must_use]
    pub fn retry_delay(mut self, retry_delay: Duration) -> Self {
        self.config.retry_delay = retry_delay;
        self
    }

    #[must_use]
    pub fn retryable_statuses(mut self, statuses: Vec<u16>) -> Self {
        self.config.retryable_statuses = statuses;
        self
    }

    /// Replaces the built-in retry rules with `predicate`.
    #[must_use]
    pub fn should_retry(mut self, predicate: RetryPredicate) -> Self {
        self.config.should_retry = Some(predicate);
        self
    }

    #[must_use]
    pub fn polling_interval(mut self, interval: Duration) -> Self {
        self.config.polling_interval = interval;
        self
    }

    #[must_use]
    pub fn max_polling_interval(mut self, interval: Duration) -> Self {
        self.config.max_polling_interval = interval;
        self
    }

    #[must_use]
    pub fn polling_backoff(mut self, multiplier: f64) -> Self {
        self.config.polling_backoff = multiplier;
        self
    }

    #[must_use]
    pub fn webhook_url(mut self, url: impl Into<String>) -> Self {
        self.config.webhook_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn on_upload_progress(mut self, callback: ProgressCallback) -> Self {
        self.config.on_upload_progress = Some(callback);
        self
    }

    #[must_use]
    pub fn on_download_progress(mut self, callback: ProgressCallback) -> Self {
        self.config.on_download_progress = Some(callback);
        self
    }

    #[must_use]
    pub fn on_conversion_progress(mut self, callback: ConversionProgressCallback) -> Self {
        self.config.on_conversion_progress = Some(callback);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for an empty token.
    pub fn build(self) -> Result<crate::ConversionClient, ApiError> {
        crate::ConversionClient::with_config(self.config)
    }
}
