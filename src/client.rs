//! Top-level Conversion Tools client.
//!
//! [`ConversionClient`] wires the transport to the files, tasks and account
//! collaborators and offers [`convert`](ConversionClient::convert), the
//! one-call upload → create → wait → download workflow.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{info, instrument};

use crate::api::{Account, Files, Tasks};
use crate::config::{ClientBuilder, ClientConfig};
use crate::conversions::OptionBag;
use crate::error::ApiError;
use crate::http::{HttpTransport, RateLimits};
use crate::input::{ConversionInput, ResolvedInput};
use crate::task::{Task, WaitOptions};
use crate::types::{ApiConfig, CreateTaskRequest, UserInfo};
use crate::validation::validate_conversion_type;

/// A [`ConversionClient::convert`] call.
#[derive(Debug)]
pub struct ConvertRequest {
    /// Conversion type, e.g. `convert.xml_to_csv`.
    pub conversion_type: String,
    /// What to convert.
    pub input: ConversionInput,
    /// Output path; the server-provided name is used when unset.
    pub output: Option<PathBuf>,
    /// Conversion options. `file_id` or `url` is filled in from the input.
    pub options: OptionBag,
    /// Wait for completion and download; otherwise return after submission.
    pub wait: bool,
    /// Webhook for this task; falls back to the client's `webhook_url`.
    pub callback_url: Option<String>,
    /// Overrides the client's polling interval.
    pub polling_interval: Option<Duration>,
    /// Overrides the client's maximum polling interval.
    pub max_polling_interval: Option<Duration>,
    /// Overall wait budget; unset waits indefinitely.
    pub timeout: Option<Duration>,
}

impl ConvertRequest {
    /// A waiting conversion with no options.
    pub fn new(conversion_type: impl Into<String>, input: impl Into<ConversionInput>) -> Self {
        Self {
            conversion_type: conversion_type.into(),
            input: input.into(),
            output: None,
            options: OptionBag::new(),
            wait: true,
            callback_url: None,
            polling_interval: None,
            max_polling_interval: None,
            timeout: None,
        }
    }

    #[must_use]
    pub fn output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    #[must_use]
    pub fn options(mut self, options: OptionBag) -> Self {
        self.options = options;
        self
    }

    /// Sets a single option.
    #[must_use]
    pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Returns after task creation instead of waiting.
    #[must_use]
    pub fn no_wait(mut self) -> Self {
        self.wait = false;
        self
    }

    #[must_use]
    pub fn callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval = Some(interval);
        self
    }

    #[must_use]
    pub fn max_polling_interval(mut self, interval: Duration) -> Self {
        self.max_polling_interval = Some(interval);
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Result of [`ConversionClient::convert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertOutcome {
    /// The task was created and not awaited.
    Submitted(String),
    /// The task finished and its result was written here.
    Completed(PathBuf),
}

/// Async client for the Conversion Tools API.
///
/// Cloning is cheap; clones share the connection pool and the rate limit
/// snapshot.
#[derive(Debug, Clone)]
pub struct ConversionClient {
    transport: HttpTransport,
    files: Files,
    tasks: Tasks,
    account: Account,
    config: Arc<ClientConfig>,
}

impl ConversionClient {
    /// Creates a client with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for an empty token.
    pub fn new(api_token: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_config(ClientConfig::new(api_token))
    }

    /// Starts a [`ClientBuilder`].
    #[must_use]
    pub fn builder(api_token: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(api_token)
    }

    /// Creates a client from a full configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for an empty token or invalid User-Agent.
    pub fn with_config(config: ClientConfig) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(config.transport_config())?;
        Ok(Self {
            files: Files::new(transport.clone()),
            tasks: Tasks::new(transport.clone()),
            account: Account::new(transport.clone()),
            transport,
            config: Arc::new(config),
        })
    }

    /// Client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// File endpoints.
    #[must_use]
    pub fn files(&self) -> &Files {
        &self.files
    }

    /// Task endpoints.
    #[must_use]
    pub fn tasks(&self) -> &Tasks {
        &self.tasks
    }

    /// Most recent quota snapshot, if any response carried one.
    #[must_use]
    pub fn rate_limits(&self) -> Option<RateLimits> {
        self.transport.rate_limits()
    }

    /// Account behind the token.
    ///
    /// # Errors
    ///
    /// Any transport error.
    pub async fn user(&self) -> Result<UserInfo, ApiError> {
        self.account.user().await
    }

    /// Conversion types available to the account.
    ///
    /// # Errors
    ///
    /// Any transport error.
    pub async fn api_config(&self) -> Result<ApiConfig, ApiError> {
        self.account.api_config().await
    }

    /// Creates a task and returns it as a PENDING [`Task`].
    ///
    /// A request without `callback_url` uses the configured webhook URL.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for a malformed conversion type; any transport error otherwise.
    pub async fn create_task(&self, request: CreateTaskRequest) -> Result<Task, ApiError> {
        let request = CreateTaskRequest {
            callback_url: request
                .callback_url
                .or_else(|| self.config.webhook_url.clone()),
            ..request
        };
        let created = self.tasks.create(&request).await?;
        Ok(Task::created(
            created.task_id,
            request.conversion_type,
            self.tasks.clone(),
            self.files.clone(),
            self.config.poll_options(),
        ))
    }

    /// Loads an existing task by id.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for a malformed id; [`ApiError::TaskNotFound`]
    /// or any transport error otherwise.
    pub async fn task(&self, task_id: &str) -> Result<Task, ApiError> {
        let response = self.tasks.status(task_id).await?;
        Ok(Task::from_status(
            task_id.to_string(),
            response,
            self.tasks.clone(),
            self.files.clone(),
            self.config.poll_options(),
        ))
    }

    /// Uploads (unless the input is a URL or file id), creates the task and,
    /// when `request.wait` is set, waits for it and downloads the result.
    ///
    /// # Errors
    ///
    /// Any error from the steps involved, unmodified.
    #[instrument(skip(self, request), fields(conversion_type = %request.conversion_type))]
    pub async fn convert(&self, request: ConvertRequest) -> Result<ConvertOutcome, ApiError> {
        validate_conversion_type(&request.conversion_type)?;

        let mut options = request.options;
        match request.input.resolve()? {
            ResolvedInput::Url(url) => {
                options.insert("url".into(), Value::String(url));
            }
            ResolvedInput::FileId(file_id) => {
                options.insert("file_id".into(), Value::String(file_id));
            }
            ResolvedInput::Upload(source) => {
                let file_id = self
                    .files
                    .upload(source, self.config.on_upload_progress.clone())
                    .await?;
                options.insert("file_id".into(), Value::String(file_id));
            }
        }

        let create = CreateTaskRequest::new(request.conversion_type, options)
            .with_callback_url(request.callback_url);
        let mut task = self.create_task(create).await?;

        if !request.wait {
            info!(task_id = %task.id(), "task submitted");
            return Ok(ConvertOutcome::Submitted(task.id().to_string()));
        }

        task.wait(WaitOptions {
            interval: request.polling_interval,
            max_interval: request.max_polling_interval,
            timeout: request.timeout,
            on_progress: self.config.on_conversion_progress.clone(),
        })
        .await?;

        let path = task
            .download_to(
                request.output.as_deref(),
                self.config.on_download_progress.clone(),
            )
            .await?;
        info!(task_id = %task.id(), path = %path.display(), "conversion complete");
        Ok(ConvertOutcome::Completed(path))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_token() {
        assert!(matches!(
            ConversionClient::new(""),
            Err(ApiError::Validation { .. })
        ));
    }

    #[test]
    fn test_convert_request_builder() {
        let request = ConvertRequest::new("convert.xml_to_csv", "data.xml")
            .output("out/result.csv")
            .option("delimiter", "comma")
            .no_wait();
        assert!(!request.wait);
        assert_eq!(request.options["delimiter"], "comma");
        assert!(matches!(request.input, ConversionInput::Path(_)));
    }

    #[test]
    fn test_convert_rejects_bad_type_before_any_request() {
        let client = ConversionClient::builder("token")
            .base_url("http://127.0.0.1:9")
            .retries(0)
            .build()
            .unwrap();
        let request = ConvertRequest::new("xml_to_csv", ConversionInput::url("https://example.com"));
        let error = tokio_test::block_on(client.convert(request)).unwrap_err();
        assert_eq!(error.code(), "VALIDATION_ERROR");
    }
}
