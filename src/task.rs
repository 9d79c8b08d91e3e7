//! Conversion task entity.
//!
//! A [`Task`] mirrors the server's view of one conversion. Its fields change
//! only when the status is re-fetched ([`Task::refresh`], [`Task::wait`]);
//! the entity never infers state on its own.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::api::{ByteStream, Files, Tasks};
use crate::error::ApiError;
use crate::polling::{PollOptions, poll_task_status};
use crate::progress::{ConversionProgressCallback, ConversionProgressEvent, ProgressCallback};
use crate::types::{TaskStatus, TaskStatusResponse};

const NO_RESULT_MESSAGE: &str = "no result file available";
const FAILED_MESSAGE: &str = "Conversion failed";

/// Overrides for [`Task::wait`]. Unset fields use the client's polling settings.
#[derive(Clone, Default)]
pub struct WaitOptions {
    /// Initial delay between status checks.
    pub interval: Option<Duration>,
    /// Upper bound on the delay.
    pub max_interval: Option<Duration>,
    /// Overall budget; unset waits indefinitely.
    pub timeout: Option<Duration>,
    /// Receives every in-flight status.
    pub on_progress: Option<ConversionProgressCallback>,
}

impl std::fmt::Debug for WaitOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaitOptions")
            .field("interval", &self.interval)
            .field("max_interval", &self.max_interval)
            .field("timeout", &self.timeout)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

impl WaitOptions {
    fn resolve(&self, defaults: &PollOptions) -> PollOptions {
        PollOptions {
            interval: self.interval.unwrap_or(defaults.interval),
            max_interval: self.max_interval.unwrap_or(defaults.max_interval),
            backoff_multiplier: defaults.backoff_multiplier,
            timeout: self.timeout.or(defaults.timeout),
        }
    }
}

/// Serializable view of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSnapshot {
    /// Task id.
    pub id: String,
    /// Conversion type, when known.
    #[serde(rename = "type")]
    pub conversion_type: Option<String>,
    /// Last observed status.
    pub status: TaskStatus,
    /// Result file id.
    pub file_id: Option<String>,
    /// Failure text.
    pub error: Option<String>,
    /// Conversion progress (0-100).
    pub conversion_progress: u8,
}

/// A conversion task.
#[derive(Debug, Clone)]
pub struct Task {
    id: String,
    conversion_type: Option<String>,
    status: TaskStatus,
    file_id: Option<String>,
    error: Option<String>,
    conversion_progress: u8,
    tasks: Tasks,
    files: Files,
    polling: PollOptions,
}

impl Task {
    /// A freshly created task, PENDING until refreshed.
    pub(crate) fn created(
        id: String,
        conversion_type: String,
        tasks: Tasks,
        files: Files,
        polling: PollOptions,
    ) -> Self {
        Self {
            id,
            conversion_type: Some(conversion_type),
            status: TaskStatus::Pending,
            file_id: None,
            error: None,
            conversion_progress: 0,
            tasks,
            files,
            polling,
        }
    }

    /// A task loaded from a status response.
    pub(crate) fn from_status(
        id: String,
        response: TaskStatusResponse,
        tasks: Tasks,
        files: Files,
        polling: PollOptions,
    ) -> Self {
        let mut task = Self {
            id,
            conversion_type: None,
            status: response.status,
            file_id: None,
            error: None,
            conversion_progress: 0,
            tasks,
            files,
            polling,
        };
        task.apply(response);
        task
    }

    /// Task id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Conversion type; unknown for tasks loaded by id.
    #[must_use]
    pub fn conversion_type(&self) -> Option<&str> {
        self.conversion_type.as_deref()
    }

    /// Last observed status.
    #[must_use]
    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Result file id, set once the task succeeded.
    #[must_use]
    pub fn file_id(&self) -> Option<&str> {
        self.file_id.as_deref()
    }

    /// Failure text, set once the task failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Last observed conversion progress (0-100).
    #[must_use]
    pub fn conversion_progress(&self) -> u8 {
        self.conversion_progress
    }

    /// PENDING or RUNNING.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status.is_in_flight()
    }

    /// SUCCESS or ERROR.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status.is_terminal()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Success
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status == TaskStatus::Error
    }

    /// Re-fetches the status and overwrites every field.
    ///
    /// # Errors
    ///
    /// Any error from the status request.
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        let response = self.tasks.status(&self.id).await?;
        self.apply(response);
        Ok(())
    }

    /// Re-fetches and returns the current status.
    ///
    /// # Errors
    ///
    /// Any error from the status request.
    pub async fn fetch_status(&mut self) -> Result<TaskStatus, ApiError> {
        self.refresh().await?;
        Ok(self.status)
    }

    /// Polls until the task finishes.
    ///
    /// # Errors
    ///
    /// [`ApiError::Conversion`] if the task ends in ERROR,
    /// [`ApiError::Timeout`] if the budget runs out, or any status request error.
    #[instrument(skip(self, options), fields(task_id = %self.id))]
    pub async fn wait(&mut self, options: WaitOptions) -> Result<(), ApiError> {
        let poll_options = options.resolve(&self.polling);
        let tasks = &self.tasks;
        let id = self.id.as_str();
        let on_progress = options.on_progress.as_ref();

        let response = poll_task_status(
            || tasks.status(id),
            &poll_options,
            |response: &TaskStatusResponse| {
                debug!(
                    status = %response.status,
                    progress = response.conversion_progress,
                    "task in flight"
                );
                if let Some(callback) = on_progress {
                    callback(ConversionProgressEvent {
                        task_id: id.to_string(),
                        status: response.status,
                        percent: response.conversion_progress,
                    });
                }
            },
        )
        .await?;

        self.apply(response);
        if self.is_error() {
            let message = self.error.clone().unwrap_or_else(|| FAILED_MESSAGE.to_string());
            return Err(ApiError::conversion(message, &self.id, self.error.clone()));
        }
        Ok(())
    }

    /// Streams the result file.
    ///
    /// # Errors
    ///
    /// [`ApiError::Conversion`] without a result file; any download error otherwise.
    pub async fn download_stream(&self) -> Result<ByteStream, ApiError> {
        self.files.download_stream(self.result_file()?).await
    }

    /// Downloads the result file into memory.
    ///
    /// # Errors
    ///
    /// [`ApiError::Conversion`] without a result file; any download error otherwise.
    pub async fn download_bytes(&self) -> Result<Bytes, ApiError> {
        self.files.download_bytes(self.result_file()?).await
    }

    /// Downloads the result file to disk.
    ///
    /// # Errors
    ///
    /// [`ApiError::Conversion`] without a result file; any download error otherwise.
    pub async fn download_to(
        &self,
        output: Option<&Path>,
        on_progress: Option<ProgressCallback>,
    ) -> Result<PathBuf, ApiError> {
        self.files
            .download_to(self.result_file()?, output, on_progress)
            .await
    }

    /// Serializable copy of the current fields.
    #[must_use]
    pub fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            id: self.id.clone(),
            conversion_type: self.conversion_type.clone(),
            status: self.status,
            file_id: self.file_id.clone(),
            error: self.error.clone(),
            conversion_progress: self.conversion_progress,
        }
    }

    fn result_file(&self) -> Result<&str, ApiError> {
        self.file_id
            .as_deref()
            .ok_or_else(|| ApiError::conversion(NO_RESULT_MESSAGE, &self.id, None))
    }

    fn apply(&mut self, response: TaskStatusResponse) {
        self.status = response.status;
        self.file_id = response.file_id;
        self.error = response.error;
        self.conversion_progress = response.conversion_progress;
    }
}
