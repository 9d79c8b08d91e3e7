//! Request and response types for the Conversion Tools API.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::conversions::OptionBag;
use crate::error::ApiError;

/// Lifecycle state of a conversion task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Queued on the server.
    Pending,
    /// Being converted.
    Running,
    /// Finished; a result file is available.
    Success,
    /// Finished with an error.
    Error,
}

impl TaskStatus {
    /// PENDING and RUNNING are both in flight and treated identically.
    #[must_use]
    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }

    /// SUCCESS or ERROR.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !self.is_in_flight()
    }

    /// Wire representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Success => "SUCCESS",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "RUNNING" => Ok(Self::Running),
            "SUCCESS" => Ok(Self::Success),
            "ERROR" => Ok(Self::Error),
            _ => Err(ApiError::validation(format!("unknown task status: {s}"))),
        }
    }
}

/// Body of `POST /tasks`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateTaskRequest {
    /// Conversion type, e.g. `convert.xml_to_csv`.
    #[serde(rename = "type")]
    pub conversion_type: String,
    /// Conversion options, including `file_id` or `url`.
    pub options: OptionBag,
    /// Webhook notified on completion.
    #[serde(rename = "callbackUrl", skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

impl CreateTaskRequest {
    /// Creates a request without a callback URL.
    #[must_use]
    pub fn new(conversion_type: impl Into<String>, options: OptionBag) -> Self {
        Self {
            conversion_type: conversion_type.into(),
            options,
            callback_url: None,
        }
    }

    /// Sets the webhook URL.
    #[must_use]
    pub fn with_callback_url(mut self, callback_url: Option<String>) -> Self {
        self.callback_url = callback_url;
        self
    }
}

/// Response of `POST /tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskCreated {
    /// Server-assigned task id.
    pub task_id: String,
    /// Whether the task runs in sandbox mode.
    #[serde(default)]
    pub sandbox: Option<bool>,
    /// Informational message from the server.
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of `GET /tasks/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatusResponse {
    /// Task failure text, set only for ERROR.
    #[serde(default)]
    pub error: Option<String>,
    /// Current status.
    pub status: TaskStatus,
    /// Result file id, set only for SUCCESS.
    #[serde(default)]
    pub file_id: Option<String>,
    /// Conversion progress (0-100).
    #[serde(rename = "conversionProgress", default)]
    pub conversion_progress: u8,
}

/// Summary of a source or result file attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    /// File id.
    pub id: String,
    /// File name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Whether the file is still stored on the server.
    pub exists: bool,
}

/// One entry of `GET /tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetail {
    /// Task id.
    pub id: String,
    /// Conversion type.
    #[serde(rename = "type")]
    pub conversion_type: String,
    /// Current status.
    pub status: TaskStatus,
    /// Failure text.
    #[serde(default)]
    pub error: Option<String>,
    /// Source URL for URL-based conversions.
    #[serde(default)]
    pub url: Option<String>,
    /// Creation timestamp as reported by the server.
    pub date_created: String,
    /// Completion timestamp.
    #[serde(default)]
    pub date_finished: Option<String>,
    /// Conversion progress (0-100).
    #[serde(default)]
    pub conversion_progress: u8,
    /// Uploaded source file.
    #[serde(default)]
    pub file_source: Option<FileSummary>,
    /// Result file.
    #[serde(default)]
    pub file_result: Option<FileSummary>,
}

/// Response of `GET /tasks`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TaskList {
    #[serde(default)]
    pub(crate) data: Vec<TaskDetail>,
}

/// Response of `POST /files`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FileUploaded {
    #[serde(default)]
    pub(crate) error: Option<String>,
    #[serde(default)]
    pub(crate) file_id: Option<String>,
}

/// Response of `GET /files/{id}/info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Whether a preview is available.
    #[serde(default)]
    pub preview: bool,
    /// Size in bytes.
    pub size: u64,
    /// File name.
    pub name: String,
    /// Preview lines, when available.
    #[serde(rename = "previewData", default)]
    pub preview_data: Option<Vec<String>>,
}

/// Response of `GET /auth`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Account email.
    pub email: String,
}

/// A conversion type declared by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Conversion type identifier.
    #[serde(rename = "type")]
    pub conversion_type: String,
    /// Human-readable title.
    pub title: String,
    /// Accepted option keys.
    #[serde(default)]
    pub options: Vec<String>,
}

/// Response of `GET /config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Conversion types available to the account.
    #[serde(default)]
    pub conversions: Vec<ConversionConfig>,
}
