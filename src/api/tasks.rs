//! Conversion task endpoints.

use tracing::{info, instrument};

use crate::error::ApiError;
use crate::http::{ApiRequest, HttpTransport};
use crate::types::{
    CreateTaskRequest, TaskCreated, TaskDetail, TaskList, TaskStatus, TaskStatusResponse,
};
use crate::validation::{validate_conversion_type, validate_task_id};

/// Operations on `/tasks`.
#[derive(Debug, Clone)]
pub struct Tasks {
    transport: HttpTransport,
}

impl Tasks {
    pub(crate) fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }

    /// Creates a conversion task.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] if the conversion type is empty or lacks the
    /// `convert.` prefix; any transport error otherwise.
    #[instrument(skip(self, request), fields(conversion_type = %request.conversion_type))]
    pub async fn create(&self, request: &CreateTaskRequest) -> Result<TaskCreated, ApiError> {
        validate_conversion_type(&request.conversion_type)?;
        let body = serde_json::to_value(request)
            .map_err(|e| ApiError::validation(format!("invalid task request: {e}")))?;

        let created: TaskCreated = self
            .transport
            .json(&ApiRequest::post_json("/tasks", body), None)
            .await?;

        info!(task_id = %created.task_id, sandbox = ?created.sandbox, "task created");
        Ok(created)
    }

    /// Fetches a task's current status.
    ///
    /// The response's `error` field is the task's own failure text and is
    /// returned as data.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for a malformed id; any transport error otherwise.
    #[instrument(skip(self))]
    pub async fn status(&self, task_id: &str) -> Result<TaskStatusResponse, ApiError> {
        validate_task_id(task_id)?;
        let request = ApiRequest::get(format!("/tasks/{task_id}")).allow_error_field();
        self.transport.json(&request, None).await
    }

    /// Lists tasks, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Any transport error.
    #[instrument(skip(self))]
    pub async fn list(&self, status: Option<TaskStatus>) -> Result<Vec<TaskDetail>, ApiError> {
        let path = match status {
            Some(status) => format!("/tasks?status={}", urlencoding::encode(status.as_str())),
            None => "/tasks".to_string(),
        };
        let list: TaskList = self.transport.json(&ApiRequest::get(path), None).await?;
        Ok(list.data)
    }
}
