//! Error types for the Conversion Tools client.
//!
//! Every failure surfaced by the client is an [`ApiError`]. Each variant maps
//! to a stable machine-readable code (see [`ApiError::code`]) and, where one
//! applies, the HTTP status it corresponds to (see [`ApiError::status`]), so
//! callers can decide on remediation without string matching.

use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::http::RateLimits;

/// Default message for HTTP 429 responses that carry no server message.
const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded";

/// Errors returned by the Conversion Tools client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed input, id, token, or conversion type (local or server-reported 400).
    #[error("validation error: {message}")]
    Validation {
        /// Human-readable description.
        message: String,
        /// Parsed server response body, when the server reported the error.
        response: Option<Value>,
    },

    /// Missing or invalid API token (HTTP 401).
    #[error("authentication error: {message}")]
    Authentication {
        /// Server message.
        message: String,
    },

    /// The referenced file does not exist (HTTP 404).
    #[error("file not found: {message}")]
    FileNotFound {
        /// Server message.
        message: String,
    },

    /// The referenced task does not exist (HTTP 404).
    #[error("task not found: {message}")]
    TaskNotFound {
        /// Server message.
        message: String,
    },

    /// Account quota exceeded (HTTP 429).
    #[error("rate limit exceeded: {message}")]
    RateLimit {
        /// Server message.
        message: String,
        /// Last quota snapshot observed by the transport, if any.
        limits: Option<RateLimits>,
    },

    /// A request or a polling loop ran out of time, or a request was aborted.
    #[error("timeout: {message}")]
    Timeout {
        /// Human-readable description.
        message: String,
        /// The budget that was exceeded, when one applies.
        timeout: Option<Duration>,
    },

    /// Transport-level failure (DNS, connection reset, TLS, body read).
    #[error("network error: {message}")]
    Network {
        /// Human-readable description.
        message: String,
        /// The underlying HTTP client error.
        #[source]
        source: reqwest::Error,
    },

    /// A task finished in the ERROR state, or a result was requested before completion.
    #[error("conversion failed for task {task_id}: {message}")]
    Conversion {
        /// Human-readable description.
        message: String,
        /// The task the error belongs to.
        task_id: String,
        /// Error text reported by the server for the task.
        task_error: Option<String>,
    },

    /// Any other non-2xx response, or a 2xx response carrying a logical `error` field.
    #[error("API error ({code}): {message}")]
    Api {
        /// Server message or status reason.
        message: String,
        /// `NOT_FOUND`, `HTTP_ERROR` or `API_ERROR`.
        code: &'static str,
        /// HTTP status of the response.
        status: Option<u16>,
        /// Parsed response body, when available.
        response: Option<Value>,
    },

    /// Local file system failure while reading an upload or writing a download.
    #[error("IO error at {path}: {source}")]
    Io {
        /// The path being read or written.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// Creates a locally-raised validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            response: None,
        }
    }

    /// Creates a timeout error carrying the exceeded budget.
    pub fn timeout(message: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self::Timeout {
            message: message.into(),
            timeout,
        }
    }

    /// Creates a network error wrapping the underlying client error.
    pub fn network(source: reqwest::Error) -> Self {
        Self::Network {
            message: format!("network request failed: {source}"),
            source,
        }
    }

    /// Creates a conversion error for a task.
    pub fn conversion(
        message: impl Into<String>,
        task_id: impl Into<String>,
        task_error: Option<String>,
    ) -> Self {
        Self::Conversion {
            message: message.into(),
            task_id: task_id.into(),
            task_error,
        }
    }

    /// Creates a generic API error for a 2xx response with a non-null `error` field.
    pub fn logical(message: impl Into<String>, status: u16, response: Option<Value>) -> Self {
        Self::Api {
            message: message.into(),
            code: "API_ERROR",
            status: Some(status),
            response,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Maps a non-2xx HTTP response to an error.
    ///
    /// `message` is the body's `error` field when present, else the status reason.
    /// `limits` is attached to 429 errors.
    #[must_use]
    pub fn from_status(
        status: u16,
        message: String,
        response: Option<Value>,
        limits: Option<RateLimits>,
    ) -> Self {
        match status {
            400 => Self::Validation { message, response },
            401 => Self::Authentication { message },
            404 => {
                let lowered = message.to_lowercase();
                if lowered.contains("file") {
                    Self::FileNotFound { message }
                } else if lowered.contains("task") {
                    Self::TaskNotFound { message }
                } else {
                    Self::Api {
                        message,
                        code: "NOT_FOUND",
                        status: Some(404),
                        response,
                    }
                }
            }
            429 => {
                let message = if message.is_empty() {
                    RATE_LIMIT_MESSAGE.to_string()
                } else {
                    message
                };
                Self::RateLimit { message, limits }
            }
            408 => Self::Timeout {
                message,
                timeout: None,
            },
            _ => Self::Api {
                message,
                code: "HTTP_ERROR",
                status: Some(status),
                response,
            },
        }
    }

    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Authentication { .. } => "AUTHENTICATION_ERROR",
            Self::FileNotFound { .. } => "FILE_NOT_FOUND",
            Self::TaskNotFound { .. } => "TASK_NOT_FOUND",
            Self::RateLimit { .. } => "RATE_LIMIT_EXCEEDED",
            Self::Timeout { .. } => "TIMEOUT_ERROR",
            Self::Network { .. } => "NETWORK_ERROR",
            Self::Conversion { .. } => "CONVERSION_ERROR",
            Self::Api { code, .. } => *code,
            Self::Io { .. } => "IO_ERROR",
        }
    }

    /// HTTP status associated with the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Validation { .. } => Some(400),
            Self::Authentication { .. } => Some(401),
            Self::FileNotFound { .. } | Self::TaskNotFound { .. } => Some(404),
            Self::RateLimit { .. } => Some(429),
            Self::Timeout { .. } => Some(408),
            Self::Api { status, .. } => *status,
            Self::Network { .. } | Self::Conversion { .. } | Self::Io { .. } => None,
        }
    }

    /// Human-readable message without the variant prefix.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Validation { message, .. }
            | Self::Authentication { message }
            | Self::FileNotFound { message }
            | Self::TaskNotFound { message }
            | Self::RateLimit { message, .. }
            | Self::Timeout { message, .. }
            | Self::Network { message, .. }
            | Self::Conversion { message, .. }
            | Self::Api { message, .. } => message.clone(),
            Self::Io { source, .. } => source.to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::http::Quota;

    #[test]
    fn test_from_status_400_is_validation() {
        let error = ApiError::from_status(400, "bad options".into(), None, None);
        assert!(matches!(error, ApiError::Validation { .. }));
        assert_eq!(error.code(), "VALIDATION_ERROR");
        assert_eq!(error.status(), Some(400));
    }

    #[test]
    fn test_from_status_401_is_authentication() {
        let error = ApiError::from_status(401, "Not authorized".into(), None, None);
        assert!(matches!(error, ApiError::Authentication { .. }));
        assert_eq!(error.status(), Some(401));
    }

    #[test]
    fn test_from_status_404_file_message() {
        let error = ApiError::from_status(404, "File not found".into(), None, None);
        assert!(matches!(error, ApiError::FileNotFound { .. }));
        assert_eq!(error.code(), "FILE_NOT_FOUND");
    }

    #[test]
    fn test_from_status_404_task_message() {
        let error = ApiError::from_status(404, "Task does not exist".into(), None, None);
        assert!(matches!(error, ApiError::TaskNotFound { .. }));
        assert_eq!(error.code(), "TASK_NOT_FOUND");
    }

    #[test]
    fn test_from_status_404_other_message_is_generic_not_found() {
        let error = ApiError::from_status(404, "Not Found".into(), None, None);
        assert_eq!(error.code(), "NOT_FOUND");
        assert_eq!(error.status(), Some(404));
    }

    #[test]
    fn test_from_status_429_carries_limits() {
        let limits = RateLimits {
            daily: Some(Quota {
                limit: 30,
                remaining: 0,
            }),
            monthly: None,
            file_size: None,
        };
        let error = ApiError::from_status(429, String::new(), None, Some(limits.clone()));
        match error {
            ApiError::RateLimit {
                message,
                limits: Some(carried),
            } => {
                assert_eq!(message, "Rate limit exceeded");
                assert_eq!(carried, limits);
            }
            other => panic!("expected RateLimit, got {other:?}"),
        }
    }

    #[test]
    fn test_from_status_408_is_timeout() {
        let error = ApiError::from_status(408, "Request Timeout".into(), None, None);
        assert_eq!(error.code(), "TIMEOUT_ERROR");
        assert_eq!(error.status(), Some(408));
    }

    #[test]
    fn test_from_status_other_is_http_error() {
        let error = ApiError::from_status(503, "Service Unavailable".into(), None, None);
        assert_eq!(error.code(), "HTTP_ERROR");
        assert_eq!(error.status(), Some(503));
        assert_eq!(error.message(), "Service Unavailable");
    }

    #[test]
    fn test_logical_error_code() {
        let error = ApiError::logical("quota", 200, None);
        assert_eq!(error.code(), "API_ERROR");
        assert_eq!(error.status(), Some(200));
    }

    #[test]
    fn test_conversion_error_display() {
        let error = ApiError::conversion(
            "Invalid XML",
            "0123456789abcdef0123456789abcdef",
            Some("Invalid XML".into()),
        );
        let msg = error.to_string();
        assert!(msg.contains("0123456789abcdef0123456789abcdef"), "{msg}");
        assert!(msg.contains("Invalid XML"), "{msg}");
        assert_eq!(error.status(), None);
    }

    #[test]
    fn test_io_error_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = ApiError::io("/tmp/out.csv", io_error);
        assert!(error.to_string().contains("/tmp/out.csv"));
        assert_eq!(error.code(), "IO_ERROR");
    }
}
