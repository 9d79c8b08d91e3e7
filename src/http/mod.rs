//! HTTP transport for the Conversion Tools REST API.
//!
//! # Features
//!
//! - Bearer token authentication and a configurable User-Agent on every call
//! - Per-request timeout plus optional external cancellation
//! - Exponential backoff retries for network errors, timeouts and
//!   retryable statuses (408, 500, 502, 503, 504 by default)
//! - Typed errors for error responses (see [`crate::ApiError`])
//! - Last-known quota snapshot from `x-ratelimit-*` headers
//!
//! # Example
//!
//! ```no_run
//! use conversiontools::http::{ApiRequest, HttpTransport, TransportConfig};
//! use serde_json::Value;
//!
//! # async fn example() -> Result<(), conversiontools::ApiError> {
//! let transport = HttpTransport::new(TransportConfig::new("your-api-token"))?;
//! let user: Value = transport.json(&ApiRequest::get("/auth"), None).await?;
//! println!("{user}");
//! println!("{:?}", transport.rate_limits());
//! # Ok(())
//! # }
//! ```

mod client;
pub(crate) mod constants;
mod rate_limits;
mod retry;

pub use client::{ApiRequest, HttpTransport, RequestBody, TransportConfig, UploadPayload};
pub use constants::{
    DEFAULT_BASE_URL, DEFAULT_RETRIES, DEFAULT_RETRY_DELAY, DEFAULT_RETRYABLE_STATUSES,
    DEFAULT_TIMEOUT,
};
pub use rate_limits::{Quota, RateLimits};
pub use retry::{RetryDecision, RetryPolicy, RetryPredicate};
