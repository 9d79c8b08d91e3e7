//! Constants for the HTTP transport (endpoint, timeouts, retry defaults).

use std::time::Duration;

/// Default API root (vendor host plus versioned path prefix).
pub const DEFAULT_BASE_URL: &str = "https://api.conversiontools.io/v1";

/// Default per-request timeout (5 minutes, uploads and downloads can be large).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Default number of retries after the initial attempt.
pub const DEFAULT_RETRIES: u32 = 3;

/// Default base delay for exponential retry backoff (1 second).
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// HTTP statuses retried by default.
pub const DEFAULT_RETRYABLE_STATUSES: [u16; 5] = [408, 500, 502, 503, 504];

/// Daily task quota header.
pub(crate) const HEADER_DAILY_LIMIT: &str = "x-ratelimit-limit-tasks";
/// Remaining daily tasks header.
pub(crate) const HEADER_DAILY_REMAINING: &str = "x-ratelimit-limit-tasks-remaining";
/// Monthly task quota header.
pub(crate) const HEADER_MONTHLY_LIMIT: &str = "x-ratelimit-limit-tasks-monthly";
/// Remaining monthly tasks header.
pub(crate) const HEADER_MONTHLY_REMAINING: &str = "x-ratelimit-limit-tasks-monthly-remaining";
/// Maximum upload size header.
pub(crate) const HEADER_FILE_SIZE_LIMIT: &str = "x-ratelimit-limit-filesize";
