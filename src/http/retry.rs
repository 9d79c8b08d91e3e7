//! Retry logic with exponential backoff for transient API failures.
//!
//! A failed request is retried when:
//! - a caller-supplied predicate says so (the predicate, when configured, is
//!   the only thing consulted), or
//! - the error is a [`ApiError::Network`] or [`ApiError::Timeout`], or
//! - the error carries an HTTP status in the retryable set
//!   (default 408, 500, 502, 503, 504).
//!
//! The delay before retry `n` (1-indexed) is `base_delay * 2^(n-1)`, with no
//! jitter. Once the retry budget is spent the last error is returned as-is.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use conversiontools::http::{RetryDecision, RetryPolicy};
//! use conversiontools::ApiError;
//!
//! let policy = RetryPolicy::new(3, Duration::from_millis(100), vec![503]);
//! let error = ApiError::from_status(503, "Service Unavailable".into(), None, None);
//!
//! match policy.should_retry(&error, 1) {
//!     RetryDecision::Retry { delay, attempt } => {
//!         assert_eq!(delay, Duration::from_millis(100));
//!         assert_eq!(attempt, 2);
//!     }
//!     RetryDecision::DoNotRetry { reason } => panic!("unexpected: {reason}"),
//! }
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::constants::{DEFAULT_RETRIES, DEFAULT_RETRY_DELAY, DEFAULT_RETRYABLE_STATUSES};
use crate::error::ApiError;

/// Caller-supplied retry predicate. Overrides the built-in heuristic entirely.
pub type RetryPredicate = Arc<dyn Fn(&ApiError) -> bool + Send + Sync>;

/// Decision on whether to retry a failed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the request after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number this will be (1-indexed, so first retry is attempt 2).
        attempt: u32,
    },

    /// Do not retry the request.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Configuration for retry behavior with exponential backoff.
///
/// # Default Values
///
/// - `retries`: 3 (so up to 4 attempts in total)
/// - `base_delay`: 1 second
/// - `retryable_statuses`: 408, 500, 502, 503, 504
///
/// With defaults, delays are exactly 1s, 2s, 4s.
#[derive(Clone)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    retries: u32,

    /// Delay before the first retry.
    base_delay: Duration,

    /// Statuses that qualify for a retry.
    retryable_statuses: Vec<u16>,

    /// Custom predicate; when set it is consulted exclusively.
    predicate: Option<RetryPredicate>,
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("retries", &self.retries)
            .field("base_delay", &self.base_delay)
            .field("retryable_statuses", &self.retryable_statuses)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            base_delay: DEFAULT_RETRY_DELAY,
            retryable_statuses: DEFAULT_RETRYABLE_STATUSES.to_vec(),
            predicate: None,
        }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy.
    ///
    /// # Arguments
    ///
    /// * `retries` - Retries after the initial attempt (0 disables retrying)
    /// * `base_delay` - Delay before the first retry
    /// * `retryable_statuses` - HTTP statuses that qualify for a retry
    #[must_use]
    pub fn new(retries: u32, base_delay: Duration, retryable_statuses: Vec<u16>) -> Self {
        Self {
            retries,
            base_delay,
            retryable_statuses,
            predicate: None,
        }
    }

    /// Replaces the built-in retry heuristic with a custom predicate.
    #[must_use]
    pub fn with_predicate(mut self, predicate: RetryPredicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Returns the number of retries configured.
    #[must_use]
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Returns the base delay.
    #[must_use]
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Returns the retryable status set.
    #[must_use]
    pub fn retryable_statuses(&self) -> &[u16] {
        &self.retryable_statuses
    }

    /// Delay before retry `attempt` (1-indexed): `base_delay * 2^(attempt-1)`.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay.saturating_mul(1u32 << exponent)
    }

    /// Whether the error qualifies for a retry, ignoring the attempt budget.
    #[must_use]
    pub fn is_retryable(&self, error: &ApiError) -> bool {
        if let Some(predicate) = &self.predicate {
            return predicate(error);
        }

        match error {
            ApiError::Network { .. } | ApiError::Timeout { .. } => true,
            other => other
                .status()
                .is_some_and(|status| self.retryable_statuses.contains(&status)),
        }
    }

    /// Determines whether to retry after `failures` consecutive failed attempts.
    ///
    /// # Returns
    ///
    /// A [`RetryDecision`] indicating whether to retry and with what delay.
    #[instrument(skip(self, error), fields(retries = self.retries, code = error.code()))]
    pub fn should_retry(&self, error: &ApiError, failures: u32) -> RetryDecision {
        if failures > self.retries {
            debug!(failures, max = self.retries, "retries exhausted");
            return RetryDecision::DoNotRetry {
                reason: format!("retries ({}) exhausted", self.retries),
            };
        }

        if !self.is_retryable(error) {
            return RetryDecision::DoNotRetry {
                reason: format!("{} is not retryable", error.code()),
            };
        }

        let delay = self.delay_for_attempt(failures);
        debug!(
            retry = failures,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "will retry"
        );

        RetryDecision::Retry {
            delay,
            attempt: failures + 1,
        }
    }

    /// Runs `operation` until it succeeds, fails permanently, or the budget is spent.
    ///
    /// `operation` receives the 1-indexed attempt number. A fired `cancel`
    /// token stops the loop and returns the attempt's error without retrying.
    ///
    /// # Errors
    ///
    /// Returns the last error produced by `operation`, unchanged.
    pub async fn run<T, F, Fut>(
        &self,
        cancel: Option<&CancellationToken>,
        mut operation: F,
    ) -> Result<T, ApiError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut failures: u32 = 0;
        loop {
            let error = match operation(failures + 1).await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };
            failures += 1;

            if cancel.is_some_and(CancellationToken::is_cancelled) {
                debug!("request cancelled, not retrying");
                return Err(error);
            }

            match self.should_retry(&error, failures) {
                RetryDecision::Retry { delay, attempt } => {
                    debug!(attempt, error = %error, "retrying request");
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::DoNotRetry { reason } => {
                    debug!(%reason, "giving up");
                    return Err(error);
                }
            }
        }
    }
}
