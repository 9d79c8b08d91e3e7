//! Generic polling loop with bounded exponential backoff.
//!
//! [`poll`] repeatedly calls a fetch function until a predicate says the
//! result is final. The first result is returned without waiting when it is
//! already final. Between fetches the interval grows by
//! `backoff_multiplier` up to `max_interval`. The timeout is checked before
//! each sleep, so a loop never sleeps past its budget before failing.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::error::ApiError;
use crate::types::TaskStatusResponse;

/// Default delay before the second fetch.
pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_secs(5);

/// Default upper bound on the delay between fetches.
pub const DEFAULT_MAX_POLLING_INTERVAL: Duration = Duration::from_secs(30);

/// Default growth factor applied to the delay after each fetch.
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 1.5;

/// Polling schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct PollOptions {
    /// Initial delay between fetches.
    pub interval: Duration,
    /// Upper bound on the delay.
    pub max_interval: Duration,
    /// Growth factor applied after each sleep.
    pub backoff_multiplier: f64,
    /// Total budget; `None` or zero polls until the predicate is satisfied.
    pub timeout: Option<Duration>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLLING_INTERVAL,
            max_interval: DEFAULT_MAX_POLLING_INTERVAL,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            timeout: None,
        }
    }
}

impl PollOptions {
    /// Sets the overall timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Delay that follows `current`: `min(current * multiplier, max_interval)`.
    #[must_use]
    pub fn next_interval(&self, current: Duration) -> Duration {
        Duration::try_from_secs_f64(current.as_secs_f64() * self.backoff_multiplier)
            .unwrap_or(self.max_interval)
            .min(self.max_interval)
    }

    fn active_timeout(&self) -> Option<Duration> {
        self.timeout.filter(|timeout| !timeout.is_zero())
    }
}

/// Polls `fetch` until `should_continue` returns false for its result.
///
/// `on_progress` sees every result that will be followed by another fetch.
///
/// # Errors
///
/// Propagates any error from `fetch`, and returns [`ApiError::Timeout`] when
/// the timeout elapses while the result still calls for another fetch.
pub async fn poll<T, F, Fut, P, O>(
    mut fetch: F,
    should_continue: P,
    options: &PollOptions,
    mut on_progress: O,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
    P: Fn(&T) -> bool,
    O: FnMut(&T),
{
    let started = Instant::now();
    let timeout = options.active_timeout();
    let mut interval = options.interval;
    let mut fetches: u32 = 0;

    loop {
        let result = fetch().await?;
        fetches += 1;

        if !should_continue(&result) {
            debug!(fetches, "polling finished");
            return Ok(result);
        }

        if let Some(timeout) = timeout
            && started.elapsed() >= timeout
        {
            debug!(fetches, timeout_ms = timeout.as_millis(), "polling timed out");
            return Err(ApiError::timeout(
                format!("polling timed out after {}ms", timeout.as_millis()),
                Some(timeout),
            ));
        }

        on_progress(&result);

        debug!(fetches, interval_ms = interval.as_millis(), "polling again");
        tokio::time::sleep(interval).await;
        interval = options.next_interval(interval);
    }
}

/// Polls a task status until it leaves PENDING/RUNNING.
///
/// # Errors
///
/// See [`poll`].
pub async fn poll_task_status<F, Fut, O>(
    fetch: F,
    options: &PollOptions,
    on_progress: O,
) -> Result<TaskStatusResponse, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<TaskStatusResponse, ApiError>>,
    O: FnMut(&TaskStatusResponse),
{
    poll(
        fetch,
        |response: &TaskStatusResponse| response.status.is_in_flight(),
        options,
        on_progress,
    )
    .await
}
