//! Progress events for uploads, downloads and conversions.

use std::sync::Arc;

use serde::Serialize;

use crate::types::TaskStatus;

/// Byte-level progress of an upload or download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    /// Bytes transferred so far.
    pub loaded: u64,
    /// Total bytes, when known up front.
    pub total: Option<u64>,
    /// Percentage complete (0-100), when the total is known.
    pub percent: Option<u8>,
}

impl ProgressEvent {
    /// Creates an event, deriving `percent` when `total` is known and non-zero.
    #[must_use]
    pub fn new(loaded: u64, total: Option<u64>) -> Self {
        let percent = total
            .filter(|total| *total > 0)
            .map(|total| calculate_percent(loaded, total));
        Self {
            loaded,
            total,
            percent,
        }
    }
}

/// Progress of a conversion task, reported while polling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionProgressEvent {
    /// Task being polled.
    pub task_id: String,
    /// Status at the time of the poll.
    pub status: TaskStatus,
    /// Server-reported conversion progress (0-100).
    pub percent: u8,
}

/// Callback for upload/download progress.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Callback for conversion progress.
pub type ConversionProgressCallback = Arc<dyn Fn(ConversionProgressEvent) + Send + Sync>;

/// Rounded percentage of `loaded` over `total`, clamped to 0-100.
#[must_use]
pub fn calculate_percent(loaded: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = (u128::from(loaded) * 100 + u128::from(total) / 2) / u128::from(total);
    u8::try_from(percent.min(100)).unwrap_or(100)
}
