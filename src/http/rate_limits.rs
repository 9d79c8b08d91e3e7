//! Quota information parsed from API response headers.
//!
//! The API reports the account's daily and monthly task quotas and the
//! maximum upload size on every response. The transport keeps the most
//! recent snapshot; it is advisory telemetry and may be stale by the time
//! it is read.

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};

use super::constants::{
    HEADER_DAILY_LIMIT, HEADER_DAILY_REMAINING, HEADER_FILE_SIZE_LIMIT, HEADER_MONTHLY_LIMIT,
    HEADER_MONTHLY_REMAINING,
};

/// A `(limit, remaining)` quota pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quota {
    /// Total tasks allowed in the period.
    pub limit: u64,
    /// Tasks still available in the period.
    pub remaining: u64,
}

/// Last-known account quotas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimits {
    /// Daily task quota.
    pub daily: Option<Quota>,
    /// Monthly task quota.
    pub monthly: Option<Quota>,
    /// Maximum upload size in bytes.
    pub file_size: Option<u64>,
}

impl RateLimits {
    /// Parses quota headers.
    ///
    /// Returns `None` when the response carried none of them, so an empty
    /// response never clears a previously observed snapshot.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let limits = Self {
            daily: quota(headers, HEADER_DAILY_LIMIT, HEADER_DAILY_REMAINING),
            monthly: quota(headers, HEADER_MONTHLY_LIMIT, HEADER_MONTHLY_REMAINING),
            file_size: header_u64(headers, HEADER_FILE_SIZE_LIMIT),
        };
        (!limits.is_empty()).then_some(limits)
    }

    /// True when no quota field is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.daily.is_none() && self.monthly.is_none() && self.file_size.is_none()
    }
}

fn quota(headers: &HeaderMap, limit: &str, remaining: &str) -> Option<Quota> {
    Some(Quota {
        limit: header_u64(headers, limit)?,
        remaining: header_u64(headers, remaining)?,
    })
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}
