//! Status-query rate limiter.
//!
//! Enforces a fixed minimum interval between status lookups sharing a
//! `(lookup-kind, value)` key. State lives in an injected moka cache
//! whose TTL eviction bounds memory; the read-then-record race between
//! check and insert is tolerated (worst case one extra query per
//! window). Applies only to the status-query path, never to allocation.

use std::fmt;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use moka::future::Cache;

use seatflow_core::config::warranty::WarrantyConfig;
use seatflow_core::error::AppError;
use seatflow_core::result::AppResult;

/// What kind of value a status lookup keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    /// An email-based lookup.
    Email,
    /// A code-based lookup.
    Code,
}

impl LookupKind {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Code => "code",
        }
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-key minimum-interval limiter for warranty status lookups.
#[derive(Debug, Clone)]
pub struct QueryRateLimiter {
    last_seen: Cache<String, DateTime<Utc>>,
    min_interval: Duration,
}

impl QueryRateLimiter {
    /// Creates a limiter from configuration.
    pub fn new(config: &WarrantyConfig) -> Self {
        let last_seen = Cache::builder()
            .max_capacity(config.query_cache_capacity)
            .time_to_live(StdDuration::from_secs(config.query_interval_seconds))
            .build();
        Self {
            last_seen,
            min_interval: Duration::seconds(config.query_interval_seconds as i64),
        }
    }

    /// Admit or reject a lookup, recording the timestamp on admission.
    pub async fn acquire(&self, kind: LookupKind, value: &str) -> AppResult<()> {
        match self.acquire_at(kind, value, Utc::now()).await {
            Ok(()) => Ok(()),
            Err(wait_seconds) => Err(AppError::rate_limit(format!(
                "Too many status lookups; retry in {wait_seconds} seconds"
            ))),
        }
    }

    /// Core admission check against an explicit clock reading. Rejects
    /// with the remaining wait in whole seconds (at least 1).
    async fn acquire_at(
        &self,
        kind: LookupKind,
        value: &str,
        now: DateTime<Utc>,
    ) -> Result<(), i64> {
        let key = format!("{kind}:{value}");
        if let Some(previous) = self.last_seen.get(&key).await {
            let elapsed = now - previous;
            if elapsed < self.min_interval {
                let remaining = self.min_interval - elapsed;
                return Err(remaining.num_seconds().max(1));
            }
        }
        self.last_seen.insert(key, now).await;
        Ok(())
    }
}
