//! Warranty policy and status-query configuration.

use serde::{Deserialize, Serialize};

/// Tunables for the warranty policy and the status-query path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarrantyConfig {
    /// Grace period, in days, granted when a warranty code is first used.
    #[serde(default = "default_grace_period_days")]
    pub grace_period_days: i64,
    /// Minimum interval, in seconds, between status lookups sharing a key.
    #[serde(default = "default_query_interval")]
    pub query_interval_seconds: u64,
    /// Maximum number of rate-limit keys retained before eviction.
    #[serde(default = "default_query_cache_capacity")]
    pub query_cache_capacity: u64,
}

impl Default for WarrantyConfig {
    fn default() -> Self {
        Self {
            grace_period_days: default_grace_period_days(),
            query_interval_seconds: default_query_interval(),
            query_cache_capacity: default_query_cache_capacity(),
        }
    }
}

fn default_grace_period_days() -> i64 {
    30
}

fn default_query_interval() -> u64 {
    30
}

fn default_query_cache_capacity() -> u64 {
    10_000
}
