//! Synchronizer configuration.

use std::time::Duration;

/// HTTP and concurrency settings for cache synchronization.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Downloads allowed in flight at once
    pub max_parallel: usize,
    /// Whole-request timeout, including the body
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_parallel: 2,
            timeout: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl SyncConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            max_parallel: std::env::var("SYNC_MAX_PARALLEL")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(2),
            timeout: Duration::from_secs(
                std::env::var("SYNC_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(300),
            ),
            connect_timeout: Duration::from_secs(
                std::env::var("SYNC_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
        }
    }
}
