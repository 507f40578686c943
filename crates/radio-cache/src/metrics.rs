//! Cache synchronization metrics.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    /// Files handled by a sync, labelled `downloaded` or `cached`.
    pub const SYNC_FILES_TOTAL: &str = "radio_sync_files_total";

    /// Completed sync calls by outcome.
    pub const SYNC_RUNS_TOTAL: &str = "radio_sync_runs_total";

    /// Time spent downloading one file, in seconds.
    pub const DOWNLOAD_DURATION_SECONDS: &str = "radio_sync_download_duration_seconds";
}

/// Record a file fetched into the cache.
pub fn record_download(duration_secs: f64) {
    counter!(names::SYNC_FILES_TOTAL, "result" => "downloaded").increment(1);
    histogram!(names::DOWNLOAD_DURATION_SECONDS).record(duration_secs);
}

/// Record entries satisfied from the cache.
pub fn record_cached(count: usize) {
    counter!(names::SYNC_FILES_TOTAL, "result" => "cached").increment(count as u64);
}

/// Record the outcome of a whole sync call.
pub fn record_run(success: bool) {
    let status = if success { "success" } else { "error" };
    counter!(names::SYNC_RUNS_TOTAL, "status" => status).increment(1);
}
