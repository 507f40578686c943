//! Encoder lifecycle metrics.

use metrics::counter;

/// Metric names as constants for consistency.
pub mod names {
    pub const ENCODER_STARTS_TOTAL: &str = "radio_encoder_starts_total";
    pub const ENCODER_LAUNCH_FAILURES_TOTAL: &str = "radio_encoder_launch_failures_total";
    pub const ENCODER_EXITS_TOTAL: &str = "radio_encoder_exits_total";
    pub const ENCODER_RESTARTS_SCHEDULED_TOTAL: &str = "radio_encoder_restarts_scheduled_total";
}

/// Record a successful encoder launch.
pub fn record_start() {
    counter!(names::ENCODER_STARTS_TOTAL).increment(1);
}

/// Record a failed encoder launch.
pub fn record_launch_failure() {
    counter!(names::ENCODER_LAUNCH_FAILURES_TOTAL).increment(1);
}

/// Record an encoder exit, labelled `stopped`, `clean` or `crash`.
pub fn record_exit(kind: &'static str) {
    counter!(names::ENCODER_EXITS_TOTAL, "kind" => kind).increment(1);
}

/// Record a scheduled restart, labelled by its cause.
pub fn record_restart_scheduled(reason: &'static str) {
    counter!(names::ENCODER_RESTARTS_SCHEDULED_TOTAL, "reason" => reason).increment(1);
}
