//! Prometheus metrics for the worker.

use std::net::SocketAddr;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::{WorkerError, WorkerResult};

/// Metric names as constants for consistency.
pub mod names {
    pub const FRAMES_ANALYZED_TOTAL: &str = "lagskill_frames_analyzed_total";
    pub const ANALYSIS_DURATION_SECONDS: &str = "lagskill_analysis_duration_seconds";
    pub const HIGHLIGHTS_SELECTED_TOTAL: &str = "lagskill_highlights_selected_total";
    pub const RUNS_COMPLETED_TOTAL: &str = "lagskill_runs_completed_total";
    pub const RUNS_FAILED_TOTAL: &str = "lagskill_runs_failed_total";
}

/// Install the Prometheus recorder with an HTTP listener on `addr`.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> WorkerResult<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| WorkerError::config_error(format!("metrics exporter: {}", e)))
}

pub fn record_analysis(operation: &str, frames: u64, duration_secs: f64) {
    let labels = [("operation", operation.to_string())];
    counter!(names::FRAMES_ANALYZED_TOTAL, &labels).increment(frames);
    histogram!(names::ANALYSIS_DURATION_SECONDS, &labels).record(duration_secs);
}

pub fn record_highlights(count: usize) {
    counter!(names::HIGHLIGHTS_SELECTED_TOTAL).increment(count as u64);
}

pub fn record_run_completed(operation: &str) {
    let labels = [("operation", operation.to_string())];
    counter!(names::RUNS_COMPLETED_TOTAL, &labels).increment(1);
}

pub fn record_run_failed(operation: &str, error: &WorkerError) {
    let labels = [
        ("operation", operation.to_string()),
        ("error", error.kind().to_string()),
    ];
    counter!(names::RUNS_FAILED_TOTAL, &labels).increment(1);
}
