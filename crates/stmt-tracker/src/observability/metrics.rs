//! Prometheus metrics for statement tracking

use std::sync::OnceLock;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::Result;
use crate::error::Error;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

// Statement metrics
const METRIC_OPENED: &str = "stmt_tracker_statements_opened_total";
const METRIC_CLOSED: &str = "stmt_tracker_statements_closed_total";
const METRIC_OPEN: &str = "stmt_tracker_open_statements";

// Reclaim metrics
const METRIC_RECLAIMS: &str = "stmt_tracker_reclaims_total";
const METRIC_LEAKED: &str = "stmt_tracker_statements_leaked_total";
const METRIC_CLOSE_FAILURES: &str = "stmt_tracker_close_failures_total";

/// Initialize Prometheus metrics recorder.
pub fn init_metrics() -> Result<()> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| Error::Config(format!("Failed to install metrics recorder: {e}")))?;

    PROMETHEUS_HANDLE.set(handle).ok();

    register_metrics();
    tracing::info!("Prometheus metrics initialized");
    Ok(())
}

fn register_metrics() {
    describe_counter!(METRIC_OPENED, "Total statements registered for tracking");
    describe_counter!(METRIC_CLOSED, "Total statements closed by their owner");
    describe_gauge!(METRIC_OPEN, "Statements currently open across all connections");

    describe_counter!(METRIC_RECLAIMS, "Total connection reclaims");
    describe_counter!(METRIC_LEAKED, "Total statements force-closed on reclaim");
    describe_counter!(
        METRIC_CLOSE_FAILURES,
        "Total leaked statements whose close failed"
    );
}

/// Render metrics in Prometheus text format.
#[must_use]
pub fn render_metrics() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}

/// Record a statement entering a registry.
pub fn record_statement_opened() {
    counter!(METRIC_OPENED).increment(1);
    gauge!(METRIC_OPEN).increment(1.0);
}

/// Record a statement closed through its handle.
pub fn record_statement_closed() {
    counter!(METRIC_CLOSED).increment(1);
    gauge!(METRIC_OPEN).decrement(1.0);
}

/// Record a connection reclaim.
pub fn record_reclaim() {
    counter!(METRIC_RECLAIMS).increment(1);
}

/// Record statements force-closed by a sweep.
#[allow(clippy::cast_precision_loss)]
pub fn record_statements_leaked(leaked: usize, failures: usize) {
    gauge!(METRIC_OPEN).decrement(leaked as f64);
    counter!(METRIC_LEAKED).increment(leaked as u64);
    counter!(METRIC_CLOSE_FAILURES).increment(failures as u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_metrics_without_init() {
        let output = render_metrics();
        assert!(output.is_empty());
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_statement_opened();
        record_statement_closed();
        record_reclaim();
        record_statements_leaked(2, 1);
        assert!(render_metrics().is_empty());
    }
}
