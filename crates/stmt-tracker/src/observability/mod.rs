//! Logging and metrics setup

#[cfg(feature = "metrics")]
mod metrics;

#[cfg(feature = "metrics")]
pub use metrics::{
    init_metrics, record_reclaim, record_statement_closed, record_statement_opened,
    record_statements_leaked, render_metrics,
};

use crate::Result;
use crate::config::TelemetryConfig;
use crate::error::Error;

const DEFAULT_LOG_LEVEL: &str = "info";

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over the configured level. Fails when a global subscriber
/// is already installed.
pub fn init_logging(config: &TelemetryConfig) -> Result<()> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{EnvFilter, Layer};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directive(config)));

    let fmt_layer = if config.json_logs {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().with_target(true).boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to install tracing subscriber: {e}")))
}

fn log_directive(config: &TelemetryConfig) -> &str {
    if config.log_level.trim().is_empty() {
        DEFAULT_LOG_LEVEL
    } else {
        &config.log_level
    }
}
