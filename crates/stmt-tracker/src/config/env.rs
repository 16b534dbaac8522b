//! Environment variable loading for configuration

use std::env;
use std::num::NonZeroUsize;
use std::time::Duration;

use super::builder::ConfigBuilder;

/// Environment variable names
mod vars {
    pub const MAX_OPEN_STATEMENTS: &str = "STMT_TRACKER_MAX_OPEN_STATEMENTS";
    pub const WARN_ON_LEAK: &str = "STMT_TRACKER_WARN_ON_LEAK";
    pub const VALIDATE_ON_RECYCLE: &str = "STMT_TRACKER_VALIDATE_ON_RECYCLE";
    pub const POOL_SIZE: &str = "STMT_TRACKER_POOL_SIZE";
    pub const WAIT_TIMEOUT_SECS: &str = "STMT_TRACKER_WAIT_TIMEOUT_SECS";
    pub const CREATE_TIMEOUT_SECS: &str = "STMT_TRACKER_CREATE_TIMEOUT_SECS";
    pub const RECYCLE_TIMEOUT_SECS: &str = "STMT_TRACKER_RECYCLE_TIMEOUT_SECS";
    pub const RUST_LOG: &str = "RUST_LOG";
    pub const JSON_LOGS: &str = "STMT_TRACKER_JSON_LOGS";
}

/// Load configuration from environment variables
///
/// Unparsable values are ignored and leave the builder unchanged.
pub fn load_from_env(mut builder: ConfigBuilder) -> ConfigBuilder {
    // Statement limit; 0 means unlimited
    if let Ok(limit_str) = env::var(vars::MAX_OPEN_STATEMENTS)
        && let Ok(limit) = limit_str.parse::<usize>()
    {
        builder = builder.max_open_statements(NonZeroUsize::new(limit));
    }

    if let Ok(val) = env::var(vars::WARN_ON_LEAK) {
        builder = builder.warn_on_leak(parse_bool(&val));
    }

    if let Ok(val) = env::var(vars::VALIDATE_ON_RECYCLE) {
        builder = builder.validate_on_recycle(parse_bool(&val));
    }

    // Pool
    if let Ok(size_str) = env::var(vars::POOL_SIZE)
        && let Ok(size) = size_str.parse::<usize>()
        && let Some(nz) = NonZeroUsize::new(size)
    {
        builder = builder.pool_size(nz);
    }

    if let Some(timeout) = parse_timeout(vars::WAIT_TIMEOUT_SECS) {
        builder = builder.wait_timeout(timeout);
    }

    if let Some(timeout) = parse_timeout(vars::CREATE_TIMEOUT_SECS) {
        builder = builder.create_timeout(timeout);
    }

    if let Some(timeout) = parse_timeout(vars::RECYCLE_TIMEOUT_SECS) {
        builder = builder.recycle_timeout(timeout);
    }

    // Telemetry
    if let Ok(level) = env::var(vars::RUST_LOG) {
        builder = builder.log_level(level);
    }

    if let Ok(val) = env::var(vars::JSON_LOGS) {
        builder = builder.json_logs(parse_bool(&val));
    }

    builder
}

fn parse_bool(s: &str) -> bool {
    matches!(s.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

/// `Some(None)` disables the timeout (`none` or `off`), `None` means unset or invalid.
fn parse_timeout(var: &str) -> Option<Option<Duration>> {
    let value = env::var(var).ok()?;
    match value.trim().to_lowercase().as_str() {
        "none" | "off" => Some(None),
        secs => secs.parse::<u64>().ok().map(|s| Some(Duration::from_secs(s))),
    }
}
