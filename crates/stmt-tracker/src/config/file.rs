//! TOML configuration file loading

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use super::builder::ConfigBuilder;
use crate::Result;

/// Configuration file locations checked in order
const CONFIG_PATHS: &[&str] = &[
    "./stmt-tracker.toml",
    "~/.config/stmt-tracker/config.toml",
    "/etc/stmt-tracker/config.toml",
];

/// Find the first existing configuration file
pub fn find_config_file() -> Option<PathBuf> {
    for path_str in CONFIG_PATHS {
        let path = if path_str.starts_with('~') {
            if let Ok(home) = std::env::var("HOME") {
                PathBuf::from(path_str.replacen('~', &home, 1))
            } else {
                continue;
            }
        } else {
            PathBuf::from(path_str)
        };

        if path.exists() {
            return Some(path);
        }
    }
    None
}

/// Load configuration from a TOML file
pub fn load_from_file(path: &Path, builder: ConfigBuilder) -> Result<ConfigBuilder> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::Error::Config(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;

    let file_config: FileConfig = toml::from_str(&content).map_err(|e| {
        crate::Error::Config(format!(
            "Failed to parse config file {}: {}",
            path.display(),
            e
        ))
    })?;

    Ok(apply_file_config(builder, file_config))
}

fn apply_file_config(mut builder: ConfigBuilder, config: FileConfig) -> ConfigBuilder {
    // Tracker settings
    if let Some(tracker) = config.tracker {
        // 0 lifts the limit
        if let Some(limit) = tracker.max_open_statements {
            builder = builder.max_open_statements(NonZeroUsize::new(limit));
        }

        if let Some(warn) = tracker.warn_on_leak {
            builder = builder.warn_on_leak(warn);
        }

        if let Some(validate) = tracker.validate_on_recycle {
            builder = builder.validate_on_recycle(validate);
        }
    }

    // Pool settings
    if let Some(pool) = config.pool {
        if let Some(size) = pool.max_size
            && let Some(nz) = NonZeroUsize::new(size)
        {
            builder = builder.pool_size(nz);
        }

        if let Some(secs) = pool.wait_timeout_secs {
            builder = builder.wait_timeout(Some(Duration::from_secs(secs)));
        }

        if let Some(secs) = pool.create_timeout_secs {
            builder = builder.create_timeout(Some(Duration::from_secs(secs)));
        }

        if let Some(secs) = pool.recycle_timeout_secs {
            builder = builder.recycle_timeout(Some(Duration::from_secs(secs)));
        }
    }

    // Observability settings
    if let Some(obs) = config.observability {
        if let Some(level) = obs.log_level {
            builder = builder.log_level(level);
        }

        if let Some(json) = obs.json_logs {
            builder = builder.json_logs(json);
        }
    }

    builder
}

/// Root configuration file structure
#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    tracker: Option<TrackerFileConfig>,
    pool: Option<PoolFileConfig>,
    observability: Option<ObservabilityConfig>,
}

#[derive(Debug, Deserialize)]
struct TrackerFileConfig {
    max_open_statements: Option<usize>,
    warn_on_leak: Option<bool>,
    validate_on_recycle: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct PoolFileConfig {
    max_size: Option<usize>,
    wait_timeout_secs: Option<u64>,
    create_timeout_secs: Option<u64>,
    recycle_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ObservabilityConfig {
    log_level: Option<String>,
    json_logs: Option<bool>,
}
