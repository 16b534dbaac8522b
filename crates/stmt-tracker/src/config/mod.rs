//! Configuration management
//!
//! Supports configuration loading with precedence: env > file > defaults

mod builder;
mod env;
mod file;

pub use builder::{Config, ConfigBuilder, PoolConfig, TelemetryConfig, TrackerConfig};

use crate::Result;

/// Load configuration with precedence: env > file > defaults
pub fn load_config() -> Result<ConfigBuilder> {
    let mut builder = ConfigBuilder::new();

    if let Some(path) = file::find_config_file() {
        tracing::info!("Loading configuration from {}", path.display());
        builder = file::load_from_file(&path, builder)?;
    }

    builder = env::load_from_env(builder);

    Ok(builder)
}

/// Load configuration from a specific file path
pub fn load_config_from_path(path: &std::path::Path) -> Result<ConfigBuilder> {
    let mut builder = ConfigBuilder::new();

    builder = file::load_from_file(path, builder)?;

    builder = env::load_from_env(builder);

    Ok(builder)
}

/// Environment helpers shared by every test that reads configuration variables.
#[cfg(test)]
pub(super) mod test_env {
    use std::env;
    use std::sync::{Mutex, PoisonError};

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Run `f` with `vars` set, restoring the previous values afterwards.
    pub fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let vars: Vec<_> = vars.iter().map(|(k, v)| (*k, Some(*v))).collect();
        with_env(&vars, f)
    }

    /// Run `f` with `keys` removed, restoring the previous values afterwards.
    pub fn without_env_vars<F, R>(keys: &[&str], f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let vars: Vec<_> = keys.iter().map(|k| (*k, None)).collect();
        with_env(&vars, f)
    }

    /// Run `f` with each var set (`Some`) or removed (`None`).
    pub fn with_env<F, R>(vars: &[(&str, Option<&str>)], f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(PoisonError::into_inner);

        let old_values: Vec<_> = vars.iter().map(|(k, _)| (*k, env::var(k).ok())).collect();

        for (key, value) in vars {
            // SAFETY: Every test touching configuration variables holds ENV_MUTEX
            match value {
                Some(v) => unsafe { env::set_var(key, v) },
                None => unsafe { env::remove_var(key) },
            }
        }

        let result = f();

        for (key, old_value) in old_values {
            // SAFETY: Every test touching configuration variables holds ENV_MUTEX
            match old_value {
                Some(v) => unsafe { env::set_var(key, v) },
                None => unsafe { env::remove_var(key) },
            }
        }

        result
    }
}
