//! Configuration builder

use std::num::NonZeroUsize;
use std::time::Duration;

use crate::Error;

/// Complete configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub tracker: TrackerConfig,
    pub pool: PoolConfig,
    pub telemetry: TelemetryConfig,
}

impl Config {
    #[must_use]
    pub const fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    #[must_use]
    pub const fn tracker(&self) -> &TrackerConfig {
        &self.tracker
    }

    #[must_use]
    pub const fn pool(&self) -> &PoolConfig {
        &self.pool
    }

    #[must_use]
    pub const fn telemetry(&self) -> &TelemetryConfig {
        &self.telemetry
    }
}

/// Per-connection statement tracking settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Maximum statements open at once on one connection (`None` = unlimited)
    pub max_open_statements: Option<NonZeroUsize>,
    /// Log every statement still open when a connection is reclaimed
    pub warn_on_leak: bool,
    /// Check `Connection::is_valid` before a pooled connection is reused
    pub validate_on_recycle: bool,
}

impl TrackerConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_open_statements: None,
            warn_on_leak: true,
            validate_on_recycle: true,
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Connection pool settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_size: NonZeroUsize,
    /// Maximum time to wait for a free connection
    pub wait_timeout: Option<Duration>,
    pub create_timeout: Option<Duration>,
    pub recycle_timeout: Option<Duration>,
}

impl PoolConfig {
    const DEFAULT_MAX_SIZE: NonZeroUsize = NonZeroUsize::MIN.saturating_add(9); // 10

    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_size: Self::DEFAULT_MAX_SIZE,
            wait_timeout: Some(Duration::from_secs(30)),
            create_timeout: Some(Duration::from_secs(30)),
            recycle_timeout: Some(Duration::from_secs(5)),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub json_logs: bool,
}

/// Configuration builder with fluent API
#[derive(Debug)]
pub struct ConfigBuilder {
    tracker: TrackerConfig,
    pool: PoolConfig,
    telemetry: TelemetryConfig,
}

impl ConfigBuilder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tracker: TrackerConfig::new(),
            pool: PoolConfig::new(),
            telemetry: TelemetryConfig {
                log_level: String::new(),
                json_logs: false,
            },
        }
    }

    // Tracker configuration methods

    /// Limit the number of statements open at once per connection
    #[must_use]
    pub const fn max_open_statements(mut self, limit: Option<NonZeroUsize>) -> Self {
        self.tracker.max_open_statements = limit;
        self
    }

    #[must_use]
    pub const fn warn_on_leak(mut self, enabled: bool) -> Self {
        self.tracker.warn_on_leak = enabled;
        self
    }

    #[must_use]
    pub const fn validate_on_recycle(mut self, enabled: bool) -> Self {
        self.tracker.validate_on_recycle = enabled;
        self
    }

    // Pool configuration methods

    #[must_use]
    pub const fn pool_size(mut self, size: NonZeroUsize) -> Self {
        self.pool.max_size = size;
        self
    }

    #[must_use]
    pub const fn wait_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.pool.wait_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn create_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.pool.create_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn recycle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.pool.recycle_timeout = timeout;
        self
    }

    // Telemetry configuration methods

    #[must_use]
    pub fn log_level(mut self, level: String) -> Self {
        self.telemetry.log_level = level;
        self
    }

    #[must_use]
    pub const fn json_logs(mut self, enabled: bool) -> Self {
        self.telemetry.json_logs = enabled;
        self
    }

    pub fn build(self) -> crate::Result<Config> {
        if self.pool.create_timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::Config(
                "create_timeout must be greater than zero".into(),
            ));
        }

        Ok(Config {
            tracker: self.tracker,
            pool: self.pool,
            telemetry: self.telemetry,
        })
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
