//! Pooled connection that tracks the statements opened on it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::config::TrackerConfig;
use crate::driver::{Connection, Statement};
use crate::error::StatementError;
use crate::handle::StatementHandle;
use crate::registry::StatementRegistry;
use crate::report::ReclaimReport;

type DriverError<C> = <<C as Connection>::Statement as Statement>::Error;

/// A physical connection owned by a pool, plus the registry of statements
/// opened on it during the current lease.
///
/// Callers only ever see [`StatementHandle`]s. When the pool takes the
/// connection back it calls [`reclaim`](Self::reclaim), which force-closes
/// whatever the caller left open.
pub struct PooledConnection<C: Connection> {
    connection: Mutex<C>,
    registry: StatementRegistry<C::Statement>,
    config: TrackerConfig,
    leases: AtomicU64,
}

impl<C: Connection> PooledConnection<C> {
    pub fn new(connection: C, config: TrackerConfig) -> Self {
        Self {
            connection: Mutex::new(connection),
            registry: StatementRegistry::new(),
            config,
            leases: AtomicU64::new(0),
        }
    }

    /// Create a statement on the physical connection and return its tracked
    /// handle.
    ///
    /// # Errors
    ///
    /// [`StatementError::TooManyOpen`] when the configured limit is reached,
    /// [`StatementError::Driver`] when the driver cannot create the statement.
    pub fn open_statement(
        &self,
    ) -> Result<StatementHandle<C::Statement>, StatementError<DriverError<C>>> {
        let mut connection = self.connection.lock();

        if let Some(limit) = self.config.max_open_statements {
            let open = self.registry.len();
            if open >= limit.get() {
                tracing::debug!(open, limit = limit.get(), "statement limit reached");
                return Err(StatementError::TooManyOpen {
                    open,
                    limit: limit.get(),
                });
            }
        }

        let statement = connection
            .create_statement()
            .map_err(StatementError::Driver)?;
        Ok(self.registry.register(statement))
    }

    /// End the current lease: close every statement still open and report
    /// them.
    ///
    /// The connection is reclaimed whatever the report says; close failures
    /// are logged and returned but never propagated.
    pub fn reclaim(&self) -> ReclaimReport<DriverError<C>> {
        let report = self.registry.close_all();
        let lease = self.leases.fetch_add(1, Ordering::Relaxed) + 1;

        if report.is_clean() {
            tracing::debug!(lease, "connection reclaimed");
        } else {
            self.log_leaks(&report, lease);
        }

        #[cfg(feature = "metrics")]
        crate::observability::record_reclaim();

        report
    }

    fn log_leaks(&self, report: &ReclaimReport<DriverError<C>>, lease: u64) {
        if self.config.warn_on_leak {
            for leak in &report.leaked {
                tracing::warn!(
                    statement = %leak.id,
                    open_for = ?leak.age,
                    lease,
                    "statement left open, closed on reclaim"
                );
            }
        }
        for failure in &report.failures {
            tracing::warn!(
                statement = %failure.id,
                error = %failure.error,
                lease,
                "failed to close leaked statement"
            );
        }
    }

    /// Ask the driver whether the physical connection is still usable.
    pub fn is_valid(&self) -> bool {
        self.connection.lock().is_valid()
    }

    pub fn open_count(&self) -> usize {
        self.registry.len()
    }

    /// Number of completed leases.
    pub fn lease_count(&self) -> u64 {
        self.leases.load(Ordering::Relaxed)
    }

    pub const fn registry(&self) -> &StatementRegistry<C::Statement> {
        &self.registry
    }

    pub const fn config(&self) -> &TrackerConfig {
        &self.config
    }
}

impl<C: Connection> Drop for PooledConnection<C> {
    /// Statements never outlive their connection, reclaimed or not.
    fn drop(&mut self) {
        let report = self.registry.close_all();
        if !report.is_clean() {
            let lease = self.leases.load(Ordering::Relaxed) + 1;
            tracing::warn!(
                leaked = report.leak_count(),
                "connection dropped with open statements"
            );
            self.log_leaks(&report, lease);
        }
    }
}

impl<C: Connection> fmt::Debug for PooledConnection<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledConnection")
            .field("open", &self.open_count())
            .field("leases", &self.lease_count())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
