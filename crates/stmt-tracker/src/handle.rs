//! Transparent statement proxy.
//!
//! [`StatementHandle`] implements [`Statement`] by forwarding every operation
//! to the driver statement it wraps. Only `close` has behavior of its own: it
//! unregisters the handle from its connection's registry before closing the
//! driver statement. Once closed, every operation fails with
//! [`StatementError::Closed`] without reaching the driver.

use std::fmt;
use std::sync::Weak;
use std::time::Duration;

use crate::driver::Statement;
use crate::error::StatementError;
use crate::registry::{RegistryInner, Slot, StatementId};
use crate::types::{
    Concurrency, CurrentResult, FetchDirection, GeneratedKeys, Holdability, ResultSetType,
    SqlWarning,
};

/// Generates `Statement` methods that pass their arguments to the wrapped
/// statement and its result back unchanged.
macro_rules! forward {
    () => {};
    (fn $name:ident(&self $(, $arg:ident: $ty:ty)*) -> $ret:ty; $($rest:tt)*) => {
        fn $name(&self $(, $arg: $ty)*) -> Result<$ret, Self::Error> {
            self.with_statement(|statement| statement.$name($($arg),*))
        }
        forward!($($rest)*);
    };
    (fn $name:ident(&mut self $(, $arg:ident: $ty:ty)*) -> $ret:ty; $($rest:tt)*) => {
        fn $name(&mut self $(, $arg: $ty)*) -> Result<$ret, Self::Error> {
            self.with_statement(|statement| statement.$name($($arg),*))
        }
        forward!($($rest)*);
    };
}

/// Proxy handed to callers in place of a driver statement.
///
/// The handle only holds a weak reference to its registry and never keeps the
/// connection alive. Dropping an open handle closes it.
pub struct StatementHandle<S: Statement> {
    id: StatementId,
    slot: Slot<S>,
    registry: Weak<RegistryInner<S>>,
}

impl<S: Statement> StatementHandle<S> {
    pub(crate) const fn new(
        id: StatementId,
        slot: Slot<S>,
        registry: Weak<RegistryInner<S>>,
    ) -> Self {
        Self { id, slot, registry }
    }

    pub const fn id(&self) -> StatementId {
        self.id
    }

    /// Whether the statement was closed, by this handle or by a reclaim.
    pub fn is_closed(&self) -> bool {
        self.slot.lock().is_none()
    }

    fn with_statement<R>(
        &self,
        f: impl FnOnce(&mut S) -> Result<R, S::Error>,
    ) -> Result<R, StatementError<S::Error>> {
        let mut guard = self.slot.lock();
        let statement = guard.as_mut().ok_or(StatementError::Closed(self.id))?;
        f(statement).map_err(StatementError::Driver)
    }

    fn close_inner(&self) -> Result<(), StatementError<S::Error>> {
        // Unregister first so a failing driver close cannot leave a dangling entry.
        if let Some(registry) = self.registry.upgrade() {
            registry.unregister(self.id);
        }

        let taken = self.slot.lock().take();
        match taken {
            Some(mut statement) => {
                tracing::debug!(statement = %self.id, "closing statement");
                #[cfg(feature = "metrics")]
                crate::observability::record_statement_closed();
                statement.close().map_err(StatementError::Driver)
            }
            None => Ok(()),
        }
    }
}

impl<S: Statement> Statement for StatementHandle<S> {
    type ResultSet = S::ResultSet;
    type Error = StatementError<S::Error>;

    forward! {
        fn execute_query(&mut self, sql: &str) -> S::ResultSet;
        fn execute_update(&mut self, sql: &str) -> u64;
        fn execute(&mut self, sql: &str) -> bool;
        fn execute_update_with_keys(&mut self, sql: &str, keys: &GeneratedKeys) -> u64;
        fn execute_with_keys(&mut self, sql: &str, keys: &GeneratedKeys) -> bool;
        fn max_field_size(&self) -> usize;
        fn set_max_field_size(&mut self, max: usize) -> ();
        fn max_rows(&self) -> u64;
        fn set_max_rows(&mut self, max: u64) -> ();
        fn set_escape_processing(&mut self, enable: bool) -> ();
        fn query_timeout(&self) -> Option<Duration>;
        fn set_query_timeout(&mut self, timeout: Option<Duration>) -> ();
        fn cancel(&mut self) -> ();
        fn warnings(&self) -> Vec<SqlWarning>;
        fn clear_warnings(&mut self) -> ();
        fn set_cursor_name(&mut self, name: &str) -> ();
        fn result_set(&mut self) -> Option<S::ResultSet>;
        fn update_count(&self) -> Option<u64>;
        fn more_results(&mut self, current: CurrentResult) -> bool;
        fn set_fetch_direction(&mut self, direction: FetchDirection) -> ();
        fn fetch_direction(&self) -> FetchDirection;
        fn set_fetch_size(&mut self, rows: u32) -> ();
        fn fetch_size(&self) -> u32;
        fn result_set_concurrency(&self) -> Concurrency;
        fn result_set_type(&self) -> ResultSetType;
        fn result_set_holdability(&self) -> Holdability;
        fn add_batch(&mut self, sql: &str) -> ();
        fn clear_batch(&mut self) -> ();
        fn execute_batch(&mut self) -> Vec<u64>;
        fn generated_keys(&mut self) -> S::ResultSet;
    }

    /// Unregister from the owning registry, then close the driver statement.
    ///
    /// Closing an already closed handle succeeds without doing anything. When
    /// the driver fails to close, its error is returned but the handle stays
    /// closed.
    fn close(&mut self) -> Result<(), Self::Error> {
        self.close_inner()
    }
}

impl<S: Statement> Drop for StatementHandle<S> {
    fn drop(&mut self) {
        if let Err(e) = self.close_inner() {
            tracing::warn!(statement = %self.id, error = %e, "failed to close dropped statement");
        }
    }
}

impl<S: Statement> fmt::Debug for StatementHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatementHandle")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
