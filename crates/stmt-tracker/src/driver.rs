//! Driver-side capability traits.
//!
//! The tracking layer never interprets SQL text or result contents. A driver
//! plugs in by implementing [`Connection`] for its physical connection and
//! [`Statement`] for the executable statements that connection opens.

use std::time::Duration;

use crate::types::{
    Concurrency, CurrentResult, FetchDirection, GeneratedKeys, Holdability, ResultSetType,
    SqlWarning,
};

/// An openable, closable, executable statement-like resource.
///
/// [`StatementHandle`](crate::StatementHandle) implements this trait as well,
/// so a tracked statement can be passed anywhere a driver statement is
/// expected.
pub trait Statement: Send + 'static {
    /// Cursor over the rows produced by a query.
    type ResultSet;

    /// Error raised by the driver.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Execute a query and return its result set.
    fn execute_query(&mut self, sql: &str) -> Result<Self::ResultSet, Self::Error>;

    /// Execute a DML or DDL statement and return the affected row count.
    fn execute_update(&mut self, sql: &str) -> Result<u64, Self::Error>;

    /// Execute any statement. Returns `true` when the first result is a result set.
    fn execute(&mut self, sql: &str) -> Result<bool, Self::Error>;

    /// Like [`execute_update`](Self::execute_update), making generated keys available.
    fn execute_update_with_keys(
        &mut self,
        sql: &str,
        keys: &GeneratedKeys,
    ) -> Result<u64, Self::Error>;

    /// Like [`execute`](Self::execute), making generated keys available.
    fn execute_with_keys(&mut self, sql: &str, keys: &GeneratedKeys) -> Result<bool, Self::Error>;

    fn max_field_size(&self) -> Result<usize, Self::Error>;

    fn set_max_field_size(&mut self, max: usize) -> Result<(), Self::Error>;

    fn max_rows(&self) -> Result<u64, Self::Error>;

    fn set_max_rows(&mut self, max: u64) -> Result<(), Self::Error>;

    fn set_escape_processing(&mut self, enable: bool) -> Result<(), Self::Error>;

    /// Query timeout; `None` means no limit.
    fn query_timeout(&self) -> Result<Option<Duration>, Self::Error>;

    fn set_query_timeout(&mut self, timeout: Option<Duration>) -> Result<(), Self::Error>;

    /// Ask the driver to abort the statement's current execution.
    fn cancel(&mut self) -> Result<(), Self::Error>;

    fn warnings(&self) -> Result<Vec<SqlWarning>, Self::Error>;

    fn clear_warnings(&mut self) -> Result<(), Self::Error>;

    fn set_cursor_name(&mut self, name: &str) -> Result<(), Self::Error>;

    /// Current result as a result set, if it is one.
    fn result_set(&mut self) -> Result<Option<Self::ResultSet>, Self::Error>;

    /// Current result as an update count, if it is one.
    fn update_count(&self) -> Result<Option<u64>, Self::Error>;

    /// Move to the next result. Returns `true` when it is a result set.
    fn more_results(&mut self, current: CurrentResult) -> Result<bool, Self::Error>;

    fn set_fetch_direction(&mut self, direction: FetchDirection) -> Result<(), Self::Error>;

    fn fetch_direction(&self) -> Result<FetchDirection, Self::Error>;

    fn set_fetch_size(&mut self, rows: u32) -> Result<(), Self::Error>;

    fn fetch_size(&self) -> Result<u32, Self::Error>;

    fn result_set_concurrency(&self) -> Result<Concurrency, Self::Error>;

    fn result_set_type(&self) -> Result<ResultSetType, Self::Error>;

    fn result_set_holdability(&self) -> Result<Holdability, Self::Error>;

    /// Append a command to the current batch.
    fn add_batch(&mut self, sql: &str) -> Result<(), Self::Error>;

    fn clear_batch(&mut self) -> Result<(), Self::Error>;

    /// Execute the accumulated batch and return one update count per command.
    fn execute_batch(&mut self) -> Result<Vec<u64>, Self::Error>;

    fn generated_keys(&mut self) -> Result<Self::ResultSet, Self::Error>;

    /// Release the driver-side resources of this statement.
    ///
    /// Called at most once; the statement is dropped right after.
    fn close(&mut self) -> Result<(), Self::Error>;
}

/// A physical database connection able to open statements.
pub trait Connection: Send {
    type Statement: Statement;

    /// Open a new statement on this connection.
    fn create_statement(
        &mut self,
    ) -> Result<Self::Statement, <Self::Statement as Statement>::Error>;

    /// Cheap liveness probe used when a pool recycles the connection.
    fn is_valid(&mut self) -> bool {
        true
    }
}
