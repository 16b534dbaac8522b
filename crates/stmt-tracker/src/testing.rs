//! In-memory driver for tests and benchmarks.
//!
//! [`MockStatement`] echoes SQL back as its result set and fails any command
//! starting with `FAIL`. All statements created from one [`MockProbe`] report
//! into it, so tests can check how many calls actually reached the driver.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use thiserror::Error;

use crate::driver::{Connection, Statement};
use crate::types::{
    Concurrency, CurrentResult, FetchDirection, GeneratedKeys, Holdability, ResultSetType,
    SqlWarning,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct MockError(String);

impl MockError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Shared call counters.
#[derive(Debug, Clone, Default)]
pub struct MockProbe {
    forwarded: Arc<AtomicUsize>,
    close_attempts: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
    created: Arc<AtomicUsize>,
}

impl MockProbe {
    /// Calls other than `close` that reached a statement.
    pub fn forwarded(&self) -> usize {
        self.forwarded.load(Ordering::SeqCst)
    }

    pub fn close_attempts(&self) -> usize {
        self.close_attempts.load(Ordering::SeqCst)
    }

    /// Successful closes.
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Statements created by a [`MockConnection`].
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.forwarded.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug)]
pub struct MockStatement {
    probe: MockProbe,
    fail_close: bool,
    closed: bool,
    batch: Vec<String>,
    keys: GeneratedKeys,
    last_sql: Option<String>,
    fetch_size: u32,
    fetch_direction: FetchDirection,
    max_rows: u64,
    max_field_size: usize,
    query_timeout: Option<Duration>,
    escape_processing: bool,
    cursor_name: Option<String>,
    warnings: Vec<SqlWarning>,
}

impl MockStatement {
    pub fn new(probe: &MockProbe) -> Self {
        Self {
            probe: probe.clone(),
            fail_close: false,
            closed: false,
            batch: Vec::new(),
            keys: GeneratedKeys::None,
            last_sql: None,
            fetch_size: 0,
            fetch_direction: FetchDirection::Forward,
            max_rows: 0,
            max_field_size: 0,
            query_timeout: None,
            escape_processing: true,
            cursor_name: None,
            warnings: Vec::new(),
        }
    }

    /// Make `close` fail.
    #[must_use]
    pub const fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub const fn escape_processing(&self) -> bool {
        self.escape_processing
    }

    pub fn cursor_name(&self) -> Option<&str> {
        self.cursor_name.as_deref()
    }

    fn run(&mut self, sql: &str) -> Result<(), MockError> {
        self.probe.hit();
        if self.closed {
            return Err(MockError::new("statement used after driver close"));
        }
        if sql.starts_with("FAIL") {
            return Err(MockError::new(sql));
        }
        self.last_sql = Some(sql.to_owned());
        Ok(())
    }

    fn touch(&self) -> Result<(), MockError> {
        self.probe.hit();
        if self.closed {
            return Err(MockError::new("statement used after driver close"));
        }
        Ok(())
    }

    fn is_query(sql: &str) -> bool {
        sql.trim_start()
            .get(..6)
            .is_some_and(|head| head.eq_ignore_ascii_case("SELECT"))
    }
}

impl Statement for MockStatement {
    type ResultSet = Vec<String>;
    type Error = MockError;

    fn execute_query(&mut self, sql: &str) -> Result<Vec<String>, MockError> {
        self.run(sql)?;
        Ok(vec![sql.to_owned()])
    }

    fn execute_update(&mut self, sql: &str) -> Result<u64, MockError> {
        self.run(sql)?;
        Ok(1)
    }

    fn execute(&mut self, sql: &str) -> Result<bool, MockError> {
        self.run(sql)?;
        Ok(Self::is_query(sql))
    }

    fn execute_update_with_keys(
        &mut self,
        sql: &str,
        keys: &GeneratedKeys,
    ) -> Result<u64, MockError> {
        self.run(sql)?;
        self.keys = keys.clone();
        Ok(1)
    }

    fn execute_with_keys(&mut self, sql: &str, keys: &GeneratedKeys) -> Result<bool, MockError> {
        self.run(sql)?;
        self.keys = keys.clone();
        Ok(Self::is_query(sql))
    }

    fn max_field_size(&self) -> Result<usize, MockError> {
        self.touch()?;
        Ok(self.max_field_size)
    }

    fn set_max_field_size(&mut self, max: usize) -> Result<(), MockError> {
        self.touch()?;
        self.max_field_size = max;
        Ok(())
    }

    fn max_rows(&self) -> Result<u64, MockError> {
        self.touch()?;
        Ok(self.max_rows)
    }

    fn set_max_rows(&mut self, max: u64) -> Result<(), MockError> {
        self.touch()?;
        self.max_rows = max;
        Ok(())
    }

    fn set_escape_processing(&mut self, enable: bool) -> Result<(), MockError> {
        self.touch()?;
        self.escape_processing = enable;
        Ok(())
    }

    fn query_timeout(&self) -> Result<Option<Duration>, MockError> {
        self.touch()?;
        Ok(self.query_timeout)
    }

    fn set_query_timeout(&mut self, timeout: Option<Duration>) -> Result<(), MockError> {
        self.touch()?;
        self.query_timeout = timeout;
        Ok(())
    }

    fn cancel(&mut self) -> Result<(), MockError> {
        self.touch()
    }

    fn warnings(&self) -> Result<Vec<SqlWarning>, MockError> {
        self.touch()?;
        Ok(self.warnings.clone())
    }

    fn clear_warnings(&mut self) -> Result<(), MockError> {
        self.touch()?;
        self.warnings.clear();
        Ok(())
    }

    fn set_cursor_name(&mut self, name: &str) -> Result<(), MockError> {
        self.touch()?;
        self.cursor_name = Some(name.to_owned());
        Ok(())
    }

    fn result_set(&mut self) -> Result<Option<Vec<String>>, MockError> {
        self.touch()?;
        Ok(self
            .last_sql
            .clone()
            .filter(|sql| Self::is_query(sql))
            .map(|sql| vec![sql]))
    }

    fn update_count(&self) -> Result<Option<u64>, MockError> {
        self.touch()?;
        Ok(self
            .last_sql
            .as_deref()
            .filter(|sql| !Self::is_query(sql))
            .map(|_| 1))
    }

    fn more_results(&mut self, _current: CurrentResult) -> Result<bool, MockError> {
        self.touch()?;
        self.last_sql = None;
        Ok(false)
    }

    fn set_fetch_direction(&mut self, direction: FetchDirection) -> Result<(), MockError> {
        self.touch()?;
        self.fetch_direction = direction;
        Ok(())
    }

    fn fetch_direction(&self) -> Result<FetchDirection, MockError> {
        self.touch()?;
        Ok(self.fetch_direction)
    }

    fn set_fetch_size(&mut self, rows: u32) -> Result<(), MockError> {
        self.touch()?;
        self.fetch_size = rows;
        Ok(())
    }

    fn fetch_size(&self) -> Result<u32, MockError> {
        self.touch()?;
        Ok(self.fetch_size)
    }

    fn result_set_concurrency(&self) -> Result<Concurrency, MockError> {
        self.touch()?;
        Ok(Concurrency::ReadOnly)
    }

    fn result_set_type(&self) -> Result<ResultSetType, MockError> {
        self.touch()?;
        Ok(ResultSetType::ForwardOnly)
    }

    fn result_set_holdability(&self) -> Result<Holdability, MockError> {
        self.touch()?;
        Ok(Holdability::CloseAtCommit)
    }

    fn add_batch(&mut self, sql: &str) -> Result<(), MockError> {
        self.touch()?;
        self.batch.push(sql.to_owned());
        Ok(())
    }

    fn clear_batch(&mut self) -> Result<(), MockError> {
        self.touch()?;
        self.batch.clear();
        Ok(())
    }

    fn execute_batch(&mut self) -> Result<Vec<u64>, MockError> {
        self.touch()?;
        Ok(self.batch.drain(..).map(|_| 1).collect())
    }

    fn generated_keys(&mut self) -> Result<Vec<String>, MockError> {
        self.touch()?;
        Ok(match &self.keys {
            GeneratedKeys::None => Vec::new(),
            GeneratedKeys::All => vec!["GENERATED_KEY".to_owned()],
            GeneratedKeys::ColumnIndexes(indexes) => {
                indexes.iter().map(|i| format!("COLUMN_{i}")).collect()
            }
            GeneratedKeys::ColumnNames(names) => names.clone(),
        })
    }

    fn close(&mut self) -> Result<(), MockError> {
        self.probe.close_attempts.fetch_add(1, Ordering::SeqCst);
        self.closed = true;
        if self.fail_close {
            return Err(MockError::new("driver refused to close statement"));
        }
        self.probe.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Physical connection handing out [`MockStatement`]s.
#[derive(Debug, Clone)]
pub struct MockConnection {
    probe: MockProbe,
    fail_create: Arc<AtomicBool>,
    fail_close: Arc<AtomicBool>,
    valid: Arc<AtomicBool>,
}

impl MockConnection {
    pub fn new(probe: &MockProbe) -> Self {
        Self {
            probe: probe.clone(),
            fail_create: Arc::new(AtomicBool::new(false)),
            fail_close: Arc::new(AtomicBool::new(false)),
            valid: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn set_fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    /// Statements created from now on fail to close.
    pub fn set_fail_close(&self, fail: bool) {
        self.fail_close.store(fail, Ordering::SeqCst);
    }

    pub fn set_valid(&self, valid: bool) {
        self.valid.store(valid, Ordering::SeqCst);
    }
}

impl Connection for MockConnection {
    type Statement = MockStatement;

    fn create_statement(&mut self) -> Result<MockStatement, MockError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(MockError::new("cannot open statement: connection reset"));
        }
        self.probe.created.fetch_add(1, Ordering::SeqCst);
        let statement = MockStatement::new(&self.probe);
        if self.fail_close.load(Ordering::SeqCst) {
            Ok(statement.failing_close())
        } else {
            Ok(statement)
        }
    }

    fn is_valid(&mut self) -> bool {
        self.valid.load(Ordering::SeqCst)
    }
}

/// Connector producing [`MockConnection`]s that share one probe.
#[cfg(feature = "pool")]
#[derive(Debug, Clone)]
pub struct MockConnector {
    probe: MockProbe,
    connection: MockConnection,
    fail_connect: Arc<AtomicBool>,
    connects: Arc<AtomicUsize>,
}

#[cfg(feature = "pool")]
impl MockConnector {
    pub fn new(probe: &MockProbe) -> Self {
        Self {
            probe: probe.clone(),
            connection: MockConnection::new(probe),
            fail_connect: Arc::new(AtomicBool::new(false)),
            connects: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Control switches shared by every connection this connector creates.
    pub const fn connection(&self) -> &MockConnection {
        &self.connection
    }

    pub fn set_fail_connect(&self, fail: bool) {
        self.fail_connect.store(fail, Ordering::SeqCst);
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub const fn probe(&self) -> &MockProbe {
        &self.probe
    }
}

#[cfg(feature = "pool")]
impl crate::pool::Connector for MockConnector {
    type Connection = MockConnection;
    type Error = MockError;

    fn connect(&self) -> Result<MockConnection, MockError> {
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(MockError::new("connection refused"));
        }
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(self.connection.clone())
    }
}
