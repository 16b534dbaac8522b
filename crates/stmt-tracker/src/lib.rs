//! Statement lifecycle tracking for pooled database connections.
//!
//! Every statement opened through a [`PooledConnection`] is handed out as a
//! [`StatementHandle`]: a transparent proxy that forwards all operations to the
//! driver statement and only intercepts `close`. The connection's
//! [`StatementRegistry`] remembers which handles are still open, so that when
//! the pool reclaims the connection any statement the caller forgot about is
//! force-closed before the physical connection is reused.
//!
//! # Example
//!
//! ```rust,ignore
//! use stmt_tracker::{PooledConnection, Statement, TrackerConfig};
//!
//! let conn = PooledConnection::new(driver_connection, TrackerConfig::default());
//! let mut stmt = conn.open_statement()?;
//! stmt.set_fetch_size(512)?;
//! let rows = stmt.execute_query("SELECT ID FROM ORDERS")?;
//!
//! // Forgotten statements are closed here and reported.
//! let report = conn.reclaim();
//! assert!(report.is_clean());
//! ```

pub mod config;
mod connection;
mod driver;
mod error;
mod handle;
pub mod observability;
#[cfg(feature = "pool")]
pub mod pool;
mod registry;
mod report;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
mod types;

pub use config::{Config, ConfigBuilder, PoolConfig, TelemetryConfig, TrackerConfig};
pub use connection::PooledConnection;
pub use driver::{Connection, Statement};
pub use error::{Error, Result, StatementError};
pub use handle::StatementHandle;
#[cfg(feature = "pool")]
pub use pool::{Connector, Pool, PooledObject, TrackedConnectionManager, create_pool};
pub use registry::{OpenStatement, StatementId, StatementRegistry};
pub use report::{CloseFailure, LeakedStatement, ReclaimReport};
pub use types::{
    Concurrency, CurrentResult, FetchDirection, GeneratedKeys, Holdability, ResultSetType,
    SqlWarning,
};
