//! Connection pool using [`deadpool`].
//!
//! Every pooled object is a [`PooledConnection`]. Returning an object to the
//! pool ends its lease: the next checkout recycles it, which force-closes any
//! statement the previous holder left open before anyone else can use the
//! connection.

use deadpool::Runtime;
use deadpool::managed::{self, Metrics, RecycleError, RecycleResult};

use crate::config::{Config, TrackerConfig};
use crate::connection::PooledConnection;
use crate::driver::Connection;
use crate::error::{Error, Result};

/// Opens physical connections for the pool.
///
/// `connect` is called from the pool's async `create`; a blocking driver
/// holds a runtime worker while it connects.
pub trait Connector: Send + Sync {
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync + 'static;

    fn connect(&self) -> std::result::Result<Self::Connection, Self::Error>;
}

pub type Pool<K> = managed::Pool<TrackedConnectionManager<K>>;
pub type PooledObject<K> = managed::Object<TrackedConnectionManager<K>>;

#[derive(Debug)]
pub struct TrackedConnectionManager<K> {
    connector: K,
    tracker: TrackerConfig,
}

impl<K: Connector> TrackedConnectionManager<K> {
    pub const fn new(connector: K, tracker: TrackerConfig) -> Self {
        Self { connector, tracker }
    }

    pub const fn connector(&self) -> &K {
        &self.connector
    }
}

impl<K: Connector> managed::Manager for TrackedConnectionManager<K> {
    type Type = PooledConnection<K::Connection>;
    type Error = Error;

    async fn create(&self) -> Result<Self::Type> {
        let connection = self
            .connector
            .connect()
            .map_err(|e| Error::Connect(e.to_string()))?;
        tracing::debug!("pooled connection created");
        Ok(PooledConnection::new(connection, self.tracker))
    }

    async fn recycle(&self, conn: &mut Self::Type, metrics: &Metrics) -> RecycleResult<Error> {
        // Leaks are logged by reclaim itself.
        conn.reclaim();

        if self.tracker.validate_on_recycle && !conn.is_valid() {
            tracing::warn!(
                recycled = metrics.recycle_count,
                "discarding pooled connection that failed validation"
            );
            return Err(RecycleError::Backend(Error::Validation(format!(
                "connection invalid after {} lease(s)",
                conn.lease_count()
            ))));
        }
        Ok(())
    }

    fn detach(&self, conn: &mut Self::Type) {
        let report = conn.reclaim();
        tracing::debug!(leaked = report.leak_count(), "pooled connection detached");
    }
}

/// Build a pool of tracked connections from `config`.
pub fn create_pool<K: Connector>(connector: K, config: &Config) -> Result<Pool<K>> {
    let pool = &config.pool;
    Pool::builder(TrackedConnectionManager::new(connector, config.tracker))
        .max_size(pool.max_size.get())
        .wait_timeout(pool.wait_timeout)
        .create_timeout(pool.create_timeout)
        .recycle_timeout(pool.recycle_timeout)
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| Error::Pool(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;
    use std::time::Duration;

    use super::*;
    use crate::config::ConfigBuilder;
    use crate::driver::Statement;
    use crate::testing::{MockConnector, MockProbe};

    fn connector() -> MockConnector {
        MockConnector::new(&MockProbe::default())
    }

    fn single_connection_config() -> Config {
        ConfigBuilder::new()
            .pool_size(NonZeroUsize::MIN)
            .wait_timeout(Some(Duration::from_secs(1)))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_manager_creates_tracked_connection() {
        use managed::Manager as _;

        let tracker = TrackerConfig {
            max_open_statements: NonZeroUsize::new(1),
            ..TrackerConfig::default()
        };
        let manager = TrackedConnectionManager::new(connector(), tracker);

        let conn = manager.create().await.unwrap();
        assert_eq!(manager.connector().connects(), 1);
        assert_eq!(conn.config(), &tracker);
        assert_eq!(conn.open_count(), 0);

        manager.connector().set_fail_connect(true);
        assert!(manager.create().await.unwrap_err().is_connect());
        assert_eq!(manager.connector().connects(), 1);
    }

    #[tokio::test]
    async fn test_create_pool_with_defaults() {
        let config = ConfigBuilder::new().build().unwrap();
        let pool = create_pool(connector(), &config).unwrap();
        assert_eq!(pool.status().max_size, 10);
    }

    #[tokio::test]
    async fn test_checkout_opens_tracked_statements() {
        let connector = connector();
        let pool = create_pool(connector.clone(), &single_connection_config()).unwrap();

        let conn = pool.get().await.unwrap();
        let mut stmt = conn.open_statement().unwrap();
        assert_eq!(stmt.execute_query("SELECT 1").unwrap(), vec!["SELECT 1"]);
        assert_eq!(conn.open_count(), 1);

        stmt.close().unwrap();
        assert_eq!(conn.open_count(), 0);
        assert_eq!(connector.connects(), 1);
    }

    #[tokio::test]
    async fn test_recycle_closes_leaked_statements() {
        let connector = connector();
        let pool = create_pool(connector.clone(), &single_connection_config()).unwrap();

        let conn = pool.get().await.unwrap();
        let leaked = conn.open_statement().unwrap();
        drop(conn);
        assert!(!leaked.is_closed());

        let conn = pool.get().await.unwrap();
        assert!(leaked.is_closed());
        assert_eq!(conn.open_count(), 0);
        assert_eq!(conn.lease_count(), 1);
        assert_eq!(connector.probe().closed(), 1);
        assert_eq!(connector.connects(), 1);
    }

    #[tokio::test]
    async fn test_invalid_connection_replaced() {
        let connector = connector();
        let pool = create_pool(connector.clone(), &single_connection_config()).unwrap();

        let conn = pool.get().await.unwrap();
        let _stmt = conn.open_statement().unwrap();
        connector.connection().set_valid(false);
        drop(conn);

        let conn = pool.get().await.unwrap();
        assert_eq!(connector.connects(), 2);
        assert_eq!(conn.lease_count(), 0);
        assert_eq!(connector.probe().closed(), 1);
    }

    #[tokio::test]
    async fn test_validation_can_be_disabled() {
        let connector = connector();
        let config = ConfigBuilder::new()
            .pool_size(NonZeroUsize::MIN)
            .validate_on_recycle(false)
            .build()
            .unwrap();
        let pool = create_pool(connector.clone(), &config).unwrap();

        let conn = pool.get().await.unwrap();
        connector.connection().set_valid(false);
        drop(conn);

        let _conn = pool.get().await.unwrap();
        assert_eq!(connector.connects(), 1);
    }

    #[tokio::test]
    async fn test_connect_failure_surfaces() {
        let connector = connector();
        connector.set_fail_connect(true);
        let pool = create_pool(connector, &single_connection_config()).unwrap();

        let err = pool.get().await.unwrap_err();
        match err {
            managed::PoolError::Backend(e) => {
                assert!(e.is_connect());
                assert!(e.to_string().contains("connection refused"));
            }
            other => panic!("unexpected pool error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_detach_reclaims() {
        let connector = connector();
        let pool = create_pool(connector.clone(), &single_connection_config()).unwrap();

        let conn = pool.get().await.unwrap();
        let leaked = conn.open_statement().unwrap();

        let detached = managed::Object::take(conn);
        assert!(leaked.is_closed());
        assert_eq!(detached.open_count(), 0);
        assert_eq!(detached.lease_count(), 1);
    }
}
