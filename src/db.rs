//! Connection provider: owns the PostgreSQL pool for the process lifetime.
//!
//! State moves `Uninitialized -> Connecting -> Connected | Failed`, and to
//! `Closed` on shutdown. There is no way out of `Failed`: a failed startup
//! connection is not retried.

use crate::config::DatabaseConfig;
use crate::error::AppError;
use crate::sql::PgBindValue;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::{ConnectOptions, Connection};
use std::fmt;
use std::str::FromStr;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Uninitialized,
    Connecting,
    Connected,
    Failed,
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConnectionState::Uninitialized => "uninitialized",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Failed => "failed",
            ConnectionState::Closed => "closed",
        })
    }
}

struct Inner {
    state: ConnectionState,
    pool: Option<PgPool>,
}

pub struct ConnectionProvider {
    config: DatabaseConfig,
    inner: RwLock<Inner>,
}

impl ConnectionProvider {
    pub fn new(config: DatabaseConfig) -> Self {
        ConnectionProvider {
            config,
            inner: RwLock::new(Inner {
                state: ConnectionState::Uninitialized,
                pool: None,
            }),
        }
    }

    /// Wrap a pool that is already open; the provider starts `Connected`.
    pub fn with_pool(pool: PgPool) -> Self {
        let options = pool.options();
        let config = DatabaseConfig {
            url: String::new(),
            max_connections: options.get_max_connections(),
            acquire_timeout: options.get_acquire_timeout(),
        };
        ConnectionProvider {
            config,
            inner: RwLock::new(Inner {
                state: ConnectionState::Connected,
                pool: Some(pool),
            }),
        }
    }

    /// Open the pool. Only valid once, from `Uninitialized`.
    pub async fn connect(&self) -> Result<(), AppError> {
        {
            let mut inner = self.write();
            if inner.state != ConnectionState::Uninitialized {
                return Err(AppError::Unavailable(inner.state));
            }
            inner.state = ConnectionState::Connecting;
        }

        let result = self.open().await;

        let mut inner = self.write();
        match result {
            Ok(pool) => {
                tracing::info!(
                    max_connections = self.config.max_connections,
                    "connected to PostgreSQL"
                );
                inner.pool = Some(pool);
                inner.state = ConnectionState::Connected;
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "database connection failed");
                inner.state = ConnectionState::Failed;
                Err(AppError::Db(e))
            }
        }
    }

    /// One direct connection before building the pool, so an unreachable
    /// server reports its own error instead of a pool timeout.
    async fn open(&self) -> Result<PgPool, sqlx::Error> {
        let options = PgConnectOptions::from_str(&self.config.url)?;
        let first = tokio::time::timeout(self.config.acquire_timeout, options.connect())
            .await
            .map_err(|_| {
                sqlx::Error::Io(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "timed out connecting to PostgreSQL",
                ))
            })??;
        first.close().await?;

        Ok(PgPoolOptions::new()
            .max_connections(self.config.max_connections)
            .acquire_timeout(self.config.acquire_timeout)
            .connect_lazy_with(options))
    }

    pub fn state(&self) -> ConnectionState {
        self.read().state
    }

    /// Pool handle, available only while connected.
    pub fn pool(&self) -> Result<PgPool, AppError> {
        let inner = self.read();
        match (&inner.pool, inner.state) {
            (Some(pool), ConnectionState::Connected) => Ok(pool.clone()),
            (_, state) => Err(AppError::Unavailable(state)),
        }
    }

    /// Run one statement with positional parameters and return every row.
    pub async fn query(&self, sql: &str, params: &[PgBindValue]) -> Result<Vec<PgRow>, AppError> {
        let pool = self.pool()?;
        tracing::debug!(sql = %sql, params = ?params, "query");
        let mut query = sqlx::query(sql);
        for p in params {
            query = query.bind(p.clone());
        }
        Ok(query.fetch_all(&pool).await?)
    }

    /// Run a statement that returns no rows.
    pub async fn execute(&self, sql: &str) -> Result<u64, AppError> {
        let pool = self.pool()?;
        tracing::debug!(sql = %sql, "execute");
        let done = sqlx::query(sql).execute(&pool).await?;
        Ok(done.rows_affected())
    }

    /// Close the pool and wait for checked-out connections to return.
    pub async fn close(&self) {
        let pool = {
            let mut inner = self.write();
            inner.state = ConnectionState::Closed;
            inner.pool.take()
        };
        if let Some(pool) = pool {
            pool.close().await;
            tracing::info!("database connection closed");
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unusable() -> ConnectionProvider {
        ConnectionProvider::new(DatabaseConfig::new("not a database url"))
    }

    #[tokio::test]
    async fn queries_are_refused_before_connect() {
        let provider = unusable();
        assert_eq!(provider.state(), ConnectionState::Uninitialized);
        let err = provider.query("SELECT 1", &[]).await.unwrap_err();
        assert!(matches!(err, AppError::Unavailable(ConnectionState::Uninitialized)));
    }

    #[tokio::test]
    async fn failed_connect_is_terminal() {
        let provider = unusable();
        let err = provider.connect().await.unwrap_err();
        assert!(matches!(err, AppError::Db(_)));
        assert_eq!(provider.state(), ConnectionState::Failed);

        let err = provider.connect().await.unwrap_err();
        assert!(matches!(err, AppError::Unavailable(ConnectionState::Failed)));
        assert_eq!(provider.state(), ConnectionState::Failed);
        assert!(provider.pool().is_err());
    }

    #[tokio::test]
    async fn refused_connection_fails_fast_with_its_own_error() {
        let provider = ConnectionProvider::new(DatabaseConfig::new("postgres://postgres@127.0.0.1:1/users"));
        let err = tokio::time::timeout(std::time::Duration::from_secs(5), provider.connect())
            .await
            .expect("connect should not wait for the acquire timeout")
            .unwrap_err();
        match err {
            AppError::Db(sqlx::Error::Io(e)) => {
                assert_eq!(e.kind(), std::io::ErrorKind::ConnectionRefused)
            }
            other => panic!("expected a refused connection, got {other:?}"),
        }
        assert_eq!(provider.state(), ConnectionState::Failed);
    }

    #[tokio::test]
    async fn wrapped_pool_starts_connected() {
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect_lazy("postgres://postgres@127.0.0.1:1/users")
            .unwrap();
        let provider = ConnectionProvider::with_pool(pool);
        assert_eq!(provider.state(), ConnectionState::Connected);
        assert!(provider.pool().is_ok());

        let err = provider.connect().await.unwrap_err();
        assert!(matches!(err, AppError::Unavailable(ConnectionState::Connected)));

        provider.close().await;
        assert_eq!(provider.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn close_moves_to_closed() {
        let provider = unusable();
        provider.close().await;
        assert_eq!(provider.state(), ConnectionState::Closed);
        let err = provider.execute("SELECT 1").await.unwrap_err();
        assert!(matches!(err, AppError::Unavailable(ConnectionState::Closed)));
    }
}
