//! Process lifecycle: connect, ensure the schema, bind, serve until shutdown, close.
//!
//! The database is reached before the listener is bound, so a startup
//! connection failure leaves no port open.

use crate::config::{Config, ServerConfig};
use crate::db::ConnectionProvider;
use crate::error::AppError;
use crate::routes::app;
use crate::service::PgUserService;
use crate::state::AppState;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Connect to PostgreSQL, then serve until `shutdown` resolves.
pub async fn run<F>(config: Config, shutdown: F) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let db = Arc::new(ConnectionProvider::new(config.database.clone()));
    db.connect().await?;
    serve(db, &config.server, shutdown).await
}

/// Serve on an already connected provider. The pool is closed on every exit path.
pub async fn serve<F>(db: Arc<ConnectionProvider>, server: &ServerConfig, shutdown: F) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let result = serve_until(db.clone(), server, shutdown).await;
    db.close().await;
    result
}

async fn serve_until<F>(db: Arc<ConnectionProvider>, server: &ServerConfig, shutdown: F) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let users = PgUserService::new(db);
    users.ensure_schema().await?;
    let state = AppState::new(Arc::new(users));

    let listener = TcpListener::bind(server.bind_addr()).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::db::ConnectionState;
    use sqlx::postgres::PgPoolOptions;
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;

    const UNREACHABLE_DB: &str = "postgres://postgres@127.0.0.1:1/users";

    fn free_port() -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    fn local(port: u16) -> ServerConfig {
        ServerConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port,
        }
    }

    #[tokio::test]
    async fn unreachable_database_fails_startup_without_binding() {
        let port = free_port();
        let mut database = DatabaseConfig::new(UNREACHABLE_DB);
        database.acquire_timeout = Duration::from_secs(1);
        let config = Config {
            server: local(port),
            database,
        };

        let handle = tokio::spawn(run(config, std::future::pending()));
        while !handle.is_finished() {
            assert!(tokio::net::TcpStream::connect(("127.0.0.1", port)).await.is_err());
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, AppError::Db(_)), "unexpected error: {err:?}");
        assert!(tokio::net::TcpStream::connect(("127.0.0.1", port)).await.is_err());
    }

    #[tokio::test]
    async fn pool_is_closed_when_schema_setup_fails() {
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_secs(1))
            .connect_lazy(UNREACHABLE_DB)
            .unwrap();
        let db = Arc::new(ConnectionProvider::with_pool(pool));

        let err = serve(db.clone(), &local(free_port()), std::future::pending())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Db(_)), "unexpected error: {err:?}");
        assert_eq!(db.state(), ConnectionState::Closed);
    }
}
