//! User service server: connects to PostgreSQL, ensures the `users` table, serves the API.
//!
//! Exits with status 1 when configuration is invalid or the database cannot be
//! reached at startup; no listener is bound in that case.

use std::process::ExitCode;
use tokio::signal;
use user_service::{init_tracing, run, AppError, Config};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let result = match Config::from_env() {
        Ok(config) => {
            tracing::debug!(?config, "configuration loaded");
            run(config, shutdown_signal()).await
        }
        Err(e) => Err(AppError::from(e)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "user service stopped");
            ExitCode::FAILURE
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C"),
        _ = terminate => tracing::info!("received SIGTERM"),
    }
    tracing::info!("shutting down");
}
