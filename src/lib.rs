//! User service: CRUD REST backend for users stored in PostgreSQL.

pub mod config;
pub mod db;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod models;
pub mod response;
pub mod routes;
pub mod server;
pub mod service;
pub mod sql;
pub mod state;
pub mod telemetry;

#[cfg(test)]
mod test_support;

pub use config::{Config, DatabaseConfig, ServerConfig};
pub use db::{ConnectionProvider, ConnectionState};
pub use error::{ApiError, AppError, ConfigError};
pub use models::{NewUser, User, UserChanges};
pub use routes::{app, common_routes, user_routes};
pub use server::{run, serve};
pub use service::{PgUserService, UserService};
pub use state::AppState;
pub use telemetry::init_tracing;
