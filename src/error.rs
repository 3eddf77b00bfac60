//! Typed errors and HTTP mapping.

use crate::db::ConnectionState;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("not found")]
    NotFound,
    #[error("request rejected: {reason}")]
    Rejected { status: StatusCode, reason: String },
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("database connection is {0}")]
    Unavailable(ConnectionState),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Attach the message reported to the client for the failed operation.
    pub fn during(self, message: &'static str) -> ApiError {
        ApiError {
            message,
            source: self,
        }
    }
}

/// Error returned by HTTP handlers: the failure plus what the handler was doing.
#[derive(Debug)]
pub struct ApiError {
    pub message: &'static str,
    pub source: AppError,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub const USER_NOT_FOUND: &str = "User not found";

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.source {
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    message: USER_NOT_FOUND.to_string(),
                    error: None,
                },
            ),
            AppError::Rejected { status, reason } => (
                *status,
                ErrorBody {
                    message: self.message.to_string(),
                    error: Some(reason.clone()),
                },
            ),
            other => {
                tracing::error!(error = %other, "{}", self.message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        message: self.message.to_string(),
                        error: Some(other.to_string()),
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
