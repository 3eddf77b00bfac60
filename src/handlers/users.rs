//! User handlers: create, read, update, delete.
//!
//! The path id is passed through as supplied; PostgreSQL decides whether it is
//! a valid integer, and a rejected id surfaces as a 500.

use crate::error::{ApiError, AppError, ErrorBody};
use crate::models::{NewUser, User, UserChanges};
use crate::response::{created, ok};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

pub const CREATE_FAILED: &str = "Error creating user";
pub const READ_FAILED: &str = "Error retrieving user";
pub const UPDATE_FAILED: &str = "Error updating user";
pub const DELETE_FAILED: &str = "Error deleting user";
pub const INVALID_BODY: &str = "Invalid request body";

/// Unwrap a JSON body. A missing content type (415) and an unreadable or
/// oversized body (413) keep axum's status; anything else is a 400.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(v)| v).map_err(|rejection| {
        let status = match &rejection {
            JsonRejection::MissingJsonContentType(_) | JsonRejection::BytesRejection(_) => rejection.status(),
            _ => StatusCode::BAD_REQUEST,
        };
        AppError::Rejected {
            status,
            reason: rejection.body_text(),
        }
        .during(INVALID_BODY)
    })
}

fn found(user: Option<User>) -> Result<User, AppError> {
    user.ok_or(AppError::NotFound)
}

#[utoipa::path(
    post,
    path = "/users",
    request_body = NewUser,
    responses(
        (status = 201, description = "Created user", body = User),
        (status = 400, description = "Body is not valid JSON for a user", body = ErrorBody),
        (status = 413, description = "Body too large", body = ErrorBody),
        (status = 415, description = "Content type is not application/json", body = ErrorBody),
        (status = 500, description = "Database error", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let data = body(payload)?;
    let user = state
        .users
        .create_user(&data)
        .await
        .map_err(|e| e.during(CREATE_FAILED))?;
    tracing::info!(id = user.id, "user created");
    Ok(created(user))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 404, description = "No user with this id", body = ErrorBody),
        (status = 500, description = "Database error", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state
        .users
        .get_user(&id)
        .await
        .and_then(found)
        .map_err(|e| e.during(READ_FAILED))?;
    Ok(ok(user))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = UserChanges,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Body is not valid JSON for a user", body = ErrorBody),
        (status = 413, description = "Body too large", body = ErrorBody),
        (status = 415, description = "Content type is not application/json", body = ErrorBody),
        (status = 404, description = "No user with this id", body = ErrorBody),
        (status = 500, description = "Database error", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UserChanges>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let changes = body(payload)?;
    let user = state
        .users
        .update_user(&id, &changes)
        .await
        .and_then(found)
        .map_err(|e| e.during(UPDATE_FAILED))?;
    Ok(ok(user))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Deleted user", body = User),
        (status = 404, description = "No user with this id", body = ErrorBody),
        (status = 500, description = "Database error", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state
        .users
        .delete_user(&id)
        .await
        .and_then(found)
        .map_err(|e| e.during(DELETE_FAILED))?;
    tracing::info!(id = user.id, "user deleted");
    Ok(ok(user))
}
