//! User row and request payloads.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A row of the `users` table as returned to clients. The password column is never selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Body of `POST /users`. Fields are optional: missing ones are stored as NULL.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct NewUser {
    pub name: Option<String>,
    pub email: Option<String>,
    /// Accepted for compatibility with existing clients; not persisted.
    pub password: Option<String>,
}

/// Body of `PUT /users/{id}`. Only the supplied fields change.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
}
