//! Statements against the `users` table.
//!
//! Identifiers bind as text and are cast with `::integer` in SQL, so an id that
//! is not a number is rejected by PostgreSQL rather than parsed here.

use super::{PgBindValue, QueryBuf};
use crate::models::{NewUser, UserChanges};

pub const CREATE_USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        name TEXT,
        email TEXT,
        password TEXT
    )
"#;

const INSERT_USER: &str = "INSERT INTO users (name, email) VALUES ($1, $2) RETURNING id, name, email";

const SELECT_USER_BY_ID: &str = "SELECT id, name, email FROM users WHERE id = $1::integer";

const UPDATE_USER: &str = "UPDATE users SET name = COALESCE($1, name), email = COALESCE($2, email) \
     WHERE id = $3::integer RETURNING id, name, email";

const DELETE_USER: &str = "DELETE FROM users WHERE id = $1::integer RETURNING id, name, email";

/// INSERT name and email. The password is not stored by this statement.
pub fn insert_user(data: &NewUser) -> QueryBuf {
    QueryBuf {
        sql: INSERT_USER,
        params: vec![data.name.clone().into(), data.email.clone().into()],
    }
}

pub fn select_user_by_id(id: &str) -> QueryBuf {
    QueryBuf {
        sql: SELECT_USER_BY_ID,
        params: vec![id.into()],
    }
}

/// UPDATE only the supplied fields; an absent field binds NULL and COALESCE keeps the stored value.
pub fn update_user(id: &str, changes: &UserChanges) -> QueryBuf {
    QueryBuf {
        sql: UPDATE_USER,
        params: vec![
            changes.name.clone().into(),
            changes.email.clone().into(),
            id.into(),
        ],
    }
}

pub fn delete_user(id: &str) -> QueryBuf {
    QueryBuf {
        sql: DELETE_USER,
        params: vec![id.into()],
    }
}
