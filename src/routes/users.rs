//! User resource routes.

use crate::handlers::users::{create_user, delete_user, get_user, update_user};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

pub fn user_routes(state: AppState) -> Router {
    Router::new()
        .route("/users", post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .with_state(state)
}
