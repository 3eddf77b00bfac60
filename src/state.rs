//! Shared application state for all routes.

use crate::service::UserService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserService>,
}

impl AppState {
    pub fn new(users: Arc<dyn UserService>) -> Self {
        AppState { users }
    }
}
