//! In-memory `UserService` for router tests.

use crate::db::ConnectionState;
use crate::error::AppError;
use crate::models::{NewUser, User, UserChanges};
use crate::service::UserService;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryUsers {
    rows: Mutex<BTreeMap<i32, User>>,
    /// Last id handed out; like a SERIAL sequence it never goes back.
    last_id: AtomicI32,
    /// When set, every call fails as if the database were unreachable.
    down: bool,
}

impl MemoryUsers {
    pub fn down() -> Self {
        MemoryUsers {
            down: true,
            ..Default::default()
        }
    }

    pub fn snapshot(&self) -> Vec<User> {
        self.rows.lock().unwrap().values().cloned().collect()
    }

    fn check(&self, id: Option<&str>) -> Result<Option<i32>, AppError> {
        if self.down {
            return Err(AppError::Unavailable(ConnectionState::Failed));
        }
        // Same outcome as `$1::integer` on a non-numeric id.
        id.map(|id| {
            id.trim().parse::<i32>().map_err(|_| {
                AppError::Db(sqlx::Error::Protocol(format!(
                    "invalid input syntax for type integer: \"{}\"",
                    id
                )))
            })
        })
        .transpose()
    }
}

#[async_trait]
impl UserService for MemoryUsers {
    async fn create_user(&self, data: &NewUser) -> Result<User, AppError> {
        self.check(None)?;
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let mut rows = self.rows.lock().unwrap();
        let user = User {
            id,
            name: data.name.clone(),
            email: data.email.clone(),
        };
        rows.insert(id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let id = self.check(Some(id))?.unwrap_or_default();
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn update_user(&self, id: &str, changes: &UserChanges) -> Result<Option<User>, AppError> {
        let id = self.check(Some(id))?.unwrap_or_default();
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.get_mut(&id).map(|user| {
            if let Some(name) = &changes.name {
                user.name = Some(name.clone());
            }
            if let Some(email) = &changes.email {
                user.email = Some(email.clone());
            }
            user.clone()
        }))
    }

    async fn delete_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let id = self.check(Some(id))?.unwrap_or_default();
        Ok(self.rows.lock().unwrap().remove(&id))
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.check(None).map(|_| ())
    }
}
