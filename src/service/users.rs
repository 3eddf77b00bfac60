//! User CRUD against PostgreSQL through the connection provider.

use crate::db::ConnectionProvider;
use crate::error::AppError;
use crate::models::{NewUser, User, UserChanges};
use crate::sql::{self, QueryBuf};
use async_trait::async_trait;
use sqlx::FromRow;
use std::sync::Arc;

/// Persistence operations used by the HTTP handlers.
///
/// Lookups by id return `Ok(None)` when no row matches; an `Err` always means
/// the database could not answer.
#[async_trait]
pub trait UserService: Send + Sync {
    async fn create_user(&self, data: &NewUser) -> Result<User, AppError>;
    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn update_user(&self, id: &str, changes: &UserChanges) -> Result<Option<User>, AppError>;
    async fn delete_user(&self, id: &str) -> Result<Option<User>, AppError>;
    /// Round trip to the database, for readiness checks.
    async fn ping(&self) -> Result<(), AppError>;
}

pub struct PgUserService {
    db: Arc<ConnectionProvider>,
}

impl PgUserService {
    pub fn new(db: Arc<ConnectionProvider>) -> Self {
        PgUserService { db }
    }

    /// Create the `users` table if it does not exist.
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        self.db.execute(sql::CREATE_USERS_TABLE).await?;
        Ok(())
    }

    async fn first_row(&self, q: QueryBuf) -> Result<Option<User>, AppError> {
        let rows = self.db.query(q.sql, &q.params).await?;
        match rows.first() {
            Some(row) => Ok(Some(User::from_row(row)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl UserService for PgUserService {
    async fn create_user(&self, data: &NewUser) -> Result<User, AppError> {
        self.first_row(sql::insert_user(data))
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        self.first_row(sql::select_user_by_id(id)).await
    }

    async fn update_user(&self, id: &str, changes: &UserChanges) -> Result<Option<User>, AppError> {
        self.first_row(sql::update_user(id, changes)).await
    }

    async fn delete_user(&self, id: &str) -> Result<Option<User>, AppError> {
        self.first_row(sql::delete_user(id)).await
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.db.query("SELECT 1", &[]).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::db::ConnectionState;

    #[tokio::test]
    async fn operations_propagate_an_unconnected_provider() {
        let db = Arc::new(ConnectionProvider::new(DatabaseConfig::new("postgres://localhost/users")));
        let service = PgUserService::new(db);

        let err = service.get_user("1").await.unwrap_err();
        assert!(matches!(err, AppError::Unavailable(ConnectionState::Uninitialized)));

        let err = service.create_user(&NewUser::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Unavailable(_)));

        assert!(service.ping().await.is_err());
        assert!(service.ensure_schema().await.is_err());
    }
}
