//! PostgreSQL user repository.

use super::UserRepository;
use crate::errors::IssuerError;
use crate::models::User;
use async_trait::async_trait;
use sqlx::PgPool;

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_user(
        &self,
        name: &str,
        password_digest: &str,
        scopes: &str,
    ) -> Result<User, IssuerError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, password, scopes)
            VALUES ($1, $2, $3)
            RETURNING id, name, password, scopes, created_at
            "#,
        )
        .bind(name)
        .bind(password_digest)
        .bind(scopes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| IssuerError::Database(format!("Failed to create user: {}", e)))?;

        Ok(user)
    }

    async fn get_by_id(&self, user_id: i64) -> Result<Option<User>, IssuerError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, password, scopes, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| IssuerError::Database(format!("Failed to fetch user by id: {}", e)))?;

        Ok(user)
    }

    async fn ping(&self) -> Result<(), IssuerError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| IssuerError::Database(format!("Database ping failed: {}", e)))?;
        Ok(())
    }
}
