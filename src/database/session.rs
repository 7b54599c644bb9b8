use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::session::Session;
use chrono::{DateTime, Utc};

#[async_trait::async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create_session(&self, session_id: &str, user_id: i32, expires_at: DateTime<Utc>) -> Result<(), AppError>;
    async fn get_session(&self, session_id: &str) -> Result<Option<Session>, AppError>;
    async fn delete_session(&self, session_id: &str) -> Result<bool, AppError>;
    /// Removes every session with `expires_at < now` and returns how many went.
    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}

#[async_trait::async_trait]
impl SessionRepository for PostgresRepository {
    async fn create_session(&self, session_id: &str, user_id: i32, expires_at: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO admin_session (id, user_id, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(session_id)
        .bind(user_id)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<Session>, AppError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_id, expires_at, created_at
            FROM admin_session
            WHERE id = $1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    async fn delete_session(&self, session_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM admin_session WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM admin_session WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
