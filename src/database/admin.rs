use crate::database::postgres_repository::{PostgresRepository, is_unique_violation};
use crate::error::app_error::AppError;
use crate::models::admin::AdminCredentials;

#[async_trait::async_trait]
pub trait AdminRepository: Send + Sync {
    async fn count_admins(&self) -> Result<i64, AppError>;
    /// Inserts only when the table is empty; returns `None` if another admin already exists.
    async fn create_admin_if_none(&self, username: &str, password_hash: &str) -> Result<Option<AdminCredentials>, AppError>;
    async fn get_admin_by_username(&self, username: &str) -> Result<Option<AdminCredentials>, AppError>;
    async fn get_admin_by_id(&self, id: i32) -> Result<Option<AdminCredentials>, AppError>;
    /// Returns `false` when the id is unknown or the username belongs to someone else.
    async fn update_admin_username(&self, id: i32, username: &str) -> Result<bool, AppError>;
    async fn update_admin_password_hash(&self, id: i32, password_hash: &str) -> Result<bool, AppError>;
}

#[async_trait::async_trait]
impl AdminRepository for PostgresRepository {
    async fn count_admins(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin_user").fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn create_admin_if_none(&self, username: &str, password_hash: &str) -> Result<Option<AdminCredentials>, AppError> {
        let admin = sqlx::query_as::<_, AdminCredentials>(
            r#"
            INSERT INTO admin_user (username, password_hash)
            SELECT $1, $2
            WHERE NOT EXISTS (SELECT 1 FROM admin_user)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await;

        match admin {
            Ok(admin) => Ok(admin),
            // A concurrent seeder won the race on the same username.
            Err(err) if is_unique_violation(&err) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn get_admin_by_username(&self, username: &str) -> Result<Option<AdminCredentials>, AppError> {
        let admin = sqlx::query_as::<_, AdminCredentials>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM admin_user
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(admin)
    }

    async fn get_admin_by_id(&self, id: i32) -> Result<Option<AdminCredentials>, AppError> {
        let admin = sqlx::query_as::<_, AdminCredentials>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM admin_user
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(admin)
    }

    async fn update_admin_username(&self, id: i32, username: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE admin_user SET username = $1 WHERE id = $2")
            .bind(username)
            .bind(id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => Ok(done.rows_affected() > 0),
            Err(err) if is_unique_violation(&err) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn update_admin_password_hash(&self, id: i32, password_hash: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE admin_user SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::InMemoryRepository;

    #[tokio::test]
    async fn create_admin_if_none_only_inserts_once() {
        let repo = InMemoryRepository::default();

        let first = repo.create_admin_if_none("admin", "aa:bb").await.unwrap();
        let second = repo.create_admin_if_none("other", "cc:dd").await.unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(repo.count_admins().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn username_lookup_is_case_sensitive() {
        let repo = InMemoryRepository::default();
        repo.insert_admin("admin", "aa:bb");

        assert!(repo.get_admin_by_username("admin").await.unwrap().is_some());
        assert!(repo.get_admin_by_username("Admin").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn username_update_rejects_collisions() {
        let repo = InMemoryRepository::default();
        let first = repo.insert_admin("admin", "aa:bb");
        repo.insert_admin("newname", "cc:dd");

        assert!(!repo.update_admin_username(first.id, "newname").await.unwrap());
        assert!(repo.update_admin_username(first.id, "owner").await.unwrap());
        assert!(!repo.update_admin_username(999, "ghost").await.unwrap());
    }
}
