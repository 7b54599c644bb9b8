use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::review::{Review, ReviewRequest};

#[async_trait::async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn list_approved_reviews(&self) -> Result<Vec<Review>, AppError>;
    async fn list_reviews(&self) -> Result<Vec<Review>, AppError>;
    async fn count_reviews(&self) -> Result<i64, AppError>;
    async fn create_review(&self, request: &ReviewRequest) -> Result<Review, AppError>;
    /// Inserts a review that is already visible on the public list.
    async fn create_approved_review(&self, request: &ReviewRequest) -> Result<Review, AppError>;
    async fn approve_review(&self, id: i32) -> Result<bool, AppError>;
    async fn delete_review(&self, id: i32) -> Result<bool, AppError>;
}

#[async_trait::async_trait]
impl ReviewRepository for PostgresRepository {
    async fn list_approved_reviews(&self) -> Result<Vec<Review>, AppError> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, name, email, rating, review, approved, created_at
            FROM review
            WHERE approved
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn list_reviews(&self) -> Result<Vec<Review>, AppError> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, name, email, rating, review, approved, created_at
            FROM review
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn count_reviews(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM review").fetch_one(&self.pool).await?;

        Ok(count)
    }

    async fn create_review(&self, request: &ReviewRequest) -> Result<Review, AppError> {
        insert_review(self, request, false).await
    }

    async fn create_approved_review(&self, request: &ReviewRequest) -> Result<Review, AppError> {
        insert_review(self, request, true).await
    }

    async fn approve_review(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE review SET approved = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_review(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM review WHERE id = $1").bind(id).execute(&self.pool).await?;

        Ok(result.rows_affected() > 0)
    }
}

async fn insert_review(repo: &PostgresRepository, request: &ReviewRequest, approved: bool) -> Result<Review, AppError> {
    let review = sqlx::query_as::<_, Review>(
        r#"
        INSERT INTO review (name, email, rating, review, approved)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, name, email, rating, review, approved, created_at
        "#,
    )
    .bind(&request.name)
    .bind(&request.email)
    .bind(request.rating)
    .bind(&request.review)
    .bind(approved)
    .fetch_one(&repo.pool)
    .await?;

    Ok(review)
}
