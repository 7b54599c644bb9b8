use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::faq::{Faq, FaqRequest, FaqUpdateRequest};

#[async_trait::async_trait]
pub trait FaqRepository: Send + Sync {
    async fn list_faqs(&self, locale: Option<&str>) -> Result<Vec<Faq>, AppError>;
    async fn get_faq_by_id(&self, id: i32) -> Result<Option<Faq>, AppError>;
    async fn create_faq(&self, request: &FaqRequest) -> Result<Faq, AppError>;
    async fn update_faq(&self, id: i32, request: &FaqUpdateRequest) -> Result<Option<Faq>, AppError>;
    async fn delete_faq(&self, id: i32) -> Result<bool, AppError>;
}

#[async_trait::async_trait]
impl FaqRepository for PostgresRepository {
    async fn list_faqs(&self, locale: Option<&str>) -> Result<Vec<Faq>, AppError> {
        let faqs = sqlx::query_as::<_, Faq>(
            r#"
            SELECT id, question, answer, locale, sort_order, created_at, updated_at
            FROM faq
            WHERE $1::TEXT IS NULL OR locale = $1
            ORDER BY sort_order ASC, id ASC
            "#,
        )
        .bind(locale)
        .fetch_all(&self.pool)
        .await?;

        Ok(faqs)
    }

    async fn get_faq_by_id(&self, id: i32) -> Result<Option<Faq>, AppError> {
        let faq = sqlx::query_as::<_, Faq>(
            r#"
            SELECT id, question, answer, locale, sort_order, created_at, updated_at
            FROM faq
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(faq)
    }

    async fn create_faq(&self, request: &FaqRequest) -> Result<Faq, AppError> {
        let faq = sqlx::query_as::<_, Faq>(
            r#"
            INSERT INTO faq (question, answer, locale, sort_order)
            VALUES ($1, $2, $3, $4)
            RETURNING id, question, answer, locale, sort_order, created_at, updated_at
            "#,
        )
        .bind(&request.question)
        .bind(&request.answer)
        .bind(request.locale())
        .bind(request.sort_order())
        .fetch_one(&self.pool)
        .await?;

        Ok(faq)
    }

    async fn update_faq(&self, id: i32, request: &FaqUpdateRequest) -> Result<Option<Faq>, AppError> {
        let faq = sqlx::query_as::<_, Faq>(
            r#"
            UPDATE faq
            SET question = COALESCE($1, question),
                answer = COALESCE($2, answer),
                locale = COALESCE($3, locale),
                sort_order = COALESCE($4, sort_order),
                updated_at = now()
            WHERE id = $5
            RETURNING id, question, answer, locale, sort_order, created_at, updated_at
            "#,
        )
        .bind(request.question.as_deref())
        .bind(request.answer.as_deref())
        .bind(request.locale.as_deref())
        .bind(request.sort_order)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(faq)
    }

    async fn delete_faq(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM faq WHERE id = $1").bind(id).execute(&self.pool).await?;

        Ok(result.rows_affected() > 0)
    }
}
