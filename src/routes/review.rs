use crate::auth::CurrentAdmin;
use crate::database::postgres_repository::PostgresRepository;
use crate::database::review::ReviewRepository;
use crate::error::app_error::AppError;
use crate::middleware::rate_limit::SubmissionRateLimit;
use crate::models::review::{PublicReview, Review, ReviewAction, ReviewActionRequest, ReviewListResponse, ReviewRequest, ReviewSubmittedResponse, SuccessResponse};
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{State, delete, get, patch, post};
use rocket_okapi::openapi;
use sqlx::PgPool;
use tracing::info;
use validator::Validate;

/// List approved reviews, newest first
#[openapi(tag = "Reviews")]
#[get("/")]
pub async fn list_public_reviews(pool: &State<PgPool>) -> Result<Json<ReviewListResponse<PublicReview>>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let reviews = repo.list_approved_reviews().await?;
    Ok(Json(ReviewListResponse {
        success: true,
        reviews: reviews.iter().map(PublicReview::from).collect(),
    }))
}

/// Submit a review; it stays hidden until an admin approves it
#[openapi(tag = "Reviews")]
#[post("/", data = "<payload>")]
pub async fn submit_review(
    pool: &State<PgPool>,
    _rate_limit: SubmissionRateLimit,
    payload: Json<ReviewRequest>,
) -> Result<Custom<Json<ReviewSubmittedResponse>>, AppError> {
    let request = payload.trimmed();
    request.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let review = repo.create_review(&request).await?;
    info!(review_id = review.id, rating = review.rating, "review submitted");

    Ok(Custom(
        Status::Created,
        Json(ReviewSubmittedResponse {
            success: true,
            message: "Thank you for your review! It will be published after approval.".to_string(),
            review: PublicReview::from(&review),
        }),
    ))
}

/// List every review, including unapproved ones
#[openapi(tag = "Admin Reviews")]
#[get("/")]
pub async fn list_all_reviews(pool: &State<PgPool>, _current_admin: CurrentAdmin) -> Result<Json<ReviewListResponse<Review>>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let reviews = repo.list_reviews().await?;
    Ok(Json(ReviewListResponse { success: true, reviews }))
}

/// Apply a moderation action to a review
#[openapi(tag = "Admin Reviews")]
#[patch("/<id>", data = "<payload>")]
pub async fn moderate_review(
    pool: &State<PgPool>,
    current_admin: CurrentAdmin,
    id: i32,
    payload: Json<ReviewActionRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    let Some(action) = payload.parse() else {
        return Err(AppError::BadRequest("Invalid action".to_string()));
    };

    let repo = PostgresRepository { pool: pool.inner().clone() };
    match action {
        ReviewAction::Approve => {
            if !repo.approve_review(id).await? {
                return Err(AppError::NotFound("Review not found".to_string()));
            }
            info!(review_id = id, admin_id = current_admin.id, "review approved");
        }
    }

    Ok(Json(SuccessResponse { success: true }))
}

/// Delete a review
#[openapi(tag = "Admin Reviews")]
#[delete("/<id>")]
pub async fn delete_review(pool: &State<PgPool>, current_admin: CurrentAdmin, id: i32) -> Result<Json<SuccessResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    if !repo.delete_review(id).await? {
        return Err(AppError::NotFound("Review not found".to_string()));
    }
    info!(review_id = id, admin_id = current_admin.id, "review deleted");

    Ok(Json(SuccessResponse { success: true }))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![list_public_reviews, submit_review]
}

pub fn admin_routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![list_all_reviews, moderate_review, delete_review]
}
