use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use validator::Validate;

#[derive(Serialize, Debug, Clone, sqlx::FromRow, JsonSchema)]
pub struct Review {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub rating: i16,
    pub review: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

/// Public review submission.
#[derive(Deserialize, Debug, Clone, Validate, JsonSchema)]
pub struct ReviewRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required (max 100 characters)"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"), length(max = 255))]
    pub email: String,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i16,
    #[validate(length(min = 1, max = 1000, message = "Review is required (max 1000 characters)"))]
    pub review: String,
}

impl ReviewRequest {
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            rating: self.rating,
            review: self.review.trim().to_string(),
        }
    }
}

/// Public projection; the submitter's email stays in the admin panel.
#[derive(Serialize, Debug, Clone, JsonSchema)]
pub struct PublicReview {
    pub id: i32,
    pub name: String,
    pub rating: i16,
    pub review: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Review> for PublicReview {
    fn from(review: &Review) -> Self {
        Self {
            id: review.id,
            name: review.name.clone(),
            rating: review.rating,
            review: review.review.clone(),
            created_at: review.created_at,
        }
    }
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct ReviewListResponse<T> {
    pub success: bool,
    pub reviews: Vec<T>,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct ReviewSubmittedResponse {
    pub success: bool,
    pub message: String,
    pub review: PublicReview,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approve,
}

#[derive(Deserialize, Debug, JsonSchema)]
pub struct ReviewActionRequest {
    pub action: String,
}

impl ReviewActionRequest {
    pub fn parse(&self) -> Option<ReviewAction> {
        match self.action.as_str() {
            "approve" => Some(ReviewAction::Approve),
            _ => None,
        }
    }
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct SuccessResponse {
    pub success: bool,
}
