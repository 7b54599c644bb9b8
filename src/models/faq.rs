use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use validator::Validate;

pub const DEFAULT_FAQ_LOCALE: &str = "en";

#[derive(Serialize, Debug, Clone, sqlx::FromRow, JsonSchema)]
pub struct Faq {
    pub id: i32,
    pub question: String,
    pub answer: String,
    pub locale: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Clone, Validate, JsonSchema)]
pub struct FaqRequest {
    #[validate(length(min = 1, message = "Question is required"))]
    pub question: String,
    #[validate(length(min = 1, message = "Answer is required"))]
    pub answer: String,
    #[validate(length(min = 2, max = 10))]
    pub locale: Option<String>,
    pub sort_order: Option<i32>,
}

impl FaqRequest {
    pub fn locale(&self) -> &str {
        self.locale.as_deref().unwrap_or(DEFAULT_FAQ_LOCALE)
    }

    pub fn sort_order(&self) -> i32 {
        self.sort_order.unwrap_or(0)
    }
}

/// Only supplied fields are written.
#[derive(Deserialize, Debug, Clone, Default, Validate, JsonSchema)]
pub struct FaqUpdateRequest {
    #[validate(length(min = 1))]
    pub question: Option<String>,
    #[validate(length(min = 1))]
    pub answer: Option<String>,
    #[validate(length(min = 2, max = 10))]
    pub locale: Option<String>,
    pub sort_order: Option<i32>,
}

impl FaqUpdateRequest {
    pub fn is_empty(&self) -> bool {
        self.question.is_none() && self.answer.is_none() && self.locale.is_none() && self.sort_order.is_none()
    }
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct FaqResponse {
    pub faq: Faq,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct FaqListResponse {
    pub faqs: Vec<Faq>,
}
