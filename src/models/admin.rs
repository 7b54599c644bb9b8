use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use validator::Validate;

/// Admin row as stored, including the salted hash.
///
/// Only the credential service and the repositories see this type; everything
/// that leaves the credential layer is an [`AdminUser`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminCredentials {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct AdminUser {
    pub id: i32,
    pub username: String,
}

impl From<&AdminCredentials> for AdminUser {
    fn from(credentials: &AdminCredentials) -> Self {
        Self {
            id: credentials.id,
            username: credentials.username.clone(),
        }
    }
}

impl From<AdminCredentials> for AdminUser {
    fn from(credentials: AdminCredentials) -> Self {
        Self {
            id: credentials.id,
            username: credentials.username,
        }
    }
}

#[derive(Deserialize, Debug, Validate, JsonSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub user: AdminUser,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct SessionStatusResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AdminUser>,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct ProfileResponse {
    pub admin: AdminUser,
}

/// Partial profile update. Absent fields are left untouched.
#[derive(Deserialize, Debug, Default, Validate, JsonSchema)]
pub struct ProfileUpdateRequest {
    #[validate(length(min = 1, max = 100))]
    pub username: Option<String>,
    pub current_password: Option<String>,
    #[validate(length(min = 1))]
    pub new_password: Option<String>,
}

impl ProfileUpdateRequest {
    /// Username to apply, if it differs from the current one.
    pub fn username_change<'a>(&'a self, current: &AdminUser) -> Option<&'a str> {
        self.username
            .as_deref()
            .map(str::trim)
            .filter(|username| !username.is_empty() && *username != current.username)
    }
}
