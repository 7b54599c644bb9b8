use crate::auth::CurrentAdmin;
use crate::config::Config;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::middleware::rate_limit::AuthRateLimit;
use crate::models::admin::{AdminUser, LoginRequest, LoginResponse, ProfileResponse, ProfileUpdateRequest, SessionStatusResponse};
use crate::models::review::SuccessResponse;
use crate::service::auth::AuthService;
use crate::service::credentials::CredentialService;
use crate::service::session::SystemClock;
use rocket::http::{CookieJar, Status};
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{State, get, post, put};
use rocket_okapi::openapi;
use sqlx::PgPool;
use validator::Validate;

/// Log in with username and password; sets the session cookie
#[openapi(tag = "Admin")]
#[post("/login", data = "<payload>")]
pub async fn login(
    pool: &State<PgPool>,
    config: &State<Config>,
    cookies: &CookieJar<'_>,
    _rate_limit: AuthRateLimit,
    payload: Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let auth = AuthService::new(&repo, &config.session, &SystemClock);
    let user = auth.login(cookies, &payload.username, &payload.password).await?;

    Ok(Json(LoginResponse { success: true, user }))
}

/// Log out; destroys the session and clears the cookie
#[openapi(tag = "Admin")]
#[post("/logout")]
pub async fn logout(pool: &State<PgPool>, config: &State<Config>, cookies: &CookieJar<'_>) -> Result<Json<SuccessResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let auth = AuthService::new(&repo, &config.session, &SystemClock);
    auth.logout(cookies).await?;

    Ok(Json(SuccessResponse { success: true }))
}

/// Report whether the caller holds a live admin session
#[openapi(tag = "Admin")]
#[get("/session")]
pub async fn session_status(
    pool: &State<PgPool>,
    config: &State<Config>,
    cookies: &CookieJar<'_>,
) -> Result<Custom<Json<SessionStatusResponse>>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let auth = AuthService::new(&repo, &config.session, &SystemClock);

    let response = match auth.get_optional_auth(cookies).await? {
        Some(user) => Custom(
            Status::Ok,
            Json(SessionStatusResponse {
                authenticated: true,
                user: Some(user),
            }),
        ),
        None => Custom(
            Status::Unauthorized,
            Json(SessionStatusResponse {
                authenticated: false,
                user: None,
            }),
        ),
    };

    Ok(response)
}

/// Get the logged-in admin's profile
#[openapi(tag = "Admin")]
#[get("/profile")]
pub async fn get_profile(current_admin: CurrentAdmin) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        admin: AdminUser::from(&current_admin),
    })
}

/// Change the logged-in admin's username and/or password.
///
/// A new password is only accepted together with the current one.
#[openapi(tag = "Admin")]
#[put("/profile", data = "<payload>")]
pub async fn update_profile(
    pool: &State<PgPool>,
    current_admin: CurrentAdmin,
    payload: Json<ProfileUpdateRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let admin = CredentialService::new(&repo)
        .update_profile(&AdminUser::from(&current_admin), &payload)
        .await?;

    Ok(Json(ProfileResponse { admin }))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![login, logout, session_status, get_profile, update_profile]
}
