use crate::config::{Config, DEFAULT_SESSION_COOKIE_NAME};
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::admin::AdminUser;
use crate::service::auth::AuthService;
use crate::service::session::{SessionCookies, SystemClock};
use rocket::http::{Cookie, CookieJar, Status};
use rocket::outcome::Outcome;
use rocket::request::{FromRequest, Outcome as RequestOutcome, Request};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::{Object, OpenApi, RefOr, Responses, SecurityRequirement, SecurityScheme, SecuritySchemeData};
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};
use serde::Serialize;
use sqlx::PgPool;

/// Request guard for admin-only routes. Rejects with `401` when the caller
/// has no live session or the session's admin no longer exists.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentAdmin {
    pub id: i32,
    pub username: String,
}

impl From<AdminUser> for CurrentAdmin {
    fn from(admin: AdminUser) -> Self {
        Self {
            id: admin.id,
            username: admin.username,
        }
    }
}

impl From<&CurrentAdmin> for AdminUser {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            id: admin.id,
            username: admin.username.clone(),
        }
    }
}

impl SessionCookies for CookieJar<'_> {
    fn session_cookie(&self, name: &str) -> Option<String> {
        self.get(name).map(|cookie| cookie.value().to_string())
    }

    fn set_session_cookie(&self, cookie: Cookie<'static>) {
        self.add(cookie);
    }

    fn clear_session_cookie(&self, name: &str) {
        self.remove(Cookie::build(name.to_string()).path("/"));
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CurrentAdmin {
    type Error = AppError;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        let (Some(pool), Some(config)) = (req.rocket().state::<PgPool>(), req.rocket().state::<Config>()) else {
            return Outcome::Error((Status::InternalServerError, AppError::internal("auth state not configured")));
        };

        let repo = PostgresRepository { pool: pool.clone() };
        let auth = AuthService::new(&repo, &config.session, &SystemClock);

        match auth.require_auth(req.cookies()).await {
            Ok(admin) => {
                let current_admin = CurrentAdmin::from(admin);
                req.local_cache(|| Some(current_admin.clone()));
                Outcome::Success(current_admin)
            }
            Err(AppError::Unauthorized) => Outcome::Error((Status::Unauthorized, AppError::Unauthorized)),
            Err(err) => {
                tracing::error!(error = ?err, "failed to resolve admin session");
                Outcome::Error((Status::InternalServerError, err))
            }
        }
    }
}

const SESSION_SECURITY_SCHEME: &str = "cookieAuth";

fn session_security_scheme(cookie_name: &str) -> SecurityScheme {
    SecurityScheme {
        description: Some(format!(
            "Cookie-based admin session. Log in via POST /admin/login to obtain the `{cookie_name}` cookie."
        )),
        data: SecuritySchemeData::ApiKey {
            name: cookie_name.to_string(),
            location: "cookie".to_string(),
        },
        extensions: Object::default(),
    }
}

/// Points the session security scheme of merged docs at the configured cookie.
pub fn apply_session_cookie_name(docs: &mut OpenApi, cookie_name: &str) {
    let Some(components) = docs.components.as_mut() else {
        return;
    };
    if let Some(RefOr::Object(scheme)) = components.security_schemes.get_mut(SESSION_SECURITY_SCHEME) {
        *scheme = session_security_scheme(cookie_name);
    }
}

impl<'a> OpenApiFromRequest<'a> for CurrentAdmin {
    fn from_request_input(_gen: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        let mut security_req = SecurityRequirement::new();
        security_req.insert(SESSION_SECURITY_SCHEME.to_string(), Vec::new());

        Ok(RequestHeaderInput::Security(
            SESSION_SECURITY_SCHEME.to_string(),
            session_security_scheme(DEFAULT_SESSION_COOKIE_NAME),
            security_req,
        ))
    }

    fn get_responses(_gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        use rocket_okapi::okapi::openapi3::{RefOr, Response};
        let mut responses = Responses::default();
        responses.responses.insert(
            "401".to_string(),
            RefOr::Object(Response {
                description: "Unauthorized - admin session required".to_string(),
                ..Default::default()
            }),
        );
        Ok(responses)
    }
}
