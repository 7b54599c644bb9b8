use crate::error::app_error::AppError;
use rocket::State;
use rocket::get;
use rocket::serde::json::Json;
use rocket_okapi::openapi;
use schemars::JsonSchema;
use serde::Serialize;
use sqlx::PgPool;

#[derive(Serialize, Debug, JsonSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

/// Liveness plus a database round trip
#[openapi(tag = "Health")]
#[get("/")]
pub async fn healthcheck(pool: &State<PgPool>) -> Result<Json<HealthResponse>, AppError> {
    sqlx::query("SELECT 1").execute(pool.inner()).await?;
    Ok(Json(HealthResponse { status: "ok", database: "ok" }))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![healthcheck]
}
