mod auth;
mod config;
mod cron_tasks;
mod database;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod service;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;
pub use cron_tasks::{SeedOutcome, purge_expired_sessions, seed_admin};

use crate::db::{stage_db, stage_seed_data};
use crate::middleware::RequestLogger;
use crate::middleware::rate_limit::RateLimiter;
use crate::routes as app_routes;
use rocket::{Build, Rocket, catchers, http::Method};
use rocket_cors::{AllowedOrigins, CorsOptions};
use rocket_okapi::swagger_ui::{SwaggerUIConfig, make_swagger_ui};
use rocket_okapi::{get_openapi_route, okapi::merge::marge_spec_list};
use tracing_subscriber::EnvFilter;

fn init_tracing(log_level: &str, json_format: bool) {
    // RUST_LOG takes precedence over logging.level, e.g.
    //   RUST_LOG=info,sparkle_admin::service=debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_line_number(true);

    // try_init: tests build several rockets in one process
    let _ = if json_format { subscriber.json().try_init() } else { subscriber.try_init() };
}

fn build_cors(cors_config: &config::CorsConfig) -> CorsOptions {
    let is_wildcard = cors_config.allowed_origins.len() == 1 && cors_config.allowed_origins[0] == "*";

    if is_wildcard && cors_config.allow_credentials {
        panic!(
            "Invalid CORS configuration: Cannot use wildcard origins (*) with credentials enabled. \
            Either set specific origins or disable credentials."
        );
    }

    let allowed_origins = if cors_config.allowed_origins.is_empty() {
        AllowedOrigins::some_exact::<&str>(&[])
    } else if is_wildcard {
        AllowedOrigins::all()
    } else {
        AllowedOrigins::some_exact(&cors_config.allowed_origins.iter().map(String::as_str).collect::<Vec<_>>())
    };

    CorsOptions {
        allowed_origins,
        allowed_methods: vec![Method::Get, Method::Post, Method::Put, Method::Delete, Method::Patch, Method::Options]
            .into_iter()
            .map(From::from)
            .collect(),
        allowed_headers: rocket_cors::AllowedHeaders::some(&["Content-Type", "Accept"]),
        allow_credentials: cors_config.allow_credentials,
        ..Default::default()
    }
}

fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return config::DEFAULT_API_BASE_PATH.to_string();
    }

    let mut normalized = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    };

    while normalized.ends_with('/') && normalized.len() > 1 {
        normalized.pop();
    }

    normalized
}

fn join_base_path(base_path: &str, path: &str) -> String {
    let base = base_path.trim_end_matches('/');
    let suffix = path.trim_start_matches('/');

    if base.is_empty() {
        format!("/{}", suffix)
    } else {
        format!("{}/{}", base, suffix)
    }
}

struct RouteSpec {
    path: &'static str,
    routes: Vec<rocket::Route>,
    openapi: rocket_okapi::okapi::openapi3::OpenApi,
}

impl RouteSpec {
    fn new(path: &'static str, (routes, openapi): (Vec<rocket::Route>, rocket_okapi::okapi::openapi3::OpenApi)) -> Self {
        RouteSpec { path, routes, openapi }
    }
}

fn collect_route_specs() -> Vec<RouteSpec> {
    vec![
        RouteSpec::new("/admin", app_routes::admin::routes()),
        RouteSpec::new("/admin/reviews", app_routes::review::admin_routes()),
        RouteSpec::new("/admin/faqs", app_routes::faq::admin_routes()),
        RouteSpec::new("/reviews", app_routes::review::routes()),
        RouteSpec::new("/faqs", app_routes::faq::routes()),
        RouteSpec::new("/health", app_routes::health::routes()),
    ]
}

fn mount_api_routes(mut rocket: Rocket<Build>, base_path: &str, enable_swagger: bool, session_cookie_name: &str) -> Rocket<Build> {
    let route_specs = collect_route_specs();
    let mut openapi_list = Vec::new();

    for spec in route_specs {
        rocket = rocket.mount(join_base_path(base_path, spec.path), spec.routes);
        openapi_list.push((spec.path, spec.openapi));
    }

    if !enable_swagger {
        return rocket;
    }

    let mut openapi_docs = match marge_spec_list(&openapi_list) {
        Ok(docs) => docs,
        Err(err) => panic!("Could not merge OpenAPI spec: {}", err),
    };
    auth::apply_session_cookie_name(&mut openapi_docs, session_cookie_name);

    let settings = rocket_okapi::settings::OpenApiSettings::default();
    rocket = rocket.mount(base_path, vec![get_openapi_route(openapi_docs, &settings)]);

    let openapi_url = join_base_path(base_path, "openapi.json");
    rocket.mount(
        join_base_path(base_path, "docs"),
        make_swagger_ui(&SwaggerUIConfig {
            url: openapi_url,
            ..Default::default()
        }),
    )
}

pub fn build_rocket(config: Config) -> Rocket<Build> {
    init_tracing(&config.logging.level, config.logging.json_format);

    let cors = build_cors(&config.cors).to_cors().expect("Failed to create CORS fairing");
    let base_path = normalize_base_path(&config.api.base_path);

    let rocket = rocket::build()
        .manage(RateLimiter::new(config.rate_limit.clone()))
        .attach(cors)
        .attach(RequestLogger)
        .attach(stage_db(config.database.clone()))
        .attach(stage_seed_data(config.seed_admin.clone()));

    let rocket = mount_api_routes(rocket, &base_path, config.api.enable_swagger, &config.session.cookie_name);

    rocket
        .register(
            base_path.as_str(),
            catchers![
                app_routes::error::bad_request,
                app_routes::error::unauthorized,
                app_routes::error::not_found,
                app_routes::error::conflict,
                app_routes::error::unprocessable_entity,
                app_routes::error::too_many_requests,
                app_routes::error::internal_error
            ],
        )
        .manage(config)
}
