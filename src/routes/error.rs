use crate::middleware::rate_limit::RateLimitRetryAfter;
use rocket::http::Header;
use rocket::serde::Serialize;
use rocket::serde::json::Json;
use rocket::{Request, Responder, catch};

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct Error {
    pub message: String,
}

fn error(message: &str) -> Json<Error> {
    Json(Error { message: message.to_string() })
}

#[catch(400)]
pub fn bad_request(_: &Request) -> Json<Error> {
    error("Bad request")
}

#[catch(401)]
pub fn unauthorized(_: &Request) -> Json<Error> {
    error("Unauthorized")
}

#[catch(404)]
pub fn not_found(_: &Request) -> Json<Error> {
    error("Not found")
}

#[catch(409)]
pub fn conflict(_: &Request) -> Json<Error> {
    error("Conflict")
}

/// Malformed or mistyped JSON bodies.
#[catch(422)]
pub fn unprocessable_entity(_: &Request) -> Json<Error> {
    error("Invalid request body")
}

#[derive(Responder)]
#[response(status = 429, content_type = "json")]
pub struct TooManyRequests {
    body: Json<Error>,
    retry_after: Header<'static>,
}

#[catch(429)]
pub fn too_many_requests(req: &Request) -> TooManyRequests {
    let retry_after = req.local_cache(|| None::<RateLimitRetryAfter>).as_ref().map(|r| r.0).unwrap_or(60);

    TooManyRequests {
        body: error("Too many requests, please try again later"),
        retry_after: Header::new("Retry-After", retry_after.to_string()),
    }
}

#[catch(500)]
pub fn internal_error(_: &Request) -> Json<Error> {
    error("Internal server error")
}
