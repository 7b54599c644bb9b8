use std::collections::HashMap;
use std::net::IpAddr;
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::{RefOr, Response as OpenApiResponse, Responses};
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};
use tokio::sync::Mutex;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RateLimitBucket {
    /// Admin login attempts.
    Auth,
    /// Anonymous content submissions such as reviews.
    Submission,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RateLimitKey {
    client: String,
    bucket: RateLimitBucket,
}

#[derive(Debug, Clone)]
struct Counter {
    window_start: Instant,
    count: u32,
}

#[derive(Debug)]
struct Counters {
    entries: HashMap<RateLimitKey, Counter>,
    last_pruned: Instant,
}

/// Fixed-window request counter keyed by client IP and bucket.
///
/// Stale windows are dropped lazily on the first check after a full window
/// has elapsed since the previous prune, so no background task is needed.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    window: Duration,
    counters: Mutex<Counters>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        let window = Duration::from_secs(config.window_seconds.max(1));

        Self {
            config,
            window,
            counters: Mutex::new(Counters {
                entries: HashMap::new(),
                last_pruned: Instant::now(),
            }),
        }
    }

    async fn check(&self, client: &str, bucket: RateLimitBucket) -> RateLimitDecision {
        self.check_at(client, bucket, Instant::now()).await
    }

    async fn check_at(&self, client: &str, bucket: RateLimitBucket, now: Instant) -> RateLimitDecision {
        let limit = self.limit_for_bucket(bucket);
        let mut counters = self.counters.lock().await;

        if now.saturating_duration_since(counters.last_pruned) >= self.window {
            let window = self.window;
            counters
                .entries
                .retain(|_, counter| now.saturating_duration_since(counter.window_start) < window);
            counters.last_pruned = now;
        }

        let key = RateLimitKey {
            client: client.to_string(),
            bucket,
        };
        let counter = counters.entries.entry(key).or_insert_with(|| Counter { window_start: now, count: 0 });

        if now.saturating_duration_since(counter.window_start) >= self.window {
            counter.window_start = now;
            counter.count = 0;
        }

        if counter.count >= limit {
            let elapsed = now.saturating_duration_since(counter.window_start);
            return RateLimitDecision::Limited {
                retry_after: self.window.saturating_sub(elapsed),
            };
        }

        counter.count += 1;
        RateLimitDecision::Allow
    }

    fn limit_for_bucket(&self, bucket: RateLimitBucket) -> u32 {
        match bucket {
            RateLimitBucket::Auth => self.config.auth_limit,
            RateLimitBucket::Submission => self.config.submission_limit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RateLimitDecision {
    Allow,
    Limited { retry_after: Duration },
}

/// Guard for `POST /admin/login`.
#[derive(Debug, Clone, Copy)]
pub struct AuthRateLimit;

/// Guard for public submission endpoints.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionRateLimit;

/// Seconds until the caller may retry; read by the `429` catcher.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitRetryAfter(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitError {
    TooManyRequests,
    MissingClientIp,
}

impl RateLimitError {
    fn status(self) -> Status {
        match self {
            RateLimitError::TooManyRequests => Status::TooManyRequests,
            RateLimitError::MissingClientIp => Status::BadRequest,
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthRateLimit {
    type Error = RateLimitError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        rate_limit_request(request, RateLimitBucket::Auth).await.map(|_| AuthRateLimit)
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SubmissionRateLimit {
    type Error = RateLimitError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        rate_limit_request(request, RateLimitBucket::Submission).await.map(|_| SubmissionRateLimit)
    }
}

impl<'a> OpenApiFromRequest<'a> for AuthRateLimit {
    fn from_request_input(_gen: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        Ok(RequestHeaderInput::None)
    }

    fn get_responses(_gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        too_many_requests_response()
    }
}

impl<'a> OpenApiFromRequest<'a> for SubmissionRateLimit {
    fn from_request_input(_gen: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        Ok(RequestHeaderInput::None)
    }

    fn get_responses(_gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        too_many_requests_response()
    }
}

async fn rate_limit_request(request: &Request<'_>, bucket: RateLimitBucket) -> Outcome<(), RateLimitError> {
    let Some(limiter) = request.rocket().state::<RateLimiter>() else {
        return Outcome::Success(());
    };

    let request_id = request
        .local_cache(|| None::<crate::middleware::RequestId>)
        .as_ref()
        .map(|r| r.0.as_str())
        .unwrap_or("unknown");

    let client = match client_key(request.client_ip(), limiter.config.require_client_ip) {
        Ok(Some(client)) => client,
        Ok(None) => {
            warn!(
                request_id = %request_id,
                method = %request.method(),
                uri = %request.uri(),
                "client ip unavailable; request not rate limited"
            );
            return Outcome::Success(());
        }
        Err(err) => {
            warn!(
                request_id = %request_id,
                method = %request.method(),
                uri = %request.uri(),
                "client ip unavailable; request rejected"
            );
            return Outcome::Error((err.status(), err));
        }
    };

    match limiter.check(&client, bucket).await {
        RateLimitDecision::Allow => Outcome::Success(()),
        RateLimitDecision::Limited { retry_after } => {
            let retry_after_secs = retry_after.as_secs().max(1);
            request.local_cache(|| Some(RateLimitRetryAfter(retry_after_secs)));
            warn!(
                request_id = %request_id,
                bucket = ?bucket,
                method = %request.method(),
                uri = %request.uri(),
                retry_after_secs = %retry_after_secs,
                "rate limit exceeded"
            );
            Outcome::Error((RateLimitError::TooManyRequests.status(), RateLimitError::TooManyRequests))
        }
    }
}

/// Counter key for a caller. `Ok(None)` means the caller cannot be
/// identified and is let through without counting.
fn client_key(ip: Option<IpAddr>, require_client_ip: bool) -> Result<Option<String>, RateLimitError> {
    match ip {
        Some(addr) => Ok(Some(addr.to_string())),
        None if require_client_ip => Err(RateLimitError::MissingClientIp),
        None => Ok(None),
    }
}

fn too_many_requests_response() -> rocket_okapi::Result<Responses> {
    let mut responses = Responses::default();
    responses.responses.insert(
        "429".to_string(),
        RefOr::Object(OpenApiResponse {
            description: "Too Many Requests".to_string(),
            ..Default::default()
        }),
    );
    Ok(responses)
}
