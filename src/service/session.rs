use crate::config::SessionConfig;
use crate::database::session::SessionRepository;
use crate::error::app_error::AppError;
use crate::models::session::SessionUser;
use chrono::{DateTime, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use rocket::http::{Cookie, SameSite};
use rocket::time::OffsetDateTime;
use tracing::{debug, info};

const SESSION_TOKEN_BYTES: usize = 32;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Read/set/clear access to the session cookie of the current request.
pub trait SessionCookies {
    fn session_cookie(&self, name: &str) -> Option<String>;
    fn set_session_cookie(&self, cookie: Cookie<'static>);
    fn clear_session_cookie(&self, name: &str);
}

pub fn generate_session_id() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Creates, resolves and destroys admin sessions.
///
/// Expired rows are purged lazily: every [`SessionManager::get_session`] call
/// sweeps the store before looking up the caller's session.
pub struct SessionManager<'a, R: SessionRepository + ?Sized> {
    repository: &'a R,
    config: &'a SessionConfig,
    clock: &'a dyn Clock,
}

impl<'a, R: SessionRepository + ?Sized> SessionManager<'a, R> {
    pub fn new(repository: &'a R, config: &'a SessionConfig, clock: &'a dyn Clock) -> Self {
        SessionManager { repository, config, clock }
    }

    pub async fn create_session<C>(&self, cookies: &C, user_id: i32) -> Result<String, AppError>
    where
        C: SessionCookies + Sync + ?Sized,
    {
        let session_id = generate_session_id();
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(self.config.ttl())
            .ok_or_else(|| AppError::internal("Session expiry is out of range"))?;
        let cookie = self.build_cookie(&session_id, expires_at)?;

        self.repository.create_session(&session_id, user_id, expires_at).await?;
        cookies.set_session_cookie(cookie);

        info!(user_id, expires_at = %expires_at, "admin session created");
        Ok(session_id)
    }

    pub async fn get_session<C>(&self, cookies: &C) -> Result<Option<SessionUser>, AppError>
    where
        C: SessionCookies + Sync + ?Sized,
    {
        let Some(session_id) = cookies.session_cookie(&self.config.cookie_name) else {
            return Ok(None);
        };

        let now = self.clock.now();
        let purged = self.repository.delete_expired_sessions(now).await?;
        if purged > 0 {
            debug!(purged, "purged expired admin sessions");
        }

        let Some(session) = self.repository.get_session(&session_id).await? else {
            return Ok(None);
        };

        if session.is_expired_at(now) {
            self.repository.delete_session(&session.id).await?;
            cookies.clear_session_cookie(&self.config.cookie_name);
            info!(user_id = session.user_id, "admin session expired");
            return Ok(None);
        }

        Ok(Some(SessionUser { user_id: session.user_id }))
    }

    pub async fn destroy_session<C>(&self, cookies: &C) -> Result<(), AppError>
    where
        C: SessionCookies + Sync + ?Sized,
    {
        if let Some(session_id) = cookies.session_cookie(&self.config.cookie_name) {
            let existed = self.repository.delete_session(&session_id).await?;
            debug!(existed, "admin session destroyed");
        }

        cookies.clear_session_cookie(&self.config.cookie_name);
        Ok(())
    }

    fn build_cookie(&self, session_id: &str, expires_at: DateTime<Utc>) -> Result<Cookie<'static>, AppError> {
        let expires = OffsetDateTime::from_unix_timestamp(expires_at.timestamp())
            .map_err(|_| AppError::internal("Session expiry cannot be expressed as a cookie date"))?;

        Ok(Cookie::build((self.config.cookie_name.clone(), session_id.to_string()))
            .http_only(true)
            .secure(self.config.cookie_secure)
            .same_site(SameSite::Lax)
            .path("/")
            .expires(expires)
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{InMemoryRepository, ManualClock, MemoryCookies};
    use chrono::Duration;

    fn config() -> SessionConfig {
        SessionConfig {
            cookie_secure: false,
            ..SessionConfig::default()
        }
    }

    #[test]
    fn session_ids_are_long_and_unique() {
        let first = generate_session_id();
        let second = generate_session_id();

        assert_eq!(first.len(), SESSION_TOKEN_BYTES * 2);
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn create_session_sets_cookie_with_contract_attributes() {
        let repo = InMemoryRepository::default();
        let clock = ManualClock::default();
        let config = SessionConfig::default();
        let cookies = MemoryCookies::default();
        let manager = SessionManager::new(&repo, &config, &clock);

        let session_id = manager.create_session(&cookies, 1).await.unwrap();

        let cookie = cookies.get("admin_session").expect("cookie set");
        assert_eq!(cookie.value(), session_id);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));

        let expected = clock.now() + Duration::hours(24);
        let expires = cookie.expires_datetime().expect("expires set");
        assert_eq!(expires.unix_timestamp(), expected.timestamp());

        let stored = repo.get_session(&session_id).await.unwrap().expect("row stored");
        assert_eq!(stored.expires_at, expected);
    }

    #[tokio::test]
    async fn unrepresentable_expiry_fails_without_storing_a_session() {
        let repo = InMemoryRepository::default();
        let clock = ManualClock::default();
        let config = config();
        let manager = SessionManager::new(&repo, &config, &clock);

        clock.set(DateTime::<Utc>::MAX_UTC);
        let cookies = MemoryCookies::default();

        let err = manager.create_session(&cookies, 1).await.unwrap_err();

        assert!(matches!(err, AppError::Internal { .. }));
        assert!(cookies.get("admin_session").is_none());
        assert_eq!(repo.session_count(), 0);
    }

    #[tokio::test]
    async fn fresh_session_resolves_to_user() {
        let repo = InMemoryRepository::default();
        let clock = ManualClock::default();
        let config = config();
        let cookies = MemoryCookies::default();
        let manager = SessionManager::new(&repo, &config, &clock);

        manager.create_session(&cookies, 1).await.unwrap();

        assert_eq!(manager.get_session(&cookies).await.unwrap(), Some(SessionUser { user_id: 1 }));
    }

    #[tokio::test]
    async fn unknown_cookie_behaves_like_no_cookie() {
        let repo = InMemoryRepository::default();
        let clock = ManualClock::default();
        let config = config();
        let manager = SessionManager::new(&repo, &config, &clock);

        let none = MemoryCookies::default();
        let unknown = MemoryCookies::with_value("admin_session", "does-not-exist");

        let without_cookie = manager.get_session(&none).await.unwrap();
        let with_unknown = manager.get_session(&unknown).await.unwrap();

        assert_eq!(without_cookie, None);
        assert_eq!(with_unknown, without_cookie);
        assert_eq!(unknown.get("admin_session").map(|c| c.value().to_string()), Some("does-not-exist".to_string()));
    }

    #[tokio::test]
    async fn session_at_expiry_instant_is_removed() {
        let repo = InMemoryRepository::default();
        let clock = ManualClock::default();
        let config = config();
        let manager = SessionManager::new(&repo, &config, &clock);

        let expires_at = clock.now() + Duration::milliseconds(1);
        repo.create_session("short", 1, expires_at).await.unwrap();
        let cookies = MemoryCookies::with_value("admin_session", "short");

        clock.set(expires_at);
        assert_eq!(manager.get_session(&cookies).await.unwrap(), None);
        assert!(repo.get_session("short").await.unwrap().is_none());
        assert!(cookies.get("admin_session").is_none());
    }

    #[tokio::test]
    async fn one_lookup_purges_every_expired_session() {
        let repo = InMemoryRepository::default();
        let clock = ManualClock::default();
        let config = config();
        let manager = SessionManager::new(&repo, &config, &clock);

        for n in 0..5 {
            repo.create_session(&format!("stale-{n}"), 1, clock.now() - Duration::minutes(n + 1)).await.unwrap();
        }
        let cookies = MemoryCookies::default();
        manager.create_session(&cookies, 2).await.unwrap();
        assert_eq!(repo.session_count(), 6);

        assert_eq!(manager.get_session(&cookies).await.unwrap(), Some(SessionUser { user_id: 2 }));
        assert_eq!(repo.session_count(), 1);
    }

    #[tokio::test]
    async fn session_expires_after_ttl() {
        let repo = InMemoryRepository::default();
        let clock = ManualClock::default();
        let config = config();
        let cookies = MemoryCookies::default();
        let manager = SessionManager::new(&repo, &config, &clock);

        manager.create_session(&cookies, 1).await.unwrap();
        clock.advance(Duration::hours(24) - Duration::milliseconds(1));
        assert!(manager.get_session(&cookies).await.unwrap().is_some());

        clock.advance(Duration::milliseconds(1));
        assert!(manager.get_session(&cookies).await.unwrap().is_none());
        assert_eq!(repo.session_count(), 0);
    }

    #[tokio::test]
    async fn destroy_session_removes_row_and_cookie() {
        let repo = InMemoryRepository::default();
        let clock = ManualClock::default();
        let config = config();
        let cookies = MemoryCookies::default();
        let manager = SessionManager::new(&repo, &config, &clock);

        let session_id = manager.create_session(&cookies, 1).await.unwrap();
        manager.destroy_session(&cookies).await.unwrap();

        assert!(cookies.get("admin_session").is_none());
        assert!(repo.get_session(&session_id).await.unwrap().is_none());
        assert_eq!(manager.get_session(&cookies).await.unwrap(), None);
    }

    #[tokio::test]
    async fn destroy_without_cookie_still_clears() {
        let repo = InMemoryRepository::default();
        let clock = ManualClock::default();
        let config = config();
        let cookies = MemoryCookies::default();
        let manager = SessionManager::new(&repo, &config, &clock);

        manager.destroy_session(&cookies).await.unwrap();

        assert_eq!(cookies.cleared(), vec!["admin_session".to_string()]);
    }

    #[tokio::test]
    async fn concurrent_logins_get_independent_sessions() {
        let repo = InMemoryRepository::default();
        let clock = ManualClock::default();
        let config = config();
        let manager = SessionManager::new(&repo, &config, &clock);
        let laptop = MemoryCookies::default();
        let phone = MemoryCookies::default();

        let first = manager.create_session(&laptop, 1).await.unwrap();
        let second = manager.create_session(&phone, 1).await.unwrap();
        assert_ne!(first, second);

        manager.destroy_session(&laptop).await.unwrap();
        assert_eq!(manager.get_session(&phone).await.unwrap(), Some(SessionUser { user_id: 1 }));
    }
}
