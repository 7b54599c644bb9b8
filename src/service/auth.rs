use crate::config::SessionConfig;
use crate::database::admin::AdminRepository;
use crate::database::session::SessionRepository;
use crate::error::app_error::AppError;
use crate::models::admin::AdminUser;
use crate::service::credentials::CredentialService;
use crate::service::session::{Clock, SessionCookies, SessionManager};
use tracing::{info, warn};

/// Login, logout and the admin gate, on top of the credential and session services.
pub struct AuthService<'a, R>
where
    R: AdminRepository + SessionRepository + ?Sized,
{
    credentials: CredentialService<'a, R>,
    sessions: SessionManager<'a, R>,
}

impl<'a, R> AuthService<'a, R>
where
    R: AdminRepository + SessionRepository + ?Sized,
{
    pub fn new(repository: &'a R, config: &'a SessionConfig, clock: &'a dyn Clock) -> Self {
        AuthService {
            credentials: CredentialService::new(repository),
            sessions: SessionManager::new(repository, config, clock),
        }
    }

    /// Verifies credentials and opens a session. No session is created on failure.
    pub async fn login<C>(&self, cookies: &C, username: &str, password: &str) -> Result<AdminUser, AppError>
    where
        C: SessionCookies + Sync + ?Sized,
    {
        let Some(admin) = self.credentials.verify_admin(username, password).await? else {
            warn!("admin login failed");
            return Err(AppError::InvalidCredentials);
        };

        self.sessions.create_session(cookies, admin.id).await?;
        info!(admin_id = admin.id, "admin logged in");
        Ok(admin)
    }

    pub async fn logout<C>(&self, cookies: &C) -> Result<(), AppError>
    where
        C: SessionCookies + Sync + ?Sized,
    {
        self.sessions.destroy_session(cookies).await
    }

    /// Resolves the caller to an admin or fails with [`AppError::Unauthorized`].
    pub async fn require_auth<C>(&self, cookies: &C) -> Result<AdminUser, AppError>
    where
        C: SessionCookies + Sync + ?Sized,
    {
        self.get_optional_auth(cookies).await?.ok_or(AppError::Unauthorized)
    }

    /// Like [`AuthService::require_auth`] but anonymous callers yield `None`.
    /// A session whose admin row has disappeared counts as anonymous.
    pub async fn get_optional_auth<C>(&self, cookies: &C) -> Result<Option<AdminUser>, AppError>
    where
        C: SessionCookies + Sync + ?Sized,
    {
        let Some(session) = self.sessions.get_session(cookies).await? else {
            return Ok(None);
        };

        self.credentials.get_by_id(session.user_id).await
    }
}
