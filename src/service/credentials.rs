use crate::config::SeedAdminConfig;
use crate::database::admin::AdminRepository;
use crate::error::app_error::AppError;
use crate::models::admin::{AdminUser, ProfileUpdateRequest};
use crate::service::password::{dummy_verify, hash_password, verify_password};
use tracing::{info, warn};

/// Credential checks and updates for admin accounts.
///
/// PBKDF2 runs on the blocking pool so that a login never stalls the
/// request executor.
pub struct CredentialService<'a, R: AdminRepository + ?Sized> {
    repository: &'a R,
}

impl<'a, R: AdminRepository + ?Sized> CredentialService<'a, R> {
    pub fn new(repository: &'a R) -> Self {
        CredentialService { repository }
    }

    /// Returns the admin when `username` exists and `password` matches.
    /// Unknown users and wrong passwords are indistinguishable to the caller.
    pub async fn verify_admin(&self, username: &str, password: &str) -> Result<Option<AdminUser>, AppError> {
        let password = password.to_string();

        match self.repository.get_admin_by_username(username).await? {
            Some(admin) => {
                let stored = admin.password_hash.clone();
                let verified = tokio::task::spawn_blocking(move || verify_password(&password, &stored)).await?;
                Ok(verified.then(|| AdminUser::from(admin)))
            }
            None => {
                tokio::task::spawn_blocking(move || dummy_verify(&password)).await?;
                Ok(None)
            }
        }
    }

    /// Checks `password` against the stored hash of admin `id`.
    pub async fn check_password(&self, id: i32, password: &str) -> Result<bool, AppError> {
        let Some(admin) = self.repository.get_admin_by_id(id).await? else {
            return Ok(false);
        };

        let password = password.to_string();
        let verified = tokio::task::spawn_blocking(move || verify_password(&password, &admin.password_hash)).await?;
        Ok(verified)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<AdminUser>, AppError> {
        Ok(self.repository.get_admin_by_id(id).await?.map(AdminUser::from))
    }

    /// `false` when the name is taken by another admin or `id` is unknown.
    pub async fn update_username(&self, id: i32, new_username: &str) -> Result<bool, AppError> {
        let updated = self.repository.update_admin_username(id, new_username).await?;
        if updated {
            info!(admin_id = id, "admin username updated");
        }
        Ok(updated)
    }

    /// Re-hashes and overwrites unconditionally; strength rules belong to the caller.
    pub async fn update_password(&self, id: i32, new_password: &str) -> Result<bool, AppError> {
        let new_password = new_password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&new_password)).await?;

        let updated = self.repository.update_admin_password_hash(id, &password_hash).await?;
        if updated {
            info!(admin_id = id, "admin password updated");
        }
        Ok(updated)
    }

    /// Applies a profile update for `current`.
    ///
    /// A new password needs the correct current password, and nothing is
    /// written until that check passes.
    pub async fn update_profile(&self, current: &AdminUser, request: &ProfileUpdateRequest) -> Result<AdminUser, AppError> {
        if let Some(new_password) = request.new_password.as_deref() {
            let Some(current_password) = request.current_password.as_deref().filter(|p| !p.is_empty()) else {
                return Err(AppError::BadRequest("Current password is required to set a new password".to_string()));
            };
            if !self.check_password(current.id, current_password).await? {
                return Err(AppError::InvalidCredentials);
            }
            self.apply_username_change(current, request).await?;
            if !self.update_password(current.id, new_password).await? {
                return Err(admin_not_found());
            }
        } else {
            self.apply_username_change(current, request).await?;
        }

        self.get_by_id(current.id).await?.ok_or_else(admin_not_found)
    }

    async fn apply_username_change(&self, current: &AdminUser, request: &ProfileUpdateRequest) -> Result<(), AppError> {
        let Some(username) = request.username_change(current) else {
            return Ok(());
        };
        if self.update_username(current.id, username).await? {
            return Ok(());
        }

        if self.repository.get_admin_by_id(current.id).await?.is_none() {
            Err(admin_not_found())
        } else {
            Err(AppError::Conflict("Username already exists".to_string()))
        }
    }

    /// Creates the bootstrap admin when no admin exists. Returns whether one was created.
    pub async fn ensure_seed_admin(&self, seed: &SeedAdminConfig) -> Result<bool, AppError> {
        if self.repository.count_admins().await? > 0 {
            return Ok(false);
        }

        let password = seed.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await?;

        match self.repository.create_admin_if_none(&seed.username, &password_hash).await? {
            Some(admin) => {
                warn!(
                    admin_id = admin.id,
                    username = %admin.username,
                    "seed admin created with the configured default password; change it after first login"
                );
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn admin_not_found() -> AppError {
    AppError::NotFound("Admin not found".to_string())
}
