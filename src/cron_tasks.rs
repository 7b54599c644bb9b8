use crate::Config;
use crate::database::postgres_repository::PostgresRepository;
use crate::database::session::SessionRepository;
use crate::db::init_pool;
use crate::service::credentials::CredentialService;
use crate::service::review::ensure_sample_reviews;
use chrono::Utc;

/// Deletes every session that has expired. Returns the number removed.
pub async fn purge_expired_sessions(config: &Config) -> Result<u64, String> {
    let pool = init_pool(&config.database)
        .await
        .map_err(|err| format!("Failed to initialize database pool: {err}"))?;

    let repo = PostgresRepository { pool: pool.clone() };
    let purged = repo
        .delete_expired_sessions(Utc::now())
        .await
        .map_err(|err| format!("Failed to purge expired sessions: {err:?}"))?;

    pool.close().await;
    Ok(purged)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedOutcome {
    pub admin_created: bool,
    pub sample_reviews: usize,
}

/// Creates the bootstrap admin if the store has none and fills an empty
/// review table with the sample reviews.
pub async fn seed_admin(config: &Config) -> Result<SeedOutcome, String> {
    let pool = init_pool(&config.database)
        .await
        .map_err(|err| format!("Failed to initialize database pool: {err}"))?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .map_err(|err| format!("Failed to run database migrations: {err}"))?;

    let repo = PostgresRepository { pool: pool.clone() };
    let admin_created = CredentialService::new(&repo)
        .ensure_seed_admin(&config.seed_admin)
        .await
        .map_err(|err| format!("Failed to seed admin account: {err:?}"))?;
    let sample_reviews = ensure_sample_reviews(&repo)
        .await
        .map_err(|err| format!("Failed to seed sample reviews: {err:?}"))?;

    pool.close().await;
    Ok(SeedOutcome {
        admin_created,
        sample_reviews,
    })
}
