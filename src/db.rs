use crate::config::{DatabaseConfig, SeedAdminConfig};
use crate::database::postgres_repository::PostgresRepository;
use crate::service::credentials::CredentialService;
use crate::service::review::ensure_sample_reviews;
use rocket::fairing::AdHoc;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

pub async fn init_pool(db_config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(db_config.max_connections)
        .min_connections(db_config.min_connections)
        .acquire_timeout(Duration::from_secs(db_config.acquire_timeout))
        .idle_timeout(Duration::from_secs(30))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&db_config.url)
        .await
}

/// Connects, applies pending migrations and manages the pool.
pub fn stage_db(db_config: DatabaseConfig) -> AdHoc {
    AdHoc::try_on_ignite("Postgres (sqlx)", |rocket| async move {
        let pool = match init_pool(&db_config).await {
            Ok(pool) => pool,
            Err(e) => {
                tracing::error!("Failed to initialize database pool: {}", e);
                return Err(rocket);
            }
        };
        tracing::info!("Database pool initialized successfully");

        if let Err(e) = sqlx::migrate!().run(&pool).await {
            tracing::error!("Failed to run database migrations: {}", e);
            return Err(rocket);
        }

        Ok(rocket.manage(pool))
    })
}

/// Creates the bootstrap admin and the sample reviews on an empty store, and
/// warns while the configured default password still opens the seed account.
pub fn stage_seed_data(seed: SeedAdminConfig) -> AdHoc {
    AdHoc::try_on_ignite("Seed data", |rocket| async move {
        let Some(pool) = rocket.state::<PgPool>() else {
            tracing::error!("Seed data stage requires the database pool");
            return Err(rocket);
        };

        let repo = PostgresRepository { pool: pool.clone() };
        let credentials = CredentialService::new(&repo);

        if let Err(e) = credentials.ensure_seed_admin(&seed).await {
            tracing::error!(error = ?e, "Failed to seed admin account");
            return Err(rocket);
        }

        if let Err(e) = ensure_sample_reviews(&repo).await {
            tracing::error!(error = ?e, "Failed to seed sample reviews");
            return Err(rocket);
        }

        match credentials.verify_admin(&seed.username, &seed.password).await {
            Ok(Some(admin)) => tracing::warn!(
                admin_id = admin.id,
                username = %admin.username,
                "admin account still uses the seed password; change it via PUT /admin/profile"
            ),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = ?e, "Could not check seed admin password"),
        }

        Ok(rocket)
    })
}
