use rocket::figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_PATH: &str = "/api";
pub const DEFAULT_SESSION_COOKIE_NAME: &str = "admin_session";
pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 24 * 60 * 60;
pub const MAX_SESSION_TTL_SECONDS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub api: ApiConfig,
    pub cors: CorsConfig,
    pub session: SessionConfig,
    pub seed_admin: SeedAdminConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub base_path: String,
    pub enable_swagger: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

/// Admin session cookie and lifetime settings.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_seconds: i64,
    /// Set the `Secure` attribute; disable only for plain-HTTP development.
    pub cookie_secure: bool,
}

/// Bootstrap admin created when the credential table is empty.
///
/// These are well-known defaults. Operators are expected to change the
/// password through the profile endpoint after first login.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SeedAdminConfig {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RateLimitConfig {
    pub auth_limit: u32,
    pub submission_limit: u32,
    pub window_seconds: u64,
    pub require_client_ip: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/sparkle_db".to_string(),
            max_connections: 16,
            min_connections: 2,
            acquire_timeout: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_API_BASE_PATH.to_string(),
            enable_swagger: true,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3000".to_string()],
            allow_credentials: true,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_SESSION_COOKIE_NAME.to_string(),
            ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            cookie_secure: true,
        }
    }
}

impl Default for SeedAdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin123".to_string(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            auth_limit: 10,
            submission_limit: 5,
            window_seconds: 60,
            require_client_ip: false,
        }
    }
}

impl SessionConfig {
    /// Session lifetime, clamped to `1..=MAX_SESSION_TTL_SECONDS`.
    pub fn ttl(&self) -> chrono::Duration {
        let seconds = self.ttl_seconds.clamp(1, MAX_SESSION_TTL_SECONDS);
        chrono::Duration::try_seconds(seconds).unwrap_or_else(|| chrono::Duration::seconds(DEFAULT_SESSION_TTL_SECONDS))
    }

    fn validate(&self) -> Result<(), figment::Error> {
        if !(1..=MAX_SESSION_TTL_SECONDS).contains(&self.ttl_seconds) {
            return Err(figment::Error::from(format!(
                "session.ttl_seconds must be between 1 and {MAX_SESSION_TTL_SECONDS}, got {}",
                self.ttl_seconds
            )));
        }
        if self.cookie_name.trim().is_empty() {
            return Err(figment::Error::from("session.cookie_name must not be empty".to_string()));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from multiple sources in priority order:
    /// 1. Built-in defaults
    /// 2. Sparkle.toml (optional)
    /// 3. Environment variables prefixed with SPARKLE_, nested with `__` (e.g. SPARKLE_SESSION__TTL_SECONDS)
    /// 4. DATABASE_URL
    pub fn load() -> Result<Self, figment::Error> {
        Self::from_figment(Self::figment())
    }

    fn from_figment(figment: Figment) -> Result<Self, figment::Error> {
        let config: Config = figment.extract()?;
        config.session.validate()?;
        Ok(config)
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file("Sparkle.toml"))
            .merge(Env::prefixed("SPARKLE_").split("__"))
            .merge(Env::raw().only(&["DATABASE_URL"]).map(|_| "database.url".into()))
    }
}
