//! Configuration management

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_ADMIN_LOGIN_PATH, DEFAULT_ADMIN_PREFIX, DEFAULT_SESSION_COOKIE,
    DEFAULT_SESSION_TTL_HOURS, INSECURE_DEFAULT_SECRET,
};

/// Environment variable holding the session signing secret.
pub const SECRET_ENV_VAR: &str = "JWT_SECRET";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub session: SessionSettings,
    pub admin: AdminSettings,
    pub auth: AuthSettings,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub backend: StorageBackend,
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionSettings {
    pub secret: String,
    pub ttl_hours: i64,
    pub cookie_name: String,
    pub secure_cookie: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdminSettings {
    pub prefix: String,
    pub login_path: String,
}

/// How the credential gate treats the submitted password.
///
/// `Disabled` keeps the historical behaviour: any non-empty password is
/// accepted for an admin account. `Argon2` verifies it against the stored hash.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PasswordCheck {
    #[default]
    Disabled,
    Argon2,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthSettings {
    pub password_check: PasswordCheck,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub format: String,
    pub directory: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Self::defaults_builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // CMS_DATABASE__URL=postgres://... overrides database.url
            .add_source(
                Environment::with_prefix("CMS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("session.secret", std::env::var(SECRET_ENV_VAR).ok())?
            .build()?;
        config.try_deserialize()
    }

    /// Built-in defaults only, without files or environment.
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::defaults_builder()?.build()?.try_deserialize()
    }

    fn defaults_builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 3000)?
            .set_default("app.name", "cms-server")?
            .set_default("database.backend", "postgres")?
            .set_default("database.url", "postgres://localhost/cms")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.acquire_timeout_seconds", 3)?
            .set_default("session.secret", INSECURE_DEFAULT_SECRET)?
            .set_default("session.ttl_hours", DEFAULT_SESSION_TTL_HOURS)?
            .set_default("session.cookie_name", DEFAULT_SESSION_COOKIE)?
            .set_default("session.secure_cookie", false)?
            .set_default("admin.prefix", DEFAULT_ADMIN_PREFIX)?
            .set_default("admin.login_path", DEFAULT_ADMIN_LOGIN_PATH)?
            .set_default("auth.password_check", "disabled")?
            .set_default("log.format", "pretty")
    }

    pub fn uses_insecure_secret(&self) -> bool {
        self.session.secret == INSECURE_DEFAULT_SECRET
    }
}
