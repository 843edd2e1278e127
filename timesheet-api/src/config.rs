use std::{fmt, str::FromStr};

use serde::Deserialize;
use serde_with::serde_as;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use strum::{Display, EnumString};

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
}

#[serde_as]
#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub port: u16,
    pub host: String,
}

#[serde_as]
#[derive(Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub port: u16,
    pub host: String,
    pub database_name: String,
    pub require_ssl: bool,
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("port", &self.port)
            .field("host", &self.host)
            .field("database_name", &self.database_name)
            .field("require_ssl", &self.require_ssl)
            .finish()
    }
}

#[serde_as]
#[derive(Deserialize, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub token_ttl_minutes: i64,
    /// Manager account created on first start, while no users exist.
    pub bootstrap_manager: Option<BootstrapManager>,
}

impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &"[redacted]")
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field("bootstrap_manager", &self.bootstrap_manager)
            .finish()
    }
}

#[derive(Deserialize, Clone)]
pub struct BootstrapManager {
    pub email: String,
    pub full_name: String,
    pub password: String,
}

impl fmt::Debug for BootstrapManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapManager")
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .field("password", &"[redacted]")
            .finish()
    }
}

impl DatabaseSettings {
    pub fn without_db(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };

        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .ssl_mode(ssl_mode)
    }

    pub fn with_db(&self) -> PgConnectOptions {
        self.without_db().database(&self.database_name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to determine the current directory: {0}")]
    CurrentDir(#[from] std::io::Error),
    #[error("unknown APP_ENVIRONMENT '{0}', expected 'local' or 'production'")]
    UnknownEnvironment(String),
    #[error(transparent)]
    Load(#[from] config::ConfigError),
}

/// Layer `config/base.yaml`, `config/{APP_ENVIRONMENT}.yaml` and
/// `TIMESHEET_`-prefixed environment variables (`__` separates sections).
pub fn read_config() -> Result<Settings, ConfigError> {
    let base_path = std::env::current_dir()?;
    let config_directory = base_path.join("config");

    let environment_name = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "local".into());
    let environment = Environment::from_str(&environment_name)
        .map_err(|_| ConfigError::UnknownEnvironment(environment_name.clone()))?;
    let environment_filename = format!("{}.yaml", environment);

    let settings = config::Config::builder()
        .add_source(config::File::from(config_directory.join("base.yaml")))
        .add_source(config::File::from(
            config_directory.join(environment_filename),
        ))
        .add_source(
            config::Environment::with_prefix("TIMESHEET")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize::<Settings>()?)
}

#[derive(Display, Debug, EnumString, PartialEq, Eq)]
pub enum Environment {
    #[strum(ascii_case_insensitive, serialize = "local")]
    Local,
    #[strum(ascii_case_insensitive, serialize = "production")]
    Production,
}
