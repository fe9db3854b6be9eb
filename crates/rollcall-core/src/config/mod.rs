use std::time::Duration;

use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub finalizer: FinalizerSettings,
    pub face_service: FaceServiceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// ## Summary
    /// Returns the bind address in the format "host:port".
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Settings for the session finalization sweep.
#[derive(Debug, Clone, Deserialize)]
pub struct FinalizerSettings {
    pub enabled: bool,
    pub interval_secs: u64,
    pub call_timeout_secs: u64,
    pub write_concurrency: usize,
    /// IANA timezone name used to resolve "today" and the current time of day.
    pub timezone: String,
}

impl FinalizerSettings {
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    #[must_use]
    pub const fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// ## Summary
    /// Parses the configured timezone.
    ///
    /// ## Errors
    /// Returns `CoreError::ConfigError` if the name is not a known IANA timezone.
    pub fn tz(&self) -> CoreResult<chrono_tz::Tz> {
        self.timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|e| CoreError::ConfigError(format!("invalid timezone '{}': {e}", self.timezone)))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FaceServiceConfig {
    pub url: Option<String>,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub backoff_ms: u64,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from `config.toml` and environment variables into a `Settings`.
    /// Environment variables (nested keys separated by `__`) take precedence over the file.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails,
    /// or if the finalizer settings are unusable.
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 4000)?
            .set_default("database.max_connections", 8)?
            .set_default("logging.level", "debug")?
            .set_default("finalizer.enabled", true)?
            .set_default("finalizer.interval_secs", 120)?
            .set_default("finalizer.call_timeout_secs", 10)?
            .set_default("finalizer.write_concurrency", 8)?
            .set_default("finalizer.timezone", "UTC")?
            .set_default("face_service.timeout_ms", 3000)?
            .set_default("face_service.max_retries", 2)?
            .set_default("face_service.backoff_ms", 200)?
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            // Environment, e.g. FINALIZER__INTERVAL_SECS=60
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            // The conventional single-underscore name wins for the database URL
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    /// ## Summary
    /// Checks the invariants the deserializer cannot express.
    ///
    /// ## Errors
    /// Returns `CoreError::ConfigError` describing the first violated constraint.
    pub fn validate(&self) -> CoreResult<()> {
        if self.finalizer.interval_secs == 0 {
            return Err(CoreError::ConfigError(
                "finalizer.interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.finalizer.call_timeout_secs == 0 {
            return Err(CoreError::ConfigError(
                "finalizer.call_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.finalizer.write_concurrency == 0 {
            return Err(CoreError::ConfigError(
                "finalizer.write_concurrency must be greater than zero".to_string(),
            ));
        }
        self.finalizer.tz()?;
        Ok(())
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
