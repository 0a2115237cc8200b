//! Environment-driven configuration.

use std::time::Duration;

use anyhow::{Context, anyhow};

use cinelog_store::PoolSettings;

/// Runtime settings, sourced from environment variables. Every knob has
/// the default the service has always shipped with; only the database
/// DSN is required.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: String,
    pub db_dsn: String,
    pub db_max_connections: u32,
    pub db_max_idle_time: Duration,
    pub limiter_rps: f64,
    pub limiter_burst: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            port: get_env_parsed_or("PORT", 4000)?,
            environment: get_env_or("ENVIRONMENT", "development"),
            db_dsn: get_env("DB_DSN")?,
            db_max_connections: get_env_parsed_or("DB_MAX_CONNS", 25)?,
            db_max_idle_time: get_env_duration_or("DB_MAX_IDLE_TIME", Duration::from_secs(15 * 60))?,
            limiter_rps: get_env_parsed_or("LIMITER_RPS", 2.0)?,
            limiter_burst: get_env_parsed_or("LIMITER_BURST", 4)?,
        })
    }

    /// Connection pool settings for the store crate.
    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            dsn: self.db_dsn.clone(),
            max_connections: self.db_max_connections,
            max_idle_time: self.db_max_idle_time,
        }
    }
}

fn get_env(name: &str) -> anyhow::Result<String> {
    std::env::var(name).map_err(|_| anyhow!("{name} must be set"))
}

fn get_env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parsed_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{name} is not valid: {raw}")),
        Err(_) => Ok(default),
    }
}

fn get_env_duration_or(name: &str, default: Duration) -> anyhow::Result<Duration> {
    match std::env::var(name) {
        // humantime accepts the familiar "15m" / "90s" forms.
        Ok(raw) => humantime::parse_duration(&raw)
            .with_context(|| format!("{name} is not a valid duration: {raw}")),
        Err(_) => Ok(default),
    }
}
