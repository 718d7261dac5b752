use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::timetable::controller::GenerationOptions;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    pub rust_log: String,
    /// Faculty id assigned to every subject when no faculty exist.
    pub default_faculty_id: i32,
    /// 0 disables the bound.
    pub generation_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            database_max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10)?,
            port: env_or("PORT", 5000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            default_faculty_id: env_or("DEFAULT_FACULTY_ID", 1)?,
            generation_timeout_secs: env_or("GENERATION_TIMEOUT_SECS", 30)?,
        })
    }

    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            default_faculty_id: self.default_faculty_id,
            timeout: (self.generation_timeout_secs > 0)
                .then(|| Duration::from_secs(self.generation_timeout_secs)),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
