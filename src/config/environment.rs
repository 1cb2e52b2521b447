//! Environment configuration
//!
//! Reads the service settings from environment variables (after `.env` is
//! loaded by `dotenvy`). Every setting has a development default except
//! `DATABASE_URL`, which only the binaries require.

use anyhow::{anyhow, Context, Result};
use std::env;
use std::time::Duration;

/// Service configuration
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub jwt_access_secret: String,
    pub jwt_refresh_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub cors_origins: Vec<String>,
    pub cookie_secure: bool,
    pub rotate_refresh_tokens: bool,
    pub bcrypt_cost: u32,
    pub log_level: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            host: "0.0.0.0".to_string(),
            port: 4000,
            database_url: None,
            jwt_access_secret: "dev_access_secret_change_me".to_string(),
            jwt_refresh_secret: "dev_refresh_secret_change_me".to_string(),
            access_token_ttl: Duration::from_secs(15 * 60),
            refresh_token_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
            cookie_secure: false,
            rotate_refresh_tokens: false,
            bcrypt_cost: 10,
            log_level: "info".to_string(),
        }
    }
}

impl EnvironmentConfig {
    /// Build the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let environment = env::var("ENVIRONMENT").unwrap_or(defaults.environment);
        let is_production = environment == "production";

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port)?,
            database_url: env::var("DATABASE_URL").ok(),
            jwt_access_secret: env::var("JWT_ACCESS_SECRET").unwrap_or(defaults.jwt_access_secret),
            jwt_refresh_secret: env::var("JWT_REFRESH_SECRET")
                .unwrap_or(defaults.jwt_refresh_secret),
            access_token_ttl: match env::var("JWT_ACCESS_EXPIRES_IN") {
                Ok(raw) => parse_duration(&raw).context("JWT_ACCESS_EXPIRES_IN")?,
                Err(_) => defaults.access_token_ttl,
            },
            refresh_token_ttl: match env::var("JWT_REFRESH_EXPIRES_IN") {
                Ok(raw) => parse_duration(&raw).context("JWT_REFRESH_EXPIRES_IN")?,
                Err(_) => defaults.refresh_token_ttl,
            },
            cors_origins: match env::var("CORS_ORIGINS") {
                Ok(raw) => raw
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                Err(_) => defaults.cors_origins,
            },
            cookie_secure: parse_var("COOKIE_SECURE", is_production)?,
            rotate_refresh_tokens: parse_var("ROTATE_REFRESH_TOKENS", false)?,
            bcrypt_cost: parse_var("BCRYPT_COST", defaults.bcrypt_cost)?,
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            environment,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Address the HTTP server binds to
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn require_database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .ok_or_else(|| anyhow!("DATABASE_URL must be set in environment variables"))
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{name} must be valid: {e}")),
        Err(_) => Ok(default),
    }
}

/// Upper bound for configured lifetimes, keeps expiry timestamps in range
const MAX_DURATION_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Parse `900`, `30s`, `15m`, `12h` or `7d`
pub fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    let (digits, unit) = match raw.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
        Some((idx, _)) => raw.split_at(idx),
        None => (raw, "s"),
    };
    let value: u64 = digits
        .parse()
        .map_err(|_| anyhow!("invalid duration '{raw}'"))?;
    let multiplier: u64 = match unit {
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        other => return Err(anyhow!("unknown duration unit '{other}' in '{raw}'")),
    };
    let seconds = value
        .checked_mul(multiplier)
        .filter(|secs| *secs <= MAX_DURATION_SECS)
        .ok_or_else(|| anyhow!("duration '{raw}' is too large"))?;
    Ok(Duration::from_secs(seconds))
}
