//! Application configuration loaded from environment variables.

use crate::errors::{ApiError, Result};

/// Signing secret used when `JWT_SECRET` is unset. Development only.
pub const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database URL or file path
    pub database_url: String,
    /// Port for the REST API server
    pub api_port: u16,
    /// HS256 secret for session tokens
    pub jwt_secret: String,
    /// Lifetime of an issued session token, in seconds
    pub token_ttl_secs: u64,
    /// Lifetime of a login nonce, in seconds
    pub nonce_ttl_secs: u64,
    /// How often (in seconds) expired nonces are swept
    pub nonce_sweep_interval_secs: u64,
    /// Seed a demo organizer and trip at startup
    pub seed_demo: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            database_url: env_var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./trusttrip.db".to_string()),
            api_port: parse_or("API_PORT", "4000")?,
            jwt_secret: env_var("JWT_SECRET").unwrap_or_else(|_| DEV_JWT_SECRET.to_string()),
            token_ttl_secs: parse_or("TOKEN_TTL_SECS", "86400")?,
            nonce_ttl_secs: parse_or("NONCE_TTL_SECS", "300")?,
            nonce_sweep_interval_secs: parse_or("NONCE_SWEEP_INTERVAL_SECS", "60")?,
            seed_demo: env_var("SEED_DEMO")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| ApiError::Config(format!("Missing env var: {key}")))
}

fn parse_or<T: std::str::FromStr>(key: &str, default: &str) -> Result<T> {
    env_var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| ApiError::Config(format!("Invalid {key}")))
}

#[cfg(test)]
impl Config {
    /// Configuration for in-process tests; never reads the environment.
    pub fn for_tests() -> Self {
        Config {
            database_url: "sqlite::memory:".to_string(),
            api_port: 0,
            jwt_secret: "test-secret-test-secret-test-secret".to_string(),
            token_ttl_secs: 3600,
            nonce_ttl_secs: 300,
            nonce_sweep_interval_secs: 60,
            seed_demo: false,
        }
    }
}
