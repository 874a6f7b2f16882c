use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub gemini_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub save_debounce: Duration,
    pub session_idle: Duration,
    pub token_ttl_hours: i64,
    pub typst_bin: String,
    pub export_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            jwt_secret: require_env("JWT_SECRET")?,
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            save_debounce: Duration::from_millis(parse_env("SAVE_DEBOUNCE_MS", 1500)?),
            session_idle: Duration::from_secs(parse_env("SESSION_IDLE_SECS", 1800)?),
            token_ttl_hours: parse_env("TOKEN_TTL_HOURS", 72)?,
            typst_bin: std::env::var("TYPST_BIN").unwrap_or_else(|_| "typst".to_string()),
            export_timeout: Duration::from_secs(parse_env("EXPORT_TIMEOUT_SECS", 30)?),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_default_when_unset() {
        let value: u64 = parse_env("ARCHITECT_TEST_UNSET_VARIABLE", 1500).unwrap();
        assert_eq!(value, 1500);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("ARCHITECT_TEST_BAD_PORT", "eighty");
        let result: Result<u16> = parse_env("ARCHITECT_TEST_BAD_PORT", 8080);
        assert!(result.is_err());
        std::env::remove_var("ARCHITECT_TEST_BAD_PORT");
    }
}
