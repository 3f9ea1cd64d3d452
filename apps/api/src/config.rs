use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub redis_url: String,
    pub sender_email: String,
    pub aws_region: String,
    /// Overrides the SES endpoint (LocalStack and friends). `None` uses the AWS default.
    pub ses_endpoint: Option<String>,
    pub dashboard_url: String,
    pub digest_cron: String,
    pub run_lock_ttl_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            database_max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 10)?,
            redis_url: require_env("REDIS_URL")?,
            sender_email: require_env("SENDER_EMAIL")?,
            aws_region: std::env::var("AWS_REGION").unwrap_or_else(|_| "eu-north-1".to_string()),
            ses_endpoint: std::env::var("SES_ENDPOINT").ok().filter(|v| !v.trim().is_empty()),
            dashboard_url: std::env::var("DASHBOARD_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            digest_cron: std::env::var("DIGEST_CRON").unwrap_or_else(|_| "0 0 * * * *".to_string()),
            run_lock_ttl_secs: parse_env("RUN_LOCK_TTL_SECS", 900)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
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
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let port: u16 = parse_env("DEALFLOW_TEST_UNSET_PORT", 8080).unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("DEALFLOW_TEST_BAD_TTL", "soon");
        let err = parse_env::<u64>("DEALFLOW_TEST_BAD_TTL", 900).unwrap_err();
        assert!(err.to_string().contains("DEALFLOW_TEST_BAD_TTL"));
    }

    #[test]
    fn test_parse_env_trims_value() {
        std::env::set_var("DEALFLOW_TEST_MAX_CONN", " 25 ");
        let max: u32 = parse_env("DEALFLOW_TEST_MAX_CONN", 10).unwrap();
        assert_eq!(max, 25);
    }

    #[test]
    fn test_require_env_names_missing_key() {
        let err = require_env("DEALFLOW_TEST_MISSING_URL").unwrap_err();
        assert!(err.to_string().contains("DEALFLOW_TEST_MISSING_URL"));
    }
}
