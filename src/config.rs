use std::env;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use dotenvy::dotenv;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub jwt_secret: String,

    // Remote presence API; in-memory stores when unset
    pub api_base_url: Option<String>,
    pub api_token: Option<String>,
    pub api_timeout: Duration,

    pub api_prefix: String,
    pub rate_protected_per_min: u32,
    pub roster_cache_ttl: Duration,
    pub session_ttl: Duration,
    pub log_level: tracing::Level,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow!("{key} must be set"))
        };
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let number = |key: &str, default: u64| -> Result<u64> {
            match optional(key) {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .with_context(|| format!("{key} must be a whole number, got {raw:?}")),
                None => Ok(default),
            }
        };

        let log_level = match optional("LOG_LEVEL") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| anyhow!("LOG_LEVEL {raw:?} is not a tracing level"))?,
            None => tracing::Level::DEBUG,
        };

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            jwt_secret: required("JWT_SECRET")?,

            api_base_url: optional("API_BASE_URL"),
            api_token: optional("API_TOKEN"),
            api_timeout: Duration::from_secs(number("API_TIMEOUT_SECS", 15)?),

            api_prefix: optional("API_PREFIX").unwrap_or_else(|| "/api".to_string()),
            rate_protected_per_min: u32::try_from(number("RATE_PROTECTED_PER_MIN", 1000)?)
                .context("RATE_PROTECTED_PER_MIN is too large")?,
            roster_cache_ttl: Duration::from_secs(number("ROSTER_CACHE_TTL_SECS", 60)?),
            session_ttl: Duration::from_secs(number("SESSION_TTL_SECS", 3600)?),
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_required_vars_are_set() {
        let cfg = config(&[("SERVER_ADDR", "127.0.0.1:8080"), ("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(cfg.api_base_url, None);
        assert_eq!(cfg.api_prefix, "/api");
        assert_eq!(cfg.api_timeout, Duration::from_secs(15));
        assert_eq!(cfg.rate_protected_per_min, 1000);
        assert_eq!(cfg.roster_cache_ttl, Duration::from_secs(60));
        assert_eq!(cfg.session_ttl, Duration::from_secs(3600));
        assert_eq!(cfg.log_level, tracing::Level::DEBUG);
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = config(&[("SERVER_ADDR", "127.0.0.1:8080")]).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = config(&[
            ("SERVER_ADDR", "0.0.0.0:9000"),
            ("JWT_SECRET", "s3cret"),
            ("API_BASE_URL", "https://presence.example.com/api"),
            ("API_TOKEN", "svc"),
            ("API_TIMEOUT_SECS", "5"),
            ("LOG_LEVEL", "warn"),
        ])
        .unwrap();
        assert_eq!(cfg.api_base_url.as_deref(), Some("https://presence.example.com/api"));
        assert_eq!(cfg.api_token.as_deref(), Some("svc"));
        assert_eq!(cfg.api_timeout, Duration::from_secs(5));
        assert_eq!(cfg.log_level, tracing::Level::WARN);

        assert!(config(&[("SERVER_ADDR", "x"), ("JWT_SECRET", "y"), ("SESSION_TTL_SECS", "soon")]).is_err());
    }
}
