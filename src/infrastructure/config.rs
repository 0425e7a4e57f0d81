use crate::infrastructure::telegram::DEFAULT_TELEGRAM_API_BASE;
use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CHECKOUT_BASE_URL: &str = "http://localhost:8080/checkout";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Without a token notifications are only logged.
    pub bot_token: Option<String>,
    pub admin_chat_id: String,
    pub api_base: String,
}

/// Credentials of a manager account created at startup when absent.
#[derive(Debug, Clone)]
pub struct ManagerSeed {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub telegram: TelegramConfig,
    pub checkout_base_url: String,
    pub manager_seed: Option<ManagerSeed>,
}

impl AppConfig {
    /// Reads the process environment, after loading `.env` if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| optional(key).ok_or(ConfigError::Missing(key));

        let port = match optional("APP_PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "APP_PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let manager_seed = match (optional("ADMIN_EMAIL"), optional("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(ManagerSeed { email, password }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("ADMIN_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::Missing("ADMIN_EMAIL")),
        };

        Ok(Self {
            host: optional("APP_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            jwt_secret: required("JWT_SECRET")?,
            telegram: TelegramConfig {
                bot_token: optional("TELEGRAM_BOT_TOKEN"),
                admin_chat_id: required("TELEGRAM_ADMIN_CHAT_ID")?,
                api_base: optional("TELEGRAM_API_BASE")
                    .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string()),
            },
            checkout_base_url: optional("PAYMENT_CHECKOUT_BASE_URL")
                .unwrap_or_else(|| DEFAULT_CHECKOUT_BASE_URL.to_string()),
            manager_seed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s3cret"),
            ("TELEGRAM_ADMIN_CHAT_ID", "-100"),
        ]))
        .unwrap();

        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.telegram.api_base, "https://api.telegram.org");
        assert!(cfg.telegram.bot_token.is_none());
        assert!(cfg.manager_seed.is_none());
    }

    #[test]
    fn test_missing_jwt_secret_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("TELEGRAM_ADMIN_CHAT_ID", "-100")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let err = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s3cret"),
            ("TELEGRAM_ADMIN_CHAT_ID", "  "),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing("TELEGRAM_ADMIN_CHAT_ID"));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s3cret"),
            ("TELEGRAM_ADMIN_CHAT_ID", "-100"),
            ("APP_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "APP_PORT", .. }));
    }

    #[test]
    fn test_manager_seed_requires_both_values() {
        let err = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s3cret"),
            ("TELEGRAM_ADMIN_CHAT_ID", "-100"),
            ("ADMIN_EMAIL", "boss@example.com"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing("ADMIN_PASSWORD"));

        let cfg = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s3cret"),
            ("TELEGRAM_ADMIN_CHAT_ID", "-100"),
            ("ADMIN_EMAIL", "boss@example.com"),
            ("ADMIN_PASSWORD", "pw"),
        ]))
        .unwrap();
        assert_eq!(cfg.manager_seed.unwrap().email, "boss@example.com");
    }
}
