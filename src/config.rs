//! Runtime configuration read from the environment.

use std::env;
use std::str::FromStr;

use crate::errors::ConfigError;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://places.db";

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Retry policy for outgoing Telegram requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryConfig {
    /// Maximum number of retry attempts after the first send
    pub max_retries: u32,
    /// Base delay between retries in milliseconds
    pub base_retry_delay_ms: u64,
    /// Maximum delay between retries in milliseconds
    pub max_retry_delay_ms: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_retry_delay_ms: 500,
            max_retry_delay_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bot_token: String,
    pub database_url: String,
    /// Users promoted to administrators at startup
    pub admin_ids: Vec<i64>,
    pub log_format: LogFormat,
    /// Number of reviews listed per place
    pub review_limit: u32,
    pub delivery: DeliveryConfig,
}

impl Config {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bot_token = get("TELEGRAM_BOT_TOKEN").ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;
        let database_url = get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let admin_ids = match get("ADMIN_IDS") {
            Some(raw) => parse_admin_ids(&raw)?,
            None => Vec::new(),
        };

        let log_format = match get("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT",
                    value: other.to_string(),
                })
            }
        };

        let review_limit: u32 = parse_or("REVIEW_LIST_LIMIT", get("REVIEW_LIST_LIMIT"), 5)?;
        if review_limit == 0 {
            return Err(ConfigError::Invalid {
                key: "REVIEW_LIST_LIMIT",
                value: "0".to_string(),
            });
        }

        let defaults = DeliveryConfig::default();
        let delivery = DeliveryConfig {
            max_retries: parse_or(
                "DELIVERY_MAX_RETRIES",
                get("DELIVERY_MAX_RETRIES"),
                defaults.max_retries,
            )?,
            base_retry_delay_ms: parse_or(
                "DELIVERY_BASE_DELAY_MS",
                get("DELIVERY_BASE_DELAY_MS"),
                defaults.base_retry_delay_ms,
            )?,
            max_retry_delay_ms: parse_or(
                "DELIVERY_MAX_DELAY_MS",
                get("DELIVERY_MAX_DELAY_MS"),
                defaults.max_retry_delay_ms,
            )?,
        };

        Ok(Self {
            bot_token,
            database_url,
            admin_ids,
            log_format,
            review_limit,
            delivery,
        })
    }
}

fn parse_or<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

fn parse_admin_ids(raw: &str) -> Result<Vec<i64>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse().map_err(|_| ConfigError::Invalid {
                key: "ADMIN_IDS",
                value: id.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("TELEGRAM_BOT_TOKEN", "123:abc")]).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert!(config.admin_ids.is_empty());
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.review_limit, 5);
        assert_eq!(config.delivery, DeliveryConfig::default());
    }

    #[test]
    fn test_missing_token() {
        assert_eq!(
            config_from(&[]).unwrap_err(),
            ConfigError::Missing("TELEGRAM_BOT_TOKEN")
        );
    }

    #[test]
    fn test_admin_ids() {
        let config = config_from(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("ADMIN_IDS", "42, 1001 ,"),
        ])
        .unwrap();
        assert_eq!(config.admin_ids, vec![42, 1001]);

        let err = config_from(&[("TELEGRAM_BOT_TOKEN", "t"), ("ADMIN_IDS", "42,bob")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "ADMIN_IDS",
                value: "bob".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_values() {
        assert!(config_from(&[("TELEGRAM_BOT_TOKEN", "t"), ("REVIEW_LIST_LIMIT", "0")]).is_err());
        assert!(config_from(&[("TELEGRAM_BOT_TOKEN", "t"), ("LOG_FORMAT", "xml")]).is_err());
        assert!(config_from(&[("TELEGRAM_BOT_TOKEN", "t"), ("DELIVERY_MAX_RETRIES", "-1")]).is_err());

        let config = config_from(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("LOG_FORMAT", "json"),
            ("DELIVERY_BASE_DELAY_MS", "250"),
        ])
        .unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.delivery.base_retry_delay_ms, 250);
    }
}
