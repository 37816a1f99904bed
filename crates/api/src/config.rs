//! Process configuration, read once from the environment at startup.

use core::str::FromStr;
use std::net::SocketAddr;

use thiserror::Error;

use catalog_observability::LogFormat;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} is required{reason}")]
    Missing { key: &'static str, reason: &'static str },

    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `BIND_ADDR`
    pub bind_addr: SocketAddr,
    /// `USE_PERSISTENT_STORES`
    pub use_persistent_stores: bool,
    /// `DATABASE_URL`
    pub database_url: Option<String>,
    /// `DATABASE_MAX_CONNECTIONS`
    pub database_max_connections: u32,
    /// `LOG_FORMAT`
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            use_persistent_stores: false,
            database_url: None,
            database_max_connections: 5,
            log_format: LogFormat::Json,
        }
    }
}

fn parse<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: core::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => {
            let parsed = value.trim().parse::<T>();
            parsed.map_err(|e| ConfigError::Invalid {
                key,
                reason: e.to_string(),
                value,
            })
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            bind_addr: parse("BIND_ADDR", lookup("BIND_ADDR"), defaults.bind_addr)?,
            use_persistent_stores: parse(
                "USE_PERSISTENT_STORES",
                lookup("USE_PERSISTENT_STORES"),
                defaults.use_persistent_stores,
            )?,
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            database_max_connections: parse(
                "DATABASE_MAX_CONNECTIONS",
                lookup("DATABASE_MAX_CONNECTIONS"),
                defaults.database_max_connections,
            )?,
            log_format: parse("LOG_FORMAT", lookup("LOG_FORMAT"), defaults.log_format)?,
        };

        if config.use_persistent_stores && config.database_url.is_none() {
            return Err(ConfigError::Missing {
                key: "DATABASE_URL",
                reason: " when USE_PERSISTENT_STORES=true",
            });
        }
        if config.database_max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "DATABASE_MAX_CONNECTIONS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(config)
    }
}
