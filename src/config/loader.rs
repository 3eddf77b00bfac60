//! Load settings from the process environment (after `.env`, if present).

use crate::config::types::*;
use crate::error::ConfigError;
use std::str::FromStr;
use std::time::Duration;

impl Config {
    /// Read `.env` if present, then the process environment.
    pub fn from_env() -> Result<Config, ConfigError> {
        dotenvy::dotenv().ok();
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let mut database = DatabaseConfig::new(url);
        if let Some(v) = get("DATABASE_MAX_CONNECTIONS") {
            database.max_connections = parse("DATABASE_MAX_CONNECTIONS", &v)?;
            if database.max_connections == 0 {
                return Err(ConfigError::Invalid {
                    key: "DATABASE_MAX_CONNECTIONS",
                    value: v,
                });
            }
        }
        if let Some(v) = get("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            database.acquire_timeout = Duration::from_secs(parse("DATABASE_ACQUIRE_TIMEOUT_SECS", &v)?);
        }

        let mut server = ServerConfig::default();
        if let Some(v) = get("HOST") {
            server.host = parse("HOST", &v)?;
        }
        if let Some(v) = get("PORT") {
            server.port = parse("PORT", &v)?;
        }

        Ok(Config { server, database })
    }
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}
