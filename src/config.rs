//! Process configuration, read from the environment once at startup and
//! passed down explicitly.

use thiserror::Error;

pub const DEFAULT_HEALTH_PORT: u16 = 5000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("environment variable {name} is invalid: {message}")]
    Invalid { name: &'static str, message: String },
}

/// Telegram application credentials and the liveness port.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_id: i64,
    pub api_hash: String,
    pub bot_token: String,
    pub health_port: u16,
}

impl Config {
    /// Read configuration from the process environment. `.env` should have
    /// been loaded by the caller already.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_id = require(&lookup, "API_ID")?
            .parse::<i64>()
            .map_err(|err| ConfigError::Invalid {
                name: "API_ID",
                message: err.to_string(),
            })?;
        let api_hash = require(&lookup, "API_HASH")?;
        let bot_token = require(&lookup, "BOT_TOKEN")?;

        let health_port = match lookup("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|err| ConfigError::Invalid {
                name: "PORT",
                message: err.to_string(),
            })?,
            None => DEFAULT_HEALTH_PORT,
        };

        Ok(Self {
            api_id,
            api_hash,
            bot_token,
            health_port,
        })
    }
}

fn require(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}
