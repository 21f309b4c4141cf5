//! Server configuration from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `TASKBOARD_HOST` / `HOST` | `127.0.0.1` |
//! | `TASKBOARD_PORT` / `PORT` | `3000` |
//! | `TASKBOARD_DATABASE_URL` | `sqlite://{data_dir}/taskboard.sqlite` |
//! | `TASKBOARD_JWT_SECRET` | required, base64, at least 32 bytes decoded |
//! | `TASKBOARD_ACCESS_TOKEN_TTL_MINUTES` | `1440` |

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::Duration;
use secrecy::SecretString;
use services::services::auth::DEFAULT_ACCESS_TOKEN_TTL_MINUTES;
use thiserror::Error;
use utils::assets::database_path;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const MIN_SECRET_BYTES: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable `{0}` is not set")]
    MissingVar(&'static str),
    #[error("invalid value for environment variable `{name}`: {reason}")]
    InvalidVar { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: SecretString,
    pub access_token_ttl: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let host = get("TASKBOARD_HOST")
            .or_else(|| get("HOST"))
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match get("TASKBOARD_PORT").map(|v| ("TASKBOARD_PORT", v)).or_else(|| {
            get("PORT").map(|v| ("PORT", v))
        }) {
            Some((name, value)) => value.parse::<u16>().map_err(|err| ConfigError::InvalidVar {
                name,
                reason: err.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let database_url = get("TASKBOARD_DATABASE_URL")
            .unwrap_or_else(|| format!("sqlite://{}", database_path().to_string_lossy()));

        let jwt_secret = get("TASKBOARD_JWT_SECRET")
            .ok_or(ConfigError::MissingVar("TASKBOARD_JWT_SECRET"))?;
        validate_secret(&jwt_secret)?;

        let ttl_minutes = match get("TASKBOARD_ACCESS_TOKEN_TTL_MINUTES") {
            Some(value) => {
                let minutes = value.parse::<i64>().map_err(|err| ConfigError::InvalidVar {
                    name: "TASKBOARD_ACCESS_TOKEN_TTL_MINUTES",
                    reason: err.to_string(),
                })?;
                if minutes <= 0 {
                    return Err(ConfigError::InvalidVar {
                        name: "TASKBOARD_ACCESS_TOKEN_TTL_MINUTES",
                        reason: "must be greater than zero".to_string(),
                    });
                }
                minutes
            }
            None => DEFAULT_ACCESS_TOKEN_TTL_MINUTES,
        };

        Ok(Self {
            host,
            port,
            database_url,
            jwt_secret: SecretString::from(jwt_secret),
            access_token_ttl: Duration::minutes(ttl_minutes),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn validate_secret(secret: &str) -> Result<(), ConfigError> {
    let decoded = STANDARD
        .decode(secret)
        .map_err(|err| ConfigError::InvalidVar {
            name: "TASKBOARD_JWT_SECRET",
            reason: format!("not valid base64: {err}"),
        })?;
    if decoded.len() < MIN_SECRET_BYTES {
        return Err(ConfigError::InvalidVar {
            name: "TASKBOARD_JWT_SECRET",
            reason: format!("must decode to at least {MIN_SECRET_BYTES} bytes"),
        });
    }
    Ok(())
}
