use std::{path::PathBuf, time::Duration};

use thiserror::Error;
use url::Url;

pub const API_URL_VAR: &str = "SIGNAL_DESK_API_URL";
pub const POLL_SECS_VAR: &str = "SIGNAL_DESK_POLL_SECS";
pub const TIMEOUT_SECS_VAR: &str = "SIGNAL_DESK_TIMEOUT_SECS";
pub const TOKEN_FILE_VAR: &str = "SIGNAL_DESK_TOKEN_FILE";

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_POLL_SECS: u64 = 150;
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TOKEN_FILE: &str = ".signal-desk-token";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid base URL {value:?}: {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid value for {var}: {value:?} (expected {expected})")]
    InvalidValue {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_url: Url,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub token_file: PathBuf,
}

impl AppConfig {
    /// Reads `.env` (if any) and then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(raw_url.trim()).map_err(|source| ConfigError::InvalidUrl {
            value: raw_url.clone(),
            source,
        })?;

        let poll_secs = parse_secs(&lookup, POLL_SECS_VAR, DEFAULT_POLL_SECS)?;
        let timeout_secs = parse_secs(&lookup, TIMEOUT_SECS_VAR, DEFAULT_TIMEOUT_SECS)?;

        let token_file = lookup(TOKEN_FILE_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE));

        Ok(Self {
            api_url,
            poll_interval: Duration::from_secs(poll_secs),
            request_timeout: Duration::from_secs(timeout_secs),
            token_file,
        })
    }
}

fn parse_secs<F>(lookup: &F, var: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => match value.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(secs),
            _ => Err(ConfigError::InvalidValue {
                var,
                value,
                expected: "a positive number of seconds",
            }),
        },
    }
}
