//! Client configuration

use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Deep reasoning on the backend runs its agents serially, so turns are slow
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds greater than zero, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },
    #[error("{var} must be a boolean (true/false, 1/0, yes/no, on/off), got {value:?}")]
    InvalidFlag { var: &'static str, value: String },
    #[error("{var} must be an http(s) URL, got {value:?}")]
    InvalidUrl { var: &'static str, value: String },
}

/// Configuration for the session client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the diagnostic API, without the trailing route
    pub api_base_url: String,
    pub request_timeout: Duration,
    /// Seed each new session with the welcome/disclaimer message
    pub welcome_message: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            welcome_message: true,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unset or blank variables
    /// fall back to defaults; set-but-invalid ones are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get("SCBR_API_BASE_URL") {
            let url = url.trim();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl {
                    var: "SCBR_API_BASE_URL",
                    value: url.to_string(),
                });
            }
            config.api_base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(raw) = get("SCBR_REQUEST_TIMEOUT_SECS") {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or(ConfigError::InvalidTimeout {
                    var: "SCBR_REQUEST_TIMEOUT_SECS",
                    value: raw.clone(),
                })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = get("SCBR_WELCOME_MESSAGE") {
            config.welcome_message = parse_flag(&raw).ok_or(ConfigError::InvalidFlag {
                var: "SCBR_WELCOME_MESSAGE",
                value: raw.clone(),
            })?;
        }

        Ok(config)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
