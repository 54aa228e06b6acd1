//! Client configuration loaded from environment variables.
//!
//! | variable           | meaning                                   | default        |
//! |--------------------|-------------------------------------------|----------------|
//! | `APP_ENV`          | `development`, `staging`, `production`    | `development`  |
//! | `API_URL`          | backend base URL                          | per environment|
//! | `API_CREDENTIALS`  | `bearer` or `cookie`                      | `bearer`       |
//! | `API_COOKIE_NAME`  | cookie name in cookie mode                | `jwt`          |
//! | `API_TIMEOUT_SECS` | per-request timeout                       | `30`           |
//! | `API_TOKEN_KEY`    | key the token is stored under             | `jwt`          |

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::credential::{CredentialMode, DEFAULT_COOKIE_NAME};
use crate::error::ConfigError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TOKEN_KEY: &str = "jwt";
pub const DEVELOPMENT_URL: &str = "http://localhost:8080";

/// Deployment environment the client runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Base URL used when none is configured. Only development has one.
    pub fn default_base_url(self) -> Option<&'static str> {
        match self {
            Environment::Development => Some(DEVELOPMENT_URL),
            Environment::Staging | Environment::Production => None,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        })
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::Invalid {
                key: "APP_ENV",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(default)]
    pub credential_mode: CredentialMode,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_token_key")]
    pub token_key: String,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_token_key() -> String {
    DEFAULT_TOKEN_KEY.to_string()
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            credential_mode: CredentialMode::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            token_key: default_token_key(),
        }
    }

    pub fn for_environment(environment: Environment) -> Result<Self, ConfigError> {
        environment
            .default_base_url()
            .map(Self::new)
            .ok_or_else(|| ConfigError::MissingBaseUrl(environment.to_string()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which returns the value of a
    /// variable or `None` when unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = match get("APP_ENV") {
            Some(raw) => raw.parse()?,
            None => Environment::default(),
        };

        let mut config = match get("API_URL") {
            Some(url) => Self::new(url.trim()),
            None => Self::for_environment(environment)?,
        };

        if let Some(raw) = get("API_CREDENTIALS") {
            let mode = raw.trim().to_ascii_lowercase();
            config.credential_mode = match mode.as_str() {
                "bearer" => CredentialMode::Bearer,
                "cookie" => CredentialMode::Cookie {
                    name: get("API_COOKIE_NAME").unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string()),
                },
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "API_CREDENTIALS",
                        value: raw,
                    })
                }
            };
        }

        if let Some(raw) = get("API_TIMEOUT_SECS") {
            config.timeout_secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid {
                    key: "API_TIMEOUT_SECS",
                    value: raw,
                })?;
        }

        if let Some(key) = get("API_TOKEN_KEY") {
            config.token_key = key;
        }

        Ok(config)
    }
}
