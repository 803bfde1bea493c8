//! Client configuration loaded from the environment.
//!
//! A `.env` file in the working directory is honoured for local development.

use std::time::Duration;

use taleweave_core::credentials::Credentials;

/// Default API root, including the version prefix.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/v1";
/// Generation endpoints can take a long time, so the default is generous.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const ENV_API_URL: &str = "TALEWEAVE_API_URL";
const ENV_API_TOKEN: &str = "TALEWEAVE_API_TOKEN";
const ENV_TIMEOUT_SECS: &str = "TALEWEAVE_TIMEOUT_SECS";

/// Configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("missing the environment variable {0}")]
    MissingVar(&'static str),

    /// A variable is set to something unusable.
    #[error("invalid value for the environment variable {0}: {1}")]
    InvalidValue(&'static str, String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Settings for [`HttpStoryService`](crate::client::HttpStoryService).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, e.g. `http://localhost:8080/api/v1`.
    pub api_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Bearer token, if one was configured.
    pub token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            token: None,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the timeout is not a positive
    /// integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the timeout is not a positive
    /// integer.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let api_url = non_empty(ENV_API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        let token = non_empty(ENV_API_TOKEN);
        let timeout_secs = non_empty(ENV_TIMEOUT_SECS)
            .map(|raw| match raw.parse::<u64>() {
                Ok(0) => Err(ConfigError::InvalidValue(
                    ENV_TIMEOUT_SECS,
                    "must be greater than zero".to_owned(),
                )),
                Ok(secs) => Ok(secs),
                Err(e) => Err(ConfigError::InvalidValue(ENV_TIMEOUT_SECS, e.to_string())),
            })
            .transpose()?
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            api_url,
            timeout: Duration::from_secs(timeout_secs),
            token,
        })
    }

    /// Returns the configured credentials.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingVar` if no token is configured.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        self.token
            .as_deref()
            .map(Credentials::bearer)
            .ok_or(ConfigError::MissingVar(ENV_API_TOKEN))
    }
}
