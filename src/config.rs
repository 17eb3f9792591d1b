//! Client configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default backend location used by the development server.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/";

/// Chat turns run inference synchronously on the backend, so the default
/// timeout is generous.
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL, always ending in `/`
    pub api_url: String,
    /// JSON file holding the `tokens` and `user` records
    pub credentials_path: PathBuf,
    /// Per-request timeout in seconds
    pub http_timeout_secs: u64,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            credentials_path: PathBuf::from("credentials.json"),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every variable is optional; missing ones fall back to local
    /// development defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_url = env::var("ASSISTANT_API_URL")
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let credentials_path = match env::var("ASSISTANT_CREDENTIALS_PATH") {
            Ok(path) => PathBuf::from(path),
            Err(_) => default_credentials_path()?,
        };

        let http_timeout_secs = match env::var("ASSISTANT_HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("ASSISTANT_HTTP_TIMEOUT_SECS", raw))?,
            Err(_) => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            api_url: normalize_base_url(&api_url),
            credentials_path,
            http_timeout_secs,
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Ensure the base URL ends with exactly one `/` so endpoint paths can be appended.
pub fn normalize_base_url(url: &str) -> String {
    format!("{}/", url.trim_end_matches('/'))
}

fn default_credentials_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(config_dir
        .join("capstone-assistant")
        .join("credentials.json"))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1:?}")]
    Invalid(&'static str, String),

    #[error("Could not determine the user config directory")]
    NoConfigDir,
}
