//! Client configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honoured for local development.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default backend root (the Django dev server).
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// Default location of the persisted session.
pub const DEFAULT_TOKEN_STORAGE_FILE: &str = "auth_tokens.json";

/// Backend paths, relative to `Config::api_base_url`.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub login: String,
    pub signup: String,
    pub token_refresh: String,
    pub upload: String,
    pub history: String,
    pub profile: String,
    pub logout: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            login: "/app1/token/".to_string(),
            signup: "/signup/".to_string(),
            token_refresh: "/app1/token/refresh/".to_string(),
            upload: "/web/upload".to_string(),
            history: "/get-history/".to_string(),
            profile: "/auth/me/".to_string(),
            logout: "/auth/logout/".to_string(),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend root, without trailing slash
    pub api_base_url: String,
    /// Transport timeout; `None` leaves reqwest's defaults in place
    pub timeout: Option<Duration>,
    /// Where the session is persisted between runs
    pub token_storage_file: PathBuf,
    /// Emit JSON log lines instead of human-readable ones
    pub log_json: bool,
    pub endpoints: Endpoints,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_base_url =
            env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        let api_base_url = normalize_base_url(&api_base_url)?;

        let timeout = match env::var("API_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid("API_TIMEOUT_SECS", raw.clone()))?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            Err(_) => None,
        };

        Ok(Self {
            api_base_url,
            timeout,
            token_storage_file: env::var("TOKEN_STORAGE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_TOKEN_STORAGE_FILE)),
            log_json: env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            endpoints: Endpoints::default(),
        })
    }

    /// Config pointing at a specific backend, for tests.
    pub fn test_default(api_base_url: &str) -> Self {
        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            timeout: Some(Duration::from_secs(5)),
            token_storage_file: PathBuf::from(DEFAULT_TOKEN_STORAGE_FILE),
            log_json: false,
            endpoints: Endpoints::default(),
        }
    }
}

/// Check the base URL is absolute http(s) and strip any trailing slash.
fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let parsed = reqwest::Url::parse(trimmed)
        .map_err(|_| ConfigError::Invalid("API_BASE_URL", raw.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid("API_BASE_URL", raw.to_string()));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
