use anyhow::{Context, Result};

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Client configuration loaded from environment variables (and `.env`).
/// Nothing is required; every value has a default or is optional.
#[derive(Debug, Clone)]
pub struct Config {
    pub service_url: String,
    /// Forwarded as `api_key` on generation requests when set.
    pub api_key: Option<String>,
    /// Service passcode; when set the client logs in once at startup.
    pub passcode: Option<String>,
    pub request_timeout_secs: u64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            service_url: std::env::var("TAILOR_SERVICE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_SERVICE_URL.to_string()),
            api_key: optional_env("TAILOR_API_KEY"),
            passcode: optional_env("TAILOR_PASSCODE"),
            request_timeout_secs: match optional_env("TAILOR_REQUEST_TIMEOUT_SECS") {
                Some(raw) => raw
                    .parse::<u64>()
                    .context("TAILOR_REQUEST_TIMEOUT_SECS must be a whole number of seconds")?,
                None => DEFAULT_TIMEOUT_SECS,
            },
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Reads an env var, treating unset and blank the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
