//! Configuration loading and resolution.
//!
//! Explicit values (CLI flags) win over the environment. Everything is
//! checked before the server loop starts; any error here is fatal.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use gitlab_api::DEFAULT_TIMEOUT_SECS;

use crate::transport::framing::DEFAULT_MAX_LINE_BYTES;

pub const TOKEN_ENV: &str = "GITLAB_PERSONAL_ACCESS_TOKEN";
pub const API_URL_ENV: &str = "GITLAB_API_URL";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("GITLAB_PERSONAL_ACCESS_TOKEN is required and must not be empty")]
    MissingToken,
    #[error("GITLAB_API_URL is required and must not be empty")]
    MissingApiUrl,
    #[error("GITLAB_API_URL is not a valid URL ({url}): {reason}")]
    InvalidApiUrl { url: String, reason: String },
    #[error("GITLAB_API_URL must use http or https, got {0}")]
    UnsupportedScheme(String),
}

#[derive(Clone)]
pub struct Config {
    pub token: String,
    pub api_url: Url,
    pub timeout: Duration,
    pub max_line_bytes: Option<usize>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url.as_str())
            .field("timeout", &self.timeout)
            .field("max_line_bytes", &self.max_line_bytes)
            .finish()
    }
}

impl Config {
    /// Resolve from explicit values, falling back to the process environment.
    pub fn resolve(token: Option<String>, api_url: Option<String>) -> Result<Self, ConfigError> {
        Self::resolve_with(token, api_url, |key| std::env::var(key).ok())
    }

    /// Resolve with a custom environment lookup.
    pub fn resolve_with(
        token: Option<String>,
        api_url: Option<String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let token = non_empty(token)
            .or_else(|| non_empty(env(TOKEN_ENV)))
            .ok_or(ConfigError::MissingToken)?;

        let raw_url = non_empty(api_url)
            .or_else(|| non_empty(env(API_URL_ENV)))
            .ok_or(ConfigError::MissingApiUrl)?;

        Ok(Self {
            token,
            api_url: parse_api_url(&raw_url)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_line_bytes: Some(DEFAULT_MAX_LINE_BYTES),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `0` disables the limit.
    pub fn with_max_line_bytes(mut self, max_line_bytes: usize) -> Self {
        self.max_line_bytes = (max_line_bytes > 0).then_some(max_line_bytes);
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidApiUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}
