//! Client runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the services that
//! need it. Nothing in this crate reads environment variables; the binary reads them and
//! hands the raw values to the `*_from_env_value` helpers below.

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_DOWNLOAD_DIR, DEFAULT_FRONTEND_URL, DEFAULT_SESSION_FILE,
    DEFAULT_TIMEOUT_MS,
};
use crate::{CoreError, CoreResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Client configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    api_base_url: String,
    timeout: Duration,
    session_file: PathBuf,
    download_dir: PathBuf,
    frontend_base_url: String,
}

impl ClientConfig {
    /// Create a new `ClientConfig`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidConfig` if either URL is not `http(s)://` or the timeout
    /// is zero.
    pub fn new(
        api_base_url: String,
        timeout: Duration,
        session_file: PathBuf,
        download_dir: PathBuf,
        frontend_base_url: String,
    ) -> CoreResult<Self> {
        let api_base_url = validate_base_url("api base url", &api_base_url)?;
        let frontend_base_url = validate_base_url("frontend base url", &frontend_base_url)?;

        if timeout.is_zero() {
            return Err(CoreError::InvalidConfig(
                "request timeout must be greater than zero".into(),
            ));
        }

        Ok(Self {
            api_base_url,
            timeout,
            session_file,
            download_dir,
            frontend_base_url,
        })
    }

    /// Base URL of the versioned REST API, without a trailing slash.
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Server root (the API base with its `/api/vN` suffix removed), used for `/health`.
    pub fn server_root(&self) -> &str {
        match self.api_base_url.find("/api/") {
            Some(index) => &self.api_base_url[..index],
            None => &self.api_base_url,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn session_file(&self) -> &Path {
        &self.session_file
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    pub fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            frontend_base_url: DEFAULT_FRONTEND_URL.to_string(),
        }
    }
}

fn validate_base_url(label: &str, value: &str) -> CoreResult<String> {
    let trimmed = value.trim().trim_end_matches('/');
    let rest = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"));

    match rest {
        Some(host) if !host.is_empty() && !host.starts_with('/') => Ok(trimmed.to_string()),
        _ => Err(CoreError::InvalidConfig(format!(
            "{label} must start with http:// or https:// and name a host, got {value:?}"
        ))),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the API base URL from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_API_URL`].
pub fn api_url_from_env_value(value: Option<String>) -> String {
    non_blank(value).unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// Parse the request timeout (milliseconds) from an optional string value.
///
/// # Errors
///
/// Returns `CoreError::InvalidConfig` if the value is present but not a positive integer.
pub fn timeout_from_env_value(value: Option<String>) -> CoreResult<Duration> {
    match non_blank(value) {
        None => Ok(Duration::from_millis(DEFAULT_TIMEOUT_MS)),
        Some(raw) => match raw.parse::<u64>() {
            Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
            _ => Err(CoreError::InvalidConfig(format!(
                "INDER_API_TIMEOUT_MS must be a positive integer, got {raw:?}"
            ))),
        },
    }
}

pub fn session_file_from_env_value(value: Option<String>) -> PathBuf {
    PathBuf::from(non_blank(value).unwrap_or_else(|| DEFAULT_SESSION_FILE.to_string()))
}

pub fn download_dir_from_env_value(value: Option<String>) -> PathBuf {
    PathBuf::from(non_blank(value).unwrap_or_else(|| DEFAULT_DOWNLOAD_DIR.to_string()))
}

pub fn frontend_url_from_env_value(value: Option<String>) -> String {
    non_blank(value).unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string())
}
