//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOCKPILE_API_URL` - Base URL of the Stockpile REST service
//!
//! ## Optional
//! - `STOCKPILE_CONNECT_TIMEOUT_SECS` - Connection establishment ceiling (default: 10)
//! - `STOCKPILE_REQUEST_TIMEOUT_SECS` - Total request ceiling (default: 30)
//! - `STOCKPILE_REFRESH_POLICY` - `shared` or `fail-fast` (default: shared)
//! - `STOCKPILE_DATA_DIR` - Directory for credentials and preferences
//!   (default: the platform data directory joined with `stockpile`)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DATA_DIR_NAME: &str = "stockpile";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("No data directory available; set STOCKPILE_DATA_DIR")]
    NoDataDir,
}

/// How a caller that hits a 401 behaves while another caller is refreshing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    /// Wait for the in-flight refresh and share its outcome.
    #[default]
    SharedAwait,
    /// Reject immediately with `Unauthorized`.
    FailFast,
}

impl FromStr for RefreshPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shared" | "shared-await" => Ok(Self::SharedAwait),
            "fail-fast" | "failfast" => Ok(Self::FailFast),
            other => Err(format!("expected `shared` or `fail-fast`, got `{other}`")),
        }
    }
}

/// Stockpile client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every request path is resolved against (always ends in `/`)
    pub base_url: Url,
    /// Ceiling for establishing a connection
    pub connect_timeout: Duration,
    /// Ceiling for the whole request including the body transfer
    pub request_timeout: Duration,
    /// Concurrent refresh behaviour
    pub refresh_policy: RefreshPolicy,
    /// Directory holding the credential and preference files
    pub data_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Configuration with defaults for everything but the base URL.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            refresh_policy: RefreshPolicy::default(),
            data_dir: None,
        }
    }

    /// Override both timeouts.
    #[must_use]
    pub const fn with_timeouts(mut self, connect: Duration, request: Duration) -> Self {
        self.connect_timeout = connect;
        self.request_timeout = request;
        self
    }

    /// Override the refresh policy.
    #[must_use]
    pub const fn with_refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.refresh_policy = policy;
        self
    }

    /// Override the data directory.
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `STOCKPILE_API_URL` is missing or any
    /// variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ClientConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let raw_url = get("STOCKPILE_API_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("STOCKPILE_API_URL".to_string()))?;
        let base_url = Url::parse(raw_url.trim()).map_err(|e| {
            ConfigError::InvalidEnvVar("STOCKPILE_API_URL".to_string(), e.to_string())
        })?;

        let connect_timeout = parse_secs(
            get("STOCKPILE_CONNECT_TIMEOUT_SECS"),
            "STOCKPILE_CONNECT_TIMEOUT_SECS",
            DEFAULT_CONNECT_TIMEOUT_SECS,
        )?;
        let request_timeout = parse_secs(
            get("STOCKPILE_REQUEST_TIMEOUT_SECS"),
            "STOCKPILE_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;

        let refresh_policy = get("STOCKPILE_REFRESH_POLICY")
            .map(|v| v.parse::<RefreshPolicy>())
            .transpose()
            .map_err(|e| ConfigError::InvalidEnvVar("STOCKPILE_REFRESH_POLICY".to_string(), e))?
            .unwrap_or_default();

        let data_dir = get("STOCKPILE_DATA_DIR").map(PathBuf::from);

        Ok(Self {
            base_url: normalize_base_url(base_url),
            connect_timeout,
            request_timeout,
            refresh_policy,
            data_dir,
        })
    }

    /// Resolve the data directory, falling back to the platform default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoDataDir` if neither is available.
    pub fn resolve_data_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(DATA_DIR_NAME))
            .ok_or(ConfigError::NoDataDir)
    }
}

fn parse_secs(value: Option<String>, key: &str, default: u64) -> Result<Duration, ConfigError> {
    let secs = match value {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?,
        None => default,
    };
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

/// `Url::join` drops the last path segment unless the base ends in `/`.
fn normalize_base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_api_url() {
        let err = ClientConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "STOCKPILE_API_URL"));
    }

    #[test]
    fn test_defaults() {
        let config =
            ClientConfig::from_lookup(lookup(&[("STOCKPILE_API_URL", "https://api.example.com/v1")]))
                .unwrap();

        assert_eq!(config.base_url.as_str(), "https://api.example.com/v1/");
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.refresh_policy, RefreshPolicy::SharedAwait);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("STOCKPILE_API_URL", "http://localhost:8080"),
            ("STOCKPILE_CONNECT_TIMEOUT_SECS", "3"),
            ("STOCKPILE_REQUEST_TIMEOUT_SECS", "12"),
            ("STOCKPILE_REFRESH_POLICY", "fail-fast"),
            ("STOCKPILE_DATA_DIR", "/tmp/stockpile-test"),
        ]))
        .unwrap();

        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.request_timeout, Duration::from_secs(12));
        assert_eq!(config.refresh_policy, RefreshPolicy::FailFast);
        assert_eq!(
            config.resolve_data_dir().unwrap(),
            PathBuf::from("/tmp/stockpile-test")
        );
    }

    #[test]
    fn test_invalid_values() {
        let bad_url = ClientConfig::from_lookup(lookup(&[("STOCKPILE_API_URL", "not a url")]));
        assert!(matches!(bad_url, Err(ConfigError::InvalidEnvVar(..))));

        let zero_timeout = ClientConfig::from_lookup(lookup(&[
            ("STOCKPILE_API_URL", "http://localhost"),
            ("STOCKPILE_REQUEST_TIMEOUT_SECS", "0"),
        ]));
        assert!(matches!(zero_timeout, Err(ConfigError::InvalidEnvVar(..))));

        let bad_policy = ClientConfig::from_lookup(lookup(&[
            ("STOCKPILE_API_URL", "http://localhost"),
            ("STOCKPILE_REFRESH_POLICY", "sometimes"),
        ]));
        assert!(matches!(bad_policy, Err(ConfigError::InvalidEnvVar(..))));
    }

    #[test]
    fn test_base_url_join_keeps_prefix() {
        let config = ClientConfig::new(Url::parse("https://api.example.com/v1").unwrap());
        let joined = config.base_url.join("groups").unwrap();
        assert_eq!(joined.as_str(), "https://api.example.com/v1/groups");
    }
}
