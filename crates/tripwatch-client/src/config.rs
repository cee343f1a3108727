//! Trips API client configuration.
//!
//! Defaults target a local backend. Override via environment variables or
//! explicit construction.

use url::Url;
use zeroize::Zeroizing;

use crate::retry::RetryPolicy;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the trips API.
///
/// `Debug` redacts `api_token`.
#[derive(Clone)]
pub struct SourceConfig {
    /// Base URL of the backend. Paths such as `/api/v1/trips` are appended.
    pub base_url: Url,
    /// Optional bearer token, zeroized on drop.
    pub api_token: Option<Zeroizing<String>>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Backoff for requests that never reached the backend.
    pub retry: RetryPolicy,
}

impl std::fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .field("retry", &self.retry)
            .finish()
    }
}

impl SourceConfig {
    /// Build a configuration for a base URL with the default timeout.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_url("base_url", base_url)?,
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry: RetryPolicy::default(),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `TRIPWATCH_API_URL` (default: `http://127.0.0.1:8080`)
    /// - `TRIPWATCH_API_TOKEN` (optional)
    /// - `TRIPWATCH_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs = match std::env::var("TRIPWATCH_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        Ok(Self {
            base_url: env_url("TRIPWATCH_API_URL", DEFAULT_BASE_URL)?,
            api_token: std::env::var("TRIPWATCH_API_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty())
                .map(Zeroizing::new),
            timeout_secs,
            retry: RetryPolicy::default(),
        })
    }

    /// A configuration pointing at a local server on `port` (for testing).
    /// Fails fast: short timeout, no retries.
    pub fn local(port: u16) -> Result<Self, ConfigError> {
        Ok(Self::new(&format!("http://127.0.0.1:{port}"))?
            .with_timeout_secs(5)
            .with_retry(RetryPolicy::none()))
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(Zeroizing::new(token.into()));
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    parse_url(var, &raw)
}

fn parse_url(name: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl(name.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(name.to_string(), "not a base URL".to_string()));
    }
    Ok(url)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("TRIPWATCH_TIMEOUT_SECS must be a whole number of seconds, got {0:?}")]
    InvalidTimeout(String),
    #[error("API token contains characters not allowed in a header")]
    InvalidToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_builds_valid_config() {
        let cfg = SourceConfig::local(9000).unwrap();
        assert_eq!(cfg.base_url.as_str(), "http://127.0.0.1:9000/");
        assert_eq!(cfg.timeout_secs, 5);
        assert_eq!(cfg.retry, RetryPolicy::none());
        assert!(cfg.api_token.is_none());
    }

    #[test]
    fn debug_redacts_token() {
        let cfg = SourceConfig::local(9000).unwrap().with_token("s3cret");
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn env_url_uses_default_when_var_absent() {
        let url = env_url("TRIPWATCH_NONEXISTENT_VAR_7731", "https://trips.example.com").unwrap();
        assert_eq!(url.as_str(), "https://trips.example.com/");
    }

    #[test]
    fn new_uses_default_backoff() {
        let cfg = SourceConfig::new("http://trips.internal").unwrap();
        assert_eq!(cfg.retry, RetryPolicy::default());
    }

    #[test]
    fn rejects_invalid_urls() {
        assert!(SourceConfig::new("not a url").is_err());
        assert!(SourceConfig::new("mailto:ops@example.com").is_err());
    }
}
